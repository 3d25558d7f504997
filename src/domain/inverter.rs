use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ensure_finite, DesignError, DesignResult};

const COMPONENT: &str = "inverter";

fn default_mppt_channels() -> u32 {
    1
}

fn default_phases() -> u8 {
    3
}

/// Inverter datasheet values relevant to string sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_dc_window"))]
pub struct InverterSpec {
    pub manufacturer: String,
    pub model: String,

    /// Rated AC output (W)
    #[validate(range(exclusive_min = 0.0))]
    pub power_ac_w: f64,

    /// Maximum DC input (W)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub power_dc_max_w: Option<f64>,

    /// Absolute maximum DC input voltage (V)
    #[serde(default)]
    pub vdc_max: Option<f64>,

    /// Lower bound of the MPPT voltage window (V)
    #[serde(default)]
    pub vdc_min: Option<f64>,

    #[serde(default)]
    pub vdc_nominal: Option<f64>,

    #[serde(default)]
    pub vac_nominal: Option<f64>,

    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency_max: Option<f64>,

    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency_euro: Option<f64>,

    #[serde(default = "default_mppt_channels")]
    #[validate(range(min = 1))]
    pub mppt_channels: u32,

    #[serde(default = "default_phases")]
    #[validate(range(min = 1, max = 3))]
    pub phases: u8,
}

fn validate_dc_window(inverter: &InverterSpec) -> Result<(), ValidationError> {
    match (inverter.vdc_min, inverter.vdc_max) {
        (Some(min), Some(max)) if min >= max => {
            Err(ValidationError::new("vdc_min_not_below_vdc_max"))
        }
        _ => Ok(()),
    }
}

/// MPPT voltage window resolved from the datasheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcWindow {
    pub vdc_min: f64,
    pub vdc_max: f64,
}

impl InverterSpec {
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        power_ac_w: f64,
        mppt_channels: u32,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            power_ac_w,
            power_dc_max_w: None,
            vdc_max: None,
            vdc_min: None,
            vdc_nominal: None,
            vac_nominal: None,
            efficiency_max: None,
            efficiency_euro: None,
            mppt_channels,
            phases: default_phases(),
        }
    }

    pub fn with_dc_window(mut self, vdc_min: f64, vdc_max: f64) -> Self {
        self.vdc_min = Some(vdc_min);
        self.vdc_max = Some(vdc_max);
        self
    }

    /// Both window bounds, ordered and positive
    pub fn dc_window(&self) -> DesignResult<DcWindow> {
        let vdc_max = self
            .vdc_max
            .ok_or_else(|| DesignError::missing(COMPONENT, "vdc_max"))?;
        let vdc_min = self
            .vdc_min
            .ok_or_else(|| DesignError::missing(COMPONENT, "vdc_min"))?;
        ensure_finite("inverter.vdc_max", vdc_max)?;
        ensure_finite("inverter.vdc_min", vdc_min)?;

        if vdc_max <= 0.0 {
            return Err(DesignError::invalid_range("inverter.vdc_max", vdc_max, "> 0"));
        }
        if vdc_min < 0.0 {
            return Err(DesignError::invalid_range("inverter.vdc_min", vdc_min, ">= 0"));
        }
        if vdc_min >= vdc_max {
            return Err(DesignError::invalid_range(
                "inverter.vdc_min",
                vdc_min,
                "below inverter.vdc_max",
            ));
        }
        Ok(DcWindow { vdc_min, vdc_max })
    }

    pub fn check(&self) -> DesignResult<()> {
        let power = ensure_finite("inverter.power_ac_w", self.power_ac_w)?;
        if power <= 0.0 {
            return Err(DesignError::invalid_range("inverter.power_ac_w", power, "> 0"));
        }
        if self.mppt_channels == 0 {
            return Err(DesignError::invalid_range(
                "inverter.mppt_channels",
                0.0,
                ">= 1",
            ));
        }
        self.validate()?;
        Ok(())
    }
}
