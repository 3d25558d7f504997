use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ensure_finite, DesignError, DesignResult};

const COMPONENT: &str = "panel";

fn default_noct() -> f64 {
    45.0
}

fn default_cells_in_series() -> u32 {
    60
}

/// PV module datasheet values at standard test conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PanelSpec {
    pub manufacturer: String,
    pub model: String,

    /// Nameplate power (W)
    #[validate(range(exclusive_min = 0.0))]
    pub power_watts: f64,

    /// Module efficiency (0-1)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub efficiency: Option<f64>,

    /// Module area (m²)
    #[validate(range(exclusive_min = 0.0))]
    pub area_m2: f64,

    /// Open-circuit voltage (V)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub voc: Option<f64>,

    /// Short-circuit current (A)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub isc: Option<f64>,

    /// Maximum power point voltage (V)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub vmp: Option<f64>,

    /// Maximum power point current (A)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub imp: Option<f64>,

    /// Fractional power change per °C (typically negative)
    #[serde(default)]
    pub temp_coeff_pmax: Option<f64>,

    /// Fractional Voc change per °C (typically negative)
    #[serde(default)]
    pub temp_coeff_voc: Option<f64>,

    #[serde(default)]
    pub temp_coeff_isc: Option<f64>,

    #[serde(default = "default_noct")]
    pub noct: f64,

    #[serde(default = "default_cells_in_series")]
    pub cells_in_series: u32,

    #[serde(default)]
    pub bifacial: bool,
}

impl PanelSpec {
    pub fn new(
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        power_watts: f64,
        area_m2: f64,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            power_watts,
            efficiency: None,
            area_m2,
            voc: None,
            isc: None,
            vmp: None,
            imp: None,
            temp_coeff_pmax: None,
            temp_coeff_voc: None,
            temp_coeff_isc: None,
            noct: default_noct(),
            cells_in_series: default_cells_in_series(),
            bifacial: false,
        }
    }

    /// Set STC voltages and currents
    pub fn with_electrical(mut self, voc: f64, vmp: f64, isc: f64, imp: f64) -> Self {
        self.voc = Some(voc);
        self.vmp = Some(vmp);
        self.isc = Some(isc);
        self.imp = Some(imp);
        self
    }

    pub fn with_temp_coefficients(mut self, temp_coeff_voc: f64, temp_coeff_pmax: f64) -> Self {
        self.temp_coeff_voc = Some(temp_coeff_voc);
        self.temp_coeff_pmax = Some(temp_coeff_pmax);
        self
    }

    pub fn require_voc(&self) -> DesignResult<f64> {
        self.voc.ok_or_else(|| DesignError::missing(COMPONENT, "voc"))
    }

    pub fn require_vmp(&self) -> DesignResult<f64> {
        self.vmp.ok_or_else(|| DesignError::missing(COMPONENT, "vmp"))
    }

    /// Panels needed to reach a DC capacity, rounded down
    pub fn count_for_capacity(&self, capacity_mw: f64) -> u64 {
        if self.power_watts <= 0.0 {
            return 0;
        }
        (capacity_mw * 1_000_000.0 / self.power_watts).floor() as u64
    }

    /// Explicit range checks followed by the derived rules
    pub fn check(&self) -> DesignResult<()> {
        let power = ensure_finite("panel.power_watts", self.power_watts)?;
        if power <= 0.0 {
            return Err(DesignError::invalid_range("panel.power_watts", power, "> 0"));
        }
        ensure_finite("panel.area_m2", self.area_m2)?;
        for (field, value) in [
            ("panel.voc", self.voc),
            ("panel.vmp", self.vmp),
            ("panel.temp_coeff_voc", self.temp_coeff_voc),
            ("panel.temp_coeff_pmax", self.temp_coeff_pmax),
        ] {
            if let Some(v) = value {
                ensure_finite(field, v)?;
            }
        }
        self.validate()?;
        Ok(())
    }
}
