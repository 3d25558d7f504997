use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use validator::{Validate, ValidationError};

use crate::error::{ensure_finite, DesignError, DesignResult};

pub const DEFAULT_DC_AC_RATIO: f64 = 1.25;
pub const MIN_DC_AC_RATIO: f64 = 1.0;
pub const MAX_DC_AC_RATIO: f64 = 2.0;

fn default_dc_ac_ratio() -> f64 {
    DEFAULT_DC_AC_RATIO
}

fn default_azimuth() -> Option<f64> {
    Some(180.0)
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModuleOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// GeoJSON polygon outlining the installation area (`[lng, lat]` pairs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationArea {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl InstallationArea {
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }

    pub fn check(&self) -> DesignResult<()> {
        if self.kind != "Polygon" {
            return Err(DesignError::Validation(format!(
                "installation area must be a GeoJSON Polygon, got {}",
                self.kind
            )));
        }
        match self.coordinates.first() {
            Some(ring) if ring.len() >= 3 => Ok(()),
            _ => Err(DesignError::Validation(
                "installation area polygon needs an outer ring of at least 3 points".to_string(),
            )),
        }
    }
}

/// User-controlled parameters of a solar design
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_azimuth"))]
pub struct DesignParameters {
    #[serde(default)]
    pub name: String,

    /// Target DC capacity (MW)
    #[validate(range(exclusive_min = 0.0))]
    pub capacity_mw: f64,

    /// String length override; `None` lets the sizing engine choose
    #[serde(default)]
    #[validate(range(min = 1))]
    pub modules_per_string: Option<u32>,

    #[serde(default)]
    #[validate(range(min = 1))]
    pub strings_per_inverter: Option<u32>,

    #[serde(default)]
    #[validate(range(min = 1))]
    pub total_inverters: Option<u64>,

    #[serde(default = "default_dc_ac_ratio")]
    #[validate(range(min = 1.0, max = 2.0))]
    pub target_dc_ac_ratio: f64,

    /// Degrees from horizontal
    #[serde(default)]
    #[validate(range(min = 0.0, max = 90.0))]
    pub tilt_angle: Option<f64>,

    /// Degrees clockwise from north, [0, 360)
    #[serde(default = "default_azimuth")]
    pub azimuth_angle: Option<f64>,

    /// Row pitch (m)
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub row_spacing: Option<f64>,

    #[serde(default)]
    pub module_orientation: ModuleOrientation,

    #[serde(default)]
    pub installation_area: Option<InstallationArea>,
}

fn validate_azimuth(design: &DesignParameters) -> Result<(), ValidationError> {
    match design.azimuth_angle {
        Some(a) if !(0.0..360.0).contains(&a) => Err(ValidationError::new("azimuth_out_of_range")),
        _ => Ok(()),
    }
}

impl DesignParameters {
    pub fn new(name: impl Into<String>, capacity_mw: f64) -> Self {
        Self {
            name: name.into(),
            capacity_mw,
            modules_per_string: None,
            strings_per_inverter: None,
            total_inverters: None,
            target_dc_ac_ratio: DEFAULT_DC_AC_RATIO,
            tilt_angle: None,
            azimuth_angle: default_azimuth(),
            row_spacing: None,
            module_orientation: ModuleOrientation::default(),
            installation_area: None,
        }
    }

    pub fn with_modules_per_string(mut self, modules: u32) -> Self {
        self.modules_per_string = Some(modules);
        self
    }

    pub fn with_orientation(mut self, tilt: f64, azimuth: f64) -> Self {
        self.tilt_angle = Some(tilt);
        self.azimuth_angle = Some(azimuth);
        self
    }

    /// Full domain check, used when a design is created or merged.
    ///
    /// Out-of-range angles are hard errors here; `validate_configuration`
    /// reports them as findings instead so stored designs can be diagnosed.
    pub fn check(&self) -> DesignResult<()> {
        check_capacity(self.capacity_mw)?;
        check_dc_ac_ratio(self.target_dc_ac_ratio)?;
        if let Some(tilt) = self.tilt_angle {
            let tilt = ensure_finite("design.tilt_angle", tilt)?;
            if !(0.0..=90.0).contains(&tilt) {
                return Err(DesignError::invalid_range("design.tilt_angle", tilt, "[0, 90]"));
            }
        }
        if let Some(azimuth) = self.azimuth_angle {
            let azimuth = ensure_finite("design.azimuth_angle", azimuth)?;
            if !(0.0..360.0).contains(&azimuth) {
                return Err(DesignError::invalid_range(
                    "design.azimuth_angle",
                    azimuth,
                    "[0, 360)",
                ));
            }
        }
        if let Some(area) = &self.installation_area {
            area.check()?;
        }
        self.validate()?;
        Ok(())
    }
}

pub(crate) fn check_capacity(capacity_mw: f64) -> DesignResult<f64> {
    let capacity = ensure_finite("capacity_mw", capacity_mw)?;
    if capacity <= 0.0 {
        return Err(DesignError::invalid_range("capacity_mw", capacity, "> 0"));
    }
    Ok(capacity)
}

pub(crate) fn check_dc_ac_ratio(ratio: f64) -> DesignResult<f64> {
    let ratio = ensure_finite("target_dc_ac_ratio", ratio)?;
    if !(MIN_DC_AC_RATIO..=MAX_DC_AC_RATIO).contains(&ratio) {
        return Err(DesignError::invalid_range("target_dc_ac_ratio", ratio, "[1.0, 2.0]"));
    }
    Ok(ratio)
}

/// Partial update of a design; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignUpdate {
    pub name: Option<String>,
    pub capacity_mw: Option<f64>,
    pub modules_per_string: Option<u32>,
    pub strings_per_inverter: Option<u32>,
    pub total_inverters: Option<u64>,
    pub target_dc_ac_ratio: Option<f64>,
    pub tilt_angle: Option<f64>,
    pub azimuth_angle: Option<f64>,
    pub row_spacing: Option<f64>,
    pub module_orientation: Option<ModuleOrientation>,
    pub installation_area: Option<InstallationArea>,
}

impl DesignUpdate {
    /// Merge onto `base`, returning a new checked design. `base` is untouched.
    pub fn apply(&self, base: &DesignParameters) -> DesignResult<DesignParameters> {
        let merged = DesignParameters {
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            capacity_mw: self.capacity_mw.unwrap_or(base.capacity_mw),
            modules_per_string: self.modules_per_string.or(base.modules_per_string),
            strings_per_inverter: self.strings_per_inverter.or(base.strings_per_inverter),
            total_inverters: self.total_inverters.or(base.total_inverters),
            target_dc_ac_ratio: self.target_dc_ac_ratio.unwrap_or(base.target_dc_ac_ratio),
            tilt_angle: self.tilt_angle.or(base.tilt_angle),
            azimuth_angle: self.azimuth_angle.or(base.azimuth_angle),
            row_spacing: self.row_spacing.or(base.row_spacing),
            module_orientation: self.module_orientation.unwrap_or(base.module_orientation),
            installation_area: self
                .installation_area
                .clone()
                .or_else(|| base.installation_area.clone()),
        };
        merged.check()?;
        Ok(merged)
    }

    pub fn is_empty(&self) -> bool {
        *self == DesignUpdate::default()
    }
}
