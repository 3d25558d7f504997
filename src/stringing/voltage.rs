use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{InverterSpec, PanelSpec};
use crate::error::{DesignError, DesignResult};

/// Module Voc at the cold design temperature (highest open-circuit voltage)
pub fn voc_at_cold(panel: &PanelSpec, cfg: &EngineConfig) -> DesignResult<f64> {
    let voc = panel.require_voc()?;
    let coeff = panel.temp_coeff_voc.unwrap_or(cfg.default_temp_coeff_voc);
    let corrected = voc * (1.0 + coeff * (cfg.cold_cell_temp_c - cfg.stc_temp_c));
    positive("voc_cold", corrected)
}

/// Module Vmp at the hot design temperature (lowest operating voltage).
/// The power coefficient stands in for the Vmp coefficient.
pub fn vmp_at_hot(panel: &PanelSpec, cfg: &EngineConfig) -> DesignResult<f64> {
    let vmp = panel.require_vmp()?;
    let coeff = panel.temp_coeff_pmax.unwrap_or(cfg.default_temp_coeff_pmax);
    let corrected = vmp * (1.0 + coeff * (cfg.hot_cell_temp_c - cfg.stc_temp_c));
    positive("vmp_hot", corrected)
}

fn positive(field: &'static str, value: f64) -> DesignResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DesignError::invalid_range(field, value, "> 0 after temperature correction"))
    }
}

/// Feasible modules-per-string window for one panel/inverter pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StringBounds {
    pub voc_cold_v: f64,
    pub vmp_hot_v: f64,
    pub vdc_min: f64,
    pub vdc_max: f64,
    pub min_modules: u32,
    pub max_modules: u32,
}

impl StringBounds {
    /// Derive the window; fails when no string length satisfies both limits
    pub fn compute(
        panel: &PanelSpec,
        inverter: &InverterSpec,
        cfg: &EngineConfig,
    ) -> DesignResult<Self> {
        let window = inverter.dc_window()?;
        let voc_cold_v = voc_at_cold(panel, cfg)?;
        let vmp_hot_v = vmp_at_hot(panel, cfg)?;

        // Bounds stay in f64 until known to fit a u32
        let raw_max = (window.vdc_max / voc_cold_v * cfg.max_voltage_margin).floor();
        let raw_min = (window.vdc_min / vmp_hot_v * cfg.min_voltage_margin).floor() + 1.0;

        if !(raw_min <= raw_max && raw_min <= u32::MAX as f64) {
            return Err(DesignError::InfeasibleVoltageWindow {
                min_modules: raw_min as u32,
                max_modules: raw_max as u32,
            });
        }
        let min_modules = raw_min as u32;
        let max_modules = raw_max.min(u32::MAX as f64) as u32;

        Ok(Self {
            voc_cold_v,
            vmp_hot_v,
            vdc_min: window.vdc_min,
            vdc_max: window.vdc_max,
            min_modules,
            max_modules,
        })
    }

    pub fn contains(&self, modules: u32) -> bool {
        (self.min_modules..=self.max_modules).contains(&modules)
    }

    pub fn clamp(&self, modules: u32) -> u32 {
        modules.clamp(self.min_modules, self.max_modules)
    }

    /// Window value nearest to `target`. For a contiguous range this is the clamp.
    pub fn closest_to(&self, target: u32) -> u32 {
        self.clamp(target)
    }

    pub fn string_voc_cold(&self, modules: u32) -> f64 {
        modules as f64 * self.voc_cold_v
    }

    pub fn string_vmp_hot(&self, modules: u32) -> f64 {
        modules as f64 * self.vmp_hot_v
    }
}
