use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::ScenarioParameters;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub finance: FinanceConfig,
    pub logging: LoggingConfig,
}

/// Constants of the string sizing engine.
///
/// Temperatures are cell temperatures in °C, coefficients are fractional
/// change per °C, margins are multipliers applied to the raw module counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cold_cell_temp_c: f64,
    pub hot_cell_temp_c: f64,
    pub stc_temp_c: f64,
    pub default_temp_coeff_voc: f64,
    pub default_temp_coeff_pmax: f64,
    pub max_voltage_margin: f64,
    pub min_voltage_margin: f64,
    pub target_modules_per_string: u32,
    /// Parallel strings accepted by one MPPT input. Heuristic, not a datasheet value.
    pub strings_per_mppt: u32,
    pub clipping_ratio_threshold: f64,
    pub clipping_loss_slope: f64,
    pub high_dc_ac_warning: f64,
    pub low_dc_ac_warning: f64,
    pub azimuth_deviation_threshold_deg: f64,
    pub zero_tilt_latitude_deg: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cold_cell_temp_c: -10.0,
            hot_cell_temp_c: 70.0,
            stc_temp_c: 25.0,
            default_temp_coeff_voc: -0.0029,
            default_temp_coeff_pmax: -0.0034,
            max_voltage_margin: 0.98,
            min_voltage_margin: 1.02,
            target_modules_per_string: 22,
            strings_per_mppt: 4,
            clipping_ratio_threshold: 1.5,
            clipping_loss_slope: 2.0,
            high_dc_ac_warning: 1.6,
            low_dc_ac_warning: 1.1,
            azimuth_deviation_threshold_deg: 45.0,
            zero_tilt_latitude_deg: 23.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceConfig {
    pub project_lifetime_years: u32,
    /// Multiplier applied to the discounted energy in the LCOE denominator.
    /// 1000 reproduces the historical figures (numerically USD/kWh), 1 gives USD/MWh.
    pub lcoe_energy_scale: f64,
    pub default_scenario: ScenarioParameters,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            project_lifetime_years: 25,
            lcoe_energy_scale: 1000.0,
            default_scenario: ScenarioParameters::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,pv_design_core=info".to_string(),
            json: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PVD__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject constant sets the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        let e = &self.engine;
        if e.cold_cell_temp_c >= e.hot_cell_temp_c {
            anyhow::bail!(
                "engine.cold_cell_temp_c ({}) must be below engine.hot_cell_temp_c ({})",
                e.cold_cell_temp_c,
                e.hot_cell_temp_c
            );
        }
        if e.max_voltage_margin <= 0.0 || e.min_voltage_margin <= 0.0 {
            anyhow::bail!("engine voltage margins must be positive");
        }
        if e.strings_per_mppt == 0 {
            anyhow::bail!("engine.strings_per_mppt must be at least 1");
        }
        if e.target_modules_per_string == 0 {
            anyhow::bail!("engine.target_modules_per_string must be at least 1");
        }
        if e.low_dc_ac_warning >= e.high_dc_ac_warning {
            anyhow::bail!("engine.low_dc_ac_warning must be below engine.high_dc_ac_warning");
        }

        let f = &self.finance;
        if f.project_lifetime_years == 0 {
            anyhow::bail!("finance.project_lifetime_years must be at least 1");
        }
        if !(f.lcoe_energy_scale.is_finite() && f.lcoe_energy_scale > 0.0) {
            anyhow::bail!("finance.lcoe_energy_scale must be a positive number");
        }
        f.default_scenario
            .check()
            .map_err(|e| anyhow::anyhow!("finance.default_scenario: {e}"))?;
        Ok(())
    }
}
