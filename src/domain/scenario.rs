use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ensure_finite, DesignError, DesignResult};

/// Fallback CAPEX rates (USD/W) when a scenario leaves them unset
pub const DEFAULT_MODULE_COST: f64 = 0.25;
pub const DEFAULT_INVERTER_COST: f64 = 0.05;
pub const DEFAULT_BOS_COST: f64 = 0.15;
pub const DEFAULT_INSTALLATION_COST: f64 = 0.10;
/// USD per MW per year
pub const DEFAULT_OM_COST_PER_MW_YEAR: f64 = 15_000.0;

fn default_system_losses() -> f64 {
    0.14
}
fn default_annual_degradation() -> f64 {
    0.005
}
fn default_soiling_losses() -> f64 {
    0.02
}
fn default_discount_rate() -> f64 {
    0.08
}
fn default_inflation_rate() -> f64 {
    0.03
}
fn default_price_escalation() -> f64 {
    0.02
}
fn default_true() -> bool {
    true
}
fn default_id() -> String {
    "default".to_string()
}

/// Economic and loss assumptions for a financial projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScenarioParameters {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_system_losses")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub system_losses: f64,

    #[serde(default = "default_annual_degradation")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub annual_degradation: f64,

    #[serde(default = "default_soiling_losses")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub soiling_losses: f64,

    #[serde(default = "default_discount_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub discount_rate: f64,

    #[serde(default = "default_inflation_rate")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub inflation_rate: f64,

    #[serde(default = "default_price_escalation")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub electricity_price_escalation: f64,

    /// USD/W
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub module_cost: Option<f64>,
    /// USD/W
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub inverter_cost: Option<f64>,
    /// USD/W
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub bos_cost: Option<f64>,
    /// USD/W
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub installation_cost: Option<f64>,
    /// USD/MW/year
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub om_cost_per_mw_year: Option<f64>,

    /// Energy sale price (USD/MWh). Enables NPV, IRR, payback and ROI.
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub electricity_price_usd_mwh: Option<f64>,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
}

impl Default for ScenarioParameters {
    fn default() -> Self {
        Self {
            id: default_id(),
            name: "Default".to_string(),
            description: None,
            system_losses: default_system_losses(),
            annual_degradation: default_annual_degradation(),
            soiling_losses: default_soiling_losses(),
            discount_rate: default_discount_rate(),
            inflation_rate: default_inflation_rate(),
            electricity_price_escalation: default_price_escalation(),
            module_cost: None,
            inverter_cost: None,
            bos_cost: None,
            installation_cost: None,
            om_cost_per_mw_year: None,
            electricity_price_usd_mwh: None,
            is_active: true,
            is_default: true,
        }
    }
}

impl ScenarioParameters {
    pub fn module_cost_rate(&self) -> f64 {
        self.module_cost.unwrap_or(DEFAULT_MODULE_COST)
    }

    pub fn inverter_cost_rate(&self) -> f64 {
        self.inverter_cost.unwrap_or(DEFAULT_INVERTER_COST)
    }

    pub fn bos_cost_rate(&self) -> f64 {
        self.bos_cost.unwrap_or(DEFAULT_BOS_COST)
    }

    pub fn installation_cost_rate(&self) -> f64 {
        self.installation_cost.unwrap_or(DEFAULT_INSTALLATION_COST)
    }

    pub fn om_rate(&self) -> f64 {
        self.om_cost_per_mw_year.unwrap_or(DEFAULT_OM_COST_PER_MW_YEAR)
    }

    pub fn with_electricity_price(mut self, usd_per_mwh: f64) -> Self {
        self.electricity_price_usd_mwh = Some(usd_per_mwh);
        self
    }

    pub fn check(&self) -> DesignResult<()> {
        for (field, value) in [
            ("scenario.system_losses", self.system_losses),
            ("scenario.annual_degradation", self.annual_degradation),
            ("scenario.soiling_losses", self.soiling_losses),
            ("scenario.discount_rate", self.discount_rate),
            ("scenario.inflation_rate", self.inflation_rate),
            (
                "scenario.electricity_price_escalation",
                self.electricity_price_escalation,
            ),
        ] {
            let v = ensure_finite(field, value)?;
            if !(0.0..=1.0).contains(&v) {
                return Err(DesignError::invalid_range(field, v, "[0, 1]"));
            }
        }
        for (field, value) in [
            ("scenario.module_cost", self.module_cost),
            ("scenario.inverter_cost", self.inverter_cost),
            ("scenario.bos_cost", self.bos_cost),
            ("scenario.installation_cost", self.installation_cost),
            ("scenario.om_cost_per_mw_year", self.om_cost_per_mw_year),
            ("scenario.electricity_price_usd_mwh", self.electricity_price_usd_mwh),
        ] {
            if let Some(v) = value {
                let v = ensure_finite(field, v)?;
                if v < 0.0 {
                    return Err(DesignError::invalid_range(field, v, ">= 0"));
                }
            }
        }
        self.validate()?;
        Ok(())
    }
}

/// Partial update of a scenario; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_losses: Option<f64>,
    pub annual_degradation: Option<f64>,
    pub soiling_losses: Option<f64>,
    pub discount_rate: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub electricity_price_escalation: Option<f64>,
    pub module_cost: Option<f64>,
    pub inverter_cost: Option<f64>,
    pub bos_cost: Option<f64>,
    pub installation_cost: Option<f64>,
    pub om_cost_per_mw_year: Option<f64>,
    pub electricity_price_usd_mwh: Option<f64>,
    pub is_active: Option<bool>,
}

impl ScenarioUpdate {
    /// Merge onto `base`, returning a new checked scenario.
    /// The default flag is not mergeable; it is owned by the scenario store.
    pub fn apply(&self, base: &ScenarioParameters) -> DesignResult<ScenarioParameters> {
        let merged = ScenarioParameters {
            id: base.id.clone(),
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            description: self.description.clone().or_else(|| base.description.clone()),
            system_losses: self.system_losses.unwrap_or(base.system_losses),
            annual_degradation: self.annual_degradation.unwrap_or(base.annual_degradation),
            soiling_losses: self.soiling_losses.unwrap_or(base.soiling_losses),
            discount_rate: self.discount_rate.unwrap_or(base.discount_rate),
            inflation_rate: self.inflation_rate.unwrap_or(base.inflation_rate),
            electricity_price_escalation: self
                .electricity_price_escalation
                .unwrap_or(base.electricity_price_escalation),
            module_cost: self.module_cost.or(base.module_cost),
            inverter_cost: self.inverter_cost.or(base.inverter_cost),
            bos_cost: self.bos_cost.or(base.bos_cost),
            installation_cost: self.installation_cost.or(base.installation_cost),
            om_cost_per_mw_year: self.om_cost_per_mw_year.or(base.om_cost_per_mw_year),
            electricity_price_usd_mwh: self
                .electricity_price_usd_mwh
                .or(base.electricity_price_usd_mwh),
            is_active: self.is_active.unwrap_or(base.is_active),
            is_default: base.is_default,
        };
        merged.check()?;
        Ok(merged)
    }
}

/// The single active default scenario, if any.
///
/// More than one flagged default means the store broke its invariant;
/// that is reported rather than resolved by picking one.
pub fn select_default_scenario(
    scenarios: &[ScenarioParameters],
) -> DesignResult<Option<&ScenarioParameters>> {
    let mut defaults = scenarios.iter().filter(|s| s.is_active && s.is_default);
    let first = defaults.next();
    if let Some(second) = defaults.next() {
        let first_id = first.map(|s| s.id.as_str()).unwrap_or_default();
        return Err(DesignError::Validation(format!(
            "multiple default scenarios: {} and {}",
            first_id, second.id
        )));
    }
    Ok(first)
}
