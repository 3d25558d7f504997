use serde::{Deserialize, Serialize};

use crate::domain::{check_capacity, ScenarioParameters};
use crate::error::DesignResult;

/// Up-front cost per component (USD)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapexBreakdown {
    pub module_cost: f64,
    pub inverter_cost: f64,
    pub bos_cost: f64,
    pub installation_cost: f64,
}

impl CapexBreakdown {
    /// Per-watt scenario rates applied to the nameplate capacity
    pub fn from_scenario(capacity_mw: f64, scenario: &ScenarioParameters) -> Self {
        let watts = capacity_mw * 1_000_000.0;
        Self {
            module_cost: watts * scenario.module_cost_rate(),
            inverter_cost: watts * scenario.inverter_cost_rate(),
            bos_cost: watts * scenario.bos_cost_rate(),
            installation_cost: watts * scenario.installation_cost_rate(),
        }
    }

    pub fn total(&self) -> f64 {
        self.module_cost + self.inverter_cost + self.bos_cost + self.installation_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapexEstimate {
    pub capacity_mw: f64,
    pub scenario: String,
    pub breakdown: CapexBreakdown,
    pub total_capex: f64,
    /// USD/W
    pub capex_per_watt: f64,
}

/// Quick CAPEX estimate without a production figure
pub fn estimate_capex(capacity_mw: f64, scenario: &ScenarioParameters) -> DesignResult<CapexEstimate> {
    let capacity_mw = check_capacity(capacity_mw)?;
    scenario.check()?;

    let breakdown = CapexBreakdown::from_scenario(capacity_mw, scenario);
    let total_capex = breakdown.total();
    Ok(CapexEstimate {
        capacity_mw,
        scenario: scenario.name.clone(),
        breakdown,
        total_capex,
        capex_per_watt: total_capex / (capacity_mw * 1_000_000.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_rates_one_megawatt() {
        let breakdown = CapexBreakdown::from_scenario(1.0, &ScenarioParameters::default());
        assert_relative_eq!(breakdown.module_cost, 250_000.0);
        assert_relative_eq!(breakdown.inverter_cost, 50_000.0);
        assert_relative_eq!(breakdown.bos_cost, 150_000.0);
        assert_relative_eq!(breakdown.installation_cost, 100_000.0);
        assert_relative_eq!(breakdown.total(), 550_000.0);
    }

    #[test]
    fn test_estimate_capex() {
        let scenario = ScenarioParameters {
            name: "Utility 2026".to_string(),
            module_cost: Some(0.20),
            ..Default::default()
        };
        let estimate = estimate_capex(50.0, &scenario).unwrap();
        assert_eq!(estimate.scenario, "Utility 2026");
        assert_relative_eq!(estimate.total_capex, 50_000_000.0 * 0.50, max_relative = 1e-12);
        assert_relative_eq!(estimate.capex_per_watt, 0.50, max_relative = 1e-12);
    }

    #[test]
    fn test_estimate_capex_rejects_zero_capacity() {
        assert!(estimate_capex(0.0, &ScenarioParameters::default()).is_err());
    }
}
