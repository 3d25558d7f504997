use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::capex::CapexBreakdown;
use super::metrics;
use crate::config::FinanceConfig;
use crate::domain::{check_capacity, ScenarioParameters};
use crate::error::{ensure_finite, DesignError, DesignResult};

/// One row of the yearly cash-flow table. Costs are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowEntry {
    pub year: u32,
    pub investment: f64,
    pub revenue: f64,
    pub opex: f64,
    /// Absent for the construction year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_mwh: Option<f64>,
    pub net_cash_flow: f64,
    pub cumulative_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialResult {
    #[serde(flatten)]
    pub capex: CapexBreakdown,
    pub total_investment: f64,
    pub annual_om_cost: f64,
    pub energy_npv_mwh: f64,
    pub om_npv: f64,
    pub lcoe: f64,
    /// Populated only when the scenario carries an electricity price
    pub npv: Option<f64>,
    pub irr: Option<f64>,
    pub payback_period: Option<f64>,
    pub roi: Option<f64>,
    pub cash_flows: Vec<CashFlowEntry>,
}

/// Discounted lifetime projection of a plant's costs and output
#[derive(Debug, Clone, Default)]
pub struct FinancialProjector {
    cfg: FinanceConfig,
}

impl FinancialProjector {
    pub fn new(cfg: FinanceConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &FinanceConfig {
        &self.cfg
    }

    #[tracing::instrument(
        skip_all,
        fields(capacity_mw = capacity_mw, annual_production_mwh = annual_production_mwh, scenario = %scenario.id)
    )]
    pub fn project_financials(
        &self,
        capacity_mw: f64,
        annual_production_mwh: f64,
        scenario: &ScenarioParameters,
    ) -> DesignResult<FinancialResult> {
        let capacity_mw = check_capacity(capacity_mw)?;
        let annual_production_mwh = ensure_finite("annual_production_mwh", annual_production_mwh)?;
        scenario.check()?;

        let capex = CapexBreakdown::from_scenario(capacity_mw, scenario);
        let total_investment = capex.total();
        let annual_om_cost = capacity_mw * scenario.om_rate();

        let lifetime = self.cfg.project_lifetime_years;
        let price = scenario.electricity_price_usd_mwh;

        let mut energy_npv_mwh = 0.0;
        let mut om_npv = 0.0;
        let mut cumulative = -total_investment;
        let mut cash_flows = Vec::with_capacity(lifetime as usize + 1);
        cash_flows.push(CashFlowEntry {
            year: 0,
            investment: -total_investment,
            revenue: 0.0,
            opex: 0.0,
            energy_mwh: None,
            net_cash_flow: -total_investment,
            cumulative_cash_flow: cumulative,
        });

        for year in 1..=lifetime {
            let age = (year - 1) as i32;
            let energy = annual_production_mwh * (1.0 - scenario.annual_degradation).powi(age);
            let om_cost = annual_om_cost * (1.0 + scenario.inflation_rate).powi(age);
            let discount_factor = 1.0 / (1.0 + scenario.discount_rate).powi(year as i32);

            energy_npv_mwh += energy * discount_factor;
            om_npv += om_cost * discount_factor;

            let revenue = price
                .map(|p| energy * p * (1.0 + scenario.electricity_price_escalation).powi(age))
                .unwrap_or(0.0);
            let net_cash_flow = revenue - om_cost;
            cumulative += net_cash_flow;

            cash_flows.push(CashFlowEntry {
                year,
                investment: 0.0,
                revenue,
                opex: -om_cost,
                energy_mwh: Some(energy),
                net_cash_flow,
                cumulative_cash_flow: cumulative,
            });
        }

        if !(energy_npv_mwh > 0.0) {
            return Err(DesignError::DivisionByZero("discounted lifetime energy"));
        }
        let lcoe = (total_investment + om_npv) / (energy_npv_mwh * self.cfg.lcoe_energy_scale);
        debug!(total_investment, energy_npv_mwh, om_npv, lcoe, "levelized cost");

        let (npv, irr, payback_period, roi) = if price.is_some() {
            let flows: Vec<f64> = cash_flows.iter().map(|c| c.net_cash_flow).collect();
            (
                Some(metrics::npv(scenario.discount_rate, &flows)),
                metrics::irr(&flows),
                metrics::payback_period(&flows),
                metrics::roi(&flows, total_investment),
            )
        } else {
            (None, None, None, None)
        };

        info!(total_investment, lcoe, ?npv, ?irr, "financial projection computed");

        Ok(FinancialResult {
            capex,
            total_investment,
            annual_om_cost,
            energy_npv_mwh,
            om_npv,
            lcoe,
            npv,
            irr,
            payback_period,
            roi,
            cash_flows,
        })
    }
}

/// `FinancialProjector::project_financials` with the built-in constants
pub fn project_financials(
    capacity_mw: f64,
    annual_production_mwh: f64,
    scenario: &ScenarioParameters,
) -> DesignResult<FinancialResult> {
    FinancialProjector::default().project_financials(capacity_mw, annual_production_mwh, scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_megawatt_defaults() {
        let result = project_financials(1.0, 1_800.0, &ScenarioParameters::default()).unwrap();

        assert_relative_eq!(result.total_investment, 550_000.0);
        assert_relative_eq!(result.annual_om_cost, 15_000.0);
        assert_eq!(result.cash_flows.len(), 26);
        assert!(result.npv.is_none());
        assert!(result.irr.is_none());
        assert!(result.payback_period.is_none());
        assert!(result.roi.is_none());

        let first = &result.cash_flows[0];
        assert_eq!(first.year, 0);
        assert_relative_eq!(first.investment, -550_000.0);
        assert_relative_eq!(first.net_cash_flow, -550_000.0);
        assert_relative_eq!(first.cumulative_cash_flow, -550_000.0);
        assert_eq!(first.opex, 0.0);
        assert!(first.energy_mwh.is_none());

        let year1 = &result.cash_flows[1];
        assert_relative_eq!(year1.opex, -15_000.0);
        assert_relative_eq!(year1.net_cash_flow, -15_000.0);
        assert_relative_eq!(year1.energy_mwh.unwrap(), 1_800.0);
        assert_relative_eq!(year1.cumulative_cash_flow, -565_000.0);
    }

    #[test]
    fn test_lcoe_formula() {
        let scenario = ScenarioParameters::default();
        let result = project_financials(2.0, 3_600.0, &scenario).unwrap();
        // (1.1e6 + 416562.56) / (36897.037 * 1000)
        assert_relative_eq!(result.energy_npv_mwh, 36_897.037_346, max_relative = 1e-9);
        assert_relative_eq!(result.om_npv, 416_562.560_015, max_relative = 1e-9);
        assert_relative_eq!(result.lcoe, 0.041_102_556_44, max_relative = 1e-9);

        let per_mwh = FinancialProjector::new(FinanceConfig {
            lcoe_energy_scale: 1.0,
            ..Default::default()
        })
        .project_financials(2.0, 3_600.0, &scenario)
        .unwrap();
        assert_relative_eq!(per_mwh.lcoe, result.lcoe * 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_discount_sums_undiscounted() {
        let scenario = ScenarioParameters {
            discount_rate: 0.0,
            annual_degradation: 0.0,
            inflation_rate: 0.0,
            ..Default::default()
        };
        let result = project_financials(1.0, 1_000.0, &scenario).unwrap();
        assert_relative_eq!(result.energy_npv_mwh, 25_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.om_npv, 375_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_production_is_division_by_zero() {
        let err = project_financials(1.0, 0.0, &ScenarioParameters::default()).unwrap_err();
        assert!(matches!(err, DesignError::DivisionByZero(_)));
        assert!(project_financials(1.0, -10.0, &ScenarioParameters::default()).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        let scenario = ScenarioParameters::default();
        assert!(matches!(
            project_financials(-1.0, 1_000.0, &scenario),
            Err(DesignError::InvalidRange { .. })
        ));
        assert!(matches!(
            project_financials(1.0, f64::NAN, &scenario),
            Err(DesignError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_revenue_metrics_with_price() {
        let scenario = ScenarioParameters::default().with_electricity_price(60.0);
        let result = project_financials(1.0, 1_800.0, &scenario).unwrap();

        let year1 = &result.cash_flows[1];
        assert_relative_eq!(year1.revenue, 108_000.0);
        assert_relative_eq!(year1.net_cash_flow, 93_000.0);

        let irr = result.irr.unwrap();
        assert!(irr > scenario.discount_rate);
        assert!(result.npv.unwrap() > 0.0);

        let payback = result.payback_period.unwrap();
        assert!(payback > 5.0 && payback < 7.0);

        let last = result.cash_flows.last().unwrap();
        assert_relative_eq!(
            result.roi.unwrap(),
            last.cumulative_cash_flow / result.total_investment,
            max_relative = 1e-12
        );
    }
}
