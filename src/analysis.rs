//! End-to-end calculation of a design: stringing, then the financial
//! projection of the resulting plant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::domain::{DesignParameters, InverterSpec, PanelSpec, ScenarioParameters};
use crate::error::{ensure_finite, DesignResult};
use crate::finance::{FinancialProjector, FinancialResult};
use crate::stringing::{ElectricalConfiguration, StringSizer, ValidationReport};
use crate::summary::DesignSummary;

const HOURS_PER_YEAR: f64 = 8760.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignAnalysis {
    pub configuration: ElectricalConfiguration,
    pub financials: FinancialResult,
    pub capacity_factor: f64,
}

/// Size the strings, then project costs over the plant lifetime.
///
/// Financials use the design's nameplate capacity, not the achieved DC
/// capacity, so both engines see the same plant size the user entered.
pub fn analyze_design(
    panel: &PanelSpec,
    inverter: &InverterSpec,
    design: &DesignParameters,
    scenario: &ScenarioParameters,
    annual_production_mwh: f64,
    cfg: &Config,
) -> DesignResult<DesignAnalysis> {
    let sizer = StringSizer::new(cfg.engine.clone());
    let configuration =
        sizer.compute_electrical_configuration(panel, inverter, design, design.target_dc_ac_ratio)?;

    let financials = FinancialProjector::new(cfg.finance.clone()).project_financials(
        design.capacity_mw,
        annual_production_mwh,
        scenario,
    )?;

    Ok(DesignAnalysis {
        capacity_factor: capacity_factor(annual_production_mwh, configuration.dc_capacity_mw),
        configuration,
        financials,
    })
}

/// Share of the year the DC array would need at nameplate to deliver the
/// production; 0 for an empty array
pub fn capacity_factor(annual_production_mwh: f64, dc_capacity_mw: f64) -> f64 {
    if dc_capacity_mw > 0.0 {
        annual_production_mwh / (dc_capacity_mw * HOURS_PER_YEAR)
    } else {
        0.0
    }
}

/// Copy of `design` carrying the sized string layout, as it would be stored
pub fn apply_configuration(
    design: &DesignParameters,
    configuration: &ElectricalConfiguration,
) -> DesignParameters {
    let mut sized = design.clone();
    sized.modules_per_string = Some(configuration.modules_per_string);
    sized.strings_per_inverter = u32::try_from(configuration.strings_per_inverter)
        .ok()
        .filter(|n| *n > 0);
    sized.total_inverters = Some(configuration.total_inverters).filter(|n| *n > 0);
    sized
}

/// Input of one batch calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub panel: PanelSpec,
    pub inverter: InverterSpec,
    pub design: DesignParameters,
    /// Falls back to the configured default scenario
    #[serde(default)]
    pub scenario: Option<ScenarioParameters>,
    /// Without a production figure the financial projection is skipped
    #[serde(default)]
    pub annual_production_mwh: Option<f64>,
    #[serde(default)]
    pub project_latitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationReport {
    pub generated_at: DateTime<Utc>,
    pub configuration: ElectricalConfiguration,
    pub validation: ValidationReport,
    pub summary: DesignSummary,
    pub financials: Option<FinancialResult>,
    pub capacity_factor: Option<f64>,
}

impl CalculationRequest {
    #[tracing::instrument(skip_all, fields(design = %self.design.name))]
    pub fn run(&self, cfg: &Config) -> DesignResult<CalculationReport> {
        let sizer = StringSizer::new(cfg.engine.clone());
        let configuration = sizer.compute_electrical_configuration(
            &self.panel,
            &self.inverter,
            &self.design,
            self.design.target_dc_ac_ratio,
        )?;

        let sized = apply_configuration(&self.design, &configuration);
        let validation = sizer.validate_configuration(
            &sized,
            Some(&self.panel),
            Some(&self.inverter),
            self.project_latitude,
        )?;
        let summary = DesignSummary::build(&sized, Some(&self.panel), Some(&self.inverter))?;

        let (financials, capacity_factor) = match self.annual_production_mwh {
            Some(production) => {
                let production = ensure_finite("annual_production_mwh", production)?;
                let scenario = self.scenario.as_ref().unwrap_or(&cfg.finance.default_scenario);
                let financials = FinancialProjector::new(cfg.finance.clone()).project_financials(
                    self.design.capacity_mw,
                    production,
                    scenario,
                )?;
                (
                    Some(financials),
                    Some(self::capacity_factor(production, configuration.dc_capacity_mw)),
                )
            }
            None => (None, None),
        };

        info!(
            valid = validation.valid,
            financials = financials.is_some(),
            "calculation finished"
        );

        Ok(CalculationReport {
            generated_at: Utc::now(),
            configuration,
            validation,
            summary,
            financials,
            capacity_factor,
        })
    }
}
