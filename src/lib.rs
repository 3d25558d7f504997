//! Utility-scale PV plant design: string sizing and inverter matching,
//! design validation, and lifetime energy/financial projection.
//!
//! Both engines are pure and synchronous. Constants live in [`config::Config`];
//! the free functions use the built-in defaults.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod finance;
pub mod stringing;
pub mod summary;
pub mod telemetry;

pub use analysis::{analyze_design, CalculationReport, CalculationRequest, DesignAnalysis};
pub use config::Config;
pub use domain::{
    select_default_scenario, DesignParameters, DesignUpdate, InverterSpec, PanelSpec,
    ScenarioParameters, ScenarioUpdate,
};
pub use error::{DesignError, DesignResult};
pub use finance::{
    estimate_capex, project_financials, CapexBreakdown, CapexEstimate, CashFlowEntry,
    FinancialProjector, FinancialResult,
};
pub use stringing::{
    compute_electrical_configuration, validate_configuration, ElectricalConfiguration,
    StringSizer, ValidationReport,
};
pub use summary::DesignSummary;
