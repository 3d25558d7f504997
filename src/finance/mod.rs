//! Energy and financial projection: CAPEX, discounted lifetime costs,
//! LCOE and the yearly cash-flow table.

pub mod capex;
pub mod metrics;
pub mod projection;

pub use capex::{estimate_capex, CapexBreakdown, CapexEstimate};
pub use projection::{project_financials, CashFlowEntry, FinancialProjector, FinancialResult};
