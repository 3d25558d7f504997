//! String sizing and inverter matching.
//!
//! Pure functions of panel, inverter and design parameters: the voltage
//! window comes from temperature-corrected module voltages, the string
//! layout from the capacity target and DC/AC ratio, and the validation
//! report from re-checking a stored design against its components.

pub mod sizing;
pub mod validation;
pub mod voltage;

pub use sizing::{compute_electrical_configuration, ElectricalConfiguration, StringSizer, VoltageLimits};
pub use validation::{
    optimal_azimuth, validate_configuration, validate_configuration_with, DesignChecklist, Finding,
    FindingCode, ValidationReport,
};
pub use voltage::{vmp_at_hot, voc_at_cold, StringBounds};
