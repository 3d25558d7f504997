pub mod design;
pub mod inverter;
pub mod panel;
pub mod scenario;

pub use design::*;
pub use inverter::*;
pub use panel::*;
pub use scenario::*;

pub(crate) use design::{check_capacity, check_dc_ac_ratio};
