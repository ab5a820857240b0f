//! Common numeric and identifier types shared by every Hifi crate

pub mod errors;
pub mod exp_log;
pub mod fixed_point;
pub mod identifiers;
pub mod signed;

pub use errors::{FixedPointError, ValidationError};
pub use fixed_point::{mul_div, UD60x18, SCALE};
pub use identifiers::Address;
pub use signed::{SD59x18, I256};
