//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod calculation;

pub use calculation::{CalculationReport, OrderCalculator};
