//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and loads order descriptions.

pub mod error;
pub mod error_ext;
pub mod order_file;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use order_file::{demo_order, load_order, parse_order, LoadedOrder};
