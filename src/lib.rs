//! Composite order calculator.
//!
//! An order is a tree of [`Item`](domain::Item)s packed into nested
//! [`Container`](domain::Container)s, stored in a [`Catalog`](domain::Catalog).
//! [`Visitor`](domain::Visitor)s compute delivery cost, tax and discount over a
//! tree; the [`OrderCalculator`](application::services::OrderCalculator) runs a
//! list of them and reports one result per visitor.
//!
//! ```
//! use cartcalc::domain::{Catalog, Container, DeliveryRates, DeliveryVisitor, Item};
//!
//! let mut catalog = Catalog::new();
//! let parcel = catalog.insert_container(Container::new("Parcel", 100.0)?);
//! let laptop = catalog.insert_item(Item::new("Laptop", 75_000.0, 2.5, "electronics")?);
//! catalog.add(parcel, laptop)?;
//!
//! let delivery = DeliveryVisitor::new(DeliveryRates::default())?;
//! assert_eq!(catalog.accept(parcel, &delivery)?, 325.0);
//! # Ok::<(), cartcalc::domain::DomainError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
