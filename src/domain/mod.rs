//! Domain layer: order trees and the computations over them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod entities;
pub mod error;
pub mod render;
pub mod visitor;

pub use catalog::{Catalog, ContainerRef, NodeId, NodeRef, PreOrderIter};
pub use entities::{Category, Component, Container, Item};
pub use error::{DomainError, DomainResult};
pub use render::TreeNodeConvert;
pub use visitor::{
    DeliveryRates, DeliveryVisitor, DiscountRates, DiscountVisitor, PriceBasis, TaxRates,
    TaxVisitor, Visitor,
};
