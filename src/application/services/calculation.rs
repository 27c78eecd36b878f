//! Order calculation service
//!
//! Applies an ordered list of visitors to one order tree and collects one
//! result per visitor.

use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{
    Catalog, DeliveryVisitor, DiscountVisitor, NodeId, TaxVisitor, Visitor,
};

/// Results of one calculation run, keyed by visitor name in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationReport {
    results: IndexMap<String, f64>,
}

impl CalculationReport {
    pub fn get(&self, visitor: &str) -> Option<f64> {
        self.results.get(visitor).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.results.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// What the customer pays: `price + delivery + tax - discount`.
    ///
    /// Missing visitors contribute nothing.
    pub fn total_payable(&self, price: f64) -> f64 {
        let delivery = self.get(DeliveryVisitor::NAME).unwrap_or(0.0);
        let tax = self.get(TaxVisitor::NAME).unwrap_or(0.0);
        let discount = self.get(DiscountVisitor::NAME).unwrap_or(0.0);
        price + delivery + tax - discount
    }
}

impl fmt::Display for CalculationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{}: {:.2}", name, value)?;
        }
        Ok(())
    }
}

/// Coordinator holding the visitors to run, in order.
#[derive(Default)]
pub struct OrderCalculator {
    visitors: Vec<Box<dyn Visitor>>,
}

impl fmt::Debug for OrderCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderCalculator")
            .field("visitors", &self.names())
            .finish()
    }
}

impl OrderCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivery, tax and discount visitors configured from `settings`.
    pub fn with_visitors(settings: &Settings) -> ApplicationResult<Self> {
        let mut calculator = Self::new();
        calculator.add_visitor(Box::new(DeliveryVisitor::new(settings.delivery)?))?;
        calculator.add_visitor(Box::new(TaxVisitor::new(settings.tax)?))?;
        calculator.add_visitor(Box::new(DiscountVisitor::new(settings.discount)?))?;
        Ok(calculator)
    }

    /// Register a visitor. Names must be unique since they key the report.
    pub fn add_visitor(&mut self, visitor: Box<dyn Visitor>) -> ApplicationResult<()> {
        if self.visitors.iter().any(|v| v.name() == visitor.name()) {
            return Err(ApplicationError::DuplicateVisitor(visitor.name().to_string()));
        }
        debug!("add_visitor: {}", visitor.name());
        self.visitors.push(visitor);
        Ok(())
    }

    /// Keep only the visitors named in `names`, preserving registration order.
    pub fn retain(&mut self, names: &[String]) {
        self.visitors
            .retain(|v| names.iter().any(|name| name == v.name()));
    }

    pub fn names(&self) -> Vec<&str> {
        self.visitors.iter().map(|v| v.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    /// Run every visitor over the tree rooted at `root`.
    #[instrument(level = "debug", skip(self, catalog))]
    pub fn run(&self, catalog: &Catalog, root: NodeId) -> ApplicationResult<CalculationReport> {
        let mut results = IndexMap::with_capacity(self.visitors.len());
        for visitor in &self.visitors {
            let value = catalog.accept(root, visitor.as_ref())?;
            info!("{}: {:.2}", visitor.name(), value);
            results.insert(visitor.name().to_string(), value);
        }
        Ok(CalculationReport { results })
    }
}
