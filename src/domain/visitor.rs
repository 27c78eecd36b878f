//! Visitors: computations over an order tree.
//!
//! A visitor is pure configuration. Every call chain started by
//! [`Catalog::accept`](crate::domain::Catalog::accept) produces one complete,
//! independent result; nothing is carried over between traversals.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::catalog::ContainerRef;
use crate::domain::entities::{Category, Item};
use crate::domain::error::{ensure_amount, DomainResult};

/// Operation over the two node variants of an order tree.
pub trait Visitor {
    /// Key under which results are reported.
    fn name(&self) -> &str;

    fn visit_item(&self, item: &Item) -> f64;

    /// Responsible for recursing into `container`'s children.
    fn visit_container(&self, container: ContainerRef<'_>) -> f64;
}

/// Delivery pricing: flat fee per item, weight-scaled part, fragile surcharge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeliveryRates {
    pub base_rate: f64,
    pub weight_rate: f64,
    pub fragile_surcharge: f64,
}

impl Default for DeliveryRates {
    fn default() -> Self {
        Self {
            base_rate: 100.0,
            weight_rate: 50.0,
            fragile_surcharge: 200.0,
        }
    }
}

impl DeliveryRates {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_amount("delivery.base_rate", self.base_rate)?;
        ensure_amount("delivery.weight_rate", self.weight_rate)?;
        ensure_amount("delivery.fragile_surcharge", self.fragile_surcharge)?;
        Ok(())
    }
}

/// Tax rates by category group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaxRates {
    pub standard_rate: f64,
    /// food and books
    pub reduced_rate: f64,
    pub luxury_rate: f64,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            standard_rate: 0.20,
            reduced_rate: 0.10,
            luxury_rate: 0.30,
        }
    }
}

impl TaxRates {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_amount("tax.standard_rate", self.standard_rate)?;
        ensure_amount("tax.reduced_rate", self.reduced_rate)?;
        ensure_amount("tax.luxury_rate", self.luxury_rate)?;
        Ok(())
    }

    pub fn rate_for(&self, category: &Category) -> f64 {
        match category {
            Category::Food | Category::Books => self.reduced_rate,
            Category::Luxury => self.luxury_rate,
            _ => self.standard_rate,
        }
    }
}

/// Which price a box is measured by when checking the bulk threshold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    #[default]
    ExclPackaging,
    InclPackaging,
}

/// Discount rules: a bulk discount for expensive boxes, otherwise a seasonal one per item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DiscountRates {
    pub bulk_threshold: f64,
    pub bulk_rate: f64,
    pub seasonal_rate: f64,
    pub threshold_basis: PriceBasis,
}

impl Default for DiscountRates {
    fn default() -> Self {
        Self {
            bulk_threshold: 10_000.0,
            bulk_rate: 0.10,
            seasonal_rate: 0.05,
            threshold_basis: PriceBasis::ExclPackaging,
        }
    }
}

impl DiscountRates {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_amount("discount.bulk_threshold", self.bulk_threshold)?;
        ensure_amount("discount.bulk_rate", self.bulk_rate)?;
        ensure_amount("discount.seasonal_rate", self.seasonal_rate)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryVisitor {
    rates: DeliveryRates,
}

impl DeliveryVisitor {
    pub const NAME: &'static str = "delivery";

    pub fn new(rates: DeliveryRates) -> DomainResult<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &DeliveryRates {
        &self.rates
    }
}

impl Visitor for DeliveryVisitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn visit_item(&self, item: &Item) -> f64 {
        let mut cost = self.rates.base_rate + item.weight() * self.rates.weight_rate;
        if *item.category() == Category::Fragile {
            cost += self.rates.fragile_surcharge;
        }
        debug!(item = item.name(), cost, "delivery");
        cost
    }

    fn visit_container(&self, container: ContainerRef<'_>) -> f64 {
        let cost = container.packaging_cost() + container.sum_children(self);
        debug!(
            container = container.name(),
            cost,
            packaging = container.packaging_cost(),
            "delivery"
        );
        cost
    }
}

#[derive(Debug, Clone)]
pub struct TaxVisitor {
    rates: TaxRates,
}

impl TaxVisitor {
    pub const NAME: &'static str = "tax";

    pub fn new(rates: TaxRates) -> DomainResult<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &TaxRates {
        &self.rates
    }
}

impl Visitor for TaxVisitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn visit_item(&self, item: &Item) -> f64 {
        let rate = self.rates.rate_for(item.category());
        let tax = item.price() * rate;
        debug!(item = item.name(), tax, rate, "tax");
        tax
    }

    // Packaging is never taxed.
    fn visit_container(&self, container: ContainerRef<'_>) -> f64 {
        let tax = container.sum_children(self);
        debug!(container = container.name(), tax, "tax");
        tax
    }
}

#[derive(Debug, Clone)]
pub struct DiscountVisitor {
    rates: DiscountRates,
}

impl DiscountVisitor {
    pub const NAME: &'static str = "discount";

    pub fn new(rates: DiscountRates) -> DomainResult<Self> {
        rates.validate()?;
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &DiscountRates {
        &self.rates
    }
}

impl Visitor for DiscountVisitor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn visit_item(&self, item: &Item) -> f64 {
        let discount = item.price() * self.rates.seasonal_rate;
        debug!(item = item.name(), discount, "seasonal discount");
        discount
    }

    /// Bulk discount on the whole box when it is expensive enough, otherwise the
    /// children's own discounts. Never both.
    fn visit_container(&self, container: ContainerRef<'_>) -> f64 {
        let measured = match self.rates.threshold_basis {
            PriceBasis::ExclPackaging => container.price_excl_packaging(),
            PriceBasis::InclPackaging => container.price_incl_packaging(),
        };
        if measured > self.rates.bulk_threshold {
            let discount = container.price_excl_packaging() * self.rates.bulk_rate;
            debug!(container = container.name(), discount, "bulk discount");
            discount
        } else {
            container.sum_children(self)
        }
    }
}
