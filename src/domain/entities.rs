//! Domain entities: goods, boxes and their categories

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::error::{ensure_amount, DomainResult};

/// Category tag of an item. Drives tax rates and fragile handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    General,
    Food,
    Books,
    Luxury,
    Fragile,
    Electronics,
    /// Any tag not known above; taxed at the standard rate.
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::General => "general",
            Category::Food => "food",
            Category::Books => "books",
            Category::Luxury => "luxury",
            Category::Fragile => "fragile",
            Category::Electronics => "electronics",
            Category::Other(tag) => tag,
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Ok(match tag.as_str() {
            "" | "general" => Category::General,
            "food" => Category::Food,
            "books" => Category::Books,
            "luxury" => Category::Luxury,
            "fragile" => Category::Fragile,
            "electronics" => Category::Electronics,
            _ => Category::Other(tag),
        })
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Category::from(tag.as_str()))
    }
}

/// An atomic good with a price, a weight and a category.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    name: String,
    price: f64,
    weight: f64,
    category: Category,
}

impl Item {
    /// Create an item. Price and weight must be finite and non-negative.
    pub fn new(
        name: impl Into<String>,
        price: f64,
        weight: f64,
        category: impl Into<Category>,
    ) -> DomainResult<Self> {
        Ok(Self {
            name: name.into(),
            price: ensure_amount("price", price)?,
            weight: ensure_amount("weight", weight)?,
            category: category.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn category(&self) -> &Category {
        &self.category
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}, {} kg", self.name, self.price, self.weight)
    }
}

/// A named box. Its children are held by the [`Catalog`](crate::domain::Catalog).
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    name: String,
    packaging_cost: f64,
}

impl Container {
    pub fn new(name: impl Into<String>, packaging_cost: f64) -> DomainResult<Self> {
        Ok(Self {
            name: name.into(),
            packaging_cost: ensure_amount("packaging_cost", packaging_cost)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn packaging_cost(&self) -> f64 {
        self.packaging_cost
    }
}

/// A node of an order tree: either a leaf item or a box.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Item(Item),
    Container(Container),
}

impl Component {
    pub fn name(&self) -> &str {
        match self {
            Component::Item(item) => item.name(),
            Component::Container(container) => container.name(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Component::Container(_))
    }
}

impl From<Item> for Component {
    fn from(item: Item) -> Self {
        Component::Item(item)
    }
}

impl From<Container> for Component {
    fn from(container: Container) -> Self {
        Component::Container(container)
    }
}
