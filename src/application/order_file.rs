//! Order descriptions in TOML
//!
//! ```toml
//! [order]
//! box = "Main box"
//! packaging_cost = 50
//!
//! [[order.contents]]
//! item = "Book"
//! price = 500
//! weight = 0.5
//! category = "books"
//! ```
//!
//! A node with `item` is a leaf, a node with `box` is a container.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Catalog, Category, Container, Item, NodeId};

#[derive(Debug, Deserialize)]
struct OrderFile {
    order: RawNode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    item: Option<String>,
    #[serde(rename = "box")]
    container: Option<String>,
    price: Option<f64>,
    weight: Option<f64>,
    category: Option<Category>,
    packaging_cost: Option<f64>,
    #[serde(default)]
    contents: Vec<RawNode>,
}

/// An order tree together with the catalog that owns it.
#[derive(Debug)]
pub struct LoadedOrder {
    pub catalog: Catalog,
    pub root: NodeId,
}

/// Read and build an order from a TOML file.
#[instrument(level = "debug")]
pub fn load_order(path: &Path) -> ApplicationResult<LoadedOrder> {
    let content = std::fs::read_to_string(path).with_path_context("read order", path)?;
    parse_order_at(&content, path)
}

/// Build an order from TOML text.
pub fn parse_order(content: &str) -> ApplicationResult<LoadedOrder> {
    parse_order_at(content, Path::new("<string>"))
}

fn parse_order_at(content: &str, path: &Path) -> ApplicationResult<LoadedOrder> {
    let file: OrderFile = toml::from_str(content).map_err(|e| invalid(path, e.to_string()))?;
    let mut catalog = Catalog::new();
    let root = build_node(&mut catalog, file.order, path)?;
    debug!("parsed order: {} nodes", catalog.len());
    Ok(LoadedOrder { catalog, root })
}

fn build_node(catalog: &mut Catalog, raw: RawNode, path: &Path) -> ApplicationResult<NodeId> {
    match (raw.item, raw.container) {
        (Some(name), None) => {
            if !raw.contents.is_empty() || raw.packaging_cost.is_some() {
                return Err(invalid(
                    path,
                    format!("item '{}' cannot have contents or packaging_cost", name),
                ));
            }
            let price = raw
                .price
                .ok_or_else(|| invalid(path, format!("item '{}' is missing price", name)))?;
            let weight = raw
                .weight
                .ok_or_else(|| invalid(path, format!("item '{}' is missing weight", name)))?;
            let item = Item::new(name, price, weight, raw.category.unwrap_or_default())?;
            Ok(catalog.insert_item(item))
        }
        (None, Some(name)) => {
            if raw.price.is_some() || raw.weight.is_some() || raw.category.is_some() {
                return Err(invalid(
                    path,
                    format!("box '{}' cannot have price, weight or category", name),
                ));
            }
            let container = Container::new(name, raw.packaging_cost.unwrap_or(0.0))?;
            let id = catalog.insert_container(container);
            for child in raw.contents {
                let child_id = build_node(catalog, child, path)?;
                catalog.add(id, child_id)?;
            }
            Ok(id)
        }
        (Some(item), Some(container)) => Err(invalid(
            path,
            format!("node is both item '{}' and box '{}'", item, container),
        )),
        (None, None) => Err(invalid(path, "node needs either `item` or `box`".to_string())),
    }
}

fn invalid(path: &Path, message: String) -> ApplicationError {
    ApplicationError::InvalidOrder {
        path: PathBuf::from(path),
        message,
    }
}

/// The sample order: a laptop in an electronics box and three gifts in a
/// gifts box, both packed into a main box.
pub fn demo_order() -> ApplicationResult<LoadedOrder> {
    let mut catalog = Catalog::new();

    let laptop = catalog.insert_item(Item::new("Laptop", 75_000.0, 2.5, Category::Electronics)?);
    let book = catalog.insert_item(Item::new("Book", 500.0, 0.5, Category::Books)?);
    let vase = catalog.insert_item(Item::new("Vase", 3_000.0, 1.0, Category::Fragile)?);
    let chocolate = catalog.insert_item(Item::new("Chocolate", 200.0, 0.2, Category::Food)?);

    let electronics = catalog.insert_container(Container::new("Electronics", 100.0)?);
    let gifts = catalog.insert_container(Container::new("Gifts", 150.0)?);
    catalog.add(electronics, laptop)?;
    for gift in [book, vase, chocolate] {
        catalog.add(gifts, gift)?;
    }

    let root = catalog.insert_container(Container::new("Main box", 50.0)?);
    catalog.add(root, electronics)?;
    catalog.add(root, gifts)?;

    Ok(LoadedOrder { catalog, root })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_parse_nested_order() {
        let order = parse_order(
            r#"
[order]
box = "Outer"
packaging_cost = 20

[[order.contents]]
item = "Tea"
price = 12.5
weight = 0.25
category = "Food"

[[order.contents]]
box = "Inner"

[[order.contents.contents]]
item = "Pen"
price = 3
weight = 0.01
"#,
        )
        .unwrap();

        let catalog = &order.catalog;
        assert_eq!(catalog.len(), 4);
        let names: Vec<&str> = catalog.iter_preorder(order.root).map(|n| n.name()).collect();
        assert_eq!(names, vec!["Outer", "Tea", "Inner", "Pen"]);
        assert_eq!(catalog.price_excl_packaging(order.root).unwrap(), 15.5);
    }

    #[test]
    fn test_item_without_price_is_invalid() {
        let err = parse_order("[order]\nitem = \"Pen\"\nweight = 1.0\n").unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidOrder { .. }));
        assert!(err.to_string().contains("missing price"));
    }

    #[test]
    fn test_node_with_both_kinds_is_invalid() {
        let err = parse_order("[order]\nitem = \"Pen\"\nbox = \"Box\"\n").unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidOrder { .. }));
    }

    #[test]
    fn test_negative_price_propagates_domain_error() {
        let err =
            parse_order("[order]\nitem = \"Pen\"\nprice = -3\nweight = 1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidArgument { field: "price", .. })
        ));
    }

    #[test]
    fn test_demo_order_shape() {
        let order = demo_order().unwrap();
        assert_eq!(order.catalog.len(), 7);
        assert_eq!(order.catalog.depth(order.root).unwrap(), 3);
        assert_eq!(
            order.catalog.price_excl_packaging(order.root).unwrap(),
            78_700.0
        );
    }
}
