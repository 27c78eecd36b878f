//! Tests for the composite tree: ownership, cycles, removal and derived totals

use rstest::rstest;

use cartcalc::domain::{Catalog, Category, Component, Container, DomainError, Item, NodeId};

fn item(catalog: &mut Catalog, name: &str, price: f64, weight: f64) -> NodeId {
    catalog.insert_item(Item::new(name, price, weight, Category::General).unwrap())
}

fn container(catalog: &mut Catalog, name: &str, packaging: f64) -> NodeId {
    catalog.insert_container(Container::new(name, packaging).unwrap())
}

// ============================================================
// Round trip
// ============================================================

#[rstest]
#[case(0.0, 0.0)]
#[case(19.99, 0.25)]
#[case(75_000.0, 2.5)]
fn given_container_when_adding_then_removing_item_then_totals_are_restored(
    #[case] price: f64,
    #[case] weight: f64,
) {
    let mut catalog = Catalog::new();
    let root = container(&mut catalog, "root", 10.0);
    let existing = item(&mut catalog, "existing", 120.0, 1.5);
    catalog.add(root, existing).unwrap();

    let weight_before = catalog.total_weight(root).unwrap();
    let price_before = catalog.total_price(root).unwrap();
    let incl_before = catalog.price_incl_packaging(root).unwrap();

    let extra = item(&mut catalog, "extra", price, weight);
    catalog.add(root, extra).unwrap();
    catalog.remove(root, extra).unwrap();

    assert_eq!(catalog.total_weight(root).unwrap(), weight_before);
    assert_eq!(catalog.total_price(root).unwrap(), price_before);
    assert_eq!(catalog.price_incl_packaging(root).unwrap(), incl_before);
    assert_eq!(catalog.children(root), &[existing]);
    assert_eq!(catalog.parent(extra), None);
}

// ============================================================
// Structural errors
// ============================================================

#[test]
fn given_nested_boxes_when_adding_outer_into_inner_then_cycle_detected() {
    let mut catalog = Catalog::new();
    let outer = container(&mut catalog, "outer", 0.0);
    let inner = container(&mut catalog, "inner", 0.0);
    catalog.add(outer, inner).unwrap();

    let err = catalog.add(inner, outer).unwrap_err();

    assert!(err.is_structural());
    assert!(matches!(err, DomainError::CycleDetected { .. }));
}

#[test]
fn given_item_in_one_box_when_adding_to_another_then_already_attached() {
    let mut catalog = Catalog::new();
    let first = container(&mut catalog, "first", 0.0);
    let second = container(&mut catalog, "second", 0.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.01);
    catalog.add(first, pen).unwrap();

    let err = catalog.add(second, pen).unwrap_err();

    assert!(err.is_structural());
    // no double counting
    assert_eq!(catalog.total_price(second).unwrap(), 0.0);
    assert_eq!(catalog.total_price(first).unwrap(), 2.0);
}

#[test]
fn given_item_when_used_as_parent_then_not_a_container() {
    let mut catalog = Catalog::new();
    let pen = item(&mut catalog, "pen", 2.0, 0.01);
    let cap = item(&mut catalog, "cap", 0.5, 0.001);

    assert_eq!(catalog.add(pen, cap), Err(DomainError::NotAContainer(pen)));
}

#[test]
fn given_absent_child_when_removing_then_not_found() {
    let mut catalog = Catalog::new();
    let root = container(&mut catalog, "root", 0.0);
    let other = container(&mut catalog, "other", 0.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.01);
    catalog.add(other, pen).unwrap();

    let err = catalog.remove(root, pen).unwrap_err();

    assert_eq!(
        err,
        DomainError::NotFound {
            parent: root,
            child: pen
        }
    );
    assert_eq!(catalog.parent(pen), Some(other));
}

#[test]
fn given_removed_node_when_removing_again_then_not_found() {
    let mut catalog = Catalog::new();
    let root = container(&mut catalog, "root", 0.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.01);
    catalog.add(root, pen).unwrap();
    catalog.remove(root, pen).unwrap();

    assert!(matches!(
        catalog.remove(root, pen),
        Err(DomainError::NotFound { .. })
    ));
}

#[test]
fn given_discarded_node_when_accessing_then_node_not_found() {
    let mut catalog = Catalog::new();
    let root = container(&mut catalog, "root", 0.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.01);
    catalog.discard(pen).unwrap();

    assert_eq!(catalog.add(root, pen), Err(DomainError::NodeNotFound(pen)));
    assert_eq!(catalog.total_weight(pen), Err(DomainError::NodeNotFound(pen)));
    assert!(catalog.get(pen).is_none());
}

// ============================================================
// Moving subtrees
// ============================================================

#[test]
fn given_subtree_when_moved_between_boxes_then_children_follow() {
    let mut catalog = Catalog::new();
    let left = container(&mut catalog, "left", 5.0);
    let right = container(&mut catalog, "right", 7.0);
    let inner = container(&mut catalog, "inner", 1.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.5);
    catalog.add(inner, pen).unwrap();
    catalog.add(left, inner).unwrap();

    catalog.remove(left, inner).unwrap();
    catalog.add(right, inner).unwrap();

    assert_eq!(catalog.total_weight(left).unwrap(), 0.0);
    assert_eq!(catalog.total_weight(right).unwrap(), 0.5);
    assert_eq!(catalog.price_incl_packaging(right).unwrap(), 10.0);
    assert_eq!(catalog.parent(pen), Some(inner));
    let mut roots = catalog.roots();
    roots.sort();
    let mut expected = vec![left, right];
    expected.sort();
    assert_eq!(roots, expected);
}

#[test]
fn given_catalog_when_getting_component_then_variant_matches() {
    let mut catalog = Catalog::new();
    let root = container(&mut catalog, "root", 3.0);
    let pen = item(&mut catalog, "pen", 2.0, 0.5);

    assert!(matches!(catalog.get(root), Some(Component::Container(c)) if c.packaging_cost() == 3.0));
    assert!(matches!(catalog.get(pen), Some(Component::Item(i)) if i.name() == "pen"));
    assert_eq!(catalog.len(), 2);
}
