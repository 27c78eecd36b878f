//! Arena-backed composite tree of items and boxes.
//!
//! The [`Catalog`] owns every node. Callers hold [`NodeId`] handles and wire
//! nodes together with [`Catalog::add`], which enforces single ownership and
//! acyclicity so that traversals always terminate.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::entities::{Component, Container, Item};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::visitor::Visitor;

/// Opaque handle to a node stored in a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}.{}", slot, generation)
    }
}

/// Tree node in the arena.
#[derive(Debug)]
struct Node {
    component: Component,
    /// None for roots (detached nodes)
    parent: Option<NodeId>,
    /// Insertion order is traversal order
    children: Vec<NodeId>,
}

/// Owner of one or more order trees.
#[derive(Debug)]
pub struct Catalog {
    arena: Arena<Node>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
        }
    }

    /// Store a component as a detached root.
    #[instrument(level = "trace", skip(self, component))]
    pub fn insert(&mut self, component: impl Into<Component>) -> NodeId {
        let node = Node {
            component: component.into(),
            parent: None,
            children: Vec::new(),
        };
        NodeId(self.arena.insert(node))
    }

    pub fn insert_item(&mut self, item: Item) -> NodeId {
        self.insert(item)
    }

    pub fn insert_container(&mut self, container: Container) -> NodeId {
        self.insert(container)
    }

    fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.arena.get(id.0).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Component> {
        self.arena.get(id.0).map(|node| &node.component)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id.0).and_then(|node| node.parent)
    }

    /// Direct children in insertion order; empty for items and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// All nodes without a parent.
    pub fn roots(&self) -> Vec<NodeId> {
        self.arena
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Append `child` to the end of `parent`'s children.
    ///
    /// Fails if `parent` is an item, if `child` already has a parent, or if
    /// `child` is `parent` itself or one of its ancestors.
    #[instrument(level = "debug", skip(self))]
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !parent_node.component.is_container() {
            return Err(DomainError::NotAContainer(parent));
        }
        if child == parent {
            return Err(DomainError::CycleDetected { parent, child });
        }
        if let Some(owner) = child_node.parent {
            return Err(DomainError::AlreadyAttached {
                child,
                parent: owner,
            });
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(DomainError::CycleDetected { parent, child });
        }

        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent.0) {
            node.children.push(child);
        }
        debug!("attached {} under {}", child, parent);
        Ok(())
    }

    /// Detach `child` (with its subtree) from `parent`. The child becomes a root again.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let parent_node = self.arena.get_mut(parent.0).ok_or(DomainError::NodeNotFound(parent))?;
        let position = parent_node
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DomainError::NotFound { parent, child })?;
        parent_node.children.remove(position);

        if let Some(node) = self.arena.get_mut(child.0) {
            node.parent = None;
        }
        debug!("detached {} from {}", child, parent);
        Ok(())
    }

    /// Drop a detached root and everything below it. Returns the number of freed nodes.
    #[instrument(level = "debug", skip(self))]
    pub fn discard(&mut self, id: NodeId) -> DomainResult<usize> {
        if let Some(owner) = self.node(id)?.parent {
            return Err(DomainError::AlreadyAttached {
                child: id,
                parent: owner,
            });
        }
        let doomed: Vec<NodeId> = self.iter_preorder(id).map(|node| node.id()).collect();
        for node in &doomed {
            self.arena.remove(node.0);
        }
        Ok(doomed.len())
    }

    /// Walk parent links upwards, starting at `id` itself.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.parent(current))
    }

    /// Number of levels in the subtree rooted at `id` (an item has depth 1).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self, id: NodeId) -> DomainResult<usize> {
        self.node(id)?;
        Ok(self.calculate_depth(id))
    }

    fn calculate_depth(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&child| self.calculate_depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Borrowed view of a node, the entry point for visitors.
    pub fn node_ref(&self, id: NodeId) -> DomainResult<NodeRef<'_>> {
        let node = self.node(id)?;
        Ok(NodeRef {
            catalog: self,
            id,
            node,
        })
    }

    /// Depth-first, pre-order walk of the subtree at `id` (empty for unknown ids).
    pub fn iter_preorder(&self, id: NodeId) -> PreOrderIter<'_> {
        PreOrderIter::new(self, id)
    }

    /// Run `visitor` over the subtree rooted at `id` (double dispatch).
    #[instrument(level = "debug", skip(self, visitor), fields(visitor = visitor.name()))]
    pub fn accept<V: Visitor + ?Sized>(&self, id: NodeId, visitor: &V) -> DomainResult<f64> {
        Ok(self.node_ref(id)?.accept(visitor))
    }

    /// Sum of the weights of all items below `id`.
    pub fn total_weight(&self, id: NodeId) -> DomainResult<f64> {
        Ok(self.node_ref(id)?.total_weight())
    }

    /// Sum of item prices below `id`, packaging excluded.
    pub fn price_excl_packaging(&self, id: NodeId) -> DomainResult<f64> {
        Ok(self.node_ref(id)?.price_excl_packaging())
    }

    /// Sum of item prices plus the packaging cost of every box below (and at) `id`.
    pub fn price_incl_packaging(&self, id: NodeId) -> DomainResult<f64> {
        Ok(self.node_ref(id)?.price_incl_packaging())
    }

    /// Alias of [`Catalog::price_excl_packaging`].
    pub fn total_price(&self, id: NodeId) -> DomainResult<f64> {
        self.price_excl_packaging(id)
    }
}

/// Read-only view of one node inside a [`Catalog`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    catalog: &'a Catalog,
    id: NodeId,
    node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn component(&self) -> &'a Component {
        &self.node.component
    }

    pub fn name(&self) -> &'a str {
        self.node.component.name()
    }

    /// Direct children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let catalog = self.catalog;
        self.node
            .children
            .iter()
            .filter_map(move |&child| catalog.node_ref(child).ok())
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    /// Dispatch on the node variant: items go to `visit_item`, boxes to `visit_container`.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &V) -> f64 {
        match &self.node.component {
            Component::Item(item) => visitor.visit_item(item),
            Component::Container(container) => visitor.visit_container(ContainerRef {
                node: *self,
                container,
            }),
        }
    }

    fn items(&self) -> impl Iterator<Item = &'a Item> + 'a {
        self.catalog
            .iter_preorder(self.id)
            .filter_map(|node| match node.component() {
                Component::Item(item) => Some(item),
                Component::Container(_) => None,
            })
    }

    pub fn total_weight(&self) -> f64 {
        self.items().map(Item::weight).sum()
    }

    pub fn price_excl_packaging(&self) -> f64 {
        self.items().map(Item::price).sum()
    }

    pub fn price_incl_packaging(&self) -> f64 {
        self.catalog
            .iter_preorder(self.id)
            .map(|node| match node.component() {
                Component::Item(item) => item.price(),
                Component::Container(container) => container.packaging_cost(),
            })
            .sum()
    }
}

/// What a [`Visitor`] sees of a box: its own data plus its children to recurse into.
#[derive(Debug, Clone, Copy)]
pub struct ContainerRef<'a> {
    node: NodeRef<'a>,
    container: &'a Container,
}

impl<'a> ContainerRef<'a> {
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn name(&self) -> &'a str {
        self.container.name()
    }

    pub fn packaging_cost(&self) -> f64 {
        self.container.packaging_cost()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.node.children()
    }

    pub fn len(&self) -> usize {
        self.node.child_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_weight(&self) -> f64 {
        self.node.total_weight()
    }

    pub fn price_excl_packaging(&self) -> f64 {
        self.node.price_excl_packaging()
    }

    pub fn price_incl_packaging(&self) -> f64 {
        self.node.price_incl_packaging()
    }

    /// Sum of `visitor` over every child, in insertion order.
    pub fn sum_children<V: Visitor + ?Sized>(&self, visitor: &V) -> f64 {
        self.children().map(|child| child.accept(visitor)).sum()
    }
}

pub struct PreOrderIter<'a> {
    catalog: &'a Catalog,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIter<'a> {
    fn new(catalog: &'a Catalog, root: NodeId) -> Self {
        let mut stack = Vec::new();
        if catalog.contains(root) {
            stack.push(root);
        }
        Self { catalog, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Ok(node) = self.catalog.node_ref(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    fn item(catalog: &mut Catalog, name: &str, price: f64, weight: f64) -> NodeId {
        catalog.insert_item(Item::new(name, price, weight, Category::General).unwrap())
    }

    fn boxed(catalog: &mut Catalog, name: &str, packaging: f64) -> NodeId {
        catalog.insert_container(Container::new(name, packaging).unwrap())
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut catalog = Catalog::new();
        let root = boxed(&mut catalog, "root", 0.0);
        let a = item(&mut catalog, "a", 1.0, 1.0);
        let b = item(&mut catalog, "b", 2.0, 1.0);
        let c = item(&mut catalog, "c", 3.0, 1.0);
        for child in [b, a, c] {
            catalog.add(root, child).unwrap();
        }
        assert_eq!(catalog.children(root), &[b, a, c]);
        assert_eq!(catalog.parent(a), Some(root));
        assert_eq!(catalog.roots(), vec![root]);
    }

    #[test]
    fn test_add_into_item_is_structural_error() {
        let mut catalog = Catalog::new();
        let a = item(&mut catalog, "a", 1.0, 1.0);
        let b = item(&mut catalog, "b", 1.0, 1.0);
        let err = catalog.add(a, b).unwrap_err();
        assert_eq!(err, DomainError::NotAContainer(a));
        assert!(err.is_structural());
    }

    #[test]
    fn test_add_self_is_cycle() {
        let mut catalog = Catalog::new();
        let root = boxed(&mut catalog, "root", 0.0);
        assert!(matches!(
            catalog.add(root, root),
            Err(DomainError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_add_ancestor_is_cycle() {
        let mut catalog = Catalog::new();
        let outer = boxed(&mut catalog, "outer", 0.0);
        let middle = boxed(&mut catalog, "middle", 0.0);
        let inner = boxed(&mut catalog, "inner", 0.0);
        catalog.add(outer, middle).unwrap();
        catalog.add(middle, inner).unwrap();

        let err = catalog.add(inner, outer).unwrap_err();
        assert_eq!(
            err,
            DomainError::CycleDetected {
                parent: inner,
                child: outer
            }
        );
        assert!(catalog.children(inner).is_empty());
    }

    #[test]
    fn test_reparenting_requires_remove() {
        let mut catalog = Catalog::new();
        let first = boxed(&mut catalog, "first", 0.0);
        let second = boxed(&mut catalog, "second", 0.0);
        let a = item(&mut catalog, "a", 1.0, 1.0);
        catalog.add(first, a).unwrap();

        assert_eq!(
            catalog.add(second, a),
            Err(DomainError::AlreadyAttached {
                child: a,
                parent: first
            })
        );

        catalog.remove(first, a).unwrap();
        catalog.add(second, a).unwrap();
        assert_eq!(catalog.parent(a), Some(second));
    }

    #[test]
    fn test_remove_missing_child_is_not_found() {
        let mut catalog = Catalog::new();
        let root = boxed(&mut catalog, "root", 0.0);
        let a = item(&mut catalog, "a", 1.0, 1.0);
        assert_eq!(
            catalog.remove(root, a),
            Err(DomainError::NotFound {
                parent: root,
                child: a
            })
        );
    }

    #[test]
    fn test_discard_frees_subtree() {
        let mut catalog = Catalog::new();
        let root = boxed(&mut catalog, "root", 0.0);
        let inner = boxed(&mut catalog, "inner", 0.0);
        let a = item(&mut catalog, "a", 1.0, 1.0);
        catalog.add(inner, a).unwrap();
        catalog.add(root, inner).unwrap();

        assert!(catalog.discard(inner).is_err());
        catalog.remove(root, inner).unwrap();
        assert_eq!(catalog.discard(inner).unwrap(), 2);
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains(a));
        assert_eq!(catalog.node_ref(a).unwrap_err(), DomainError::NodeNotFound(a));
    }

    #[test]
    fn test_totals_and_depth() {
        let mut catalog = Catalog::new();
        let root = boxed(&mut catalog, "root", 10.0);
        let inner = boxed(&mut catalog, "inner", 5.0);
        let a = item(&mut catalog, "a", 100.0, 1.5);
        let b = item(&mut catalog, "b", 50.0, 0.5);
        catalog.add(inner, a).unwrap();
        catalog.add(root, inner).unwrap();
        catalog.add(root, b).unwrap();

        assert_eq!(catalog.total_weight(root).unwrap(), 2.0);
        assert_eq!(catalog.price_excl_packaging(root).unwrap(), 150.0);
        assert_eq!(catalog.total_price(root).unwrap(), 150.0);
        assert_eq!(catalog.price_incl_packaging(root).unwrap(), 165.0);
        assert_eq!(catalog.depth(root).unwrap(), 3);
        assert_eq!(catalog.depth(b).unwrap(), 1);

        let names: Vec<&str> = catalog.iter_preorder(root).map(|n| n.name()).collect();
        assert_eq!(names, vec!["root", "inner", "a", "b"]);
    }
}
