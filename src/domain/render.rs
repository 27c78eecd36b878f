//! Render order trees for the terminal.

use termtree::Tree;

use crate::domain::catalog::NodeRef;
use crate::domain::entities::Component;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeRef<'_> {
    fn to_tree_string(&self) -> Tree<String> {
        let label = match self.component() {
            Component::Item(item) => format!("{} [{}]", item, item.category()),
            Component::Container(container) => format!(
                "Box '{}' ({} items, packaging {})",
                container.name(),
                self.child_count(),
                container.packaging_cost()
            ),
        };

        // Recursively construct the children
        let leaves: Vec<_> = self.children().map(|c| c.to_tree_string()).collect();

        Tree::new(label).with_leaves(leaves)
    }
}
