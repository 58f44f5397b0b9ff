//! Construction-time settings for [`AssocTree`](crate::AssocTree).

/// How the tree is repaired after a node is spliced out by `delete`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteRebalance {
    /// Full red-black delete fixup. Black-height stays equal on every path, so
    /// height stays within `2 * log2(n + 1)` under any workload.
    #[default]
    Conformant,
    /// Run only the red-red repair used by insert on the node that fills the
    /// vacated slot. The root stays black and no red node gets a red parent,
    /// but removing black nodes can leave black-heights unequal. Tree shapes
    /// follow the classic `treelibc` container; root colour may differ, since
    /// the root is always forced black here.
    RedOnly,
}

/// Settings passed to [`AssocTree::with_config`](crate::AssocTree::with_config).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeConfig {
    pub delete_rebalance: DeleteRebalance,
    /// Node slots to preallocate.
    pub initial_capacity: usize,
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_rebalance(mut self, mode: DeleteRebalance) -> Self {
        self.delete_rebalance = mode;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
