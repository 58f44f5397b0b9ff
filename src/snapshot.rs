//! Key snapshots in insertion order and in comparator order.
//!
//! The sorted walk uses parent links to climb back out of finished subtrees,
//! so it needs no stack and no recursion regardless of tree depth.

use crate::engine::RawTree;
use crate::error::{Result, TreeError};
use crate::node::Link;

/// In-order successor walk over a [`RawTree`].
pub(crate) struct SortedWalk<'t, 'a> {
    tree: &'t RawTree<'a>,
    next: Link,
}

impl<'t, 'a> SortedWalk<'t, 'a> {
    pub(crate) fn new(tree: &'t RawTree<'a>) -> Self {
        let next = if tree.root.is_nil() {
            Link::NIL
        } else {
            leftmost(tree, tree.root)
        };
        Self { tree, next }
    }
}

fn leftmost(tree: &RawTree<'_>, mut link: Link) -> Link {
    loop {
        let left = tree.arena.get(link).left;
        if left.is_nil() {
            return link;
        }
        link = left;
    }
}

fn successor(tree: &RawTree<'_>, link: Link) -> Link {
    let right = tree.arena.get(link).right;
    if right.is_some() {
        return leftmost(tree, right);
    }
    // Climb until we leave a left subtree.
    let mut child = link;
    let mut parent = tree.arena.parent(child);
    while parent.is_some() && tree.arena.get(parent).right == child {
        child = parent;
        parent = tree.arena.parent(child);
    }
    parent
}

impl<'t, 'a> Iterator for SortedWalk<'t, 'a> {
    type Item = Link;

    fn next(&mut self) -> Option<Link> {
        if self.next.is_nil() {
            return None;
        }
        let link = self.next;
        self.next = successor(self.tree, link);
        Some(link)
    }
}

impl<'a> RawTree<'a> {
    /// Collect keys visited by `links` into a freshly reserved vector.
    fn collect_keys<'t>(&'t self, links: impl Iterator<Item = Link>) -> Result<Vec<&'t [u8]>> {
        if self.len == 0 {
            return Err(TreeError::Empty);
        }
        let mut out: Vec<&'t [u8]> = Vec::new();
        out.try_reserve_exact(self.len)
            .map_err(|_| TreeError::AllocationFailure {
                requested: self.len * std::mem::size_of::<&[u8]>(),
            })?;
        out.extend(links.map(|link| self.arena.get(link).key.as_bytes()));
        debug_assert_eq!(out.len(), self.len);
        Ok(out)
    }

    pub(crate) fn snapshot_insertion_order(&self) -> Result<Vec<&[u8]>> {
        self.collect_keys(self.list_iter())
    }

    pub(crate) fn snapshot_sorted(&self) -> Result<Vec<&[u8]>> {
        self.collect_keys(SortedWalk::new(self))
    }
}
