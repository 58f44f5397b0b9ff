//! Structural self-check used by tests and debugging tools.

use std::cmp::Ordering;

use crate::compare::Comparator;
use crate::engine::RawTree;
use crate::error::InvariantViolation;
use crate::node::{Color, Link};
use crate::snapshot::SortedWalk;

/// Shape summary returned by [`AssocTree::verify`](crate::AssocTree::verify).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeStats {
    pub len: usize,
    /// Nodes on the longest root-to-leaf path.
    pub height: usize,
    /// Black nodes on every root-to-NIL path, or `None` when paths disagree.
    pub black_height: Option<usize>,
}

impl<'a> RawTree<'a> {
    pub(crate) fn verify<C: Comparator>(&self, cmp: &C) -> Result<TreeStats, InvariantViolation> {
        if self.root.is_some() {
            if self.arena.color(self.root) != Color::Black {
                return Err(InvariantViolation::RedRoot);
            }
            if self.arena.parent(self.root).is_some() {
                return Err(InvariantViolation::RootHasParent);
            }
        }

        // Links and colors, plus black count from the root to each NIL.
        let mut stack: Vec<(Link, usize)> = Vec::new();
        if self.root.is_some() {
            stack.push((self.root, 0));
        }
        let mut tree_count = 0usize;
        let mut black_height = None;
        let mut balanced = true;
        while let Some((link, blacks_above)) = stack.pop() {
            tree_count += 1;
            let node = self.arena.get(link);
            let blacks = blacks_above + usize::from(node.color == Color::Black);
            if node.color == Color::Red && self.arena.is_red(node.parent) {
                return Err(InvariantViolation::RedRed { node: link.raw() });
            }
            for child in [node.left, node.right] {
                if child.is_nil() {
                    match black_height {
                        None => black_height = Some(blacks + 1),
                        Some(h) if h != blacks + 1 => balanced = false,
                        Some(_) => {}
                    }
                    continue;
                }
                if self.arena.parent(child) != link {
                    return Err(InvariantViolation::ParentMismatch {
                        parent: link.raw(),
                        child: child.raw(),
                    });
                }
                stack.push((child, blacks));
            }
        }
        if tree_count != self.len {
            return Err(InvariantViolation::TreeCount {
                expected: self.len,
                found: tree_count,
            });
        }

        let mut prev_key: Option<&[u8]> = None;
        for (position, link) in SortedWalk::new(self).enumerate() {
            let key = self.arena.get(link).key.as_bytes();
            if let Some(prev) = prev_key {
                if cmp.compare(prev, key) != Ordering::Less {
                    return Err(InvariantViolation::OutOfOrder { position });
                }
            }
            prev_key = Some(key);
        }

        let mut list_count = 0usize;
        let mut prev = Link::NIL;
        for link in self.list_iter() {
            if self.arena.get(link).prev != prev {
                return Err(InvariantViolation::ListLink { node: link.raw() });
            }
            list_count += 1;
            if list_count > self.len {
                break;
            }
            prev = link;
        }
        if list_count != self.len {
            return Err(InvariantViolation::ListCount {
                expected: self.len,
                found: list_count,
            });
        }
        if prev != self.tail {
            return Err(InvariantViolation::ListTail);
        }

        Ok(TreeStats {
            len: self.len,
            height: self.height(),
            black_height: if balanced { black_height.or(Some(1)) } else { None },
        })
    }
}
