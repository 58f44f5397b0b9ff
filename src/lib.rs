//! # assoc-tree
//!
//! An associative container over byte keys: a red-black tree ordered by a
//! caller-supplied comparator, with every node also threaded on a doubly
//! linked list in first-insertion order.
//!
//! Keys and values are opaque bytes. Each one is stored either as a
//! container-owned copy or as a reference into caller memory, chosen per
//! field through [`Blob`]. No operation recurses, so tree depth is never
//! limited by the call stack.
//!
//! ## Example
//!
//! ```rust
//! use assoc_tree::{AssocTree, Blob, Lexicographic};
//!
//! let mut tree = AssocTree::new(Lexicographic);
//! tree.insert(Blob::copied(b"Scalia"), Some(Blob::copied(b"Reagan"))).unwrap();
//! tree.insert(Blob::copied(b"Kennedy"), Some(Blob::copied(b"Reagan"))).unwrap();
//! tree.insert(Blob::borrowed(b"Thomas"), Some(Blob::borrowed(b"Bush"))).unwrap();
//!
//! assert_eq!(tree.len(), 3);
//! assert_eq!(tree.array_sorted().unwrap(), [&b"Kennedy"[..], b"Scalia", b"Thomas"]);
//! assert_eq!(tree.array_insertion_order().unwrap(), [&b"Scalia"[..], b"Kennedy", b"Thomas"]);
//! assert_eq!(tree.value_of(b"Thomas").unwrap(), Some(&b"Bush"[..]));
//!
//! tree.delete(b"Scalia").unwrap();
//! assert!(tree.value_of(b"Scalia").is_err());
//! ```
//!
//! ## Thread safety
//!
//! There is no internal synchronization. Mutation requires `&mut self`; if a
//! tree is shared across threads, callers serialize access themselves.

#![deny(unsafe_code)]

mod blob;
mod compare;
mod config;
mod engine;
mod error;
mod list;
mod node;
mod snapshot;
mod tracing_helpers;
mod verify;

pub use blob::{Blob, OwnedBuf};
pub use compare::{CStyle, Comparator, Lexicographic, Reverse};
pub use config::{DeleteRebalance, TreeConfig};
pub use error::{InvariantViolation, Result, TreeError};
pub use verify::TreeStats;

use std::cmp::Ordering;

use engine::RawTree;
use node::{Link, Side};
use tracing_helpers::{debug_log, trace_log, warn_log};

/// Comparator-ordered red-black tree with an insertion-order list.
///
/// `'a` bounds every borrowed key or value; owned copies live as long as the
/// entry that holds them.
#[derive(Clone)]
pub struct AssocTree<'a, C> {
    cmp: C,
    config: TreeConfig,
    raw: RawTree<'a>,
}

impl<'a, C: Comparator> AssocTree<'a, C> {
    pub fn new(cmp: C) -> Self {
        Self::with_config(cmp, TreeConfig::default())
    }

    pub fn with_config(cmp: C, config: TreeConfig) -> Self {
        Self {
            cmp,
            config,
            raw: RawTree::with_capacity(config.initial_capacity),
        }
    }

    /// Number of live keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.len == 0
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    fn find(&self, key: &[u8]) -> Link {
        let mut cur = self.raw.root;
        while cur.is_some() {
            let node = self.raw.arena.get(cur);
            cur = match self.cmp.compare(key, node.key.as_bytes()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return cur,
            };
        }
        Link::NIL
    }

    /// Add a new entry at the tail of the insertion order.
    ///
    /// Never overwrites: an existing key yields [`TreeError::DuplicateKey`]
    /// and leaves its value untouched. Use [`AssocTree::update`] to replace
    /// values.
    pub fn insert(&mut self, key: Blob<'a>, value: Option<Blob<'a>>) -> Result<()> {
        let mut parent = Link::NIL;
        let mut side = Side::Left;
        let mut cur = self.raw.root;
        while cur.is_some() {
            let node = self.raw.arena.get(cur);
            parent = cur;
            (side, cur) = match self.cmp.compare(key.as_bytes(), node.key.as_bytes()) {
                Ordering::Less => (Side::Left, node.left),
                Ordering::Greater => (Side::Right, node.right),
                Ordering::Equal => {
                    debug_log!(len = self.raw.len, "insert rejected: duplicate key");
                    return Err(TreeError::DuplicateKey);
                }
            };
        }

        if let Err(err) = self.raw.arena.reserve_one() {
            warn_log!(%err, "node allocation failed");
            return Err(err);
        }
        self.raw.attach(key, value, parent, side);
        trace_log!(len = self.raw.len, "inserted");
        Ok(())
    }

    /// [`AssocTree::insert`] using the length convention: a length of `0`
    /// stores a reference to the given bytes, a positive length stores a copy
    /// of that many bytes. A `None` value stores no value.
    pub fn insert_with_len(
        &mut self,
        key: &'a [u8],
        key_len: usize,
        value: Option<&'a [u8]>,
        value_len: usize,
    ) -> Result<()> {
        let key = Blob::with_len(key, key_len)?;
        let value = value_blob(value, value_len)?;
        self.insert(key, value)
    }

    /// Keys in first-insertion order, rebuilt on every call.
    ///
    /// Returns [`TreeError::Empty`] when there are no keys.
    pub fn array_insertion_order(&self) -> Result<Vec<&[u8]>> {
        self.raw.snapshot_insertion_order()
    }

    /// Keys in comparator order, rebuilt on every call.
    ///
    /// Returns [`TreeError::Empty`] when there are no keys.
    pub fn array_sorted(&self) -> Result<Vec<&[u8]>> {
        self.raw.snapshot_sorted()
    }

    /// Value stored under `key`. `Ok(None)` means the key is present with no
    /// value.
    pub fn value_of(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        self.get_key_value(key)
            .map(|(_, value)| value.map(Blob::as_bytes))
            .ok_or(TreeError::KeyNotFound)
    }

    /// Stored key and value blobs for `key`, exposing their ownership tags.
    pub fn get_key_value(&self, key: &[u8]) -> Option<(&Blob<'a>, Option<&Blob<'a>>)> {
        let link = self.find(key);
        if link.is_nil() {
            return None;
        }
        let node = self.raw.arena.get(link);
        Some((&node.key, node.value.as_ref()))
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Replace the value of an existing key. The previous value is dropped
    /// (freed if it was an owned copy); key and positions are unchanged.
    pub fn update(&mut self, key: &[u8], value: Option<Blob<'a>>) -> Result<()> {
        let link = self.find(key);
        if link.is_nil() {
            debug_log!("update rejected: key not found");
            return Err(TreeError::KeyNotFound);
        }
        self.raw.arena.get_mut(link).value = value;
        trace_log!("updated");
        Ok(())
    }

    /// [`AssocTree::update`] using the length convention of
    /// [`AssocTree::insert_with_len`].
    pub fn update_with_len(
        &mut self,
        key: &[u8],
        value: Option<&'a [u8]>,
        value_len: usize,
    ) -> Result<()> {
        if !self.contains_key(key) {
            return Err(TreeError::KeyNotFound);
        }
        let value = value_blob(value, value_len)?;
        self.update(key, value)
    }

    /// Remove `key` from the tree and the insertion list.
    ///
    /// A node with two children keeps its tree slot: it takes over its
    /// in-order predecessor's key, value and list position, and the
    /// predecessor's node is the one released.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        let target = self.find(key);
        if target.is_nil() {
            debug_log!("delete rejected: key not found");
            return Err(TreeError::KeyNotFound);
        }

        let (left, right) = {
            let node = self.raw.arena.get(target);
            (node.left, node.right)
        };
        if target == self.raw.root && left.is_nil() && right.is_nil() {
            self.release();
            return Ok(());
        }

        if let Err(err) = self.raw.arena.reserve_free_slot() {
            warn_log!(%err, "free-list growth failed");
            return Err(err);
        }
        let doomed = if left.is_some() && right.is_some() {
            let pred = self.raw.predecessor(target);
            self.raw.substitute(target, pred);
            pred
        } else {
            self.raw.list_unlink(target);
            target
        };
        self.raw.splice_out(doomed, self.config.delete_rebalance);
        self.raw.arena.free(doomed);
        self.raw.len -= 1;
        trace_log!(len = self.raw.len, "deleted");
        Ok(())
    }

    /// Drop every entry, freeing owned copies, and return to the empty state.
    /// The comparator and configuration are kept.
    pub fn release(&mut self) {
        debug_log!(len = self.raw.len, "releasing all entries");
        self.raw.clear();
    }

    /// Check every structural invariant: parent links, comparator order,
    /// red-black coloring and list integrity.
    ///
    /// With [`DeleteRebalance::RedOnly`] the returned `black_height` may be
    /// `None` after deletions; that alone is not reported as an error.
    pub fn verify(&self) -> std::result::Result<TreeStats, InvariantViolation> {
        self.raw.verify(&self.cmp)
    }

    /// Approximate heap bytes held by the container.
    pub fn memory_usage(&self) -> usize {
        self.raw.arena.capacity()
            + self
                .raw
                .list_iter()
                .map(|link| {
                    let node = self.raw.arena.get(link);
                    node.key.heap_bytes() + node.value.as_ref().map_or(0, Blob::heap_bytes)
                })
                .sum::<usize>()
    }

    pub fn shrink_to_fit(&mut self) {
        self.raw.arena.shrink_to_fit();
    }
}

fn value_blob(value: Option<&[u8]>, value_len: usize) -> Result<Option<Blob<'_>>> {
    match value {
        Some(bytes) => Blob::with_len(bytes, value_len).map(Some),
        None if value_len == 0 => Ok(None),
        None => Err(TreeError::InvalidArgument("length given without a value")),
    }
}

impl<C> std::fmt::Debug for AssocTree<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.raw.list_iter().map(|link| {
                let node = self.raw.arena.get(link);
                (&node.key, &node.value)
            }))
            .finish()
    }
}


#[cfg(test)]
mod proptests;
