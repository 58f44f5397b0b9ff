//! Insertion-order list threaded through the arena.
//!
//! The list is independent of the tree shape: rotations never touch
//! `prev`/`next`, and a key re-inserted after deletion lands at the tail.

use crate::engine::RawTree;
use crate::node::Link;

impl<'a> RawTree<'a> {
    pub(crate) fn list_push_back(&mut self, node: Link) {
        let tail = self.tail;
        {
            let n = self.arena.get_mut(node);
            n.prev = tail;
            n.next = Link::NIL;
        }
        if tail.is_nil() {
            self.head = node;
        } else {
            self.arena.get_mut(tail).next = node;
        }
        self.tail = node;
    }

    pub(crate) fn list_unlink(&mut self, node: Link) {
        let (prev, next) = {
            let n = self.arena.get(node);
            (n.prev, n.next)
        };
        if prev.is_nil() {
            self.head = next;
        } else {
            self.arena.get_mut(prev).next = next;
        }
        if next.is_nil() {
            self.tail = prev;
        } else {
            self.arena.get_mut(next).prev = prev;
        }
        let n = self.arena.get_mut(node);
        n.prev = Link::NIL;
        n.next = Link::NIL;
    }

    /// Drop `to` from its own list position and move it into the position
    /// `from` occupies. `from` ends up detached from the list.
    ///
    /// Used by predecessor-substitution delete: the surviving node takes over
    /// the predecessor's key and therefore its place in insertion order.
    pub(crate) fn list_take_position(&mut self, to: Link, from: Link) {
        debug_assert_ne!(to, from);
        self.list_unlink(to);

        let (prev, next) = {
            let n = self.arena.get(from);
            (n.prev, n.next)
        };
        {
            let n = self.arena.get_mut(to);
            n.prev = prev;
            n.next = next;
        }
        if prev.is_nil() {
            self.head = to;
        } else {
            self.arena.get_mut(prev).next = to;
        }
        if next.is_nil() {
            self.tail = to;
        } else {
            self.arena.get_mut(next).prev = to;
        }

        let n = self.arena.get_mut(from);
        n.prev = Link::NIL;
        n.next = Link::NIL;
    }

    /// Walk the list from head to tail.
    pub(crate) fn list_iter(&self) -> ListIter<'_, 'a> {
        ListIter {
            tree: self,
            cur: self.head,
        }
    }
}

pub(crate) struct ListIter<'t, 'a> {
    tree: &'t RawTree<'a>,
    cur: Link,
}

impl<'t, 'a> Iterator for ListIter<'t, 'a> {
    type Item = Link;

    fn next(&mut self) -> Option<Link> {
        if self.cur.is_nil() {
            return None;
        }
        let link = self.cur;
        self.cur = self.tree.arena.get(link).next;
        Some(link)
    }
}
