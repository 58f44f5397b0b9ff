//! Red-black maintenance over the node arena.
//!
//! [`RawTree`] owns the arena plus the root and list anchors. Nothing here
//! looks at key bytes: descents that need the comparator live on
//! [`AssocTree`](crate::AssocTree), which hands this module the node to
//! link in or splice out.

use crate::blob::Blob;
use crate::config::DeleteRebalance;
use crate::node::{Color, Link, NodeArena, Side};

#[derive(Clone, Debug, Default)]
pub(crate) struct RawTree<'a> {
    pub(crate) arena: NodeArena<'a>,
    pub(crate) root: Link,
    pub(crate) head: Link,
    pub(crate) tail: Link,
    pub(crate) len: usize,
}

impl<'a> RawTree<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: NodeArena::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Drop every node and reset to empty, keeping arena capacity.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.root = Link::NIL;
        self.head = Link::NIL;
        self.tail = Link::NIL;
        self.len = 0;
    }

    /// Put `child` where `old` used to hang (under `old`'s parent, or at the root).
    fn replace_child(&mut self, old: Link, child: Link) {
        let parent = self.arena.parent(old);
        if parent.is_nil() {
            self.root = child;
        } else {
            let side = self.arena.side_of(old);
            self.arena.get_mut(parent).set_child(side, child);
        }
        if child.is_some() {
            self.arena.get_mut(child).parent = parent;
        }
    }

    /// Rotate `x` down towards `dir`; its child on the opposite side takes its place.
    ///
    /// ```text
    ///   rotate(x, Left):      x              y
    ///                        / \            / \
    ///                       a   y    =>    x   c
    ///                          / \        / \
    ///                         b   c      a   b
    /// ```
    pub(crate) fn rotate(&mut self, x: Link, dir: Side) {
        let up = dir.opposite();
        let y = self.arena.get(x).child(up);
        debug_assert!(y.is_some(), "rotation without a child to promote");

        let middle = self.arena.get(y).child(dir);
        self.arena.get_mut(x).set_child(up, middle);
        if middle.is_some() {
            self.arena.get_mut(middle).parent = x;
        }

        self.replace_child(x, y);
        self.arena.get_mut(y).set_child(dir, x);
        self.arena.get_mut(x).parent = y;
    }

    /// Link a freshly allocated node under `parent` (or as the root) and
    /// append it to the insertion list, then restore the red-black shape.
    pub(crate) fn attach(&mut self, key: Blob<'a>, value: Option<Blob<'a>>, parent: Link, side: Side) -> Link {
        let color = if parent.is_nil() { Color::Black } else { Color::Red };
        let node = self.arena.alloc(key, value, color);
        if parent.is_nil() {
            self.root = node;
        } else {
            self.arena.get_mut(node).parent = parent;
            self.arena.get_mut(parent).set_child(side, node);
        }
        self.list_push_back(node);
        self.len += 1;
        self.fix_red_red(node);
        node
    }

    /// Repair consecutive red nodes upward from `node`.
    ///
    /// Does nothing when `node` is black.
    pub(crate) fn fix_red_red(&mut self, mut node: Link) {
        if node.is_nil() || !self.arena.is_red(node) {
            return;
        }
        loop {
            if node == self.root {
                break;
            }
            let parent = self.arena.parent(node);
            if !self.arena.is_red(parent) {
                break;
            }
            let grand = self.arena.parent(parent);
            if grand.is_nil() {
                break;
            }

            let side = self.arena.side_of(parent);
            let uncle = self.arena.get(grand).child(side.opposite());
            if self.arena.is_red(uncle) {
                self.arena.get_mut(parent).color = Color::Black;
                self.arena.get_mut(uncle).color = Color::Black;
                self.arena.get_mut(grand).color = Color::Red;
                node = grand;
                continue;
            }

            // Zig-zag: straighten into zig-zig first.
            if self.arena.side_of(node) != side {
                node = parent;
                self.rotate(node, side);
            }
            let parent = self.arena.parent(node);
            let grand = self.arena.parent(parent);
            self.arena.get_mut(parent).color = Color::Black;
            self.arena.get_mut(grand).color = Color::Red;
            self.rotate(grand, side.opposite());
        }
        let root = self.root;
        self.arena.get_mut(root).color = Color::Black;
    }

    /// Rightmost node of `link`'s left subtree. `link` must have a left child.
    pub(crate) fn predecessor(&self, link: Link) -> Link {
        let mut cur = self.arena.get(link).left;
        loop {
            let right = self.arena.get(cur).right;
            if right.is_nil() {
                return cur;
            }
            cur = right;
        }
    }

    /// Move `pred`'s key, value and list position into `target`. `target`'s
    /// previous key and value are dropped; `pred` is left empty and unlisted,
    /// ready to be spliced out and freed.
    pub(crate) fn substitute(&mut self, target: Link, pred: Link) {
        let (key, value) = {
            let p = self.arena.get_mut(pred);
            (std::mem::replace(&mut p.key, Blob::Borrowed(&[])), p.value.take())
        };
        let t = self.arena.get_mut(target);
        t.key = key;
        t.value = value;
        self.list_take_position(target, pred);
    }

    /// Unlink `node` (at most one child) from the tree and rebalance.
    ///
    /// The node stays allocated and listed; callers free it.
    pub(crate) fn splice_out(&mut self, node: Link, mode: DeleteRebalance) {
        let (left, right, color) = {
            let n = self.arena.get(node);
            (n.left, n.right, n.color)
        };
        debug_assert!(left.is_nil() || right.is_nil(), "splice_out needs at most one child");

        let child = if left.is_some() { left } else { right };
        let parent = self.arena.parent(node);
        let side = if parent.is_some() {
            self.arena.side_of(node)
        } else {
            Side::Left
        };
        self.replace_child(node, child);

        let n = self.arena.get_mut(node);
        n.parent = Link::NIL;
        n.left = Link::NIL;
        n.right = Link::NIL;

        if parent.is_nil() {
            if child.is_some() {
                self.arena.get_mut(child).color = Color::Black;
            }
            return;
        }

        match mode {
            DeleteRebalance::RedOnly => self.fix_red_red(child),
            DeleteRebalance::Conformant => {
                if color == Color::Red {
                    return;
                }
                if self.arena.is_red(child) {
                    self.arena.get_mut(child).color = Color::Black;
                } else {
                    self.fix_double_black(child, parent, side);
                }
            }
        }
    }

    /// Restore black-height after removing a black node. `x` (possibly NIL)
    /// sits on `side` of `parent` and is one black short.
    fn fix_double_black(&mut self, mut x: Link, mut parent: Link, mut side: Side) {
        while x != self.root && !self.arena.is_red(x) {
            let far = side.opposite();
            let mut sibling = self.arena.get(parent).child(far);

            if self.arena.is_red(sibling) {
                self.arena.get_mut(sibling).color = Color::Black;
                self.arena.get_mut(parent).color = Color::Red;
                self.rotate(parent, side);
                sibling = self.arena.get(parent).child(far);
            }
            debug_assert!(sibling.is_some(), "black-height violated before delete");

            let near_nephew = self.arena.get(sibling).child(side);
            let far_nephew = self.arena.get(sibling).child(far);
            if !self.arena.is_red(near_nephew) && !self.arena.is_red(far_nephew) {
                self.arena.get_mut(sibling).color = Color::Red;
                x = parent;
                parent = self.arena.parent(x);
                if parent.is_nil() {
                    break;
                }
                side = self.arena.side_of(x);
                continue;
            }

            if !self.arena.is_red(far_nephew) {
                self.arena.get_mut(near_nephew).color = Color::Black;
                self.arena.get_mut(sibling).color = Color::Red;
                self.rotate(sibling, far);
                sibling = self.arena.get(parent).child(far);
            }

            let parent_color = self.arena.get(parent).color;
            self.arena.get_mut(sibling).color = parent_color;
            self.arena.get_mut(parent).color = Color::Black;
            let far_nephew = self.arena.get(sibling).child(far);
            self.arena.get_mut(far_nephew).color = Color::Black;
            self.rotate(parent, side);
            x = self.root;
        }
        if x.is_some() {
            self.arena.get_mut(x).color = Color::Black;
        }
    }

    /// Longest root-to-leaf path, measured with an explicit stack.
    pub(crate) fn height(&self) -> usize {
        let mut max = 0;
        let mut stack = Vec::new();
        if self.root.is_some() {
            stack.push((self.root, 1usize));
        }
        while let Some((link, depth)) = stack.pop() {
            max = max.max(depth);
            let node = self.arena.get(link);
            for child in [node.left, node.right] {
                if child.is_some() {
                    stack.push((child, depth + 1));
                }
            }
        }
        max
    }
}
