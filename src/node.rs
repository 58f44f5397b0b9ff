//! Arena-backed nodes.
//!
//! Nodes live in a `Vec` and refer to each other through [`Link`] indices.
//! Tree edges (`left`/`right`) and the list edge `next` are the structural
//! edges; `parent` and `prev` are back-references used for traversal and
//! splicing only. Freed slots are recycled through a free list.

use crate::blob::Blob;
use crate::error::{Result, TreeError};

/// Index of a node in the arena: 32-bit, with `u32::MAX` reserved as NIL.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Link(u32);

impl Link {
    pub(crate) const NIL: Link = Link(u32::MAX);

    #[inline]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == Self::NIL.0
    }

    #[inline]
    pub(crate) fn is_some(self) -> bool {
        !self.is_nil()
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(self.is_some(), "dereferenced NIL link");
        self.0 as usize
    }

    #[inline]
    pub(crate) fn raw(self) -> u32 {
        self.0
    }
}

impl Default for Link {
    fn default() -> Self {
        Link::NIL
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<'a> {
    pub(crate) key: Blob<'a>,
    pub(crate) value: Option<Blob<'a>>,
    pub(crate) color: Color,
    pub(crate) parent: Link,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) prev: Link,
    pub(crate) next: Link,
}

impl<'a> Node<'a> {
    fn new(key: Blob<'a>, value: Option<Blob<'a>>, color: Color) -> Self {
        Self {
            key,
            value,
            color,
            parent: Link::NIL,
            left: Link::NIL,
            right: Link::NIL,
            prev: Link::NIL,
            next: Link::NIL,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, link: Link) {
        match side {
            Side::Left => self.left = link,
            Side::Right => self.right = link,
        }
    }
}

/// Link for the slot at `len`, or an error once the 32-bit index space
/// (minus the NIL sentinel) is used up.
fn next_index(len: usize) -> Result<Link> {
    match u32::try_from(len) {
        Ok(raw) if raw != Link::NIL.0 => Ok(Link(raw)),
        _ => Err(TreeError::AllocationFailure {
            requested: std::mem::size_of::<Node<'static>>(),
        }),
    }
}

/// Node storage with slot reuse.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeArena<'a> {
    nodes: Vec<Node<'a>>,
    free: Vec<Link>,
}

impl<'a> NodeArena<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Make room for one more node so that [`NodeArena::alloc`] cannot fail.
    pub(crate) fn reserve_one(&mut self) -> Result<()> {
        if !self.free.is_empty() {
            return Ok(());
        }
        next_index(self.nodes.len())?;
        if self.nodes.len() < self.nodes.capacity() {
            return Ok(());
        }
        // Same growth policy as `Vec::push`, but fallible.
        let additional = self.nodes.len().max(4);
        self.nodes
            .try_reserve(additional)
            .or_else(|_| self.nodes.try_reserve_exact(1))
            .map_err(|_| TreeError::AllocationFailure {
                requested: std::mem::size_of::<Node<'a>>(),
            })
    }

    /// Make room on the free list so that [`NodeArena::free`] cannot fail.
    pub(crate) fn reserve_free_slot(&mut self) -> Result<()> {
        if self.free.len() < self.free.capacity() {
            return Ok(());
        }
        self.free
            .try_reserve(self.nodes.len().saturating_sub(self.free.len()).max(1))
            .map_err(|_| TreeError::AllocationFailure {
                requested: std::mem::size_of::<Link>(),
            })
    }

    /// Store a detached node. Callers reserve first via [`NodeArena::reserve_one`].
    pub(crate) fn alloc(&mut self, key: Blob<'a>, value: Option<Blob<'a>>, color: Color) -> Link {
        let node = Node::new(key, value, color);
        match self.free.pop() {
            Some(link) => {
                self.nodes[link.index()] = node;
                link
            }
            None => {
                let link = Link(self.nodes.len() as u32);
                debug_assert!(link.is_some(), "alloc past the index space");
                self.nodes.push(node);
                link
            }
        }
    }

    /// Drop the slot's key and value and make it available for reuse.
    pub(crate) fn free(&mut self, link: Link) -> Node<'a> {
        let vacant = Node::new(Blob::Borrowed(&[]), None, Color::Black);
        let old = std::mem::replace(&mut self.nodes[link.index()], vacant);
        self.free.push(link);
        old
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    #[inline]
    pub(crate) fn get(&self, link: Link) -> &Node<'a> {
        &self.nodes[link.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, link: Link) -> &mut Node<'a> {
        &mut self.nodes[link.index()]
    }

    /// Color of `link`, treating NIL as black.
    #[inline]
    pub(crate) fn color(&self, link: Link) -> Color {
        if link.is_nil() {
            Color::Black
        } else {
            self.get(link).color
        }
    }

    #[inline]
    pub(crate) fn is_red(&self, link: Link) -> bool {
        self.color(link) == Color::Red
    }

    #[inline]
    pub(crate) fn parent(&self, link: Link) -> Link {
        self.get(link).parent
    }

    /// Which side of its parent `link` hangs on. `link` must have a parent.
    #[inline]
    pub(crate) fn side_of(&self, link: Link) -> Side {
        let parent = self.parent(link);
        if self.get(parent).left == link {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node<'a>>()
            + self.free.capacity() * std::mem::size_of::<Link>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
        self.free.shrink_to_fit();
    }
}
