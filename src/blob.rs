//! Key and value storage with an explicit ownership tag.
//!
//! A [`Blob`] is either a container-owned copy or a reference into memory the
//! caller keeps alive for the lifetime `'a`. Owned copies carry one trailing
//! `0` byte past the logical contents, so text stored through the tree can be
//! handed to C-string consumers via [`Blob::as_bytes_with_nul`].

use smallvec::SmallVec;

use crate::error::{Result, TreeError};

/// Inline capacity for owned copies; short keys avoid a heap allocation.
const INLINE_BYTES: usize = 23;

type OwnedBytes = SmallVec<[u8; INLINE_BYTES + 1]>;

/// Container-owned copy: logical bytes followed by a single `0` terminator.
///
/// Only built by [`Blob::copied`], [`Blob::try_copied`] and [`Blob::with_len`],
/// so the terminator is always present. Its payload is private:
///
/// ```compile_fail
/// let raw = smallvec::SmallVec::from_slice(b"abc");
/// let _ = assoc_tree::Blob::Owned(assoc_tree::OwnedBuf(raw));
/// ```
#[derive(Clone)]
pub struct OwnedBuf(OwnedBytes);

impl OwnedBuf {
    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let requested = bytes.len() + 1;
        let mut buf = OwnedBytes::new();
        buf.try_reserve_exact(requested)
            .map_err(|_| TreeError::AllocationFailure { requested })?;
        buf.extend_from_slice(bytes);
        buf.push(0);
        Ok(OwnedBuf(buf))
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = OwnedBytes::with_capacity(bytes.len() + 1);
        buf.extend_from_slice(bytes);
        buf.push(0);
        OwnedBuf(buf)
    }

    #[inline]
    fn contents(&self) -> &[u8] {
        match self.0.split_last() {
            Some((_, contents)) => contents,
            None => &[],
        }
    }

    #[inline]
    fn with_nul(&self) -> &[u8] {
        &self.0
    }
}

/// Bytes stored in a node, either copied into the container or borrowed.
#[derive(Clone)]
pub enum Blob<'a> {
    /// Container-owned copy.
    Owned(OwnedBuf),
    /// Caller-owned bytes; never copied, never freed by the container.
    Borrowed(&'a [u8]),
}

impl<'a> Blob<'a> {
    /// Copy `bytes` into a container-owned buffer.
    ///
    /// Panics only if the allocator aborts; use [`Blob::try_copied`] to get an
    /// explicit [`TreeError::AllocationFailure`] instead.
    pub fn copied(bytes: &[u8]) -> Self {
        Blob::Owned(OwnedBuf::from_bytes(bytes))
    }

    /// Fallible form of [`Blob::copied`].
    pub fn try_copied(bytes: &[u8]) -> Result<Self> {
        OwnedBuf::try_from_bytes(bytes).map(Blob::Owned)
    }

    /// Reference `bytes` without copying.
    #[inline]
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        Blob::Borrowed(bytes)
    }

    /// Build a blob from the length convention: `len == 0` borrows `bytes`
    /// as-is, `len > 0` copies the first `len` bytes.
    pub fn with_len(bytes: &'a [u8], len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Blob::Borrowed(bytes));
        }
        let prefix = bytes
            .get(..len)
            .ok_or(TreeError::InvalidArgument("length exceeds supplied bytes"))?;
        Self::try_copied(prefix)
    }

    /// Logical contents, without the terminator of owned copies.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Blob::Owned(buf) => buf.contents(),
            Blob::Borrowed(bytes) => bytes,
        }
    }

    /// Owned copies including their trailing `0`; borrowed bytes unchanged.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        match self {
            Blob::Owned(buf) => buf.with_nul(),
            Blob::Borrowed(bytes) => bytes,
        }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Blob::Owned(_))
    }

    /// Logical length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Heap bytes held by this blob (zero for borrowed and inline copies).
    pub(crate) fn heap_bytes(&self) -> usize {
        match self {
            Blob::Owned(OwnedBuf(buf)) if buf.spilled() => buf.capacity(),
            _ => 0,
        }
    }
}

impl std::fmt::Debug for Blob<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = if self.is_owned() { "Owned" } else { "Borrowed" };
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => write!(f, "{tag}({s:?})"),
            Err(_) => write!(f, "{tag}({:?})", self.as_bytes()),
        }
    }
}

impl PartialEq for Blob<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Blob<'_> {}
