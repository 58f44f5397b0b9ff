//! Key ordering.
//!
//! The tree never interprets key bytes itself; every descent asks a
//! [`Comparator`]. Any `Fn(&[u8], &[u8]) -> Ordering` closure is a comparator,
//! and a few common orders are provided here.

use std::cmp::Ordering;

/// A total order over key bytes.
///
/// Implementations must be consistent (the same pair always compares the
/// same way) and must treat equal keys as duplicates. Descending and custom
/// orders are fine; sorted snapshots follow them verbatim.
pub trait Comparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

impl<F> Comparator for F
where
    F: Fn(&[u8], &[u8]) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        self(a, b)
    }
}

/// Byte-wise lexicographic order; matches `strcmp` for text without interior NULs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lexicographic;

impl Comparator for Lexicographic {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts another comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reverse<C>(pub C);

impl<C: Comparator> Comparator for Reverse<C> {
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Adapts a C-style comparison returning negative, zero or positive.
#[derive(Clone, Copy)]
pub struct CStyle<F>(pub F);

impl<F> Comparator for CStyle<F>
where
    F: Fn(&[u8], &[u8]) -> i32,
{
    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        (self.0)(a, b).cmp(&0)
    }
}

impl<F> std::fmt::Debug for CStyle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CStyle(..)")
    }
}
