// Composite terms: tuples, lists and maps

pub mod list;
pub mod map;
pub mod tuple;

/// Most elements reserved before any of them is decoded.
pub(crate) const MAX_PREALLOC: usize = 1024;

/// Preallocation hint for `count` wire elements.
///
/// Every element takes at least one byte, so a count larger than the rest of
/// the input can only end in `UnexpectedEof`. Past `MAX_PREALLOC` the vector
/// grows as elements actually arrive, so a lying count in front of one large
/// payload cannot reserve a multiple of the input size.
pub(crate) fn capacity_hint(count: usize, remaining: usize) -> usize {
    count.min(remaining).min(MAX_PREALLOC)
}
