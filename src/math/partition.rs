use std::ops::Range;

/// Splits `0..len` into `parts` contiguous, disjoint ranges that together
/// cover every index exactly once.
///
/// Every chunk but the last has `len / parts` elements; the last one always
/// ends at `len`, so the remainder lands there instead of being dropped.
/// `parts == 0` is treated as a single chunk.
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.max(1);
    let width = len / parts;
    (0..parts)
        .map(|i| {
            let start = width * i;
            let end = if i + 1 == parts { len } else { width * (i + 1) };
            start..end
        })
        .collect()
}

/// Cuts `slice` into mutable sub-slices following `ranges`, which must be a
/// contiguous cover starting at zero (as produced by [`partition`]).
pub fn split_ranges_mut<'a, T>(mut slice: &'a mut [T], ranges: &[Range<usize>]) -> Vec<&'a mut [T]> {
    let mut offset = 0;
    let mut chunks = Vec::with_capacity(ranges.len());
    for range in ranges {
        debug_assert_eq!(range.start, offset, "ranges must be contiguous");
        let (head, tail) = std::mem::take(&mut slice).split_at_mut(range.end - offset);
        chunks.push(head);
        slice = tail;
        offset = range.end;
    }
    chunks
}
