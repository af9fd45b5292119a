use std::ops::Range;

/// Start offsets `0, step, 2*step, ...` of every full `batch_size` window over `len` items.
///
/// A remainder shorter than `batch_size` gets no window of its own. With
/// `cover_tail`, one extra full-size window ending at `len` is appended when
/// the last regular window stops short of the end.
pub fn window_ranges(len: usize, batch_size: usize, step: usize, cover_tail: bool) -> Vec<Range<usize>> {
    if batch_size == 0 || step == 0 || len < batch_size {
        return Vec::new();
    }

    let mut ranges: Vec<Range<usize>> = (0..=len - batch_size)
        .step_by(step)
        .map(|start| start..start + batch_size)
        .collect();

    if cover_tail && ranges.last().is_some_and(|last| last.end < len) {
        ranges.push(len - batch_size..len);
    }

    ranges
}

/// Indices of items that fall outside every window.
pub fn uncovered(len: usize, ranges: &[Range<usize>]) -> Vec<usize> {
    (0..len)
        .filter(|i| !ranges.iter().any(|r| r.contains(i)))
        .collect()
}
