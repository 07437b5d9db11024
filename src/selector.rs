//! Playhead-biased frame selection for preview baking.
//!
//! Interactive preview must put visible results first: the scan starts at the
//! frame the user is looking at, runs forward to the end of the range, then
//! wraps to the beginning. Strict chronological order would make the user
//! wait for frames they are not even displaying.

use crate::cache::{FrameCache, FrameRange};

/// Scan order for `range` given the current playhead.
///
/// If `current` lies inside the range the sequence is rotated to start
/// there, with the skipped prefix appended at the end in its original
/// relative order: range `[0,10)` at playhead 5 scans
/// `5,6,7,8,9,0,1,2,3,4`. A playhead outside the range degrades to plain
/// ascending order.
pub fn scan_order(range: FrameRange, current: i32) -> impl Iterator<Item = i32> {
    let pivot = if range.contains(current) {
        current
    } else {
        range.start()
    };
    (pivot..range.end()).chain(range.start()..pivot)
}

/// Next frame that should be baked, or None once the cache covers the range.
pub fn select_next(range: FrameRange, current: i32, cache: &FrameCache) -> Option<i32> {
    cache.first_missing(scan_order(range, current))
}
