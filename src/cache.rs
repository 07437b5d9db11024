//! Session frame cache: which frames of the bake range are already done.
//!
//! The cache is owned by exactly one session (a batch run or a preview
//! session) and lives only as long as that session. A frame enters the set
//! only after its artifact has been confirmed to exist on disk, so a cached
//! frame can always be referenced by the generated script.

use std::collections::BTreeSet;

/// Half-open frame range `[start, end)`.
///
/// The convention is fixed crate-wide: `end` is one past the last baked
/// frame, and that last frame (`end - 1`) owns the trailing `else` bucket of
/// the generated script. Construction clamps `end` up to `start`, so a
/// degenerate request yields an empty range rather than a backwards one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    start: i32,
    end: i32,
}

impl FrameRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    #[inline]
    pub fn start(&self) -> i32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> i32 {
        self.end
    }

    /// Last frame actually baked (`end - 1`), if the range is non-empty.
    pub fn last(&self) -> Option<i32> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.start && frame < self.end
    }

    /// Frames in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = i32> {
        self.start..self.end
    }
}

/// Set of frames baked in the current session.
///
/// Backed by a `BTreeSet` so completeness checks and debug dumps iterate in
/// a deterministic order.
#[derive(Debug, Clone, Default)]
pub struct FrameCache {
    baked: BTreeSet<i32>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert. Returns true if the frame was newly recorded.
    pub fn mark_baked(&mut self, frame: i32) -> bool {
        self.baked.insert(frame)
    }

    /// Idempotent removal; no-op if the frame was never cached.
    /// Returns true if a cached frame was actually dropped.
    pub fn invalidate(&mut self, frame: i32) -> bool {
        self.baked.remove(&frame)
    }

    pub fn contains(&self, frame: i32) -> bool {
        self.baked.contains(&frame)
    }

    /// True iff every frame of `range` is cached. Never mutates.
    pub fn is_complete(&self, range: FrameRange) -> bool {
        range.frames().all(|f| self.baked.contains(&f))
    }

    /// First frame of the supplied ordering that is not cached yet.
    /// The ordering comes from the selector, not from the cache.
    pub fn first_missing<I>(&self, ordering: I) -> Option<i32>
    where
        I: IntoIterator<Item = i32>,
    {
        ordering.into_iter().find(|f| !self.baked.contains(f))
    }

    pub fn len(&self) -> usize {
        self.baked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baked.is_empty()
    }

    /// Session reset: drop every cached frame.
    pub fn clear(&mut self) {
        self.baked.clear();
    }
}
