//! Contracts with the external host: bake engine, attribute store, progress.
//!
//! The core never renders, never touches host scene state and never draws a
//! progress bar itself; it drives these traits and verifies the results.

use std::path::PathBuf;

use crate::error::BakeResult;

/// One unit of bake work. Immutable once constructed, produced fresh per
/// frame by the session driving the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BakeJob {
    pub frame: i32,
    /// Procedural/animated texture node to rasterize.
    pub source_node: String,
    /// Mesh the texture is baked against.
    pub target_node: String,
    /// Square texel resolution of the artifact.
    pub resolution: u32,
    /// Directory the artifact must be written into; the engine picks the
    /// file name and format.
    pub output_path: PathBuf,
}

/// Renders one frame of the source into a raster artifact.
///
/// Opaque to the core: an engine is free to run a format-conversion pre-step
/// for source nodes it cannot bake directly (the host-side equivalent of
/// rasterizing a solid texture to a temp file first). Whatever it does, the
/// caller verifies the returned artifact actually exists before recording the
/// frame as baked.
pub trait BakeEngine {
    /// Resolve the on-disk root the `${DESC}` script placeholder stands for.
    fn description_root(&self, collection: &str, description: &str) -> PathBuf;

    /// Bake one frame, returning the artifact path.
    fn bake(&mut self, job: &BakeJob) -> BakeResult<PathBuf>;
}

/// Host store holding attribute expression scripts.
pub trait AttributeStore {
    /// Current script of the attribute; empty string if unset.
    fn read(&self, attribute_id: &str) -> String;

    /// Commit a compiled script.
    fn write(&mut self, attribute_id: &str, script: &str) -> BakeResult<()>;

    /// Host refresh hook, called once after a successful commit.
    fn refresh(&mut self) {}
}

/// Host progress reporting for batch conversions.
pub trait ProgressSink {
    fn set_range(&mut self, max: u64);
    fn set_position(&mut self, value: u64);
    fn step(&mut self, delta: u64);

    /// Polled once per frame; true aborts the remaining range.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that discards everything (tests, headless embedding).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn set_range(&mut self, _max: u64) {}
    fn set_position(&mut self, _value: u64) {}
    fn step(&mut self, _delta: u64) {}
}
