//! Full-range batch conversion.
//!
//! Synchronous ascending loop over the bake range: bake, verify, record,
//! append the script fragment, advance progress. Preconditions are checked
//! before the first bake so a validation failure has zero side effects, and
//! any bake failure aborts the remainder — a committed script must never
//! reference an artifact that does not exist.
//!
//! Baked frames are recorded in a [`BatchSession`] supplied by the caller.
//! When the final script commit fails the session survives, so a retried run
//! skips every frame whose artifact is still on disk and goes straight back
//! to the commit.

use log::{debug, info};
use std::collections::BTreeMap;

use crate::cache::{FrameCache, FrameRange};
use crate::engine::{AttributeStore, BakeEngine, BakeJob, ProgressSink};
use crate::error::{BakeError, BakeResult};
use crate::script::{ExpressionCompiler, assigned_map, fallback_expression};
use crate::settings::BakeConfig;

/// Batch state surviving a failed script commit: the frames already baked and
/// the artifact file name of each. A retried run re-verifies the artifacts
/// and re-bakes only what is missing.
#[derive(Debug, Default)]
pub struct BatchSession {
    cache: FrameCache,
    artifacts: BTreeMap<i32, String>,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baked_frames(&self) -> usize {
        self.cache.len()
    }
}

/// Drives one synchronous conversion over a frame range.
pub struct BatchConverter<'a, E, A, P>
where
    E: BakeEngine,
    A: AttributeStore,
    P: ProgressSink,
{
    config: &'a BakeConfig,
    engine: &'a mut E,
    attrs: &'a mut A,
    progress: &'a mut P,
}

impl<'a, E, A, P> BatchConverter<'a, E, A, P>
where
    E: BakeEngine,
    A: AttributeStore,
    P: ProgressSink,
{
    pub fn new(
        config: &'a BakeConfig,
        engine: &'a mut E,
        attrs: &'a mut A,
        progress: &'a mut P,
    ) -> Self {
        Self {
            config,
            engine,
            attrs,
            progress,
        }
    }

    /// Bake `[range.start, range.end)` ascending and commit the compiled
    /// script. Returns the committed script text.
    ///
    /// Frames already recorded in `session` whose artifact still exists are
    /// not re-baked; their stored file name feeds the compiler directly.
    pub fn run(&mut self, range: FrameRange, session: &mut BatchSession) -> BakeResult<String> {
        let config = self.config;

        // Preconditions, before any side effect.
        let attribute_ref = config.attribute_ref();
        let previous = self.attrs.read(&attribute_ref);
        let Some(seed_map) = assigned_map(&previous) else {
            return Err(BakeError::NoMapAssigned);
        };
        debug!("assigned map before conversion: {}", seed_map);

        let fallback =
            fallback_expression(config.expression_override.as_deref(), &previous);

        let desc_root = self
            .engine
            .description_root(&config.collection, &config.description);
        let paint_dir = config.paint_dir(&desc_root);

        self.progress.set_range(range.len() as u64);
        self.progress.set_position(0);

        let mut compiler = ExpressionCompiler::new(range);

        info!(
            "batch conversion of '{}' over [{}, {}) at {}^2 texels",
            config.sequence_node,
            range.start(),
            range.end(),
            config.resolution
        );

        for frame in range.frames() {
            if self.progress.is_cancelled() {
                return Err(BakeError::Cancelled);
            }

            let retained = session
                .artifacts
                .get(&frame)
                .filter(|name| {
                    session.cache.contains(frame) && paint_dir.join(name.as_str()).is_file()
                })
                .cloned();

            let file_name = match retained {
                Some(name) => {
                    debug!("frame {} already baked as '{}', skipping", frame, name);
                    name
                }
                None => {
                    let job = BakeJob {
                        frame,
                        source_node: config.sequence_node.clone(),
                        target_node: config.emitter_node.clone(),
                        resolution: config.resolution,
                        output_path: paint_dir.clone(),
                    };
                    let artifact = self.engine.bake(&job)?;

                    // The frame enters the cache only once the artifact is real.
                    if !artifact.is_file() {
                        return Err(BakeError::MissingArtifact {
                            frame,
                            path: artifact,
                        });
                    }
                    let name = artifact
                        .file_name()
                        .and_then(|n| n.to_str())
                        .ok_or_else(|| BakeError::BakeFailed {
                            frame,
                            reason: format!(
                                "artifact path has no file name: {}",
                                artifact.display()
                            ),
                        })?
                        .to_owned();
                    session.cache.mark_baked(frame);
                    session.artifacts.insert(frame, name.clone());
                    name
                }
            };
            compiler.push_frame(frame, &config.map_reference(&file_name))?;

            self.progress.step(1);
        }

        let script = compiler.finish(&fallback)?;
        self.attrs.write(&attribute_ref, &script)?;
        self.attrs.refresh();

        info!(
            "batch conversion complete: {} frame(s) baked, script committed to '{}'",
            session.baked_frames(),
            attribute_ref
        );
        Ok(script)
    }
}
