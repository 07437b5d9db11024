//! Session facade tying settings, collaborators and scheduling together.
//!
//! [`Baker`] owns the engine and attribute store, validates settings per
//! operation and enforces the one-session rule: the frame cache belongs to
//! either a batch run or a preview session, never both at once.

use log::info;

use crate::cache::{FrameCache, FrameRange};
use crate::convert::{BatchConverter, BatchSession};
use crate::engine::{AttributeStore, BakeEngine, BakeJob, ProgressSink};
use crate::error::{BakeError, BakeResult};
use crate::events::{ChangeEventSender, change_channel};
use crate::scheduler::{PreviewScheduler, Tick};
use crate::settings::{BakeConfig, Settings};

struct PreviewSession {
    config: BakeConfig,
    paint_dir: std::path::PathBuf,
    scheduler: PreviewScheduler,
}

/// Conversion and preview entry point over one settings store.
pub struct Baker<E, A>
where
    E: BakeEngine,
    A: AttributeStore,
{
    settings: Settings,
    engine: E,
    attrs: A,
    preview: Option<PreviewSession>,
    /// Batch state kept only across a failed script commit.
    batch: Option<BatchSession>,
}

impl<E, A> Baker<E, A>
where
    E: BakeEngine,
    A: AttributeStore,
{
    pub fn new(settings: Settings, engine: E, attrs: A) -> Self {
        Self {
            settings,
            engine,
            attrs,
            preview: None,
            batch: None,
        }
    }

    /// Host-side settings access (the core itself only reads).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Full batch conversion over `range`.
    ///
    /// Validates settings first (no side effects on failure) and is rejected
    /// outright while a preview session is ticking. When only the final
    /// script commit fails, the baked frames are retained: a retried call
    /// verifies their artifacts and goes straight back to the commit instead
    /// of re-baking the range.
    pub fn convert<P: ProgressSink>(
        &mut self,
        range: FrameRange,
        progress: &mut P,
    ) -> BakeResult<String> {
        if self.preview.as_ref().is_some_and(|p| p.scheduler.is_busy()) {
            return Err(BakeError::SessionBusy);
        }
        let config = BakeConfig::from_settings(&self.settings)?;
        let mut session = self.batch.take().unwrap_or_default();
        let result = BatchConverter::new(&config, &mut self.engine, &mut self.attrs, progress)
            .run(range, &mut session);
        if matches!(result, Err(BakeError::WriteFailed(_))) {
            self.batch = Some(session);
        }
        result
    }

    /// Start an incremental preview session over `range`.
    ///
    /// Returns the sender half of the invalidation channel; the host emits a
    /// [`SourceChanged`](crate::events::SourceChanged) whenever the source
    /// object changes so the affected frame gets re-baked. Any previous
    /// (stopped) session and its cache are discarded.
    pub fn preview_start(&mut self, range: FrameRange) -> BakeResult<ChangeEventSender> {
        if self.preview.as_ref().is_some_and(|p| p.scheduler.is_busy()) {
            return Err(BakeError::AlreadyRunning);
        }
        let config = BakeConfig::from_settings(&self.settings)?;

        // Same precondition as batch: preview bakes feed the same attribute.
        let previous = self.attrs.read(&config.attribute_ref());
        if crate::script::assigned_map(&previous).is_none() {
            return Err(BakeError::NoMapAssigned);
        }

        let desc_root = self
            .engine
            .description_root(&config.collection, &config.description);
        let paint_dir = config.paint_dir(&desc_root);

        let (sender, receiver) = change_channel();
        let mut scheduler = PreviewScheduler::new(range, receiver);
        scheduler.start()?;

        info!("preview session opened for '{}'", config.attribute_id);
        self.preview = Some(PreviewSession {
            config,
            paint_dir,
            scheduler,
        });
        Ok(sender)
    }

    /// Drive one preview tick; `current` is the host playhead frame.
    /// Call from the host event loop whenever it has spare time.
    pub fn preview_tick(&mut self, current: i32) -> Tick {
        let Some(session) = self.preview.as_mut() else {
            return Tick::Stopped;
        };
        let PreviewSession {
            config,
            paint_dir,
            scheduler,
        } = session;
        let engine = &mut self.engine;

        scheduler.tick(current, |frame| {
            let job = BakeJob {
                frame,
                source_node: config.sequence_node.clone(),
                target_node: config.emitter_node.clone(),
                resolution: config.resolution,
                output_path: paint_dir.clone(),
            };
            let artifact = engine.bake(&job)?;
            if !artifact.is_file() {
                return Err(BakeError::MissingArtifact {
                    frame,
                    path: artifact,
                });
            }
            Ok(())
        })
    }

    /// Request the preview loop to stop; the next tick self-terminates.
    pub fn preview_stop(&mut self) {
        if let Some(session) = self.preview.as_mut() {
            session.scheduler.stop();
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.as_ref().is_some_and(|p| p.scheduler.is_busy())
    }

    /// Frame cache of the active preview session, if any.
    pub fn preview_cache(&self) -> Option<&FrameCache> {
        self.preview.as_ref().map(|p| p.scheduler.cache())
    }
}
