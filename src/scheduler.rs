//! Cooperative preview bake loop.
//!
//! Explicit state machine (`Idle -> Running -> (Stopping -> Idle | Idle)`)
//! driven by an external tick source: the host event loop calls
//! [`PreviewScheduler::tick`] whenever it has spare time, and the scheduler
//! does at most one bake per call before handing control back. It never loops
//! internally and never recurses, so the host stays responsive and the stack
//! stays flat no matter how long the session runs.
//!
//! Only one tick executes at a time (single logical thread), which makes the
//! cache mutations trivially linearizable. There is no bake timeout: an
//! engine call that never returns stalls the loop, and that is a known,
//! accepted limitation rather than something to retry around.

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

use crate::cache::{FrameCache, FrameRange};
use crate::error::{BakeError, BakeResult};
use crate::events::SourceChanged;
use crate::selector::select_next;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// `stop()` was requested; the next tick clears the flag and goes Idle
    /// without doing work. Not busy: a new `start()` is accepted here.
    Stopping,
}

/// Outcome of a single scheduling tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Scheduler was idle, or has just honored a stop request.
    Stopped,
    /// Every frame of the range is cached; the scheduler went idle.
    Complete,
    /// One frame was baked, verified and recorded.
    Baked(i32),
    /// The bake failed; the frame stays uncached and a later tick retries it
    /// through natural re-selection.
    Failed(i32),
}

/// Incremental bake loop over one preview session's frame cache.
#[derive(Debug)]
pub struct PreviewScheduler {
    range: FrameRange,
    cache: FrameCache,
    state: SchedulerState,
    stop_requested: bool,
    invalidations: Receiver<SourceChanged>,
}

impl PreviewScheduler {
    pub fn new(range: FrameRange, invalidations: Receiver<SourceChanged>) -> Self {
        Self {
            range,
            cache: FrameCache::new(),
            state: SchedulerState::Idle,
            stop_requested: false,
            invalidations,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// True only while `Running`; flips false the moment `stop()` is called.
    pub fn is_busy(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Begin (or resume) ticking. Fails if already running; the active tick
    /// stream is unaffected by the rejected call.
    pub fn start(&mut self) -> BakeResult<()> {
        if self.state == SchedulerState::Running {
            return Err(BakeError::AlreadyRunning);
        }
        self.stop_requested = false;
        self.state = SchedulerState::Running;
        info!(
            "preview started over [{}, {}), {} frame(s) cached",
            self.range.start(),
            self.range.end(),
            self.cache.len()
        );
        Ok(())
    }

    /// Request a stop. Safe at any time, including between a tick being
    /// scheduled and executed: the flag makes the in-flight tick
    /// self-terminate without touching the cache.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.stop_requested = true;
            self.state = SchedulerState::Stopping;
            debug!("preview stop requested");
        }
    }

    /// Session reset ("Update"): drop every cached frame so the next ticks
    /// re-bake the whole range.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Run one scheduling tick.
    ///
    /// `current` is the frame the host is displaying; the selector rotates
    /// the scan order to start there. `bake` must render the frame, verify
    /// the artifact exists and return Ok only then — the scheduler records
    /// the frame as cached on Ok.
    pub fn tick<F>(&mut self, current: i32, mut bake: F) -> Tick
    where
        F: FnMut(i32) -> BakeResult<()>,
    {
        if self.stop_requested {
            self.stop_requested = false;
            self.state = SchedulerState::Idle;
            debug!("preview stopped");
            return Tick::Stopped;
        }
        if self.state != SchedulerState::Running {
            return Tick::Stopped;
        }

        self.drain_invalidations();

        let Some(frame) = select_next(self.range, current, &self.cache) else {
            self.state = SchedulerState::Idle;
            info!("preview complete: {} frame(s) baked", self.cache.len());
            return Tick::Complete;
        };

        match bake(frame) {
            Ok(()) => {
                self.cache.mark_baked(frame);
                debug!("preview baked frame {}", frame);
                Tick::Baked(frame)
            }
            Err(e) => {
                warn!("preview bake failed at frame {}: {}", frame, e);
                Tick::Failed(frame)
            }
        }
    }

    /// Apply pending external change notifications: each stale frame is
    /// dropped from the cache so this or a later tick re-bakes it.
    fn drain_invalidations(&mut self) {
        while let Ok(event) = self.invalidations.try_recv() {
            if self.cache.invalidate(event.frame) {
                debug!("invalidated frame {} after source change", event.frame);
            }
        }
    }
}
