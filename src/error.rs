//! Error taxonomy for bake sessions.
//!
//! Validation and precondition errors abort before any side effect. Bake
//! failures are fatal in batch mode (the generated script must never reference
//! a missing artifact) but merely logged in preview mode, where the frame
//! stays uncached and is retried on a later tick.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while baking or committing a script.
#[derive(Debug, Error)]
pub enum BakeError {
    /// A required setting is missing or empty.
    #[error("missing required setting '{0}'")]
    MissingSetting(&'static str),

    /// The target attribute's current script does not reference a map.
    #[error("no map is currently assigned to the selected attribute")]
    NoMapAssigned,

    /// The engine could not produce an artifact for a frame.
    #[error("bake failed at frame {frame}: {reason}")]
    BakeFailed { frame: i32, reason: String },

    /// The engine reported success but the artifact is not on disk.
    #[error("bake reported success at frame {frame} but artifact {} does not exist", .path.display())]
    MissingArtifact { frame: i32, path: PathBuf },

    /// Committing the compiled script to the attribute store failed.
    /// The frame cache is preserved so a retry does not re-bake.
    #[error("failed to commit expression script: {0}")]
    WriteFailed(String),

    /// The compiler was asked to finish with zero baked frames.
    #[error("no frames were baked, refusing to emit an empty script")]
    EmptyScript,

    /// Script fragments must be appended in strictly ascending frame order.
    #[error("expression fragments out of order: frame {got} after {last}")]
    OutOfOrder { got: i32, last: i32 },

    /// A script fragment was requested for a frame outside the bake range.
    #[error("frame {frame} is outside the bake range [{start}, {end})")]
    FrameOutOfRange { frame: i32, start: i32, end: i32 },

    /// A batch conversion was requested while a preview session is active
    /// (or vice versa). The frame cache belongs to exactly one session.
    #[error("another bake session is already active")]
    SessionBusy,

    /// `start()` was called on a scheduler that is already running.
    #[error("preview scheduler is already running")]
    AlreadyRunning,

    /// The progress sink reported cancellation mid-batch.
    #[error("conversion cancelled")]
    Cancelled,
}

pub type BakeResult<T> = Result<T, BakeError>;
