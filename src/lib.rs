//! PTEXBAKE - animated map baking library
//!
//! Converts a time-varying procedural texture into per-frame raster
//! artifacts and synthesizes the piecewise `if/else if/else` expression
//! script selecting the correct artifact per evaluation frame. Two modes:
//! a synchronous batch conversion over a frame range, and a cooperative
//! preview loop that bakes the frames the user actually visits, cached so a
//! revisited frame never re-bakes.

// Core baking logic (cache, selector, compiler, scheduler, converter)
pub mod bake;
pub mod cache;
pub mod convert;
pub mod scheduler;
pub mod script;
pub mod selector;

// Collaborator contracts and bundled implementations
pub mod engine;
pub mod events;
pub mod progress;
pub mod raster;
pub mod store;

// App modules
pub mod cli;
pub mod error;
pub mod settings;

// Re-export commonly used types
pub use bake::Baker;
pub use cache::{FrameCache, FrameRange};
pub use engine::{AttributeStore, BakeEngine, BakeJob, NullProgress, ProgressSink};
pub use error::{BakeError, BakeResult};
pub use events::{ChangeEventSender, SourceChanged, change_channel};
pub use scheduler::{PreviewScheduler, SchedulerState, Tick};
pub use selector::select_next;
pub use settings::{BakeConfig, SettingValue, Settings};
