//! Edit engine and session management for GPU power level tables.
//!
//! - [`Edit`]: the mutations a user can make to a decoded table
//! - [`EditorSession`]: one chip's working state, undo/redo history, change
//!   log and save state
//! - [`EditorController`]: owns every session, switches between chips and
//!   dispatches saves and builds to background workers
//!
//! # Example
//!
//! ```no_run
//! use pts_editor::{Edit, EditorConfig, EditorController};
//!
//! # fn main() -> pts_editor::Result<()> {
//! let controller = EditorController::new(EditorConfig::load());
//! controller.register_target("kona", "/sdcard/kona.dts")?;
//! controller.switch_profile("kona")?;
//!
//! controller.apply_change(&Edit::AddLevelBottom { bin: 0 })?;
//! controller.undo()?;
//! controller.save()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod edit;
pub mod error;
pub mod history;
pub mod session;
pub mod worker;

pub use config::{BuildConfig, DEFAULT_HISTORY_LIMIT, EditorConfig};
pub use controller::{EditorController, SessionStatus};
pub use edit::Edit;
pub use error::{EditorError, Result, WorkerError};
pub use history::History;
pub use session::{ChangeEntry, EditorSession, Position};
pub use worker::{WorkerUpdate, run_build, run_with_timeout, spawn_build, spawn_save};
