//! Top-level owner of all editing sessions.
//!
//! The controller maps chip profiles to their source files and keeps one
//! [`EditorSession`] per profile. Every entry point takes the same lock, so a
//! save or profile switch is always ordered after any mutation in flight.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use pts_chip::{ChipProfile, catalog};
use pts_codec::Document;
use pts_persistence::{Envelope, read_text, verify_file_hash};

use crate::config::EditorConfig;
use crate::edit::Edit;
use crate::error::{EditorError, Result};
use crate::session::{EditorSession, Position};
use crate::worker::{WorkerUpdate, spawn_build, spawn_save};

/// Summary of the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub chip: &'static str,
    pub dirty: bool,
    pub undo: usize,
    pub redo: usize,
    pub position: Position,
}

impl SessionStatus {
    fn of(session: &EditorSession) -> Self {
        Self {
            chip: session.profile().key,
            dirty: session.is_dirty(),
            undo: session.undo_available(),
            redo: session.redo_available(),
            position: session.position(),
        }
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    targets: BTreeMap<&'static str, PathBuf>,
    sessions: HashMap<&'static str, EditorSession>,
    active: Option<&'static str>,
}

impl ControllerState {
    fn active_session(&mut self) -> Result<&mut EditorSession> {
        let key = self.active.ok_or(EditorError::NoActiveSession)?;
        self.sessions
            .get_mut(key)
            .ok_or(EditorError::NoActiveSession)
    }
}

#[derive(Debug, Default)]
pub struct EditorController {
    config: EditorConfig,
    state: Mutex<ControllerState>,
}

impl EditorController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Associate a chip profile with its decoded source file.
    ///
    /// A cached session for that chip is dropped so the next switch decodes
    /// the new file.
    pub fn register_target(&self, key: &str, path: impl Into<PathBuf>) -> Result<&'static ChipProfile> {
        let profile = catalog::find(key)?;
        let path = path.into();
        let mut state = self.lock();
        if let Some(previous) = state.sessions.remove(profile.key) {
            if previous.is_dirty() {
                tracing::warn!(chip = profile.key, "Discarding unsaved session on re-register");
            }
            if state.active == Some(profile.key) {
                state.active = None;
            }
        }
        tracing::debug!(chip = profile.key, path = %path.display(), "Registered target");
        state.targets.insert(profile.key, path);
        Ok(profile)
    }

    /// Make `key` the active profile, decoding its source on first use.
    ///
    /// The outgoing session stays cached untouched, history included.
    pub fn switch_profile(&self, key: &str) -> Result<SessionStatus> {
        let profile = catalog::find(key)?;
        let mut state = self.lock();

        if !state.sessions.contains_key(profile.key) {
            let path = state
                .targets
                .get(profile.key)
                .cloned()
                .ok_or_else(|| EditorError::UnknownTarget {
                    key: key.to_string(),
                })?;
            let text = read_text(&path)?;
            let session = EditorSession::decode(profile, &text)?
                .with_source_path(path)
                .with_history_limit(self.config.history_limit)
                .with_auto_save(self.config.auto_save.clone());
            state.sessions.insert(profile.key, session);
        }

        let previous = state.active.replace(profile.key);
        tracing::info!(from = previous, to = profile.key, "Switched profile");
        state.active_session().map(|session| SessionStatus::of(session))
    }

    pub fn active_profile(&self) -> Option<&'static ChipProfile> {
        let state = self.lock();
        state
            .active
            .and_then(|key| state.sessions.get(key))
            .map(EditorSession::profile)
    }

    /// Run `f` against the active session under the controller lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut EditorSession) -> Result<R>) -> Result<R> {
        let mut state = self.lock();
        f(state.active_session()?)
    }

    pub fn status(&self) -> Result<SessionStatus> {
        self.with_session(|session| Ok(SessionStatus::of(session)))
    }

    pub fn apply_change(&self, edit: &Edit) -> Result<Document> {
        self.with_session(|session| session.apply_change(edit).cloned())
    }

    pub fn undo(&self) -> Result<Option<Document>> {
        self.with_session(|session| Ok(session.undo().cloned()))
    }

    pub fn redo(&self) -> Result<Option<Document>> {
        self.with_session(|session| Ok(session.redo().cloned()))
    }

    pub fn encode(&self) -> Result<String> {
        self.with_session(|session| session.encode())
    }

    pub fn save(&self) -> Result<PathBuf> {
        self.with_session(EditorSession::save)
    }

    /// Hand the active session's text to a save worker.
    ///
    /// The outcome arrives on `sender` and must be passed back through
    /// [`EditorController::handle_update`].
    pub fn save_in_background(&self, sender: Sender<WorkerUpdate>) -> Result<JoinHandle<()>> {
        let (chip, path, text) = self.with_session(|session| {
            let (path, text) = session.prepare_save()?;
            Ok((session.profile().key, path, text))
        })?;
        Ok(spawn_save(chip, path, text, sender))
    }

    /// Compile the active session's source file into `output`.
    pub fn build_in_background(&self, output: PathBuf, sender: Sender<WorkerUpdate>) -> Result<JoinHandle<()>> {
        let input = self.with_session(|session| {
            session
                .source_path()
                .map(PathBuf::from)
                .ok_or(EditorError::NoSourcePath {
                    chip: session.profile().key,
                })
        })?;
        Ok(spawn_build(self.config.build.clone(), input, output, sender))
    }

    /// Apply a worker outcome to the session it belongs to.
    pub fn handle_update(&self, update: &WorkerUpdate) {
        let mut state = self.lock();
        match update {
            WorkerUpdate::Saved { chip, signature, .. } => match state.sessions.get_mut(chip) {
                Some(session) => session.mark_saved(signature.clone()),
                None => tracing::warn!(chip, "Save finished for a closed session"),
            },
            WorkerUpdate::SaveFailed { chip, path, message } => {
                tracing::error!(chip, path = %path.display(), error = %message, "Background save failed");
                if let Some(session) = state.sessions.get_mut(chip) {
                    session.save_failed();
                }
            }
            WorkerUpdate::BuildFinished { output, elapsed } => {
                tracing::info!(output = %output.display(), elapsed_ms = elapsed.as_millis(), "Build complete");
            }
            WorkerUpdate::BuildFailed { message } => {
                tracing::error!(error = %message, "Build failed");
            }
        }
    }

    pub fn export_envelope(&self, description: &str) -> Result<Envelope> {
        self.with_session(|session| Ok(session.export_envelope(description)))
    }

    pub fn import_envelope(&self, envelope: &Envelope) -> Result<Document> {
        self.with_session(|session| session.import_envelope(envelope).cloned())
    }

    /// Re-read the active session's source file, dropping its history.
    pub fn reset(&self) -> Result<Document> {
        self.with_session(|session| {
            let path = session
                .source_path()
                .map(PathBuf::from)
                .ok_or(EditorError::NoSourcePath {
                    chip: session.profile().key,
                })?;
            let text = read_text(&path)?;
            session.reset(&text).cloned()
        })
    }

    /// Whether the active session's file changed on disk since it was read
    /// or last saved.
    pub fn source_changed(&self) -> Result<bool> {
        self.with_session(|session| {
            let Some(path) = session.source_path() else {
                return Ok(false);
            };
            Ok(!verify_file_hash(path, session.loaded_signature())?)
        })
    }

    /// Chips with unsaved changes.
    pub fn dirty_profiles(&self) -> Vec<&'static str> {
        let state = self.lock();
        let mut dirty: Vec<_> = state
            .sessions
            .iter()
            .filter(|(_, session)| session.is_dirty())
            .map(|(key, _)| *key)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::tempdir;

    const KONA: &str = include_str!("../../pts-codec/tests/fixtures/kona.dts");

    #[test]
    fn test_no_active_session() {
        let controller = EditorController::default();
        assert!(matches!(controller.status(), Err(EditorError::NoActiveSession)));
        assert!(controller.active_profile().is_none());
    }

    #[test]
    fn test_switch_requires_target() {
        let controller = EditorController::default();
        assert!(matches!(
            controller.switch_profile("kona"),
            Err(EditorError::UnknownTarget { .. })
        ));
        assert!(matches!(
            controller.switch_profile("nope"),
            Err(EditorError::Chip(_))
        ));
    }

    #[test]
    fn test_background_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kona.dts");
        std::fs::write(&path, KONA).unwrap();

        let controller = EditorController::default();
        controller.register_target("kona", &path).unwrap();
        controller.switch_profile("kona").unwrap();
        controller.apply_change(&Edit::AddLevelTop { bin: 1 }).unwrap();
        assert_eq!(controller.dirty_profiles(), ["kona"]);

        let (sender, receiver) = mpsc::channel();
        controller.save_in_background(sender).unwrap().join().unwrap();
        controller.handle_update(&receiver.recv().unwrap());

        assert!(!controller.status().unwrap().dirty);
        assert!(!controller.source_changed().unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            controller.encode().unwrap()
        );
    }

    #[test]
    fn test_source_changed_and_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kona.dts");
        std::fs::write(&path, KONA).unwrap();

        let controller = EditorController::default();
        controller.register_target("kona", &path).unwrap();
        controller.switch_profile("kona").unwrap();
        controller.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();
        assert!(!controller.source_changed().unwrap());

        std::fs::write(&path, format!("{KONA}\n")).unwrap();
        assert!(controller.source_changed().unwrap());

        let document = controller.reset().unwrap();
        assert_eq!(document.bins[0].levels.len(), 3);
        let status = controller.status().unwrap();
        assert_eq!((status.undo, status.dirty), (0, false));
        assert!(!controller.source_changed().unwrap());
    }
}
