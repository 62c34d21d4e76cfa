//! Per-chip editing session.
//!
//! A session owns the working [`Document`] for one chip profile together with
//! everything needed to undo, audit and save it. Sessions never share state:
//! switching chips swaps whole sessions.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use pts_chip::ChipProfile;
use pts_codec::{Document, decode_table_text, decode_voltage_text};
use pts_persistence::{AutoSaveConfig, DirtyTracker, Envelope, content_signature, write_text};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::edit::Edit;
use crate::error::{EditorError, Result};
use crate::history::History;

/// Last viewed place in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub bin: usize,
    pub level: Option<usize>,
}

/// One line of the change log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub at: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    profile: &'static ChipProfile,
    source_path: Option<PathBuf>,
    /// Signature of the source file as last read or written.
    loaded_signature: String,
    state: Document,
    history: History<Document>,
    change_log: Vec<ChangeEntry>,
    saved_signature: String,
    tracker: DirtyTracker,
    auto_save: AutoSaveConfig,
    position: Position,
}

impl EditorSession {
    /// Decode `text` into a clean session with empty history.
    pub fn decode(profile: &'static ChipProfile, text: &str) -> Result<Self> {
        let state = Document::decode(text, profile)?;
        let mut session = Self {
            profile,
            source_path: None,
            loaded_signature: content_signature(text),
            state,
            history: History::new(DEFAULT_HISTORY_LIMIT),
            change_log: Vec::new(),
            saved_signature: String::new(),
            tracker: DirtyTracker::new(),
            auto_save: AutoSaveConfig::default(),
            position: Position::default(),
        };
        session.saved_signature = session.signature();
        tracing::info!(
            chip = profile.key,
            bins = session.state.bins.len(),
            levels = session.state.level_count(),
            "Opened session"
        );
        Ok(session)
    }

    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = History::new(limit);
        self
    }

    #[must_use]
    pub fn with_auto_save(mut self, config: AutoSaveConfig) -> Self {
        self.auto_save = config;
        self
    }

    pub fn profile(&self) -> &'static ChipProfile {
        self.profile
    }

    pub fn state(&self) -> &Document {
        &self.state
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn loaded_signature(&self) -> &str {
        &self.loaded_signature
    }

    pub fn change_log(&self) -> &[ChangeEntry] {
        &self.change_log
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }

    pub fn undo_available(&self) -> usize {
        self.history.undo_available()
    }

    pub fn redo_available(&self) -> usize {
        self.history.redo_available()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.clamp_position();
    }

    /// Apply an [`Edit`] as one undoable change.
    pub fn apply_change(&mut self, edit: &Edit) -> Result<&Document> {
        let profile = self.profile;
        self.apply_with(&edit.to_string(), |document| edit.apply(document, profile))
    }

    /// Run `mutation` on a copy of the state and, if it succeeds, make the
    /// copy current with the previous state as an undo checkpoint.
    ///
    /// A failed mutation leaves the session untouched.
    pub fn apply_with<F>(&mut self, description: &str, mutation: F) -> Result<&Document>
    where
        F: FnOnce(&mut Document) -> Result<()>,
    {
        let mut next = self.state.clone();
        mutation(&mut next)?;

        let previous = std::mem::replace(&mut self.state, next);
        self.history.push_checkpoint(previous);
        self.change_log.push(ChangeEntry {
            at: Utc::now(),
            description: description.to_string(),
        });
        self.tracker.mark_dirty();
        self.clamp_position();
        tracing::info!(chip = self.profile.key, change = description, "Applied change");

        if let Err(error) = self.auto_save_if_due() {
            tracing::warn!(chip = self.profile.key, %error, "Auto-save failed");
        }
        Ok(&self.state)
    }

    /// Restore the state before the last change. `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<&Document> {
        let previous = self.history.undo(self.state.clone())?;
        self.state = previous;
        self.after_history_step("Undo");
        Some(&self.state)
    }

    /// Re-apply the last undone change.
    pub fn redo(&mut self) -> Option<&Document> {
        let next = self.history.redo(self.state.clone())?;
        self.state = next;
        self.after_history_step("Redo");
        Some(&self.state)
    }

    /// Full source text of the current state.
    pub fn encode(&self) -> Result<String> {
        Ok(self.state.encode(self.profile)?)
    }

    /// Signature of the current content.
    ///
    /// Hashes the regenerated source; if regeneration fails, falls back to a
    /// hash of the bin tree so dirty tracking keeps working.
    pub fn signature(&self) -> String {
        match self.state.encode(self.profile) {
            Ok(text) => content_signature(&text),
            Err(error) => {
                tracing::warn!(chip = self.profile.key, %error, "Falling back to tree signature");
                let mut hasher = DefaultHasher::new();
                self.state.bins.hash(&mut hasher);
                self.state.voltage.hash(&mut hasher);
                format!("tree:{:016x}", hasher.finish())
            }
        }
    }

    /// Save to the source file.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self
            .source_path
            .clone()
            .ok_or(EditorError::NoSourcePath {
                chip: self.profile.key,
            })?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`. On failure the session stays dirty.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let text = self.encode()?;
        self.tracker.start_save();
        match write_text(path, &text) {
            Ok(()) => {
                self.mark_saved(content_signature(&text));
                Ok(())
            }
            Err(error) => {
                self.save_failed();
                Err(error.into())
            }
        }
    }

    /// Text and signature for a save done elsewhere, e.g. on a worker.
    pub fn prepare_save(&mut self) -> Result<(PathBuf, String)> {
        let path = self
            .source_path
            .clone()
            .ok_or(EditorError::NoSourcePath {
                chip: self.profile.key,
            })?;
        let text = self.encode()?;
        self.tracker.start_save();
        Ok((path, text))
    }

    /// Record a completed save of content with `signature`.
    ///
    /// If the state changed while the save was running it stays dirty.
    pub fn mark_saved(&mut self, signature: String) {
        self.loaded_signature.clone_from(&signature);
        self.saved_signature = signature;
        self.tracker.save_complete();
        if self.signature() != self.saved_signature {
            self.tracker.mark_dirty();
        }
        tracing::info!(chip = self.profile.key, dirty = self.is_dirty(), "Session saved");
    }

    pub fn save_failed(&mut self) {
        self.tracker.save_failed();
        tracing::warn!(chip = self.profile.key, "Save failed, changes kept");
    }

    /// Save now if auto-save is on and due. Returns whether it saved.
    pub fn auto_save_if_due(&mut self) -> Result<bool> {
        if self.source_path.is_none() || !self.tracker.should_auto_save(&self.auto_save) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Replace the state with a fresh decode of `text`, dropping history.
    pub fn reset(&mut self, text: &str) -> Result<&Document> {
        self.state = Document::decode(text, self.profile)?;
        self.loaded_signature = content_signature(text);
        self.history.clear();
        self.saved_signature = self.signature();
        self.tracker.mark_clean();
        self.change_log.push(ChangeEntry {
            at: Utc::now(),
            description: "Reset to source".to_string(),
        });
        self.clamp_position();
        tracing::info!(chip = self.profile.key, "Session reset");
        Ok(&self.state)
    }

    /// Package the current tables.
    pub fn export_envelope(&self, description: &str) -> Envelope {
        Envelope {
            chip: self.profile.key.to_string(),
            description: description.to_string(),
            table: self.state.table_text(self.profile),
            voltage_table: self.state.voltage_text(),
        }
    }

    /// Replace the tables with an envelope's as one undoable change.
    ///
    /// Everything is validated before the session is touched: the envelope
    /// chip must be known and equivalent to this session's chip, and both
    /// tables must decode.
    pub fn import_envelope(&mut self, envelope: &Envelope) -> Result<&Document> {
        let origin = pts_chip::find(&envelope.chip)?;
        if !self.profile.is_equivalent(origin.key) {
            return Err(EditorError::ProfileMismatch {
                active: self.profile.key,
                found: envelope.chip.clone(),
            });
        }

        let bins = decode_table_text(&envelope.table, origin)?;
        let voltage = envelope
            .voltage_table
            .as_deref()
            .map(decode_voltage_text)
            .transpose()?;

        let edit = Edit::ReplaceTables { bins, voltage };
        let description = format!("Import '{}' from {}", envelope.description, origin.key);
        let profile = self.profile;
        self.apply_with(&description, |document| edit.apply(document, profile))
    }

    fn after_history_step(&mut self, action: &str) {
        let dirty = self.signature() != self.saved_signature;
        self.tracker.set_dirty(dirty);
        self.clamp_position();
        tracing::info!(
            chip = self.profile.key,
            dirty,
            undo = self.history.undo_available(),
            redo = self.history.redo_available(),
            "{action}"
        );
    }

    fn clamp_position(&mut self) {
        let bins = &self.state.bins;
        if self.position.bin >= bins.len() {
            self.position = Position::default();
        }
        let levels = bins.get(self.position.bin).map_or(0, |bin| bin.levels.len());
        self.position.level = match self.position.level {
            Some(_) if levels == 0 => None,
            Some(level) => Some(level.min(levels - 1)),
            None => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pts_chip::catalog;
    use pts_codec::keys;
    use tempfile::tempdir;

    const KONA: &str = include_str!("../../pts-codec/tests/fixtures/kona.dts");

    fn kona() -> EditorSession {
        EditorSession::decode(catalog::find("kona").unwrap(), KONA).unwrap()
    }

    #[test]
    fn test_add_level_bottom_then_undo() {
        let mut session = kona();
        let original = session.state().clone();

        let state = session.apply_change(&Edit::AddLevelBottom { bin: 0 }).unwrap();
        assert_eq!(state.bins[0].levels.len(), 4);
        assert_eq!(state.bins[0].header_value(keys::INITIAL_LEVEL), Some(3));
        assert_eq!(session.undo_available(), 1);
        assert!(session.is_dirty());

        let state = session.undo().unwrap();
        assert_eq!(state.bins[0].levels.len(), 3);
        assert_eq!(state.bins[0].header_value(keys::INITIAL_LEVEL), Some(2));
        assert_eq!(*state, original);
        assert!(!session.is_dirty());
        assert_eq!(session.redo_available(), 1);
    }

    #[test]
    fn test_refused_edit_leaves_session_untouched() {
        let mut session = kona();
        let before = session.state().clone();

        let result = session.apply_change(&Edit::RemoveLevel { bin: 7, level: 0 });

        assert!(matches!(result, Err(EditorError::BinOutOfRange { bin: 7, .. })));
        assert_eq!(*session.state(), before);
        assert_eq!(session.undo_available(), 0);
        assert!(session.change_log().is_empty());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_empty_stacks_are_no_ops() {
        let mut session = kona();
        assert!(session.undo().is_none());
        assert!(session.redo().is_none());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_change_log_records_descriptions() {
        let mut session = kona();
        session.apply_change(&Edit::AddLevelTop { bin: 1 }).unwrap();
        session
            .apply_change(&Edit::set_frequency(1, 0, 600_000_000))
            .unwrap();

        let descriptions: Vec<_> = session
            .change_log()
            .iter()
            .map(|entry| entry.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            [
                "Add level at top of bin 1",
                "Set qcom,gpu-freq = 600000000 on level 0 of bin 1"
            ]
        );
    }

    #[test]
    fn test_save_clears_dirty_and_writes_encoded_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kona.dts");
        let mut session = kona().with_source_path(&path);

        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();
        session.save().unwrap();

        assert!(!session.is_dirty());
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, session.encode().unwrap());

        session.undo();
        assert!(session.is_dirty());
    }

    #[test]
    fn test_failed_save_keeps_dirty() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let mut session = kona().with_source_path(blocker.join("kona.dts"));

        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();
        assert!(session.save().is_err());
        assert!(session.is_dirty());
        assert!(!session.tracker().is_saving());
    }

    #[test]
    fn test_auto_save_on_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kona.dts");
        let mut session = kona()
            .with_source_path(&path)
            .with_auto_save(AutoSaveConfig::immediate());

        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();

        assert!(!session.is_dirty());
        assert!(path.exists());
    }

    #[test]
    fn test_save_without_path() {
        let mut session = kona();
        assert!(matches!(
            session.save(),
            Err(EditorError::NoSourcePath { chip: "kona" })
        ));
    }

    #[test]
    fn test_mark_saved_after_concurrent_edit_stays_dirty() {
        let mut session = kona();
        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();
        let saved = session.signature();
        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();

        session.mark_saved(saved);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_reset_drops_history() {
        let mut session = kona();
        session.apply_change(&Edit::AddLevelTop { bin: 0 }).unwrap();

        session.reset(KONA).unwrap();

        assert_eq!(session.undo_available(), 0);
        assert!(!session.is_dirty());
        assert_eq!(session.state().bins[0].levels.len(), 3);
    }

    #[test]
    fn test_position_is_clamped() {
        let mut session = kona();
        session.set_position(Position {
            bin: 1,
            level: Some(9),
        });
        assert_eq!(
            session.position(),
            Position {
                bin: 1,
                level: Some(1)
            }
        );

        session.set_position(Position {
            bin: 5,
            level: None,
        });
        assert_eq!(session.position(), Position::default());
    }

    #[test]
    fn test_tree_signature_fallback() {
        let mut session = kona();
        let mut broken = session.state().clone();
        broken.table.offset = usize::MAX;
        session.state = broken;

        assert!(session.signature().starts_with("tree:"));
    }
}
