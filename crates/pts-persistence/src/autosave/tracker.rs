//! Dirty state tracking.

use std::time::Instant;

use super::AutoSaveConfig;

/// Tracks unsaved changes of one editing session.
///
/// Drives auto-save and the "unsaved changes" indicator.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty: bool,

    /// When the most recent change was made.
    last_change: Option<Instant>,

    /// When the first unsaved change was made. Reset when saved.
    first_unsaved_change: Option<Instant>,

    saving: bool,
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Record a change.
    pub fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.dirty = true;
        self.last_change = Some(now);

        if self.first_unsaved_change.is_none() {
            self.first_unsaved_change = Some(now);
        }
    }

    /// The content matches what is on disk again, e.g. after an undo.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.first_unsaved_change = None;
    }

    /// Set dirtiness from a signature comparison.
    pub fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            self.mark_dirty();
        } else {
            self.mark_clean();
        }
    }

    pub fn start_save(&mut self) {
        self.saving = true;
    }

    pub fn save_complete(&mut self) {
        self.dirty = false;
        self.saving = false;
        self.first_unsaved_change = None;
    }

    /// A failed save leaves the changes marked unsaved.
    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    pub fn ms_since_last_change(&self) -> Option<u64> {
        self.last_change.map(|t| t.elapsed().as_millis() as u64)
    }

    pub fn ms_since_first_unsaved(&self) -> Option<u64> {
        self.first_unsaved_change
            .map(|t| t.elapsed().as_millis() as u64)
    }

    /// Check if auto-save should trigger based on the config.
    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        if !self.dirty || self.saving || !config.enabled {
            return false;
        }

        match (self.ms_since_last_change(), self.ms_since_first_unsaved()) {
            (Some(since_last), Some(since_first)) => config.should_save(since_last, since_first),
            _ => false,
        }
    }
}
