//! Backup memory and save-state persistence
//!
//! Both kinds of save data are opaque blobs owned by the engine; this
//! module decides when they move and where they live. File names key off
//! the content identity so re-ripped discs with identical layout share
//! their saves.

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

use pce_core::error::StateError;

use crate::session::Session;

impl Session {
    /// Load battery-backed save RAM. Runs once after a successful
    /// content bind.
    pub fn load_backup_memory(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        info!("loading backup memory");
        handle.engine.load_backup_memory();
    }

    /// Persist battery-backed save RAM. A no-op when no content is
    /// loaded; called on dirty notification and unconditionally at
    /// content close.
    pub fn flush_backup_memory(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        info!("saving backup memory");
        handle.engine.flush_backup_memory();
    }

    /// Host noticed backup memory writes this frame.
    pub fn on_backup_memory_dirty(&mut self) {
        if self.config.general.flush_backup_on_dirty {
            self.flush_backup_memory();
        }
    }

    /// Serialize the engine's complete state to `path`.
    ///
    /// Failure is reported, not retried, and leaves the session running.
    pub fn save_state(&mut self, path: &Path, slot: u32) -> Result<(), StateError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StateError::StateWriteFailed {
                path: path.to_path_buf(),
            });
        };
        handle.engine.save_state(path, slot).map_err(|e| {
            warn!("state write to {} failed: {e}", path.display());
            StateError::StateWriteFailed {
                path: path.to_path_buf(),
            }
        })
    }

    /// Restore the engine's complete state from `path`.
    pub fn load_state(&mut self, path: &Path, slot: u32) -> Result<(), StateError> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(StateError::StateReadFailed {
                path: path.to_path_buf(),
            });
        };
        handle.engine.load_state(path, slot).map_err(|e| {
            warn!("state read from {} failed: {e}", path.display());
            StateError::StateReadFailed {
                path: path.to_path_buf(),
            }
        })
    }

    /// Save-state file name for `slot`: content name, identity, and the
    /// slot tag.
    pub fn state_filename(&self, slot: u32) -> Option<String> {
        self.handle
            .as_ref()
            .map(|h| format!("{}.{}.q{}", h.content_name, h.identity, slot))
    }

    /// Backup memory file next to the content.
    pub fn backup_memory_path(&self) -> Option<PathBuf> {
        self.handle
            .as_ref()
            .map(|h| h.content_directory.join(format!("{}.sav", h.content_name)))
    }

    /// When backup memory last reached disk, if it ever has.
    pub fn backup_memory_last_write_time(&self) -> Option<SystemTime> {
        let path = self.backup_memory_path()?;
        std::fs::metadata(path).ok()?.modified().ok()
    }
}
