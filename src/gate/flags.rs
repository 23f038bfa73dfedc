//! Persisted upload-gate flags
//!
//! The device-scoped flag store behind the gate: a small JSON document in
//! the state directory holding the one-time-upload marker, the locked-step
//! marker and the last uploaded file name. Flags survive restarts but are
//! local to this machine; they are written only after the corresponding
//! server call has been confirmed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

const FLAGS_FILE: &str = "upload_flags.json";

/// Flags persisted across wizard sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredFlags {
    /// A one-time bulk upload has completed on this device.
    pub uploaded_once: bool,
    /// The send-message step has been reached at least once. Irreversible.
    pub locked_step_reached: bool,
    /// Name of the last uploaded spreadsheet. Cosmetic.
    pub last_uploaded_file_name: Option<String>,
}

/// File-backed store for `StoredFlags`.
#[derive(Debug, Clone)]
pub struct FlagStore {
    path: PathBuf,
}

impl FlagStore {
    /// Create a store rooted at `state_dir`. The directory is created on
    /// first write, not here.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(FLAGS_FILE),
        }
    }

    /// Read the current flags. A missing file reads as the default (all
    /// clear); an unreadable file is treated the same, with a warning,
    /// rather than blocking the wizard.
    pub fn load(&self) -> StoredFlags {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return StoredFlags::default(),
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read flag store: {}", e);
                return StoredFlags::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(flags) => flags,
            Err(e) => {
                warn!(path = %self.path.display(), "corrupt flag store, resetting: {}", e);
                StoredFlags::default()
            }
        }
    }

    /// Persist `flags`, creating the state directory if needed.
    pub fn save(&self, flags: &StoredFlags) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(flags)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }

    /// Remove all persisted flags.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
