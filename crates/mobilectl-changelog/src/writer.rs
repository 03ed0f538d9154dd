//! Changelog file access

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, instrument};

use mobilectl_core::error::ChangelogError;

use crate::backup::{write_atomically, BackupManager};

/// Reads and replaces changelog files
pub trait ChangelogWriter: Send + Sync {
    /// Replace the whole file with `content`
    fn write(&self, content: &str, file_path: &Path) -> Result<bool, ChangelogError>;

    /// Read the file, `None` when it does not exist
    fn read(&self, file_path: &Path) -> Result<Option<String>, ChangelogError>;
}

/// Writer that snapshots the existing file before replacing it
pub struct SafeFileWriter {
    backups: Box<dyn BackupManager>,
}

impl SafeFileWriter {
    /// Create a writer using the given backup manager
    pub fn new(backups: impl BackupManager + 'static) -> Self {
        Self {
            backups: Box::new(backups),
        }
    }

    /// Get the backup manager
    pub fn backups(&self) -> &dyn BackupManager {
        self.backups.as_ref()
    }
}

impl ChangelogWriter for SafeFileWriter {
    #[instrument(skip(self, content), fields(path = %file_path.display(), bytes = content.len()))]
    fn write(&self, content: &str, file_path: &Path) -> Result<bool, ChangelogError> {
        if file_path.exists() {
            if let Some(backup) = self.backups.create_backup(file_path)? {
                debug!(backup = %backup.id, "existing changelog backed up");
            }
        }

        write_atomically(file_path, content.as_bytes())
            .map_err(|e| ChangelogError::write(file_path, e))?;

        info!("changelog written");
        Ok(true)
    }

    fn read(&self, file_path: &Path) -> Result<Option<String>, ChangelogError> {
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChangelogError::write(file_path, e)),
        }
    }
}
