//! Changelog backups
//!
//! Every overwrite of a changelog is preceded by a full copy of the old file
//! in a flat backup directory. Backup file names have the form
//! `<stem>@<YYYY-MM-DD_HH-mm-ss-SSS>.<ext>`; the part before the extension
//! is the backup id, so ids sort lexically by creation time.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use mobilectl_core::config::{BACKUP_DIR, TOOL_DIR};
use mobilectl_core::error::ChangelogError;

use crate::types::BackupInfo;

/// Timestamp layout used in backup ids
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S-%3f";

/// Extension used for files that have none
const FALLBACK_EXTENSION: &str = "bak";

/// Snapshot storage for files about to be overwritten
pub trait BackupManager: Send + Sync {
    /// Copy `file_path` into the backup directory.
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    fn create_backup(&self, file_path: &Path) -> Result<Option<BackupInfo>, ChangelogError>;

    /// Backups of files sharing `file_path`'s name, newest first
    fn list_backups(&self, file_path: &Path) -> Result<Vec<BackupInfo>, ChangelogError>;

    /// Every backup in the directory, newest first
    fn list_all_backups(&self) -> Result<Vec<BackupInfo>, ChangelogError>;

    /// Overwrite `target_path` with the contents of backup `id`
    fn restore_backup(&self, id: &str, target_path: &Path) -> Result<bool, ChangelogError>;

    /// Remove backup `id`
    fn delete_backup(&self, id: &str) -> Result<bool, ChangelogError>;

    /// Keep the `keep_count` newest backups across all files, delete the rest.
    ///
    /// Returns the number of backups deleted.
    fn delete_old_backups(&self, keep_count: usize) -> Result<usize, ChangelogError>;
}

/// Backups stored as plain files in one directory
#[derive(Debug, Clone)]
pub struct FileBackupManager {
    backup_dir: PathBuf,
}

impl FileBackupManager {
    /// Create a manager storing backups in `backup_dir`
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    /// Manager using the project's `.mobilectl/changelog-backups` directory
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(TOOL_DIR).join(BACKUP_DIR))
    }

    /// Get the backup directory
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Read every well-formed backup entry in the directory
    fn scan(&self) -> Result<Vec<(BackupName, BackupInfo)>, ChangelogError> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backup_dir)
            .map_err(|e| ChangelogError::backup(&self.backup_dir, e))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ChangelogError::backup(&self.backup_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            let Some(name) = BackupName::parse(&file_name) else {
                if !file_name.starts_with('.') {
                    warn!(file = %file_name, "ignoring unrecognised file in backup directory");
                }
                continue;
            };

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let info = BackupInfo {
                id: name.id(),
                timestamp: name.timestamp,
                file_path: path,
                size,
            };
            backups.push((name, info));
        }

        backups.sort_by(|a, b| {
            b.1.timestamp
                .cmp(&a.1.timestamp)
                .then_with(|| b.1.id.cmp(&a.1.id))
        });
        Ok(backups)
    }

    fn find(&self, id: &str) -> Result<BackupInfo, ChangelogError> {
        self.scan()?
            .into_iter()
            .map(|(_, info)| info)
            .find(|info| info.id == id)
            .ok_or_else(|| ChangelogError::BackupNotFound(id.to_string()))
    }
}

impl BackupManager for FileBackupManager {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn create_backup(&self, file_path: &Path) -> Result<Option<BackupInfo>, ChangelogError> {
        if !file_path.exists() {
            debug!("nothing to back up, file does not exist");
            return Ok(None);
        }

        let contents = fs::read(file_path).map_err(|e| ChangelogError::backup(file_path, e))?;
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| ChangelogError::backup(&self.backup_dir, e))?;

        let (stem, extension) = split_file_name(file_path);
        let taken: HashSet<DateTime<Utc>> =
            self.scan()?.into_iter().map(|(_, info)| info.timestamp).collect();

        // Timestamps are unique across the directory so creation order is total
        let mut timestamp = truncate_to_millis(Utc::now());
        while taken.contains(&timestamp) {
            timestamp += Duration::milliseconds(1);
        }
        let name = BackupName::new(&stem, timestamp, &extension);

        let backup_path = self.backup_dir.join(name.file_name());
        write_atomically(&backup_path, &contents).map_err(|e| ChangelogError::backup(&backup_path, e))?;

        let info = BackupInfo {
            id: name.id(),
            timestamp,
            file_path: backup_path,
            size: contents.len() as u64,
        };
        info!(id = %info.id, size = info.size, "created backup");
        Ok(Some(info))
    }

    fn list_backups(&self, file_path: &Path) -> Result<Vec<BackupInfo>, ChangelogError> {
        let (stem, extension) = split_file_name(file_path);
        Ok(self
            .scan()?
            .into_iter()
            .filter(|(name, _)| name.stem == stem && name.extension == extension)
            .map(|(_, info)| info)
            .collect())
    }

    fn list_all_backups(&self) -> Result<Vec<BackupInfo>, ChangelogError> {
        Ok(self.scan()?.into_iter().map(|(_, info)| info).collect())
    }

    #[instrument(skip(self), fields(target = %target_path.display()))]
    fn restore_backup(&self, id: &str, target_path: &Path) -> Result<bool, ChangelogError> {
        let backup = self.find(id)?;
        let contents =
            fs::read(&backup.file_path).map_err(|e| ChangelogError::backup(&backup.file_path, e))?;

        write_atomically(target_path, &contents)
            .map_err(|e| ChangelogError::backup(target_path, e))?;

        info!(id, size = contents.len(), "restored backup");
        Ok(true)
    }

    #[instrument(skip(self))]
    fn delete_backup(&self, id: &str) -> Result<bool, ChangelogError> {
        let backup = self.find(id)?;
        fs::remove_file(&backup.file_path)
            .map_err(|e| ChangelogError::backup(&backup.file_path, e))?;
        info!(id, "deleted backup");
        Ok(true)
    }

    #[instrument(skip(self))]
    fn delete_old_backups(&self, keep_count: usize) -> Result<usize, ChangelogError> {
        let backups = self.scan()?;
        let total = backups.len();
        let mut removed = 0;

        for (_, info) in backups.into_iter().skip(keep_count) {
            fs::remove_file(&info.file_path)
                .map_err(|e| ChangelogError::backup(&info.file_path, e))?;
            debug!(id = %info.id, "deleted old backup");
            removed += 1;
        }

        info!(total, removed, kept = total - removed, "pruned backups");
        Ok(removed)
    }
}

/// Parsed backup file name
#[derive(Debug, Clone, PartialEq, Eq)]
struct BackupName {
    stem: String,
    timestamp: DateTime<Utc>,
    extension: String,
}

impl BackupName {
    fn new(stem: &str, timestamp: DateTime<Utc>, extension: &str) -> Self {
        Self {
            stem: stem.to_string(),
            timestamp,
            extension: extension.to_string(),
        }
    }

    fn id(&self) -> String {
        format!("{}@{}", self.stem, self.timestamp.format(TIMESTAMP_FORMAT))
    }

    fn file_name(&self) -> String {
        format!("{}.{}", self.id(), self.extension)
    }

    fn parse(file_name: &str) -> Option<Self> {
        let (stem, rest) = file_name.rsplit_once('@')?;
        let (stamp, extension) = rest.split_once('.')?;
        if stem.is_empty() || extension.is_empty() {
            return None;
        }
        Some(Self {
            stem: stem.to_string(),
            timestamp: parse_timestamp(stamp)?,
            extension: extension.to_string(),
        })
    }
}

/// Parse `YYYY-MM-DD_HH-mm-ss-SSS`
fn parse_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let (seconds, millis) = stamp.rsplit_once('-')?;
    if millis.len() != 3 {
        return None;
    }
    let millis: i64 = millis.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(seconds, "%Y-%m-%d_%H-%M-%S").ok()?;
    Some(naive.and_utc() + Duration::milliseconds(millis))
}

fn truncate_to_millis(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or(time)
}

fn split_file_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "changelog".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    (stem, extension)
}

/// Write through a temp file in the destination directory, then rename over
/// the destination.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileBackupManager, PathBuf) {
        let temp = TempDir::new().unwrap();
        let manager = FileBackupManager::for_project(temp.path());
        let file = temp.path().join("CHANGELOG.md");
        (temp, manager, file)
    }

    #[test]
    fn test_backup_of_missing_file_succeeds() {
        let (_temp, manager, file) = setup();
        assert!(manager.create_backup(&file).unwrap().is_none());
        assert!(manager.list_all_backups().unwrap().is_empty());
    }

    #[test]
    fn test_create_backup_copies_bytes() {
        let (_temp, manager, file) = setup();
        let bytes = "# Changelog\n\n- café ✨\r\n\u{0}tail".as_bytes();
        fs::write(&file, bytes).unwrap();

        let info = manager.create_backup(&file).unwrap().unwrap();
        assert!(info.id.starts_with("CHANGELOG@"));
        assert_eq!(info.size, bytes.len() as u64);
        assert_eq!(fs::read(&info.file_path).unwrap(), bytes);
        assert!(info.file_path.starts_with(manager.backup_dir()));
        assert_eq!(
            info.file_path.file_name().unwrap().to_string_lossy(),
            format!("{}.md", info.id)
        );
    }

    #[test]
    fn test_round_trip_restore() {
        let (_temp, manager, file) = setup();
        fs::write(&file, "original\n").unwrap();
        let info = manager.create_backup(&file).unwrap().unwrap();

        fs::write(&file, "mutated beyond recognition").unwrap();
        assert!(manager.restore_backup(&info.id, &file).unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "original\n");
    }

    #[test]
    fn test_restore_unknown_id_leaves_target() {
        let (_temp, manager, file) = setup();
        fs::write(&file, "keep me").unwrap();

        let result = manager.restore_backup("CHANGELOG@2020-01-01_00-00-00-000", &file);
        assert!(matches!(result, Err(ChangelogError::BackupNotFound(_))));
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep me");
    }

    #[test]
    fn test_rapid_backups_get_unique_ids() {
        let (_temp, manager, file) = setup();
        fs::write(&file, "v").unwrap();

        let ids: Vec<String> = (0..5)
            .map(|_| manager.create_backup(&file).unwrap().unwrap().id)
            .collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5);
        assert_eq!(manager.list_backups(&file).unwrap().len(), 5);
    }

    #[test]
    fn test_list_backups_filters_by_name() {
        let (temp, manager, file) = setup();
        let other = temp.path().join("RELEASE_NOTES.md");
        let same_stem = temp.path().join("CHANGELOG.txt");
        fs::write(&file, "a").unwrap();
        fs::write(&other, "b").unwrap();
        fs::write(&same_stem, "c").unwrap();

        manager.create_backup(&file).unwrap();
        manager.create_backup(&other).unwrap();
        manager.create_backup(&other).unwrap();
        manager.create_backup(&same_stem).unwrap();

        assert_eq!(manager.list_backups(&file).unwrap().len(), 1);
        assert_eq!(manager.list_backups(&other).unwrap().len(), 2);
        assert_eq!(manager.list_backups(&same_stem).unwrap().len(), 1);
        assert_eq!(manager.list_all_backups().unwrap().len(), 4);
    }

    #[test]
    fn test_list_is_newest_first() {
        let (_temp, manager, file) = setup();
        fs::write(&file, "x").unwrap();
        let first = manager.create_backup(&file).unwrap().unwrap();
        let second = manager.create_backup(&file).unwrap().unwrap();

        let listed = manager.list_backups(&file).unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert!(listed[0].timestamp > listed[1].timestamp);
    }

    #[test]
    fn test_delete_old_backups_keeps_newest() {
        let (_temp, manager, file) = setup();
        let mut created = Vec::new();
        for i in 0..6 {
            fs::write(&file, format!("version {}", i)).unwrap();
            created.push(manager.create_backup(&file).unwrap().unwrap());
        }

        let removed = manager.delete_old_backups(2).unwrap();
        assert_eq!(removed, 4);

        let remaining: Vec<String> = manager
            .list_backups(&file)
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(remaining, vec![created[5].id.clone(), created[4].id.clone()]);
    }

    #[test]
    fn test_delete_old_backups_spans_all_files() {
        let (temp, manager, file) = setup();
        let other = temp.path().join("NOTES.md");
        fs::write(&file, "a").unwrap();
        fs::write(&other, "b").unwrap();

        manager.create_backup(&file).unwrap();
        manager.create_backup(&file).unwrap();
        let newest = manager.create_backup(&other).unwrap().unwrap();

        assert_eq!(manager.delete_old_backups(1).unwrap(), 2);
        let all = manager.list_all_backups().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, newest.id);
    }

    #[test]
    fn test_delete_old_backups_on_missing_dir() {
        let (_temp, manager, _file) = setup();
        assert_eq!(manager.delete_old_backups(3).unwrap(), 0);
    }

    #[test]
    fn test_delete_backup() {
        let (_temp, manager, file) = setup();
        fs::write(&file, "a").unwrap();
        let info = manager.create_backup(&file).unwrap().unwrap();

        assert!(manager.delete_backup(&info.id).unwrap());
        assert!(!info.file_path.exists());
        assert!(matches!(
            manager.delete_backup(&info.id),
            Err(ChangelogError::BackupNotFound(_))
        ));
    }

    #[test]
    fn test_backup_name_parse() {
        let name = BackupName::parse("app.notes@2026-03-04_05-06-07-089.md").unwrap();
        assert_eq!(name.stem, "app.notes");
        assert_eq!(name.extension, "md");
        assert_eq!(name.id(), "app.notes@2026-03-04_05-06-07-089");
        assert_eq!(name.timestamp.timestamp_subsec_millis(), 89);

        assert!(BackupName::parse("CHANGELOG.md").is_none());
        assert!(BackupName::parse(".tmpA1b2C3").is_none());
        assert!(BackupName::parse("x@not-a-date.md").is_none());
    }

    #[test]
    fn test_file_without_extension() {
        let (temp, manager, _file) = setup();
        let file = temp.path().join("CHANGES");
        fs::write(&file, "plain").unwrap();

        let info = manager.create_backup(&file).unwrap().unwrap();
        assert!(info.file_path.to_string_lossy().ends_with(".bak"));
        assert_eq!(manager.list_backups(&file).unwrap().len(), 1);
    }
}
