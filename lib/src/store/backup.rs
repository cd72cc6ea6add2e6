use crate::error::{PocketmarkError, Result};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Copies a bookmark store aside before it is modified
#[derive(Debug, Clone, Default)]
pub struct BackupManager {
    /// Directory for backups; beside the store when unset
    dir: Option<PathBuf>,
}

impl BackupManager {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Copy `path` to `<path>.backup-YYYYMMDD-HHMMSS` and flush the copy to disk
    ///
    /// An existing backup is never overwritten; a `-N` suffix is added instead.
    pub fn backup(&self, path: &Path) -> Result<PathBuf> {
        let failed = |source: io::Error| PocketmarkError::BackupFailed {
            path: path.to_path_buf(),
            source,
        };

        let file_name = path.file_name().ok_or_else(|| {
            failed(io::Error::new(
                ErrorKind::InvalidInput,
                "store path has no file name",
            ))
        })?;
        let dir = match &self.dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(failed)?;
                dir.clone()
            }
            None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        let mut source = File::open(path).map_err(failed)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let base = format!("{}.backup-{}", file_name.to_string_lossy(), stamp);

        let (backup_path, mut backup) = create_unique(&dir, &base).map_err(failed)?;
        let copied = io::copy(&mut source, &mut backup)
            .and_then(|bytes| backup.sync_all().map(|_| bytes))
            .and_then(|bytes| {
                let permissions = source.metadata()?.permissions();
                fs::set_permissions(&backup_path, permissions)?;
                Ok(bytes)
            });

        match copied {
            Ok(bytes) => {
                log::info!("Backed up {:?} to {:?} ({} bytes)", path, backup_path, bytes);
                Ok(backup_path)
            }
            Err(e) => {
                let _ = fs::remove_file(&backup_path);
                Err(failed(e))
            }
        }
    }
}

fn create_unique(dir: &Path, base: &str) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, attempt)
        };
        let candidate = dir.join(name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir, contents: &[u8]) -> PathBuf {
        let path = dir.path().join("Bookmarks");
        fs::write(&path, contents).unwrap();
        path
    }

    fn backup_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_backup_copies_bytes_beside_store() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir, b"{\n   \"version\": 1\n}\n");

        let backup = BackupManager::default().backup(&path).unwrap();
        assert_eq!(backup.parent(), Some(dir.path()));
        assert_eq!(fs::read(&backup).unwrap(), fs::read(&path).unwrap());

        let name = backup_name(&backup);
        let stamp = name.strip_prefix("Bookmarks.backup-").unwrap();
        assert_eq!(stamp.len(), "YYYYMMDD-HHMMSS".len());
        assert_eq!(&stamp[8..9], "-");
        assert!(stamp.chars().filter(|c| *c != '-').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_backup_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir, b"first");
        let manager = BackupManager::default();

        let first = manager.backup(&path).unwrap();
        fs::write(&path, b"second").unwrap();
        let second = manager.backup(&path).unwrap();
        fs::write(&path, b"third").unwrap();
        let third = manager.backup(&path).unwrap();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
        assert_eq!(fs::read(&third).unwrap(), b"third");
    }

    #[test]
    fn test_numeric_suffix_on_collision() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.backup-1"), b"taken").unwrap();
        fs::write(dir.path().join("x.backup-1-1"), b"taken").unwrap();

        let (path, _file) = create_unique(dir.path(), "x.backup-1").unwrap();
        assert_eq!(path, dir.path().join("x.backup-1-2"));
        assert_eq!(fs::read(dir.path().join("x.backup-1")).unwrap(), b"taken");
    }

    #[test]
    fn test_backup_into_configured_dir() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir, b"data");
        let backups = dir.path().join("backups/nested");

        let backup = BackupManager::new(Some(backups.clone()))
            .backup(&path)
            .unwrap();
        assert_eq!(backup.parent(), Some(backups.as_path()));
        assert!(backup_name(&backup).starts_with("Bookmarks.backup-"));
    }

    #[test]
    fn test_backup_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir, b"data");
        let not_a_dir = dir.path().join("file");
        fs::write(&not_a_dir, b"").unwrap();

        let err = BackupManager::new(Some(not_a_dir))
            .backup(&path)
            .unwrap_err();
        assert!(matches!(err, PocketmarkError::BackupFailed { .. }));
        assert_eq!(err.stage(), "backup");
        assert_eq!(fs::read(&path).unwrap(), b"data");
    }

    #[test]
    fn test_backup_of_missing_store_fails() {
        let dir = TempDir::new().unwrap();
        let err = BackupManager::default()
            .backup(&dir.path().join("Bookmarks"))
            .unwrap_err();
        assert!(matches!(err, PocketmarkError::BackupFailed { .. }));
    }
}
