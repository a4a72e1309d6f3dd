//! Staged directory swap
//!
//! Replaces a directory transactionally: the current tree is renamed aside
//! before the new one is written, then the backup is either discarded
//! ([`StagedSwap::commit`]) or renamed back ([`StagedSwap::rollback`]).
//! Renames stay within the target's parent directory, so each step is a
//! single metadata operation and a crash leaves the old or the new tree in
//! place, never a mix.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::remove_dir_if_exists;
use crate::{Error, Result};

const BACKUP_MARKER: &str = ".backup-";

/// An in-progress replacement of `target`.
///
/// Dropping a swap that was neither committed nor rolled back rolls it back.
#[derive(Debug)]
pub struct StagedSwap {
    target: PathBuf,
    backup: Option<PathBuf>,
    finished: bool,
}

impl StagedSwap {
    /// Start replacing `target`.
    ///
    /// If `target` exists it is renamed to a uniquely named sibling backup.
    /// On return `target` is absent and ready to be populated.
    pub fn begin(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let parent = target
            .parent()
            .ok_or_else(|| Error::SwapWithoutParent {
                path: target.clone(),
            })?
            .to_path_buf();
        fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

        let backup = if target.exists() {
            let backup = backup_path(&parent, &target);
            fs::rename(&target, &backup).map_err(|e| Error::io(&target, e))?;
            tracing::debug!(target = %target.display(), backup = %backup.display(), "moved existing tree aside");
            Some(backup)
        } else {
            None
        };

        Ok(Self {
            target,
            backup,
            finished: false,
        })
    }

    /// The directory being replaced.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Where the previous tree currently lives, if there was one.
    pub fn backup(&self) -> Option<&Path> {
        self.backup.as_deref()
    }

    /// Keep the new tree and discard the backup.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        if let Some(backup) = self.backup.take() {
            remove_dir_if_exists(&backup)?;
        }
        Ok(())
    }

    /// Discard whatever was written to the target and restore the backup.
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.restore()
    }

    fn restore(&mut self) -> Result<()> {
        remove_dir_if_exists(&self.target)?;
        if let Some(backup) = self.backup.take() {
            if let Err(source) = fs::rename(&backup, &self.target) {
                return Err(Error::RollbackFailed {
                    target: self.target.clone(),
                    backup,
                    source,
                });
            }
            tracing::debug!(target = %self.target.display(), "restored previous tree");
        }
        Ok(())
    }
}

impl Drop for StagedSwap {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.restore() {
            tracing::warn!("Implicit rollback of {} failed: {}", self.target.display(), e);
        }
    }
}

fn backup_path(parent: &Path, target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    parent.join(format!(
        ".{}{}{}",
        name,
        BACKUP_MARKER,
        uuid::Uuid::new_v4().simple()
    ))
}

/// Remove leftover backups of `name` inside `parent`.
///
/// Backups only survive a swap when the process died mid-transaction or a
/// rollback failed. Returns the number of directories removed.
pub fn remove_stale_backups(parent: &Path, name: &str) -> Result<usize> {
    let prefix = format!(".{}{}", name, BACKUP_MARKER);
    let entries = match fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(Error::io(parent, e)),
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            remove_dir_if_exists(&entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn backup_path_is_hidden_sibling() {
        let parent = Path::new("/data/extensions");
        let backup = backup_path(parent, &parent.join("weather"));
        assert_eq!(backup.parent(), Some(parent));
        assert!(
            backup
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(".weather.backup-")
        );
    }

    #[test]
    fn stale_backups_only_match_their_name() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".weather.backup-1")).unwrap();
        fs::create_dir_all(temp.path().join(".weather.backup-2")).unwrap();
        fs::create_dir_all(temp.path().join(".weatherly.backup-3")).unwrap();
        fs::create_dir_all(temp.path().join("weather")).unwrap();

        assert_eq!(remove_stale_backups(temp.path(), "weather").unwrap(), 2);
        assert!(temp.path().join(".weatherly.backup-3").exists());
        assert!(temp.path().join("weather").exists());
    }

    #[test]
    fn stale_backups_in_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            remove_stale_backups(&temp.path().join("nope"), "weather").unwrap(),
            0
        );
    }
}
