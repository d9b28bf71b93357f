use crate::models::backup_record::BackupRecord;
use crate::models::error::{DeployError, Result};
use crate::service::timestamp::Timestamp;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const BACKUP_SUFFIX: &str = "_BACKUP";

/// Snapshots destination files before they are replaced.
///
/// All backups taken by one manager share the timestamp captured at the start of the run.
#[derive(Debug, Clone)]
pub struct BackupManager {
    timestamp: Timestamp,
}

impl BackupManager {
    pub fn new(timestamp: Timestamp) -> Self {
        BackupManager { timestamp }
    }

    /// `<dir>/<file_name>_<timestamp>_BACKUP`, next to the original
    pub fn backup_path_for(&self, destination: &Path) -> Result<PathBuf> {
        let file_name = destination.file_name().ok_or_else(|| DeployError::BackupIo {
            from: destination.to_path_buf(),
            to: destination.to_path_buf(),
            cause: io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        })?;

        let mut backup_name = file_name.to_os_string();
        backup_name.push(format!("_{}{}", self.timestamp.as_str(), BACKUP_SUFFIX));
        Ok(destination.with_file_name(backup_name))
    }

    /// Path the backup would take, or None when there is nothing to preserve. Writes nothing.
    pub fn planned_backup(&self, destination: &Path) -> Result<Option<PathBuf>> {
        if !self.destination_exists(destination)? {
            return Ok(None);
        }
        self.backup_path_for(destination).map(Some)
    }

    /// Copies an existing destination to its backup path.
    ///
    /// Returns None for first-time installs. An existing backup with the same name is
    /// overwritten.
    pub fn backup(&self, destination: &Path) -> Result<Option<BackupRecord>> {
        if !self.destination_exists(destination)? {
            debug!(
                "No existing file at {}, nothing to back up",
                destination.display()
            );
            return Ok(None);
        }

        let backup_path = self.backup_path_for(destination)?;
        if backup_path.exists() {
            debug!(
                "Backup {} already exists and will be overwritten",
                backup_path.display()
            );
        }

        fs::copy(destination, &backup_path).map_err(|cause| DeployError::BackupIo {
            from: destination.to_path_buf(),
            to: backup_path.clone(),
            cause,
        })?;

        info!(
            "Backed up {} to {}",
            destination.display(),
            backup_path.display()
        );

        Ok(Some(BackupRecord {
            original_path: destination.to_path_buf(),
            backup_path,
            created_at: self.timestamp.clone(),
        }))
    }

    fn destination_exists(&self, destination: &Path) -> Result<bool> {
        let backup_error = |cause: io::Error| DeployError::BackupIo {
            from: destination.to_path_buf(),
            to: destination.to_path_buf(),
            cause,
        };

        if !destination.try_exists().map_err(backup_error)? {
            return Ok(false);
        }

        if !destination.is_file() {
            return Err(backup_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination exists but is not a regular file",
            )));
        }
        Ok(true)
    }
}
