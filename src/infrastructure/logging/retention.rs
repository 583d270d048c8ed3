//! Retention cleanup for rolled log files.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::logger::LOG_FILE_NAME;

/// Delete rolled log files last modified more than `retention_days` ago.
///
/// Only files named after the log file (`habit-rhythm.log*`) are touched.
/// Returns the number of files removed.
pub async fn cleanup_old_logs(log_dir: impl AsRef<Path>, retention_days: u32) -> Result<usize> {
    let log_dir = log_dir.as_ref();
    if !log_dir.exists() {
        warn!(path = %log_dir.display(), "log directory does not exist");
        return Ok(0);
    }

    let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
    let mut deleted = 0;
    let mut entries = tokio::fs::read_dir(log_dir)
        .await
        .context("failed to read log directory")?;

    while let Some(entry) = entries.next_entry().await.context("failed to read directory entry")? {
        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_FILE_NAME));
        if !is_log {
            continue;
        }

        let modified: DateTime<Utc> = entry
            .metadata()
            .await
            .context("failed to get file metadata")?
            .modified()
            .context("failed to get file modification time")?
            .into();

        if modified < cutoff {
            tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to delete {}", path.display()))?;
            deleted += 1;
        }
    }

    if deleted > 0 {
        info!(count = deleted, "cleaned up old log files");
    }
    Ok(deleted)
}

/// Run [`cleanup_old_logs`] now and then every `interval`, until aborted.
pub async fn run_periodic_cleanup(log_dir: PathBuf, retention_days: u32, interval: std::time::Duration) {
    let mut timer = tokio::time::interval(interval);
    loop {
        timer.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir, retention_days).await {
            warn!(error = %e, "failed to run periodic log cleanup");
        }
    }
}

/// Spawn the periodic cleanup on the current tokio runtime.
///
/// Returns `None` outside a runtime; retention then only applies to
/// processes that log from async code.
pub fn spawn_periodic_cleanup(
    log_dir: PathBuf,
    retention_days: u32,
    interval: std::time::Duration,
) -> Option<JoinHandle<()>> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => Some(handle.spawn(run_periodic_cleanup(log_dir, retention_days, interval))),
        Err(_) => {
            debug!("no tokio runtime, log retention cleanup not scheduled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keeps_recent_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("habit-rhythm.log.2024-01-01"), "old").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

        // Fresh files are within any retention window
        assert_eq!(cleanup_old_logs(dir.path(), 30).await.unwrap(), 0);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_zero_retention_removes_log_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("habit-rhythm.log.2024-01-01"), "old").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(cleanup_old_logs(dir.path(), 0).await.unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_spawned_cleanup_runs_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("habit-rhythm.log.2024-01-01");
        std::fs::write(&stale, "old").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let handle = spawn_periodic_cleanup(dir.path().to_path_buf(), 0, std::time::Duration::from_secs(3600)).unwrap();
        for _ in 0..50 {
            if !stale.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        handle.abort();
        assert!(!stale.exists());
    }

    #[test]
    fn test_spawn_outside_runtime_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(spawn_periodic_cleanup(dir.path().to_path_buf(), 7, std::time::Duration::from_secs(60)).is_none());
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path().join("absent"), 7).await.unwrap(), 0);
    }
}
