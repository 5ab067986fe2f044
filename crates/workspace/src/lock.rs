// SPDX-License-Identifier: MIT

//! Advisory per-file locking via atomic directory creation.
//!
//! `mkdir` of `{path}.lock` is atomic on POSIX-compatible filesystems, which
//! makes it a portable mutual-exclusion primitive without a separate lock
//! manager process. A lock directory older than [`STALE_AFTER`] is assumed to
//! belong to a crashed holder and is reclaimed rather than waited on.

use crate::error::WorkspaceError;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

/// A lock older than this is considered abandoned and reclaimed.
pub const STALE_AFTER: Duration = Duration::from_secs(60);
/// Interval between acquisition attempts while another holder is active.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// Default time budget for acquiring a lock before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A held advisory lock. Releases the lock directory when dropped.
pub struct LockGuard {
    lock_dir: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // Best-effort: if this fails the lock will simply age out as stale.
        let _ = std::fs::remove_dir(&self.lock_dir);
    }
}

/// Acquire the advisory lock for `target`, polling until acquired, a stale
/// lock is reclaimed, or `timeout` elapses.
pub async fn acquire(target: &Path, timeout: Duration) -> Result<LockGuard, WorkspaceError> {
    let lock_dir = crate::paths::lock_path(target);
    let deadline = Instant::now() + timeout;

    loop {
        match tokio::fs::create_dir(&lock_dir).await {
            Ok(()) => return Ok(LockGuard { lock_dir }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if is_stale(&lock_dir).await {
                    // Best-effort reclaim; if another racer wins the reclaim
                    // and recreate, the next loop iteration's create_dir will
                    // fail again and we'll just keep polling.
                    let _ = tokio::fs::remove_dir(&lock_dir).await;
                    continue;
                }
            }
            Err(e) => {
                return Err(WorkspaceError::WriteFailed {
                    path: lock_dir.display().to_string(),
                    source: e,
                })
            }
        }

        if Instant::now() >= deadline {
            return Err(WorkspaceError::LockTimeout {
                path: target.display().to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn is_stale(lock_dir: &Path) -> bool {
    let Ok(meta) = tokio::fs::metadata(lock_dir).await else { return false };
    let Ok(modified) = meta.modified() else { return false };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age > STALE_AFTER,
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
