//! Cross-process writer lock for the file store.
//!
//! The lock is an advisory `flock`/`LockFileEx` on `<file>.lock`. The file
//! itself is never deleted; only the OS lock on it matters, and the OS drops
//! that lock when the holder closes the file or dies. A lock file left over
//! from a crashed writer therefore does not block anyone.

use crate::domain::error::DomainError;
use crate::domain::ports::index_store::WriteLock;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Take the exclusive lock on `lock_path`, polling for up to `timeout` while
/// another handle holds it. Blocks the calling thread.
pub fn acquire(lock_path: &Path, timeout: Duration) -> Result<WriteLock, DomainError> {
    let mut file = open_lock_file(lock_path)?;
    let started = Instant::now();
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => break,
            Err(e) if is_contended(&e) => {
                if started.elapsed() >= timeout {
                    return Err(DomainError::Lock(format!(
                        "timed out after {}ms waiting for another writer on {}",
                        timeout.as_millis(),
                        lock_path.display()
                    )));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(DomainError::Lock(format!(
                    "cannot lock {}: {e}",
                    lock_path.display()
                )))
            }
        }
    }

    // Holder pid, for humans inspecting the directory.
    let _ = file.set_len(0).and_then(|_| writeln!(file, "{}", std::process::id()));
    tracing::debug!(path = %lock_path.display(), "index lock acquired");

    Ok(WriteLock::new(move || {
        if let Err(e) = FileExt::unlock(&file) {
            tracing::warn!(error = %e, "failed to unlock index lock file; closing it instead");
        }
        drop(file);
    }))
}

fn open_lock_file(lock_path: &Path) -> Result<File, DomainError> {
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| DomainError::Lock(format!("cannot create {}: {e}", parent.display())))?;
    }
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|e| DomainError::Lock(format!("cannot open {}: {e}", lock_path.display())))
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
