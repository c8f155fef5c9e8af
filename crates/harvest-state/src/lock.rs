use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the lock directory inside the state directory.
pub const LOCK_DIR: &str = "harvest.lock";

/// Name of the owner-pid marker file inside the lock directory.
/// Diagnostic only — nothing reads it programmatically.
pub const PID_FILE: &str = "pid";

/// Attempt to take the batch lock for `state_dir`.
///
/// Directory creation is atomic on every platform we care about, so the
/// create-or-fail result is the mutual exclusion. `Ok(false)` means another
/// run holds the lock — the normal skip signal, not a fault.
pub fn acquire(state_dir: &Path) -> harvest_core::Result<bool> {
    std::fs::create_dir_all(state_dir)?;
    let lock_path = state_dir.join(LOCK_DIR);
    match std::fs::create_dir(&lock_path) {
        Ok(()) => {
            std::fs::write(lock_path.join(PID_FILE), std::process::id().to_string())?;
            debug!(path = %lock_path.display(), "lock acquired");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %lock_path.display(), "lock already held");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Release the batch lock. Idempotent: an absent lock directory is fine.
pub fn release(state_dir: &Path) -> harvest_core::Result<()> {
    let lock_path = state_dir.join(LOCK_DIR);
    match std::fs::remove_dir_all(&lock_path) {
        Ok(()) => {
            debug!(path = %lock_path.display(), "lock released");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// RAII holder for the batch lock: releases on drop, so the lock is freed on
/// every exit path — early returns, `?` propagation, and panics alike.
pub struct LockGuard {
    state_dir: PathBuf,
    released: bool,
}

impl LockGuard {
    /// Try to take the lock. `Ok(None)` when another run holds it.
    pub fn try_acquire(state_dir: &Path) -> harvest_core::Result<Option<Self>> {
        if acquire(state_dir)? {
            Ok(Some(Self {
                state_dir: state_dir.to_path_buf(),
                released: false,
            }))
        } else {
            Ok(None)
        }
    }

    /// Release explicitly, surfacing any error. Drop would swallow it.
    pub fn release(mut self) -> harvest_core::Result<()> {
        self.released = true;
        release(&self.state_dir)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = release(&self.state_dir) {
                warn!(error = %e, dir = %self.state_dir.display(), "failed to release lock on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_release() {
        let dir = tempfile::tempdir().unwrap();
        assert!(acquire(dir.path()).unwrap());
        assert!(dir.path().join(LOCK_DIR).join(PID_FILE).exists());
        release(dir.path()).unwrap();
        assert!(!dir.path().join(LOCK_DIR).exists());
    }

    #[test]
    fn second_acquire_fails_without_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(acquire(dir.path()).unwrap());
        assert!(!acquire(dir.path()).unwrap());
        release(dir.path()).unwrap();
    }

    #[test]
    fn release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        release(dir.path()).unwrap();
        release(dir.path()).unwrap();
    }

    #[test]
    fn pid_file_contains_our_pid() {
        let dir = tempfile::tempdir().unwrap();
        acquire(dir.path()).unwrap();
        let pid = std::fs::read_to_string(dir.path().join(LOCK_DIR).join(PID_FILE)).unwrap();
        assert_eq!(pid, std::process::id().to_string());
        release(dir.path()).unwrap();
    }

    #[test]
    fn concurrent_acquires_yield_exactly_one_winner() {
        use std::sync::Barrier;

        let dir = tempfile::tempdir().unwrap();
        let barrier = Barrier::new(2);
        let (a, b) = std::thread::scope(|s| {
            let ha = s.spawn(|| {
                barrier.wait();
                acquire(dir.path()).unwrap()
            });
            let hb = s.spawn(|| {
                barrier.wait();
                acquire(dir.path()).unwrap()
            });
            (ha.join().unwrap(), hb.join().unwrap())
        });
        assert_ne!(a, b, "exactly one of two racing acquires must win");
        release(dir.path()).unwrap();
    }

    #[test]
    fn guard_releases_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _guard = LockGuard::try_acquire(dir.path()).unwrap().unwrap();
            assert!(dir.path().join(LOCK_DIR).exists());
        }
        assert!(!dir.path().join(LOCK_DIR).exists());
    }

    #[test]
    fn guard_none_when_held() {
        let dir = tempfile::tempdir().unwrap();
        let guard = LockGuard::try_acquire(dir.path()).unwrap().unwrap();
        assert!(LockGuard::try_acquire(dir.path()).unwrap().is_none());
        guard.release().unwrap();
        assert!(LockGuard::try_acquire(dir.path()).unwrap().is_some());
    }
}
