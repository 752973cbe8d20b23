//! Exclusive access to the signing keyring.
//!
//! # Security
//! - The provider signs with mutable keyring state (account sequence), so at
//!   most one broadcast may touch the keyring at a time
//! - Cross-process exclusion is an OS advisory lock on a lock file in the key
//!   directory; the OS drops it when the holding process exits, so a crash
//!   never leaves the keyring locked
//! - Key material itself never passes through this module

use std::fmt;
use std::fs::{File, OpenOptions, TryLockError};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use thiserror::Error;
use tokio::sync::Mutex;

/// Failure to acquire the signing resource.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Another process holds the keyring lock.
    #[error("keyring is locked: {}", path.display())]
    Locked { path: PathBuf },

    /// The lock file could not be opened or locked.
    #[error("keyring lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Process-external lock around the keyring.
pub trait KeyringLock: Send + Sync + fmt::Debug {
    fn lock(&self) -> Result<(), GuardError>;
    fn unlock(&self);
}

/// For in-memory keyrings that no other process can reach.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopKeyringLock;

impl KeyringLock for NoopKeyringLock {
    fn lock(&self) -> Result<(), GuardError> {
        Ok(())
    }

    fn unlock(&self) {}
}

/// Exclusive OS lock on a file next to the keyring files.
///
/// The file itself is never removed; only the lock on its handle matters, so
/// a file left behind by an earlier run does not block anyone.
#[derive(Debug)]
pub struct FileKeyringLock {
    path: PathBuf,
    held: StdMutex<Option<File>>,
}

impl FileKeyringLock {
    pub const LOCK_FILE: &'static str = "keyring.lock";

    pub fn new(key_directory: impl AsRef<Path>) -> Self {
        Self {
            path: key_directory.as_ref().join(Self::LOCK_FILE),
            held: StdMutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> GuardError {
        GuardError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyringLock for FileKeyringLock {
    fn lock(&self) -> Result<(), GuardError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(GuardError::Locked {
                    path: self.path.clone(),
                })
            }
            Err(TryLockError::Error(e)) => return Err(self.io_error(e)),
        }

        // Owner pid, for humans inspecting the lock.
        if file.set_len(0).is_ok() {
            let _ = writeln!(file, "{}", std::process::id());
        }
        *self.held.lock().unwrap_or_else(|e| e.into_inner()) = Some(file);
        Ok(())
    }

    fn unlock(&self) {
        // Closing the handle releases the OS lock.
        let released = self.held.lock().unwrap_or_else(|e| e.into_inner()).take();
        if released.is_none() {
            tracing::warn!(path = %self.path.display(), "Keyring unlock without a held lock");
        }
    }
}

/// Serializes access to the signing keyring across concurrent submissions.
#[derive(Debug)]
pub struct KeyringGuard {
    mutex: Mutex<()>,
    lock: Arc<dyn KeyringLock>,
}

impl KeyringGuard {
    pub fn new(lock: Arc<dyn KeyringLock>) -> Self {
        Self {
            mutex: Mutex::new(()),
            lock,
        }
    }

    /// Guard with no process-external lock.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(NoopKeyringLock))
    }

    /// Run `f` while holding exclusive access to the keyring.
    ///
    /// `Err` only reports failure to acquire the resource; whatever `f`
    /// produces is returned untouched in `Ok`. Both locks are released on
    /// every exit path, including a panic in `f` or the future being dropped.
    pub async fn with_exclusive_access<F, Fut, T>(&self, f: F) -> Result<T, GuardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _held = self.mutex.lock().await;
        self.lock.lock()?;
        let _lease = Lease {
            lock: self.lock.as_ref(),
        };
        Ok(f().await)
    }
}

/// Releases the keyring lock on drop; declared after the mutex guard so it drops first.
struct Lease<'a> {
    lock: &'a dyn KeyringLock,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}
