//! Process environment helpers shared by integration tests.

use std::ffi::{OsStr, OsString};
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENVIRONMENT: Mutex<()> = Mutex::new(());

/// Environment overrides that are undone when the guard drops.
///
/// Holding the guard serializes environment changes across test threads.
pub struct ScopedEnv {
    restore: Vec<(OsString, Option<OsString>)>,
    _serialized: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Applies `changes`; a `None` value removes the variable.
    pub fn apply(changes: &[(OsString, Option<OsString>)]) -> Self {
        let serialized = ENVIRONMENT.lock().unwrap_or_else(PoisonError::into_inner);
        let restore = changes
            .iter()
            .map(|(key, value)| {
                let previous = std::env::var_os(key);
                set_or_remove(key, value.as_deref());
                (key.clone(), previous)
            })
            .collect();
        Self {
            restore,
            _serialized: serialized,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, previous) in self.restore.drain(..).rev() {
            set_or_remove(&key, previous.as_deref());
        }
    }
}

fn set_or_remove(key: &OsStr, value: Option<&OsStr>) {
    // SAFETY: callers hold the `ENVIRONMENT` lock for the whole change.
    unsafe {
        match value {
            Some(new_value) => std::env::set_var(key, new_value),
            None => std::env::remove_var(key),
        }
    }
}
