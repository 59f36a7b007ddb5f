use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock a std mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One async mutex per data key, so remote writes to the same key run one
/// at a time while different keys proceed independently.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of a remote write.
pub(crate) struct KeyGuard<'a> {
    owner: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyLocks {
    pub(crate) async fn acquire(&self, key: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut locks = lock(&self.locks);
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = mutex.lock_owned().await;
        KeyGuard {
            owner: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.locks).len()
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        // Forget the mutex once nobody else holds or waits on it
        let mut locks = lock(&self.owner.locks);
        if let Some(mutex) = locks.get(&self.key) {
            if Arc::strong_count(mutex) == 1 {
                locks.remove(&self.key);
            }
        }
    }
}
