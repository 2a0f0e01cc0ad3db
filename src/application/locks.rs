use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle slots are swept once the table grows past this many keys.
const SWEEP_THRESHOLD: usize = 1024;

/// One async mutex per key, created on first use.
///
/// Operations on the same key run one at a time; operations on different
/// keys do not contend beyond the brief table lookup. Callers that need more
/// than one key must always acquire them in the same global order.
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`. Access is released when the guard
    /// drops.
    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            if slots.len() >= SWEEP_THRESHOLD {
                // A slot only the table references has no holder and no waiter.
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            slots.entry(key.clone()).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}
