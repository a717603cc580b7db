use std::{
    collections::HashSet,
    hash::Hash,
    sync::{Arc, Mutex, PoisonError},
};

/// Set of keys currently held by an in-flight task.
///
/// Membership is the exclusion token: a key can only be acquired once
/// until the returned [`Token`] is dropped.
#[derive(Debug)]
pub struct ExclusiveSet<K: Eq + Hash>(Arc<Mutex<HashSet<K>>>);

impl<K: Eq + Hash> Default for ExclusiveSet<K> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(HashSet::new())))
    }
}

impl<K: Copy + Eq + Hash> ExclusiveSet<K> {
    /// Inserts `key` unless it is already present.
    ///
    /// The check and the insertion happen under the same lock.
    pub fn try_acquire(&self, key: K) -> Option<Token<K>> {
        let inserted = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);

        inserted.then(|| Token {
            set: self.0.clone(),
            key,
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Removes its key from the [`ExclusiveSet`] when dropped.
#[derive(Debug)]
pub struct Token<K: Eq + Hash> {
    set: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash> Drop for Token<K> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
