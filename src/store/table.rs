//! A keyed in-memory table with row-level locks.
//!
//! Rows live behind their own `Mutex`, so a row lock serializes the
//! read-check-write on one record without blocking the rest of the table.
//! The table-wide `RwLock` is only ever held to look up, insert or remove
//! row handles, never while waiting on a row lock.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::error::EngineError;

/// A shared handle to one row.
pub type Row<V> = Arc<Mutex<V>>;

/// Locks a row (or any mutex), recovering the data if a previous holder
/// panicked. Every mutation in the engine validates before it writes, so a
/// poisoned row still holds a consistent record.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An insert collided with an existing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey<K> {
    /// The table the insert targeted.
    pub table: &'static str,
    /// The colliding key.
    pub key: K,
}

impl<K: Debug> From<DuplicateKey<K>> for EngineError {
    fn from(duplicate: DuplicateKey<K>) -> Self {
        EngineError::Conflict {
            message: format!("duplicate key {:?} in {}", duplicate.key, duplicate.table),
        }
    }
}

/// A table of rows with a unique key.
#[derive(Debug)]
pub struct Table<K, V> {
    name: &'static str,
    rows: RwLock<HashMap<K, Row<V>>>,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty table.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// The table name used in conflict messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Inserts a row, failing if the key is already taken. The uniqueness
    /// check and the insert happen under one write lock.
    pub fn insert_unique(&self, key: K, value: V) -> Result<Row<V>, DuplicateKey<K>> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        if rows.contains_key(&key) {
            return Err(DuplicateKey {
                table: self.name,
                key,
            });
        }
        let row = Arc::new(Mutex::new(value));
        rows.insert(key, Arc::clone(&row));
        Ok(row)
    }

    /// Inserts a row unless the key is taken. Returns true if inserted.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        self.insert_unique(key, value).is_ok()
    }

    /// Returns the handle of a row so it can be locked.
    pub fn row(&self, key: &K) -> Option<Row<V>> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.get(key).cloned()
    }

    /// Returns a copy of a row.
    pub fn get(&self, key: &K) -> Option<V> {
        self.row(key).map(|row| lock(&row).clone())
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &K) -> bool {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.contains_key(key)
    }

    /// Removes a row, returning its last value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let row = {
            let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
            rows.remove(key)
        }?;
        let value = lock(&row).clone();
        Some(value)
    }

    /// Returns copies of every row matching `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        self.handles()
            .into_iter()
            .filter_map(|row| {
                let value = lock(&row);
                predicate(&value).then(|| value.clone())
            })
            .collect()
    }

    /// Returns true if any row matches `predicate`.
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&V) -> bool,
    {
        self.handles().into_iter().any(|row| predicate(&lock(&row)))
    }

    /// Returns copies of every row.
    pub fn values(&self) -> Vec<V> {
        self.filter(|_| true)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Row handles are collected before any row is locked so the table lock
    // is never held while waiting on a row.
    fn handles(&self) -> Vec<Row<V>> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        rows.values().cloned().collect()
    }
}

/// Named exclusive locks created on demand, one per key.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Creates an empty lock set.
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `key`, creating it on first use.
    pub fn handle(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = lock(&self.locks);
        Arc::clone(locks.entry(key.clone()).or_default())
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::thread;

    #[test]
    fn test_insert_unique_rejects_duplicate_key() {
        let table: Table<u32, String> = Table::new("things");
        table.insert_unique(1, "first".to_string()).unwrap();
        let duplicate = table.insert_unique(1, "second".to_string()).unwrap_err();
        assert_eq!(duplicate.key, 1);
        assert_eq!(table.get(&1).unwrap(), "first");

        let err: EngineError = duplicate.into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_insert_if_absent_keeps_existing_row() {
        let table: Table<u32, u32> = Table::new("numbers");
        assert!(table.insert_if_absent(1, 10));
        assert!(!table.insert_if_absent(1, 20));
        assert_eq!(table.get(&1), Some(10));
    }

    #[test]
    fn test_row_mutation_is_visible_through_table() {
        let table: Table<u32, u32> = Table::new("numbers");
        table.insert_unique(1, 10).unwrap();
        {
            let row = table.row(&1).unwrap();
            *lock(&row) += 5;
        }
        assert_eq!(table.get(&1), Some(15));
    }

    #[test]
    fn test_filter_and_remove() {
        let table: Table<u32, u32> = Table::new("numbers");
        for i in 0..10 {
            table.insert_unique(i, i * 10).unwrap();
        }
        let mut even = table.filter(|v| v % 20 == 0);
        even.sort();
        assert_eq!(even, vec![0, 20, 40, 60, 80]);

        assert_eq!(table.remove(&3), Some(30));
        assert!(!table.contains(&3));
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn test_concurrent_unique_inserts_admit_one_winner() {
        let table: Table<&'static str, usize> = Table::new("payrolls");
        let winners: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let table = &table;
                    scope.spawn(move || table.insert_unique("emp-1/2024-03", i).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });
        assert_eq!(winners, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_keyed_locks_share_one_lock_per_key() {
        let locks: KeyedLocks<u32> = KeyedLocks::new();
        let a = locks.handle(&1);
        let b = locks.handle(&1);
        let c = locks.handle(&2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
