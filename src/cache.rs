use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// A memoization table for one derived-fact function.
///
/// Keys are typed tuples of the function's arguments, so two distinct
/// argument tuples can never collide. The table only ever grows; entries
/// live as long as the owning analysis object.
#[derive(Debug)]
pub struct Memo<K, V> {
    entries: RefCell<HashMap<K, V>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Memo<K, V> {
    /// Returns the cached value for `key`, computing and storing it on first
    /// access. `compute` may recursively use the same table for other keys;
    /// no borrow is held while it runs.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.borrow().get(&key) {
            return value.clone();
        }
        let value = compute();
        self.entries
            .borrow_mut()
            .insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
