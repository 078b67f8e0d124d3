use std::collections::HashMap;

/// A rendered row together with its markup identity.
///
/// `identity` changes only when the row is fully replaced. Renderers key their
/// elements on it, so an in-place update keeps animated children (spinners)
/// alive while a replacement rebuilds them.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<R> {
    pub key: String,
    pub identity: u64,
    pub row: R,
}

/// Keyed table in display order with targeted in-place updates and full-row replacement.
#[derive(Debug, Clone)]
pub struct KeyedTable<R> {
    order: Vec<String>,
    rows: HashMap<String, Keyed<R>>,
    next_identity: u64,
    revision: u64,
}

impl<R> Default for KeyedTable<R> {
    fn default() -> Self {
        Self { order: Vec::new(), rows: HashMap::new(), next_identity: 1, revision: 0 }
    }
}

impl<R> KeyedTable<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new row at the end or fully replace an existing one in place.
    /// Returns the new identity.
    pub fn replace(&mut self, key: &str, row: R) -> u64 {
        let identity = self.next_identity;
        self.next_identity += 1;
        self.revision += 1;
        match self.rows.get_mut(key) {
            Some(existing) => {
                existing.identity = identity;
                existing.row = row;
            }
            None => {
                self.order.push(key.to_string());
                self.rows.insert(key.to_string(), Keyed { key: key.to_string(), identity, row });
            }
        }
        identity
    }

    /// Mutate a row without changing its identity. `f` reports whether anything
    /// changed; the table revision only moves when it did.
    pub fn update_in_place<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut R) -> bool,
    {
        let Some(entry) = self.rows.get_mut(key) else {
            return false;
        };
        let changed = f(&mut entry.row);
        if changed {
            self.revision += 1;
        }
        changed
    }

    pub fn get(&self, key: &str) -> Option<&Keyed<R>> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<R> {
        let removed = self.rows.remove(key)?;
        self.order.retain(|k| k != key);
        self.revision += 1;
        Some(removed.row)
    }

    pub fn clear(&mut self) {
        if self.order.is_empty() {
            return;
        }
        self.order.clear();
        self.rows.clear();
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rows in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Keyed<R>> {
        self.order.iter().filter_map(move |k| self.rows.get(k))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| k.as_str())
    }

    /// Monotonic mutation counter; equal revisions mean nothing was rendered in between.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
