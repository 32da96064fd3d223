/// Keyed rows kept in insertion order.
#[derive(Debug)]
pub(super) struct OrderedTable<K, V> {
    rows: Vec<(K, V)>,
}

impl<K, V> Default for OrderedTable<K, V> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<K: PartialEq + Copy, V: Clone> OrderedTable<K, V> {
    /// Replaces the row in place, or appends it when the key is new.
    pub(super) fn upsert(&mut self, key: K, value: V) {
        match self.rows.iter_mut().find(|(stored, _)| *stored == key) {
            Some((_, existing)) => *existing = value,
            None => self.rows.push((key, value)),
        }
    }

    pub(super) fn get(&self, key: K) -> Option<V> {
        self.find(|stored, _| *stored == key)
    }

    pub(super) fn find(&self, predicate: impl Fn(&K, &V) -> bool) -> Option<V> {
        self.rows
            .iter()
            .find(|(key, value)| predicate(key, value))
            .map(|(_, value)| value.clone())
    }

    pub(super) fn remove(&mut self, key: K) -> Option<V> {
        let position = self.rows.iter().position(|(stored, _)| *stored == key)?;
        Some(self.rows.remove(position).1)
    }

    pub(super) fn values(&self) -> Vec<V> {
        self.rows.iter().map(|(_, value)| value.clone()).collect()
    }

    pub(super) fn len(&self) -> usize {
        self.rows.len()
    }
}
