//! Map collection proxy.

use crate::collection::delta::{Delta, DeltaLog};
use crate::error::CoreResult;
use crate::schema::Column;
use crate::value::Value;
use tracing::trace;

/// Mutable view of a map column.
///
/// Keys are unique and kept sorted. Inserting over an existing key
/// overwrites it and records a `SetKey`, never a remove followed by an insert.
#[derive(Debug)]
pub struct MapProxy<'a> {
    column: &'a Column,
    entries: &'a mut Vec<(Value, Value)>,
    log: &'a mut DeltaLog,
}

impl<'a> MapProxy<'a> {
    pub(crate) fn new(
        column: &'a Column,
        entries: &'a mut Vec<(Value, Value)>,
        log: &'a mut DeltaLog,
    ) -> Self {
        Self {
            column,
            entries,
            log,
        }
    }

    /// The column this proxy wraps.
    #[must_use]
    pub fn column(&self) -> &Column {
        self.column
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.find(key).ok().map(|pos| &self.entries[pos].1)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.find(key).is_ok()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> CoreResult<Option<Value>> {
        let (key, value) = (key.into(), value.into());
        self.column.check_entry(&key, &value)?;
        Ok(self.put_recorded(key, value))
    }

    /// Sets several entries, recording one `SetKey` per pair.
    ///
    /// Nothing is written if any entry has the wrong type.
    pub fn extend<I, K, V>(&mut self, pairs: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let pairs = pairs
            .into_iter()
            .map(|(key, value)| {
                let (key, value) = (key.into(), value.into());
                self.column.check_entry(&key, &value).map(|()| (key, value))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        for (key, value) in pairs {
            self.put_recorded(key, value);
        }
        Ok(())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: impl Into<Value>) -> CoreResult<Option<Value>> {
        let key = key.into();
        self.column.check_element(&key)?;
        let old = self.find(&key).ok().map(|pos| self.entries.remove(pos).1);
        self.record(Delta::RemoveKey { key });
        Ok(old)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.record(Delta::Clear);
    }

    /// Deltas recorded since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[Delta] {
        self.log.pending()
    }

    /// Drains the pending deltas. The map itself is unchanged.
    pub fn flush(&mut self) -> Vec<Delta> {
        self.log.flush()
    }

    fn find(&self, key: &Value) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(key))
    }

    fn put(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.find(&key) {
            Ok(pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                None
            }
        }
    }

    fn put_recorded(&mut self, key: Value, value: Value) -> Option<Value> {
        let old = self.put(key.clone(), value.clone());
        self.record(Delta::SetKey { key, value });
        old
    }

    fn record(&mut self, delta: Delta) {
        trace!(column = self.column.name(), op = %delta.op(), "recorded map delta");
        self.log.record(delta);
    }
}
