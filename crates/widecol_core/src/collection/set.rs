//! Set collection proxy.

use crate::collection::delta::{Delta, DeltaLog};
use crate::error::CoreResult;
use crate::schema::Column;
use crate::value::Value;
use tracing::trace;

/// Mutable view of a set column.
///
/// Elements are unique and kept sorted. Adding an element records an
/// `Append` delta, removing one records a `Remove`.
#[derive(Debug)]
pub struct SetProxy<'a> {
    column: &'a Column,
    items: &'a mut Vec<Value>,
    log: &'a mut DeltaLog,
}

impl<'a> SetProxy<'a> {
    pub(crate) fn new(column: &'a Column, items: &'a mut Vec<Value>, log: &'a mut DeltaLog) -> Self {
        Self { column, items, log }
    }

    /// The column this proxy wraps.
    #[must_use]
    pub fn column(&self) -> &Column {
        self.column
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `value` is a member.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.binary_search(value).is_ok()
    }

    /// Iterates over the members in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Adds a member. Returns false if it was already present.
    pub fn insert(&mut self, value: impl Into<Value>) -> CoreResult<bool> {
        let value = value.into();
        self.column.check_element(&value)?;
        let added = self.add(value.clone());
        self.record(Delta::Append(vec![value]));
        Ok(added)
    }

    /// Adds several members as a single delta.
    ///
    /// Nothing is added if any member has the wrong type.
    pub fn extend<I, V>(&mut self, values: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                self.column.check_element(&value).map(|()| value)
            })
            .collect::<CoreResult<Vec<_>>>()?;
        if values.is_empty() {
            return Ok(());
        }
        for value in &values {
            self.add(value.clone());
        }
        self.record(Delta::Append(values));
        Ok(())
    }

    /// Removes a member. Returns false if it was absent.
    pub fn remove(&mut self, value: impl Into<Value>) -> CoreResult<bool> {
        let value = value.into();
        self.column.check_element(&value)?;
        let removed = match self.items.binary_search(&value) {
            Ok(pos) => {
                self.items.remove(pos);
                true
            }
            Err(_) => false,
        };
        self.record(Delta::Remove(vec![value]));
        Ok(removed)
    }

    /// Removes every member.
    pub fn clear(&mut self) {
        self.items.clear();
        self.record(Delta::Clear);
    }

    /// Deltas recorded since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[Delta] {
        self.log.pending()
    }

    /// Drains the pending deltas. The set itself is unchanged.
    pub fn flush(&mut self) -> Vec<Delta> {
        self.log.flush()
    }

    fn add(&mut self, value: Value) -> bool {
        match self.items.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, value);
                true
            }
        }
    }

    fn record(&mut self, delta: Delta) {
        trace!(column = self.column.name(), op = %delta.op(), "recorded set delta");
        self.log.record(delta);
    }
}
