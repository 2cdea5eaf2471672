//! List collection proxy.

use crate::collection::delta::{Delta, DeltaLog};
use crate::error::{CoreError, CoreResult};
use crate::schema::Column;
use crate::value::Value;
use tracing::trace;

/// Mutable view of a list column.
///
/// Every mutation is applied to the in-memory list and recorded as one
/// [`Delta`]. A mutation that fails leaves both the list and the pending
/// log untouched.
#[derive(Debug)]
pub struct ListProxy<'a> {
    column: &'a Column,
    items: &'a mut Vec<Value>,
    log: &'a mut DeltaLog,
}

impl<'a> ListProxy<'a> {
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

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// The elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        self.items.as_slice()
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Whether an equal element is present.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains(value)
    }

    /// Appends one element.
    pub fn push(&mut self, value: impl Into<Value>) -> CoreResult<()> {
        let value = value.into();
        self.column.check_element(&value)?;
        self.items.push(value.clone());
        self.record(Delta::Append(vec![value]));
        Ok(())
    }

    /// Appends several elements as a single delta.
    ///
    /// Nothing is appended if any element has the wrong type.
    pub fn extend<I, V>(&mut self, values: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = self.checked(values)?;
        if values.is_empty() {
            return Ok(());
        }
        self.items.extend(values.iter().cloned());
        self.record(Delta::Append(values));
        Ok(())
    }

    /// Puts one element at the front.
    pub fn prepend(&mut self, value: impl Into<Value>) -> CoreResult<()> {
        let value = value.into();
        self.column.check_element(&value)?;
        self.items.insert(0, value.clone());
        self.record(Delta::Prepend(vec![value]));
        Ok(())
    }

    /// Inserts an element before the one currently at `index`.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) -> CoreResult<()> {
        self.check_index(index)?;
        let value = value.into();
        self.column.check_element(&value)?;
        self.items.insert(index, value.clone());
        self.record(Delta::InsertAt { index, value });
        Ok(())
    }

    /// Replaces the element at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> CoreResult<Value> {
        self.check_index(index)?;
        let value = value.into();
        self.column.check_element(&value)?;
        let old = std::mem::replace(&mut self.items[index], value.clone());
        self.record(Delta::SetAt { index, value });
        Ok(old)
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> CoreResult<Value> {
        self.check_index(index)?;
        let old = self.items.remove(index);
        self.record(Delta::RemoveAt { index });
        Ok(old)
    }

    /// Removes the first element equal to `value`. Returns whether one was found.
    ///
    /// The store's removal by value drops every occurrence, so the match is
    /// recorded by position as a `RemoveAt`. A miss records nothing.
    pub fn remove(&mut self, value: impl Into<Value>) -> CoreResult<bool> {
        let value = value.into();
        self.column.check_element(&value)?;
        match self.items.iter().position(|item| *item == value) {
            Some(index) => {
                self.items.remove(index);
                self.record(Delta::RemoveAt { index });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes every occurrence of each value, as a single `Remove` delta.
    /// Returns how many elements were removed; nothing is recorded when none
    /// matched.
    pub fn remove_all<I, V>(&mut self, values: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = self.checked(values)?;
        let before = self.items.len();
        self.items.retain(|item| !values.contains(item));
        let removed = before - self.items.len();
        if removed > 0 {
            self.record(Delta::Remove(values));
        }
        Ok(removed)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.items.clear();
        self.record(Delta::Clear);
    }

    /// Deltas recorded since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[Delta] {
        self.log.pending()
    }

    /// Drains the pending deltas. The list itself is unchanged.
    pub fn flush(&mut self) -> Vec<Delta> {
        self.log.flush()
    }

    fn checked<I, V>(&self, values: I) -> CoreResult<Vec<Value>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .map(|value| {
                let value = value.into();
                self.column.check_element(&value).map(|()| value)
            })
            .collect()
    }

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(CoreError::index_out_of_range(
                self.column.name(),
                index,
                self.items.len(),
            ))
        }
    }

    fn record(&mut self, delta: Delta) {
        trace!(column = self.column.name(), op = %delta.op(), "recorded list delta");
        self.log.record(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CollectionType, ColumnOptions, ColumnRegistry};
    use crate::types::ScalarType;

    fn texts(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    fn column() -> Column {
        let mut reg = ColumnRegistry::new("posts");
        reg.declare_collection(
            "comments",
            CollectionType::List(ScalarType::Text),
            ColumnOptions::new(),
        )
        .unwrap()
        .clone()
    }

    #[test]
    fn push_keeps_duplicates_and_order() {
        let column = column();
        let mut items = Vec::new();
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);

        list.push("a").unwrap();
        list.push("b").unwrap();
        list.push("a").unwrap();

        assert_eq!(list.as_slice(), texts(&["a", "b", "a"]));
        assert_eq!(list.pending().len(), 3);
        assert!(list.pending().iter().all(|d| matches!(d, Delta::Append(v) if v.len() == 1)));
    }

    #[test]
    fn remove_takes_first_match_by_position() {
        let column = column();
        let mut items = texts(&["b", "a", "c", "a"]);
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);

        assert!(list.remove("a").unwrap());
        assert_eq!(list.as_slice(), texts(&["b", "c", "a"]));
        assert_eq!(list.pending(), &[Delta::RemoveAt { index: 1 }]);

        assert!(!list.remove("zzz").unwrap());
        assert_eq!(list.len(), 3);
        assert_eq!(list.pending().len(), 1);
    }

    #[test]
    fn out_of_range_leaves_state_untouched() {
        let column = column();
        let mut items = texts(&["a"]);
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);
        list.push("b").unwrap();

        let err = list.set(2, "x").unwrap_err();
        assert_eq!(err, CoreError::index_out_of_range("comments", 2, 2));
        assert!(list.insert(2, "x").is_err());
        assert!(list.remove_at(5).is_err());

        assert_eq!(list.as_slice(), texts(&["a", "b"]));
        assert_eq!(list.pending().len(), 1);
    }

    #[test]
    fn wrong_element_type_leaves_state_untouched() {
        let column = column();
        let mut items = texts(&["a"]);
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);

        let err = list.push(42).unwrap_err();
        assert_eq!(err, CoreError::type_mismatch("comments", "text", "integer"));
        assert!(list.prepend(true).is_err());
        assert!(list.set(0, Value::Null).is_err());
        assert!(list.insert(0, 1.5).is_err());
        assert!(list.extend([Value::from("ok"), Value::Int(1)]).is_err());
        assert!(list.remove(7).is_err());

        assert_eq!(list.as_slice(), texts(&["a"]));
        assert!(list.pending().is_empty());
    }

    #[test]
    fn index_operations_record_positions() {
        let column = column();
        let mut items = texts(&["a", "c"]);
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);

        list.insert(1, "b").unwrap();
        assert_eq!(list.set(0, "A").unwrap(), Value::from("a"));
        assert_eq!(list.remove_at(2).unwrap(), Value::from("c"));
        list.prepend("z").unwrap();

        assert_eq!(list.as_slice(), texts(&["z", "A", "b"]));
        assert_eq!(
            list.flush(),
            vec![
                Delta::InsertAt { index: 1, value: "b".into() },
                Delta::SetAt { index: 0, value: "A".into() },
                Delta::RemoveAt { index: 2 },
                Delta::Prepend(vec!["z".into()]),
            ]
        );
        assert!(list.pending().is_empty());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn batch_operations_are_single_deltas() {
        let column = column();
        let mut items = Vec::new();
        let mut log = DeltaLog::new();
        let mut list = ListProxy::new(&column, &mut items, &mut log);

        list.extend(["a", "b", "a", "c"]).unwrap();
        list.extend(Vec::<Value>::new()).unwrap();
        assert_eq!(list.remove_all(["a", "c", "q"]).unwrap(), 3);
        assert_eq!(list.remove_all(["q"]).unwrap(), 0);
        assert_eq!(list.as_slice(), texts(&["b"]));
        list.clear();

        assert!(list.is_empty());
        assert_eq!(
            list.pending(),
            &[
                Delta::Append(vec!["a".into(), "b".into(), "a".into(), "c".into()]),
                Delta::Remove(vec!["a".into(), "c".into(), "q".into()]),
                Delta::Clear,
            ]
        );
    }
}
