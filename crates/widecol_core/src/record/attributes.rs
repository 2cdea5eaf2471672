//! Per-instance attribute storage.

use crate::value::Value;

/// Attribute values of one record instance.
///
/// Declared columns live in slots indexed by column position, so iteration
/// follows declaration order and an unset column is simply an empty slot.
/// Transient attributes (set through virtual setters) follow, in the order
/// they were first set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeStore {
    slots: Vec<Option<Value>>,
    transient: Vec<(String, Value)>,
}

impl AttributeStore {
    /// Creates a store with `columns` unset slots.
    #[must_use]
    pub fn with_columns(columns: usize) -> Self {
        Self {
            slots: vec![None; columns],
            transient: Vec::new(),
        }
    }

    /// Value of the column at `position`, `None` when unset.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Stores the value of the column at `position`.
    pub fn set(&mut self, position: usize, value: Value) {
        self.slots[position] = Some(value);
    }

    /// Whether the column at `position` has a value.
    #[must_use]
    pub fn is_set(&self, position: usize) -> bool {
        self.get(position).is_some()
    }

    pub(crate) fn slot_mut(&mut self, position: usize) -> &mut Option<Value> {
        &mut self.slots[position]
    }

    /// Value of a transient attribute.
    #[must_use]
    pub fn transient(&self, name: &str) -> Option<&Value> {
        self.transient
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Stores a transient attribute, keeping its first-set position.
    pub fn set_transient(&mut self, name: &str, value: Value) {
        match self.transient.iter_mut().find(|(key, _)| key == name) {
            Some(existing) => existing.1 = value,
            None => self.transient.push((name.to_string(), value)),
        }
    }

    /// Set column values with their positions, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| slot.as_ref().map(|value| (pos, value)))
    }

    /// Transient attributes in first-set order.
    pub fn transients(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.transient
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_until_assigned() {
        let mut store = AttributeStore::with_columns(2);
        assert!(!store.is_set(0));
        assert_eq!(store.get(1), None);
        assert_eq!(store.get(9), None);

        store.set(1, Value::Int(5));
        assert_eq!(store.get(1), Some(&Value::Int(5)));
        let set: Vec<_> = store.columns().map(|(pos, _)| pos).collect();
        assert_eq!(set, [1]);
    }

    #[test]
    fn empty_collection_is_distinct_from_unset() {
        let mut store = AttributeStore::with_columns(1);
        store.set(0, Value::Set(Vec::new()));
        assert!(store.is_set(0));
    }

    #[test]
    fn transients_keep_first_set_order() {
        let mut store = AttributeStore::default();
        store.set_transient("b", Value::Int(1));
        store.set_transient("a", Value::Int(2));
        store.set_transient("b", Value::Int(3));

        let names: Vec<_> = store.transients().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(store.transient("b"), Some(&Value::Int(3)));
        assert_eq!(store.transient("zzz"), None);
    }
}
