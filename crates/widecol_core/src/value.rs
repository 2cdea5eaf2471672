//! Dynamic column value type.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A dynamic column value.
///
/// Records are schemaless on the wire, so every attribute holds a `Value`.
/// Collections keep a canonical in-memory form: sets are sorted and unique,
/// maps are sorted by unique key. Values are totally ordered (doubles use
/// `total_cmp`), which lets any of them act as a set element or map key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (int and bigint columns).
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// Text string (text and ascii columns).
    Text(String),
    /// Byte string.
    Blob(Vec<u8>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// Random UUID.
    Uuid(Uuid),
    /// Time-based UUID.
    TimeUuid(Uuid),
    /// Ordered list; duplicates allowed.
    List(Vec<Value>),
    /// Set of unique values, kept sorted.
    Set(Vec<Value>),
    /// Map of unique keys to values, kept sorted by key.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Creates a list value.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Creates a set value, sorting and removing duplicates.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut elements: Vec<Value> = items.into_iter().map(Into::into).collect();
        elements.sort();
        elements.dedup();
        Value::Set(elements)
    }

    /// Creates a map value sorted by key. When a key repeats, the later value wins.
    pub fn map<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        for (key, value) in pairs {
            let (key, value) = (key.into(), value.into());
            match entries.binary_search_by(|(k, _)| k.cmp(&key)) {
                Ok(pos) => entries[pos].1 = value,
                Err(pos) => entries.insert(pos, (key, value)),
            }
        }
        Value::Map(entries)
    }

    /// Returns a short name for the value's shape, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
            Value::TimeUuid(_) => "timeuuid",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Double(_) => 3,
            Value::Text(_) => 4,
            Value::Blob(_) => 5,
            Value::Timestamp(_) => 6,
            Value::Uuid(_) => 7,
            Value::TimeUuid(_) => 8,
            Value::List(_) => 9,
            Value::Set(_) => 10,
            Value::Map(_) => 11,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a list, set or map.
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Set(_) | Value::Map(_))
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a double, if it is one.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string, if it is a text string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a UUID, if it is either identifier type.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(id) | Value::TimeUuid(id) => Some(*id),
            _ => None,
        }
    }

    /// Get this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a set, if it is one.
    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Get this value as a map, if it is one.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in this map value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        let entries = self.as_map()?;
        entries
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|pos| &entries[pos].1)
    }

    /// Returns a displayable view that renders at most `limit` collection
    /// elements before eliding the rest.
    #[must_use]
    pub fn inspect(&self, limit: usize) -> Inspect<'_> {
        Inspect { value: self, limit }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) | (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) | (Value::TimeUuid(a), Value::TimeUuid(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

/// Diagnostic rendering of a [`Value`], see [`Value::inspect`].
pub struct Inspect<'a> {
    value: &'a Value,
    limit: usize,
}

impl Inspect<'_> {
    fn write_seq<'v>(
        &self,
        f: &mut fmt::Formatter<'_>,
        open: &str,
        close: &str,
        items: impl ExactSizeIterator<Item = &'v Value>,
    ) -> fmt::Result {
        let total = items.len();
        f.write_str(open)?;
        for (i, item) in items.take(self.limit).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", item.inspect(self.limit))?;
        }
        if total > self.limit {
            f.write_str(if self.limit == 0 { "..." } else { ", ..." })?;
        }
        f.write_str(close)
    }
}

impl fmt::Display for Inspect<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) | Value::Timestamp(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n:?}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Blob(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            // Identifiers render bare so they read like the key they are.
            Value::Uuid(id) | Value::TimeUuid(id) => write!(f, "{id}"),
            Value::List(items) => self.write_seq(f, "[", "]", items.iter()),
            Value::Set(items) => self.write_seq(f, "{", "}", items.iter()),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().take(self.limit).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key.inspect(self.limit), value.inspect(self.limit))?;
                }
                if entries.len() > self.limit {
                    f.write_str(if self.limit == 0 { "..." } else { ", ..." })?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect(usize::MAX))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Blob(b.to_vec())
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Uuid(id)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_sorted_and_unique() {
        let set = Value::set(["b", "a", "b", "c"]);
        assert_eq!(set, Value::Set(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn map_later_duplicate_wins() {
        let map = Value::map([("z", 1), ("a", 2), ("z", 3)]);
        let entries = map.as_map().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, Value::from("a"));
        assert_eq!(map.get(&"z".into()), Some(&Value::Int(3)));
        assert_eq!(map.get(&"missing".into()), None);
    }

    #[test]
    fn ordering_is_total_across_variants() {
        let mut values = vec![
            Value::Text("x".into()),
            Value::Null,
            Value::Double(f64::NAN),
            Value::Int(3),
            Value::Double(1.5),
        ];
        values.sort();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Int(3));
        assert_eq!(values[2], Value::Double(1.5));
        assert!(values[3].as_double().unwrap().is_nan());
        assert_eq!(values[4], Value::Text("x".into()));
    }

    #[test]
    fn nan_equals_itself() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    }

    #[test]
    fn identifier_variants_are_distinct() {
        let id = Uuid::new_v4();
        assert_ne!(Value::Uuid(id), Value::TimeUuid(id));
        assert_eq!(Value::TimeUuid(id).as_uuid(), Some(id));
    }

    #[test]
    fn display_formats() {
        let id = Uuid::nil();
        assert_eq!(Value::Uuid(id).to_string(), id.to_string());
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "0xdead");
        assert_eq!(Value::list([1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::set(["a"]).to_string(), "{\"a\"}");
        assert_eq!(Value::map([("k", true)]).to_string(), "{\"k\": true}");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn inspect_elides_long_collections() {
        let list = Value::list([1, 2, 3, 4]);
        assert_eq!(list.inspect(2).to_string(), "[1, 2, ...]");
        assert_eq!(list.inspect(0).to_string(), "[...]");
        assert_eq!(list.inspect(4).to_string(), "[1, 2, 3, 4]");
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(vec![1u8, 2]), Value::Blob(vec![1, 2]));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    proptest::proptest! {
        #[test]
        fn set_construction_matches_btreeset(items in proptest::collection::vec(-50i64..50, 0..40)) {
            let expected: Vec<Value> = items
                .iter()
                .copied()
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .map(Value::Int)
                .collect();
            proptest::prop_assert_eq!(Value::set(items), Value::Set(expected));
        }

        #[test]
        fn map_keys_sorted_and_unique(pairs in proptest::collection::vec(("[a-e]", 0i64..9), 0..20)) {
            let map = Value::map(pairs);
            let keys: Vec<_> = map.as_map().unwrap().iter().map(|(k, _)| k).collect();
            proptest::prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
