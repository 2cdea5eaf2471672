//! Record equality.
//!
//! Two instances are equal when they belong to the same record type and
//! their primary keys are equal. An instance whose key is not fully assigned
//! has no key identity and is equal only to itself.

use crate::record::instance::Record;
use crate::value::Value;
use std::ptr;
use std::sync::Arc;

impl Record {
    /// Whether every key column holds a non-null value.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.key_values().iter().all(|value| !value.is_null())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        if !Arc::ptr_eq(self.record_type(), other.record_type()) {
            return false;
        }
        let (ours, theirs) = (self.key_values(), other.key_values());
        if ours.iter().chain(&theirs).any(Value::is_null) {
            return false;
        }
        ours == theirs
    }
}

impl Eq for Record {}

#[cfg(test)]
mod tests {
    use crate::model::RecordType;
    use crate::schema::{ColumnOptions, KeyOptions};
    use crate::types::ScalarType;
    use crate::value::Value;
    use std::sync::Arc;

    fn comments(table: &str) -> Arc<RecordType> {
        RecordType::builder(table)
            .key("post", ScalarType::Text, KeyOptions::new())
            .key("seq", ScalarType::Int, KeyOptions::new())
            .column("body", ScalarType::Text, ColumnOptions::new())
            .build()
            .unwrap()
    }

    #[test]
    fn equal_keys_are_equal_regardless_of_data() {
        let ty = comments("comments");
        let a = ty
            .new_record([("post", Value::from("p")), ("seq", Value::Int(1)), ("body", "x".into())])
            .unwrap();
        let b = ty
            .hydrate([("post", Value::from("p")), ("seq", Value::Int(1)), ("body", "y".into())])
            .unwrap();
        let c = ty
            .new_record([("post", Value::from("p")), ("seq", Value::Int(2))])
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn different_types_never_equal() {
        let (first, second) = (comments("comments"), comments("replies"));
        let a = first.new_record([("post", Value::from("p")), ("seq", Value::Int(1))]).unwrap();
        let b = second.new_record([("post", Value::from("p")), ("seq", Value::Int(1))]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn incomplete_key_falls_back_to_identity() {
        let ty = comments("comments");
        let a = ty.new_record([("post", "p")]).unwrap();
        let b = ty.new_record([("post", "p")]).unwrap();

        assert!(!a.has_key());
        assert_ne!(a, b);
        assert!(a.eq(&a));
    }
}
