//! Property-based test generators using proptest.
//!
//! Provides strategies for attribute values, collection elements and
//! mutation scripts that can be replayed against a collection proxy.

use proptest::prelude::*;
use widecol_core::{ListProxy, Value};

/// Strategy for generating scalar values of any non-collection variant.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("finite doubles only", |n| n.is_finite())
            .prop_map(Value::Double),
        text_element_strategy(),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Blob),
        prop::array::uniform16(any::<u8>())
            .prop_map(|bytes| Value::Uuid(uuid::Uuid::from_bytes(bytes))),
    ]
}

/// Strategy for generating short text values, suitable as collection elements.
pub fn text_element_strategy() -> impl Strategy<Value = Value> {
    prop::string::string_regex("[a-z]{1,8}")
        .expect("Invalid regex")
        .prop_map(Value::Text)
}

/// Strategy for generating a sequence of text elements.
pub fn elements_strategy(max_len: usize) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(text_element_strategy(), 0..=max_len)
}

/// A single mutation applied through a list proxy.
#[derive(Debug, Clone)]
pub enum ListMutation {
    /// Append one element.
    Push(Value),
    /// Prepend one element.
    Prepend(Value),
    /// Insert at an index, reduced modulo the list length.
    Insert {
        /// Index hint
        index: usize,
        /// Element
        value: Value,
    },
    /// Replace at an index, reduced modulo the list length.
    Set {
        /// Index hint
        index: usize,
        /// Element
        value: Value,
    },
    /// Remove at an index, reduced modulo the list length.
    RemoveAt {
        /// Index hint
        index: usize,
    },
    /// Remove the first occurrence of an element.
    Remove(Value),
    /// Remove every element.
    Clear,
}

impl ListMutation {
    /// Replays the mutation against `list` and against `model`, a plain
    /// vector tracking the expected contents.
    ///
    /// Index-based mutations on an empty list are skipped, and removing an
    /// absent value records nothing, so every applied mutation records
    /// exactly one delta. Returns whether it was applied.
    pub fn apply(&self, list: &mut ListProxy<'_>, model: &mut Vec<Value>) -> bool {
        match self {
            Self::Push(value) => {
                list.push(value.clone()).expect("text element");
                model.push(value.clone());
            }
            Self::Prepend(value) => {
                list.prepend(value.clone()).expect("text element");
                model.insert(0, value.clone());
            }
            Self::Insert { index, value } => {
                if model.is_empty() {
                    return false;
                }
                let index = index % model.len();
                list.insert(index, value.clone()).expect("index in range");
                model.insert(index, value.clone());
            }
            Self::Set { index, value } => {
                if model.is_empty() {
                    return false;
                }
                let index = index % model.len();
                list.set(index, value.clone()).expect("index in range");
                model[index] = value.clone();
            }
            Self::RemoveAt { index } => {
                if model.is_empty() {
                    return false;
                }
                let index = index % model.len();
                list.remove_at(index).expect("index in range");
                model.remove(index);
            }
            Self::Remove(value) => {
                let found = list.remove(value.clone()).expect("text element");
                if let Some(pos) = model.iter().position(|item| item == value) {
                    model.remove(pos);
                }
                return found;
            }
            Self::Clear => {
                list.clear();
                model.clear();
            }
        }
        true
    }
}

/// Strategy for generating raw, unnormalised set contents: unsorted text
/// members with duplicates.
pub fn raw_set_strategy(max_len: usize) -> impl Strategy<Value = Value> {
    prop::collection::vec(short_text(), 0..=max_len)
        .prop_map(|members| Value::Set(members.into_iter().map(Value::Text).collect()))
}

/// Strategy for generating raw, unnormalised map contents: text pairs in
/// arbitrary order with repeated keys.
pub fn raw_map_strategy(max_len: usize) -> impl Strategy<Value = Value> {
    prop::collection::vec((short_text(), short_text()), 0..=max_len).prop_map(|pairs| {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (Value::Text(k), Value::Text(v)))
                .collect(),
        )
    })
}

// A narrow alphabet so duplicates come up often.
fn short_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-d]{1,2}").expect("Invalid regex")
}

/// Strategy for generating list mutations.
pub fn list_mutation_strategy() -> impl Strategy<Value = ListMutation> {
    prop_oneof![
        4 => text_element_strategy().prop_map(ListMutation::Push),
        2 => text_element_strategy().prop_map(ListMutation::Prepend),
        2 => (any::<usize>(), text_element_strategy())
            .prop_map(|(index, value)| ListMutation::Insert { index, value }),
        2 => (any::<usize>(), text_element_strategy())
            .prop_map(|(index, value)| ListMutation::Set { index, value }),
        1 => any::<usize>().prop_map(|index| ListMutation::RemoveAt { index }),
        2 => text_element_strategy().prop_map(ListMutation::Remove),
        1 => Just(ListMutation::Clear),
    ]
}

/// Strategy for generating a sequence of list mutations.
pub fn list_script_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<ListMutation>> {
    prop::collection::vec(list_mutation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
