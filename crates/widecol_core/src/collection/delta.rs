//! Delta descriptors recorded by collection proxies.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One atomic collection update waiting to be written.
///
/// Each descriptor captures exactly one in-memory mutation, never a snapshot
/// of the whole collection. The persistence layer turns them into the
/// store's native collection update operations, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    /// Elements appended to a list, or added to a set.
    Append(Vec<Value>),
    /// Elements prepended to a list.
    ///
    /// An extension to the minimal operation set: the store applies it as
    /// `list = [..] + list`. Layers that only speak the minimal set can
    /// replay it as one `InsertAt { index: 0 }` per element, last first.
    Prepend(Vec<Value>),
    /// Elements removed from a list or set by value. On lists this drops
    /// every occurrence, matching the store's native removal.
    Remove(Vec<Value>),
    /// Collection emptied.
    Clear,
    /// List element replaced.
    SetAt {
        /// Position of the replaced element.
        index: usize,
        /// New element.
        value: Value,
    },
    /// List element inserted before an existing position.
    InsertAt {
        /// Position the new element occupies.
        index: usize,
        /// Inserted element.
        value: Value,
    },
    /// List element removed by position.
    RemoveAt {
        /// Position of the removed element.
        index: usize,
    },
    /// Map entry inserted or overwritten.
    SetKey {
        /// Entry key.
        key: Value,
        /// Entry value.
        value: Value,
    },
    /// Map entry removed.
    RemoveKey {
        /// Entry key.
        key: Value,
    },
}

/// The operation a [`Delta`] performs, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaOp {
    /// See [`Delta::Append`].
    Append,
    /// See [`Delta::Prepend`].
    Prepend,
    /// See [`Delta::Remove`].
    Remove,
    /// See [`Delta::Clear`].
    Clear,
    /// See [`Delta::SetAt`].
    SetAt,
    /// See [`Delta::InsertAt`].
    InsertAt,
    /// See [`Delta::RemoveAt`].
    RemoveAt,
    /// See [`Delta::SetKey`].
    SetKey,
    /// See [`Delta::RemoveKey`].
    RemoveKey,
}

impl DeltaOp {
    /// Returns the operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::Remove => "remove",
            Self::Clear => "clear",
            Self::SetAt => "set_at",
            Self::InsertAt => "insert_at",
            Self::RemoveAt => "remove_at",
            Self::SetKey => "set_key",
            Self::RemoveKey => "remove_key",
        }
    }
}

impl fmt::Display for DeltaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Delta {
    /// Returns the operation this delta performs.
    #[must_use]
    pub const fn op(&self) -> DeltaOp {
        match self {
            Self::Append(_) => DeltaOp::Append,
            Self::Prepend(_) => DeltaOp::Prepend,
            Self::Remove(_) => DeltaOp::Remove,
            Self::Clear => DeltaOp::Clear,
            Self::SetAt { .. } => DeltaOp::SetAt,
            Self::InsertAt { .. } => DeltaOp::InsertAt,
            Self::RemoveAt { .. } => DeltaOp::RemoveAt,
            Self::SetKey { .. } => DeltaOp::SetKey,
            Self::RemoveKey { .. } => DeltaOp::RemoveKey,
        }
    }
}

/// Pending deltas of one collection column, in mutation order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeltaLog {
    pending: Vec<Delta>,
}

impl DeltaLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, delta: Delta) {
        self.pending.push(delta);
    }

    /// Deltas recorded since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[Delta] {
        &self.pending
    }

    /// Drains the log, returning everything recorded since the last flush.
    pub fn flush(&mut self) -> Vec<Delta> {
        std::mem::take(&mut self.pending)
    }

    /// Number of pending deltas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
