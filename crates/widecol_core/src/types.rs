//! Core type definitions for widecol.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar column type, as declared on a column.
///
/// Collections are typed by the scalar type of their elements (and of their
/// values, for maps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    /// ASCII text.
    Ascii,
    /// UTF-8 text.
    Text,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    BigInt,
    /// Boolean.
    Boolean,
    /// 64-bit float.
    Double,
    /// Arbitrary bytes.
    Blob,
    /// Milliseconds since the Unix epoch.
    Timestamp,
    /// Random (version 4) UUID.
    Uuid,
    /// Time-based (version 1) UUID.
    TimeUuid,
}

impl ScalarType {
    /// Returns true for the UUID family, the only types that may be
    /// auto-generated.
    #[must_use]
    pub const fn is_identifier(self) -> bool {
        matches!(self, Self::Uuid | Self::TimeUuid)
    }

    /// Whether `value` has the shape this type stores.
    ///
    /// A shape check only: integer width is not enforced, and `Uuid`
    /// columns also take time-based identifiers. `Null` is never admitted,
    /// since collections can't hold nulls.
    #[must_use]
    pub fn admits(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Ascii, Value::Text(s)) => s.is_ascii(),
            (Self::Text, Value::Text(_))
            | (Self::Int | Self::BigInt, Value::Int(_))
            | (Self::Boolean, Value::Bool(_))
            | (Self::Double, Value::Double(_))
            | (Self::Blob, Value::Blob(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::Uuid, Value::Uuid(_) | Value::TimeUuid(_))
            | (Self::TimeUuid, Value::TimeUuid(_)) => true,
            _ => false,
        }
    }

    /// Returns the type name as it appears in table definitions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Text => "text",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Double => "double",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
            Self::TimeUuid => "timeuuid",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role a column plays in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Part of the partition key.
    PartitionKey,
    /// Clustering column, ordering rows within a partition.
    ClusteringKey,
    /// Scalar data column.
    Data,
    /// Ordered list collection.
    List,
    /// Unordered set collection.
    Set,
    /// Key-value map collection.
    Map,
}

impl ColumnKind {
    /// Returns true for partition and clustering columns.
    #[must_use]
    pub const fn is_key(self) -> bool {
        matches!(self, Self::PartitionKey | Self::ClusteringKey)
    }

    /// Returns true for list, set and map columns.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(self, Self::List | Self::Set | Self::Map)
    }

    /// Returns the kind name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PartitionKey => "partition key",
            Self::ClusteringKey => "clustering key",
            Self::Data => "data",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of a clustering column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusteringOrder {
    /// Ascending (the store's default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Consistency level a scope asks the transport to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consistency {
    /// A single replica.
    One,
    /// Two replicas.
    Two,
    /// A majority of replicas across all data centers.
    #[default]
    Quorum,
    /// A majority of replicas in the local data center.
    LocalQuorum,
    /// A majority of replicas in every data center.
    EachQuorum,
    /// Every replica.
    All,
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Quorum => "QUORUM",
            Self::LocalQuorum => "LOCAL_QUORUM",
            Self::EachQuorum => "EACH_QUORUM",
            Self::All => "ALL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_family() {
        assert!(ScalarType::Uuid.is_identifier());
        assert!(ScalarType::TimeUuid.is_identifier());
        assert!(!ScalarType::Text.is_identifier());
        assert!(!ScalarType::BigInt.is_identifier());
    }

    #[test]
    fn admits_checks_shape() {
        assert!(ScalarType::Text.admits(&Value::from("x")));
        assert!(!ScalarType::Text.admits(&Value::Int(42)));
        assert!(ScalarType::Ascii.admits(&Value::from("plain")));
        assert!(!ScalarType::Ascii.admits(&Value::from("caf\u{e9}")));
        assert!(ScalarType::Int.admits(&Value::Int(i64::MAX)));
        assert!(!ScalarType::Double.admits(&Value::Int(1)));

        let id = uuid::Uuid::nil();
        assert!(ScalarType::Uuid.admits(&Value::TimeUuid(id)));
        assert!(!ScalarType::TimeUuid.admits(&Value::Uuid(id)));
        assert!(!ScalarType::Text.admits(&Value::Null));
    }

    #[test]
    fn kind_predicates() {
        assert!(ColumnKind::PartitionKey.is_key());
        assert!(ColumnKind::ClusteringKey.is_key());
        assert!(!ColumnKind::Data.is_key());
        assert!(ColumnKind::Map.is_collection());
        assert!(!ColumnKind::Data.is_collection());
    }

    #[test]
    fn consistency_display() {
        assert_eq!(format!("{}", Consistency::LocalQuorum), "LOCAL_QUORUM");
        assert_eq!(Consistency::default(), Consistency::Quorum);
    }
}
