//! Per-record-type column registry.

use crate::error::{CoreError, CoreResult};
use crate::schema::column::{CollectionType, Column, ColumnOptions, DefaultValue, KeyOptions};
use crate::types::{ColumnKind, ScalarType};
use std::collections::HashMap;
use tracing::debug;

/// The declared columns of one record type.
///
/// Populated once while the type is being declared and read-only afterwards,
/// so concurrent readers need no synchronization. Columns keep their
/// declaration order, which is also the attribute order of every instance.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    /// Record type name, used in error messages.
    record_type: String,
    /// Columns in declaration order.
    columns: Vec<Column>,
    /// Column name -> position in `columns`.
    index: HashMap<String, usize>,
    /// Positions of partition key columns, in declaration order.
    partition_keys: Vec<usize>,
    /// Positions of clustering columns, in declaration order.
    clustering: Vec<usize>,
}

impl ColumnRegistry {
    /// Creates an empty registry for the named record type.
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            columns: Vec::new(),
            index: HashMap::new(),
            partition_keys: Vec::new(),
            clustering: Vec::new(),
        }
    }

    /// Declares a key column.
    ///
    /// The first key becomes the partition key; later keys are clustering
    /// columns unless they explicitly ask to join the partition key.
    pub fn declare_key(
        &mut self,
        name: impl Into<String>,
        ty: ScalarType,
        options: KeyOptions,
    ) -> CoreResult<&Column> {
        let name = self.check_name(name.into())?;

        if options.auto && !ty.is_identifier() {
            return Err(CoreError::declaration(
                &self.record_type,
                format!("auto key {name} must be uuid or timeuuid, not {ty}"),
            ));
        }

        let kind = if options.partition || self.partition_keys.is_empty() {
            ColumnKind::PartitionKey
        } else {
            ColumnKind::ClusteringKey
        };

        if kind == ColumnKind::PartitionKey && options.order.is_some() {
            return Err(CoreError::declaration(
                &self.record_type,
                format!("partition key {name} can't have a clustering order"),
            ));
        }

        let position = self.push(Column::key(name, kind, ty, options));
        match kind {
            ColumnKind::PartitionKey => self.partition_keys.push(position),
            _ => self.clustering.push(position),
        }
        Ok(&self.columns[position])
    }

    /// Declares a scalar data column.
    pub fn declare_data(
        &mut self,
        name: impl Into<String>,
        ty: ScalarType,
        options: ColumnOptions,
    ) -> CoreResult<&Column> {
        let name = self.check_name(name.into())?;
        let position = self.push(Column::data(name, ty, options.default));
        Ok(&self.columns[position])
    }

    /// Declares a list, set or map column.
    ///
    /// Without an explicit default, new instances start with an empty
    /// collection. A literal default must be a collection of the same kind.
    pub fn declare_collection(
        &mut self,
        name: impl Into<String>,
        ty: CollectionType,
        options: ColumnOptions,
    ) -> CoreResult<&Column> {
        let name = self.check_name(name.into())?;
        let column = Column::collection(name, ty, None);

        let default = match options.default {
            Some(DefaultValue::Literal(value)) => {
                let value = column.coerce(value).map_err(|err| {
                    CoreError::declaration(&self.record_type, format!("bad default: {err}"))
                })?;
                Some(DefaultValue::Literal(value))
            }
            other => other,
        };

        let position = self.push(column.with_default(default));
        Ok(&self.columns[position])
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&pos| &self.columns[pos])
    }

    /// Position of a column in declaration order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the record type this registry describes.
    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// All columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Partition key columns in declaration order.
    pub fn partition_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.partition_keys.iter().map(|&pos| &self.columns[pos])
    }

    /// Clustering columns in declaration order.
    pub fn clustering_columns(&self) -> impl Iterator<Item = &Column> {
        self.clustering.iter().map(|&pos| &self.columns[pos])
    }

    /// Primary key columns: partition key first, then clustering columns.
    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.partition_key_columns().chain(self.clustering_columns())
    }

    /// Positions of the primary key columns, in primary key order.
    pub(crate) fn key_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.partition_keys
            .iter()
            .chain(self.clustering.iter())
            .copied()
    }

    /// Non-key columns in declaration order.
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| !column.is_key())
    }

    /// Number of declared columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no columns are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn check_name(&self, name: String) -> CoreResult<String> {
        if name.is_empty() {
            return Err(CoreError::declaration(
                &self.record_type,
                "column name can't be empty",
            ));
        }
        if self.index.contains_key(&name) {
            return Err(CoreError::declaration(
                &self.record_type,
                format!("column {name} is already declared"),
            ));
        }
        Ok(name)
    }

    fn push(&mut self, column: Column) -> usize {
        debug!(
            record_type = %self.record_type,
            column = column.name(),
            kind = %column.kind(),
            ty = %column.element_type(),
            "declared column"
        );
        let position = self.columns.len();
        self.index.insert(column.name().to_string(), position);
        self.columns.push(column);
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusteringOrder;
    use crate::value::Value;

    fn registry() -> ColumnRegistry {
        ColumnRegistry::new("posts")
    }

    #[test]
    fn first_key_is_partition_key() {
        let mut reg = registry();
        reg.declare_key("blog", ScalarType::Text, KeyOptions::new())
            .unwrap();
        reg.declare_key("id", ScalarType::TimeUuid, KeyOptions::new())
            .unwrap();
        reg.declare_key("rev", ScalarType::Int, KeyOptions::new())
            .unwrap();

        assert_eq!(reg.lookup("blog").unwrap().kind(), ColumnKind::PartitionKey);
        let clustering: Vec<_> = reg.clustering_columns().map(Column::name).collect();
        assert_eq!(clustering, ["id", "rev"]);
    }

    #[test]
    fn explicit_partition_extends_partition_key() {
        let mut reg = registry();
        reg.declare_key("blog", ScalarType::Text, KeyOptions::new())
            .unwrap();
        reg.declare_key("year", ScalarType::Int, KeyOptions::new().partition())
            .unwrap();
        reg.declare_key("id", ScalarType::Uuid, KeyOptions::new())
            .unwrap();

        let partition: Vec<_> = reg.partition_key_columns().map(Column::name).collect();
        assert_eq!(partition, ["blog", "year"]);
        let keys: Vec<_> = reg.key_columns().map(Column::name).collect();
        assert_eq!(keys, ["blog", "year", "id"]);
    }

    #[test]
    fn auto_requires_identifier_type() {
        let mut reg = registry();
        let err = reg
            .declare_key("id", ScalarType::Int, KeyOptions::new().auto())
            .unwrap_err();
        assert!(matches!(err, CoreError::Declaration { .. }));
        assert!(reg.is_empty());

        reg.declare_key("id", ScalarType::Uuid, KeyOptions::new().auto())
            .unwrap();
        assert!(reg.lookup("id").unwrap().is_auto());
    }

    #[test]
    fn partition_key_rejects_order() {
        let mut reg = registry();
        let err = reg
            .declare_key(
                "id",
                ScalarType::Uuid,
                KeyOptions::new().order(ClusteringOrder::Desc),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Declaration { .. }));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut reg = registry();
        reg.declare_data("title", ScalarType::Text, ColumnOptions::new())
            .unwrap();
        assert!(reg
            .declare_data("title", ScalarType::Text, ColumnOptions::new())
            .is_err());
    }

    #[test]
    fn collection_default_must_match_kind() {
        let mut reg = registry();
        let err = reg
            .declare_collection(
                "tags",
                CollectionType::Set(ScalarType::Text),
                ColumnOptions::new().default_value("nope"),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Declaration { .. }));

        let column = reg
            .declare_collection(
                "tags",
                CollectionType::Set(ScalarType::Text),
                ColumnOptions::new().default_value(Value::list(["b", "a"])),
            )
            .unwrap();
        assert_eq!(column.initial_value(), Some(Value::set(["a", "b"])));
    }

    #[test]
    fn lookup_and_introspection() {
        let mut reg = registry();
        reg.declare_key("id", ScalarType::Uuid, KeyOptions::new())
            .unwrap();
        reg.declare_data("title", ScalarType::Text, ColumnOptions::new())
            .unwrap();
        reg.declare_collection(
            "meta",
            CollectionType::Map(ScalarType::Text, ScalarType::Int),
            ColumnOptions::new(),
        )
        .unwrap();

        assert!(reg.lookup("nope").is_none());
        assert_eq!(reg.position("meta"), Some(2));
        assert_eq!(reg.lookup("meta").unwrap().value_type(), Some(ScalarType::Int));
        let data: Vec<_> = reg.data_columns().map(Column::name).collect();
        assert_eq!(data, ["title", "meta"]);
        assert_eq!(reg.len(), 3);
    }
}
