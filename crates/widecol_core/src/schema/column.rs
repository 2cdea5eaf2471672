//! Column descriptors.

use crate::error::{CoreError, CoreResult};
use crate::types::{ClusteringOrder, ColumnKind, ScalarType};
use crate::value::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// A zero-argument default generator, invoked once per new instance.
pub type Generator = Arc<dyn Fn() -> Value + Send + Sync>;

/// Where a column's initial value comes from.
#[derive(Clone)]
pub enum DefaultValue {
    /// A template value, structurally cloned into every new instance.
    Literal(Value),
    /// A generator producing a fresh value for every new instance.
    Generator(Generator),
}

impl DefaultValue {
    /// Creates a literal default.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a generated default.
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(f))
    }

    /// Produces the value for one new instance.
    ///
    /// Literals are cloned so that instances never share collection storage
    /// with each other or with this template.
    #[must_use]
    pub fn produce(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Options for a key column declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Explicitly make this column part of the partition key.
    pub partition: bool,
    /// Generate identifiers for new instances. UUID-family types only.
    pub auto: bool,
    /// Clustering order. Only valid for clustering columns.
    pub order: Option<ClusteringOrder>,
}

impl KeyOptions {
    /// Creates default key options.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            partition: false,
            auto: false,
            order: None,
        }
    }

    /// Requests partition-key status.
    #[must_use]
    pub const fn partition(mut self) -> Self {
        self.partition = true;
        self
    }

    /// Requests generated identifiers.
    #[must_use]
    pub const fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    /// Sets the clustering order.
    #[must_use]
    pub const fn order(mut self, order: ClusteringOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// Options for data and collection column declarations.
#[derive(Debug, Clone, Default)]
pub struct ColumnOptions {
    /// Default value for new instances.
    pub default: Option<DefaultValue>,
}

impl ColumnOptions {
    /// Creates options with no default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::literal(value));
        self
    }

    /// Sets a generated default.
    #[must_use]
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::generator(f));
        self
    }
}

/// Element typing of a collection column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionType {
    /// List of elements.
    List(ScalarType),
    /// Set of elements.
    Set(ScalarType),
    /// Map from keys to values.
    Map(ScalarType, ScalarType),
}

impl CollectionType {
    pub(crate) const fn kind(self) -> ColumnKind {
        match self {
            Self::List(_) => ColumnKind::List,
            Self::Set(_) => ColumnKind::Set,
            Self::Map(..) => ColumnKind::Map,
        }
    }
}

/// Immutable descriptor of one declared column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    element_type: ScalarType,
    value_type: Option<ScalarType>,
    default: Option<DefaultValue>,
    order: Option<ClusteringOrder>,
    auto: bool,
}

impl Column {
    pub(crate) fn key(name: String, kind: ColumnKind, ty: ScalarType, options: KeyOptions) -> Self {
        let default = options
            .auto
            .then(|| DefaultValue::Generator(identifier_generator(ty)));
        Self {
            name,
            kind,
            element_type: ty,
            value_type: None,
            default,
            order: match kind {
                ColumnKind::ClusteringKey => Some(options.order.unwrap_or_default()),
                _ => None,
            },
            auto: options.auto,
        }
    }

    pub(crate) fn data(name: String, ty: ScalarType, default: Option<DefaultValue>) -> Self {
        Self {
            name,
            kind: ColumnKind::Data,
            element_type: ty,
            value_type: None,
            default,
            order: None,
            auto: false,
        }
    }

    pub(crate) fn collection(
        name: String,
        ty: CollectionType,
        default: Option<DefaultValue>,
    ) -> Self {
        let (element_type, value_type) = match ty {
            CollectionType::List(element) | CollectionType::Set(element) => (element, None),
            CollectionType::Map(key, value) => (key, Some(value)),
        };
        Self {
            name,
            kind: ty.kind(),
            element_type,
            value_type,
            default,
            order: None,
            auto: false,
        }
    }

    pub(crate) fn with_default(mut self, default: Option<DefaultValue>) -> Self {
        self.default = default;
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column kind.
    #[must_use]
    pub const fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Scalar type of the column, or of its elements (map keys for maps).
    #[must_use]
    pub const fn element_type(&self) -> ScalarType {
        self.element_type
    }

    /// Value type of a map column.
    #[must_use]
    pub const fn value_type(&self) -> Option<ScalarType> {
        self.value_type
    }

    /// Declared default, if any.
    #[must_use]
    pub const fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Clustering order of a clustering column.
    #[must_use]
    pub const fn order(&self) -> Option<ClusteringOrder> {
        self.order
    }

    /// Whether identifiers are generated for new instances.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.auto
    }

    /// Whether this column is part of the primary key.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        self.kind.is_key()
    }

    /// Whether this column is a list, set or map.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }

    /// Empty collection of this column's kind, `None` for scalar columns.
    #[must_use]
    pub fn empty_collection(&self) -> Option<Value> {
        match self.kind {
            ColumnKind::List => Some(Value::List(Vec::new())),
            ColumnKind::Set => Some(Value::Set(Vec::new())),
            ColumnKind::Map => Some(Value::Map(Vec::new())),
            _ => None,
        }
    }

    /// The value a new instance starts with.
    pub(crate) fn initial_value(&self) -> Option<Value> {
        match &self.default {
            Some(default) => Some(default.produce()),
            None => self.empty_collection(),
        }
    }

    /// Normalises a wholesale value for this column.
    ///
    /// Collection columns accept null (stored as empty), lists and sets,
    /// converting between the two as needed; map columns accept maps only.
    /// Sets and maps are rebuilt into their canonical sorted, unique form
    /// (a repeated map key keeps its last value) and every element must be
    /// admitted by the declared element types.
    pub(crate) fn coerce(&self, value: Value) -> CoreResult<Value> {
        let value = match (self.kind, value) {
            (ColumnKind::List | ColumnKind::Set | ColumnKind::Map, Value::Null) => {
                return Ok(self.empty_collection().unwrap_or(Value::Null));
            }
            (ColumnKind::List, Value::List(items) | Value::Set(items)) => Value::List(items),
            (ColumnKind::Set, Value::List(items) | Value::Set(items)) => Value::set(items),
            (ColumnKind::Map, Value::Map(entries)) => Value::map(entries),
            (ColumnKind::List | ColumnKind::Set | ColumnKind::Map, other) => {
                return Err(CoreError::type_mismatch(
                    &self.name,
                    self.kind.as_str(),
                    other.type_name(),
                ));
            }
            (_, value) => return Ok(value),
        };

        match &value {
            Value::List(items) | Value::Set(items) => {
                items.iter().try_for_each(|item| self.check_element(item))?;
            }
            Value::Map(entries) => {
                entries
                    .iter()
                    .try_for_each(|(key, entry)| self.check_entry(key, entry))?;
            }
            _ => {}
        }
        Ok(value)
    }

    /// Checks a list or set element, or a map key, against the element type.
    pub(crate) fn check_element(&self, value: &Value) -> CoreResult<()> {
        if self.element_type.admits(value) {
            Ok(())
        } else {
            Err(CoreError::type_mismatch(
                &self.name,
                self.element_type.as_str(),
                value.type_name(),
            ))
        }
    }

    /// Checks a map entry against the key and value types.
    pub(crate) fn check_entry(&self, key: &Value, value: &Value) -> CoreResult<()> {
        self.check_element(key)?;
        match self.value_type {
            Some(ty) if !ty.admits(value) => Err(CoreError::type_mismatch(
                &self.name,
                ty.as_str(),
                value.type_name(),
            )),
            _ => Ok(()),
        }
    }
}

fn identifier_generator(ty: ScalarType) -> Generator {
    match ty {
        ScalarType::TimeUuid => Arc::new(|| Value::TimeUuid(Uuid::now_v1(node_id()))),
        _ => Arc::new(|| Value::Uuid(Uuid::new_v4())),
    }
}

/// Random node id for time-based identifiers, with the multicast bit set so
/// it can never collide with a real MAC address.
fn node_id() -> &'static [u8; 6] {
    static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();
    NODE_ID.get_or_init(|| {
        let random = Uuid::new_v4().into_bytes();
        let mut node = [0u8; 6];
        node.copy_from_slice(&random[10..16]);
        node[0] |= 0x01;
        node
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_default_is_cloned() {
        let default = DefaultValue::literal(Value::list(["a"]));
        let mut produced = default.produce();
        if let Value::List(items) = &mut produced {
            items.push("b".into());
        }
        assert_eq!(default.produce(), Value::list(["a"]));
    }

    #[test]
    fn generator_default_runs_each_time() {
        let default = DefaultValue::generator(|| Value::Uuid(Uuid::new_v4()));
        assert_ne!(default.produce(), default.produce());
    }

    #[test]
    fn auto_keys_generate_by_type() {
        let random = Column::key(
            "id".into(),
            ColumnKind::PartitionKey,
            ScalarType::Uuid,
            KeyOptions::new().auto(),
        );
        let timed = Column::key(
            "at".into(),
            ColumnKind::ClusteringKey,
            ScalarType::TimeUuid,
            KeyOptions::new().auto(),
        );

        let random = random.initial_value().unwrap();
        let timed = timed.initial_value().unwrap();
        assert_eq!(random.as_uuid().unwrap().get_version_num(), 4);
        assert!(matches!(timed, Value::TimeUuid(_)));
        assert_eq!(timed.as_uuid().unwrap().get_version_num(), 1);
    }

    #[test]
    fn clustering_columns_default_to_ascending() {
        let column = Column::key(
            "at".into(),
            ColumnKind::ClusteringKey,
            ScalarType::Timestamp,
            KeyOptions::new(),
        );
        assert_eq!(column.order(), Some(ClusteringOrder::Asc));
    }

    #[test]
    fn coerce_collections() {
        let tags = Column::collection("tags".into(), CollectionType::Set(ScalarType::Text), None);
        assert_eq!(
            tags.coerce(Value::list(["b", "a", "b"])).unwrap(),
            Value::set(["a", "b"])
        );
        assert_eq!(tags.coerce(Value::Null).unwrap(), Value::Set(Vec::new()));
        assert!(matches!(
            tags.coerce(Value::Int(1)),
            Err(CoreError::TypeMismatch { .. })
        ));

        let title = Column::data("title".into(), ScalarType::Text, None);
        assert_eq!(title.coerce(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn coerce_rebuilds_maps() {
        let meta = Column::collection(
            "meta".into(),
            CollectionType::Map(ScalarType::Text, ScalarType::Int),
            None,
        );
        let raw = Value::Map(vec![
            ("c".into(), Value::Int(1)),
            ("a".into(), Value::Int(2)),
            ("c".into(), Value::Int(3)),
        ]);
        assert_eq!(
            meta.coerce(raw).unwrap(),
            Value::map([("a", 2), ("c", 3)])
        );
    }

    #[test]
    fn coerce_checks_element_types() {
        let names = Column::collection("names".into(), CollectionType::List(ScalarType::Text), None);
        let err = names.coerce(Value::list([Value::from("a"), Value::Int(1)])).unwrap_err();
        assert_eq!(err, CoreError::type_mismatch("names", "text", "integer"));

        let meta = Column::collection(
            "meta".into(),
            CollectionType::Map(ScalarType::Text, ScalarType::Int),
            None,
        );
        assert!(meta.coerce(Value::map([(true, 1)])).is_err());
        assert!(meta.coerce(Value::map([("k", "not an int")])).is_err());
        assert!(meta.check_entry(&"k".into(), &Value::Int(1)).is_ok());
    }
}
