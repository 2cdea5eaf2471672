//! Record instances.

use crate::collection::{Delta, DeltaLog, ListProxy, MapProxy, SetProxy};
use crate::error::{CoreError, CoreResult};
use crate::model::RecordType;
use crate::record::attributes::AttributeStore;
use crate::schema::Column;
use crate::types::ColumnKind;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Persistence state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Constructed in memory, never written. Key columns are writable.
    New,
    /// Round-tripped through persistence. Key columns are frozen.
    Loaded,
}

/// One row of a record type, held in memory.
///
/// Instances are not meant to be shared between threads while being
/// mutated; collection proxies borrow the record mutably.
#[derive(Debug)]
pub struct Record {
    record_type: Arc<RecordType>,
    attributes: AttributeStore,
    /// Proxy cache: column position -> pending deltas. Dropped on wholesale
    /// reassignment of the column.
    proxies: BTreeMap<usize, DeltaLog>,
    state: RecordState,
}

impl Record {
    /// Creates a new instance.
    ///
    /// Every column starts from its default (literals are cloned, generators
    /// run fresh, collections without a default start empty). Generated
    /// collection defaults are normalised like a wholesale write. Then
    /// `attributes` are applied through [`bulk_assign`](Self::bulk_assign).
    pub fn new<I, K, V>(record_type: Arc<RecordType>, attributes: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut store = AttributeStore::with_columns(record_type.columns().len());
        for (position, column) in record_type.columns().columns().iter().enumerate() {
            if let Some(value) = column.initial_value() {
                store.set(position, column.coerce(value)?);
            }
        }

        let mut record = Self {
            record_type,
            attributes: store,
            proxies: BTreeMap::new(),
            state: RecordState::New,
        };
        record.bulk_assign(attributes)?;
        Ok(record)
    }

    /// Builds a loaded instance from a persisted row.
    ///
    /// No defaults are applied. Collection columns missing from the row start
    /// empty, since the store does not distinguish null from empty
    /// collections. Names with no column are skipped.
    pub fn hydrate<I, K, V>(record_type: Arc<RecordType>, row: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let registry = record_type.columns();
        let mut store = AttributeStore::with_columns(registry.len());
        for (name, value) in row {
            let name = name.as_ref();
            match registry.position(name) {
                Some(position) => {
                    let value = registry.columns()[position].coerce(value.into())?;
                    store.set(position, value);
                }
                None => debug!(record_type = record_type.name(), column = name, "skipped unknown column"),
            }
        }
        for (position, column) in registry.columns().iter().enumerate() {
            if !store.is_set(position) {
                if let Some(empty) = column.empty_collection() {
                    store.set(position, empty);
                }
            }
        }

        Ok(Self {
            record_type,
            attributes: store,
            proxies: BTreeMap::new(),
            state: RecordState::Loaded,
        })
    }

    /// The record type of this instance.
    #[must_use]
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    /// Persistence state.
    #[must_use]
    pub const fn state(&self) -> RecordState {
        self.state
    }

    /// Whether the instance has not been persisted yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.state == RecordState::New
    }

    /// Whether the instance has been persisted.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == RecordState::Loaded
    }

    /// Marks the instance as persisted, freezing its key columns.
    pub fn mark_loaded(&mut self) {
        self.state = RecordState::Loaded;
    }

    /// The underlying attribute values.
    #[must_use]
    pub fn attribute_store(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Reads an attribute.
    ///
    /// Fails with `MissingAttribute` for a declared column that was never
    /// set, and `UnknownAttribute` for a name that is neither a column nor a
    /// transient attribute set on this instance.
    pub fn get(&self, name: &str) -> CoreResult<&Value> {
        match self.record_type.columns().position(name) {
            Some(position) => self
                .attributes
                .get(position)
                .ok_or_else(|| CoreError::missing_attribute(self.record_type.name(), name)),
            None => self
                .attributes
                .transient(name)
                .ok_or_else(|| CoreError::unknown_attribute(self.record_type.name(), name)),
        }
    }

    /// Writes a declared column.
    ///
    /// Collection columns are replaced wholesale: the column's proxy and any
    /// unflushed deltas are discarded, since the new value is the complete
    /// intended state. Key columns are writable only while the instance is
    /// new.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> CoreResult<()> {
        let registry = self.record_type.columns();
        let position = registry
            .position(name)
            .ok_or_else(|| CoreError::unknown_attribute(self.record_type.name(), name))?;
        let column = &registry.columns()[position];

        if column.is_key() && self.state == RecordState::Loaded {
            return Err(CoreError::key_immutable(self.record_type.name(), name));
        }

        let value = column.coerce(value.into())?;
        if column.is_collection() {
            if let Some(log) = self.proxies.remove(&position) {
                if !log.is_empty() {
                    debug!(
                        record_type = self.record_type.name(),
                        column = name,
                        discarded = log.len(),
                        "wholesale write discarded pending deltas"
                    );
                }
            }
        }
        self.attributes.set(position, value);
        Ok(())
    }

    /// Stores a transient attribute. Intended for virtual setters; a declared
    /// column name is written through [`set`](Self::set) instead.
    pub fn set_transient(&mut self, name: &str, value: impl Into<Value>) -> CoreResult<()> {
        if self.record_type.columns().lookup(name).is_some() {
            return self.set(name, value);
        }
        self.attributes.set_transient(name, value.into());
        Ok(())
    }

    /// Applies each pair in order: declared columns through [`set`](Self::set),
    /// other names through the type's virtual setter for that name.
    ///
    /// Fails with `UnknownAttribute` on the first name with neither. Pairs
    /// before the failing one stay applied.
    pub fn bulk_assign<I, K, V>(&mut self, pairs: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in pairs {
            let name = name.as_ref();
            if self.record_type.columns().lookup(name).is_some() {
                self.set(name, value)?;
            } else if let Some(setter) = self.record_type.virtual_setter(name) {
                setter(self, value.into())?;
            } else {
                return Err(CoreError::unknown_attribute(self.record_type.name(), name));
            }
        }
        Ok(())
    }

    /// Values of the primary key columns (partition key, then clustering
    /// columns). Unset keys read as `Null`.
    #[must_use]
    pub fn key_values(&self) -> Vec<Value> {
        self.record_type
            .columns()
            .key_positions()
            .map(|position| self.attributes.get(position).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Attributes in declaration order, followed by transient attributes.
    /// Unset columns are skipped.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        let columns = self.record_type.columns().columns();
        self.attributes
            .columns()
            .map(move |(position, value)| (columns[position].name(), value))
            .chain(self.attributes.transients())
    }

    /// Mutable list view of a list column.
    pub fn list_mut(&mut self, name: &str) -> CoreResult<ListProxy<'_>> {
        let (position, column) = resolve(&self.record_type, name, ColumnKind::List)?;
        let items = match self.attributes.slot_mut(position).get_or_insert_with(|| Value::List(Vec::new())) {
            Value::List(items) => items,
            other => return Err(CoreError::type_mismatch(name, "list", other.type_name())),
        };
        let log = self.proxies.entry(position).or_default();
        Ok(ListProxy::new(column, items, log))
    }

    /// Mutable set view of a set column.
    pub fn set_mut(&mut self, name: &str) -> CoreResult<SetProxy<'_>> {
        let (position, column) = resolve(&self.record_type, name, ColumnKind::Set)?;
        let items = match self.attributes.slot_mut(position).get_or_insert_with(|| Value::Set(Vec::new())) {
            Value::Set(items) => items,
            other => return Err(CoreError::type_mismatch(name, "set", other.type_name())),
        };
        let log = self.proxies.entry(position).or_default();
        Ok(SetProxy::new(column, items, log))
    }

    /// Mutable map view of a map column.
    pub fn map_mut(&mut self, name: &str) -> CoreResult<MapProxy<'_>> {
        let (position, column) = resolve(&self.record_type, name, ColumnKind::Map)?;
        let entries = match self.attributes.slot_mut(position).get_or_insert_with(|| Value::Map(Vec::new())) {
            Value::Map(entries) => entries,
            other => return Err(CoreError::type_mismatch(name, "map", other.type_name())),
        };
        let log = self.proxies.entry(position).or_default();
        Ok(MapProxy::new(column, entries, log))
    }

    /// Deltas pending on a collection column, without draining them.
    pub fn pending_deltas(&self, name: &str) -> CoreResult<&[Delta]> {
        let position = self.collection_position(name)?;
        Ok(self
            .proxies
            .get(&position)
            .map(DeltaLog::pending)
            .unwrap_or_default())
    }

    /// Drains the pending deltas of one collection column.
    pub fn flush(&mut self, name: &str) -> CoreResult<Vec<Delta>> {
        let position = self.collection_position(name)?;
        let deltas = self
            .proxies
            .get_mut(&position)
            .map(DeltaLog::flush)
            .unwrap_or_default();
        debug!(
            record_type = self.record_type.name(),
            column = name,
            deltas = deltas.len(),
            "flushed collection"
        );
        Ok(deltas)
    }

    /// Drains every collection column with pending deltas, in declaration order.
    pub fn flush_all(&mut self) -> Vec<(String, Vec<Delta>)> {
        let columns = self.record_type.columns().columns();
        let batches: Vec<_> = self
            .proxies
            .iter_mut()
            .filter(|(_, log)| !log.is_empty())
            .map(|(&position, log)| (columns[position].name().to_string(), log.flush()))
            .collect();
        debug!(
            record_type = self.record_type.name(),
            columns = batches.len(),
            "flushed all collections"
        );
        batches
    }

    fn collection_position(&self, name: &str) -> CoreResult<usize> {
        let registry = self.record_type.columns();
        let position = registry
            .position(name)
            .ok_or_else(|| CoreError::unknown_attribute(self.record_type.name(), name))?;
        if registry.columns()[position].is_collection() {
            Ok(position)
        } else {
            Err(CoreError::not_a_collection(name, "collection"))
        }
    }
}

fn resolve<'a>(
    record_type: &'a RecordType,
    name: &str,
    kind: ColumnKind,
) -> CoreResult<(usize, &'a Column)> {
    let registry = record_type.columns();
    let position = registry
        .position(name)
        .ok_or_else(|| CoreError::unknown_attribute(record_type.name(), name))?;
    let column = &registry.columns()[position];
    if column.kind() == kind {
        Ok((position, column))
    } else {
        Err(CoreError::not_a_collection(name, kind.as_str()))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = self.record_type.config().inspect_limit;
        write!(f, "{} {{", self.record_type.name())?;
        for (i, (name, value)) in self.attributes().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            write!(f, "{name}: {}", value.inspect(limit))?;
        }
        f.write_str(" }")
    }
}
