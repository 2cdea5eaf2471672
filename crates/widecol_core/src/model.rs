//! Record types.
//!
//! A [`RecordType`] is the static description of one table: its columns,
//! virtual attribute setters, configuration and current-scope slot. It is
//! declared once through [`RecordType::builder`] and shared as an `Arc` by
//! every instance.
//!
//! # Example
//!
//! ```rust
//! use widecol_core::{
//!     CollectionType, ColumnOptions, KeyOptions, RecordType, ScalarType, Value,
//! };
//!
//! let posts = RecordType::builder("posts")
//!     .key("id", ScalarType::Uuid, KeyOptions::new().auto())
//!     .column("title", ScalarType::Text, ColumnOptions::new())
//!     .collection("tags", CollectionType::Set(ScalarType::Text), ColumnOptions::new())
//!     .build()
//!     .unwrap();
//!
//! let mut post = posts.new_record([("title", "Hello")]).unwrap();
//! post.set_mut("tags").unwrap().insert("rust").unwrap();
//! assert_eq!(post.get("title").unwrap(), &Value::from("Hello"));
//! ```

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::record::Record;
use crate::schema::{CollectionType, Column, ColumnOptions, ColumnRegistry, KeyOptions};
use crate::scope::{Scope, ScopeContext};
use crate::types::ScalarType;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Setter for an attribute that has no column, consulted by bulk assignment.
pub type VirtualSetter = Arc<dyn Fn(&mut Record, Value) -> CoreResult<()> + Send + Sync>;

/// Static description of a record type.
pub struct RecordType {
    name: String,
    config: Config,
    columns: ColumnRegistry,
    virtual_setters: HashMap<String, VirtualSetter>,
    scopes: ScopeContext,
}

impl RecordType {
    /// Starts declaring a record type stored in `table`.
    pub fn builder(table: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(table.into())
    }

    /// Record type (and table) name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the type was declared with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Declared columns.
    #[must_use]
    pub fn columns(&self) -> &ColumnRegistry {
        &self.columns
    }

    /// Looks up a declared column.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Column> {
        self.columns.lookup(name)
    }

    /// Whether bulk assignment accepts `name`, as a column or a virtual attribute.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        self.columns.lookup(name).is_some() || self.virtual_setters.contains_key(name)
    }

    pub(crate) fn virtual_setter(&self, name: &str) -> Option<VirtualSetter> {
        self.virtual_setters.get(name).cloned()
    }

    /// Creates a new instance seeded from column defaults, then bulk-assigns
    /// `attributes`.
    pub fn new_record<I, K, V>(self: &Arc<Self>, attributes: I) -> CoreResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Record::new(Arc::clone(self), attributes)
    }

    /// Builds a loaded instance from a row returned by the persistence layer.
    pub fn hydrate<I, K, V>(self: &Arc<Self>, row: I) -> CoreResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Record::hydrate(Arc::clone(self), row)
    }

    /// The current scope: the innermost `with_scope` override, or the
    /// default scope over this type's table.
    #[must_use]
    pub fn current_scope(&self) -> Arc<Scope> {
        self.scopes.current()
    }

    /// The default scope over this type's table.
    #[must_use]
    pub fn default_scope(&self) -> Arc<Scope> {
        self.scopes.default_scope()
    }

    /// Runs `body` with `scope` as the current scope, restoring the previous
    /// one afterwards (also on panic).
    pub fn with_scope<F, R>(&self, scope: Scope, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.scopes.with_scope(scope, body)
    }

    /// Narrows the current scope to rows where `column` equals `value`.
    pub fn where_eq(&self, column: &str, value: impl Into<Value>) -> CoreResult<Scope> {
        if self.columns.lookup(column).is_none() {
            return Err(CoreError::unknown_attribute(&self.name, column));
        }
        Ok(self.current_scope().as_ref().clone().where_eq(column, value))
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut virtuals: Vec<_> = self.virtual_setters.keys().collect();
        virtuals.sort();
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("columns", &self.columns)
            .field("virtual_attributes", &virtuals)
            .finish_non_exhaustive()
    }
}

/// Declares the columns of a [`RecordType`].
///
/// Declaration methods chain; the first invalid declaration is remembered
/// and returned by [`build`](Self::build).
pub struct RecordTypeBuilder {
    config: Config,
    columns: ColumnRegistry,
    virtual_setters: HashMap<String, VirtualSetter>,
    error: Option<CoreError>,
}

impl RecordTypeBuilder {
    fn new(table: String) -> Self {
        Self {
            config: Config::default(),
            columns: ColumnRegistry::new(table),
            virtual_setters: HashMap::new(),
            error: None,
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Declares a key column.
    #[must_use]
    pub fn key(mut self, name: &str, ty: ScalarType, options: KeyOptions) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.columns.declare_key(name, ty, options) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Declares a scalar data column.
    #[must_use]
    pub fn column(mut self, name: &str, ty: ScalarType, options: ColumnOptions) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.columns.declare_data(name, ty, options) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Declares a list, set or map column.
    #[must_use]
    pub fn collection(mut self, name: &str, ty: CollectionType, options: ColumnOptions) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.columns.declare_collection(name, ty, options) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Registers a setter for an attribute that has no column.
    #[must_use]
    pub fn virtual_attribute<F>(mut self, name: &str, setter: F) -> Self
    where
        F: Fn(&mut Record, Value) -> CoreResult<()> + Send + Sync + 'static,
    {
        self.virtual_setters.insert(name.to_string(), Arc::new(setter));
        self
    }

    /// Finishes the declaration.
    pub fn build(self) -> CoreResult<Arc<RecordType>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let name = self.columns.record_type().to_string();
        if self.columns.key_columns().next().is_none() {
            return Err(CoreError::declaration(&name, "at least one key column is required"));
        }
        if let Some(clash) = self
            .virtual_setters
            .keys()
            .find(|virt| self.columns.lookup(virt).is_some())
        {
            return Err(CoreError::declaration(
                &name,
                format!("virtual attribute {clash} shadows a column"),
            ));
        }

        let mut default_scope =
            Scope::new(name.clone()).with_consistency(self.config.default_consistency);
        if let Some(keyspace) = &self.config.keyspace {
            default_scope = default_scope.in_keyspace(keyspace.clone());
        }

        debug!(
            record_type = %name,
            columns = self.columns.len(),
            virtual_attributes = self.virtual_setters.len(),
            "built record type"
        );

        Ok(Arc::new(RecordType {
            name,
            config: self.config,
            columns: self.columns,
            virtual_setters: self.virtual_setters,
            scopes: ScopeContext::new(default_scope),
        }))
    }
}

/// A Rust type backed by one statically declared [`RecordType`].
///
/// Implementors usually keep the record type in a `OnceLock` so it is
/// declared exactly once per process.
pub trait Model {
    /// The record type describing this model's table.
    fn record_type() -> &'static Arc<RecordType>;

    /// Creates a new instance of this model.
    fn new_record<I, K, V>(attributes: I) -> CoreResult<Record>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Self::record_type().new_record(attributes)
    }

    /// The model's current scope.
    fn current_scope() -> Arc<Scope> {
        Self::record_type().current_scope()
    }

    /// Runs `body` with `scope` as the model's current scope.
    fn with_scope<F, R>(scope: Scope, body: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::record_type().with_scope(scope, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Consistency;

    fn posts() -> Arc<RecordType> {
        RecordType::builder("posts")
            .config(Config::new().keyspace("blog"))
            .key("blog", ScalarType::Text, KeyOptions::new())
            .key("id", ScalarType::TimeUuid, KeyOptions::new().auto())
            .column("title", ScalarType::Text, ColumnOptions::new())
            .build()
            .unwrap()
    }

    #[test]
    fn first_error_wins() {
        let err = RecordType::builder("posts")
            .key("id", ScalarType::Int, KeyOptions::new().auto())
            .column("id", ScalarType::Text, ColumnOptions::new())
            .build()
            .unwrap_err();
        match err {
            CoreError::Declaration { message, .. } => assert!(message.contains("auto key id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn key_required() {
        let err = RecordType::builder("loose")
            .column("title", ScalarType::Text, ColumnOptions::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Declaration { .. }));
    }

    #[test]
    fn virtual_attribute_cannot_shadow_column() {
        let err = RecordType::builder("posts")
            .key("id", ScalarType::Uuid, KeyOptions::new())
            .virtual_attribute("id", |_, _| Ok(()))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::Declaration { .. }));
    }

    #[test]
    fn default_scope_targets_table() {
        let posts = posts();
        let scope = posts.current_scope();
        assert!(scope.is_unscoped());
        assert_eq!(scope.table(), "posts");
        assert_eq!(scope.keyspace(), Some("blog"));
        assert_eq!(scope.consistency(), Some(Consistency::Quorum));
    }

    #[test]
    fn where_eq_narrows_current_scope() {
        let posts = posts();
        let narrowed = posts.where_eq("blog", "rust").unwrap();
        assert_eq!(narrowed.restriction("blog"), Some(&Value::from("rust")));
        assert_eq!(narrowed.keyspace(), Some("blog"));

        let err = posts.where_eq("nope", 1).unwrap_err();
        assert!(matches!(err, CoreError::UnknownAttribute { .. }));

        posts.with_scope(narrowed.clone(), || {
            let deeper = posts.where_eq("title", "x").unwrap();
            assert_eq!(deeper.restrictions().len(), 2);
        });
    }
}
