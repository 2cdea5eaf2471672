//! # Widecol Core
//!
//! In-memory record model for wide-column stores.
//!
//! This crate provides:
//! - A column registry describing each record type's partition key,
//!   clustering columns, data columns and collection columns
//! - Per-instance attribute storage with defaults and key immutability
//! - Collection proxies that mirror every list, set and map mutation as a
//!   minimal delta for the persistence layer
//! - Scope composition with a per-type current scope that nests and
//!   restores itself
//!
//! ## Usage
//!
//! ```
//! use widecol_core::{
//!     CollectionType, ColumnOptions, Delta, KeyOptions, RecordType, ScalarType, Value,
//! };
//!
//! let posts = RecordType::builder("posts")
//!     .key("blog_id", ScalarType::Text, KeyOptions::new())
//!     .key("id", ScalarType::TimeUuid, KeyOptions::new().auto())
//!     .column("title", ScalarType::Text, ColumnOptions::new())
//!     .collection("tags", CollectionType::List(ScalarType::Text), ColumnOptions::new())
//!     .build()
//!     .unwrap();
//!
//! let mut post = posts.new_record([("blog_id", "b1"), ("title", "Hello")]).unwrap();
//! post.list_mut("tags").unwrap().push("rust").unwrap();
//!
//! let deltas = post.flush("tags").unwrap();
//! assert_eq!(deltas, vec![Delta::Append(vec![Value::from("rust")])]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod error;
mod model;
mod record;
mod schema;
mod scope;
mod types;
mod value;

pub use collection::{Delta, DeltaLog, DeltaOp, ListProxy, MapProxy, SetProxy};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use model::{Model, RecordType, RecordTypeBuilder, VirtualSetter};
pub use record::{AttributeStore, Record, RecordState};
pub use schema::{
    CollectionType, Column, ColumnOptions, ColumnRegistry, DefaultValue, Generator, KeyOptions,
};
pub use scope::{Scope, ScopeContext};
pub use types::{ClusteringOrder, ColumnKind, Consistency, ScalarType};
pub use value::{Inspect, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
