//! Column declarations.
//!
//! Every record type owns a [`ColumnRegistry`] describing its key, data and
//! collection columns. Declarations happen once, before any instance exists.

mod column;
mod registry;

pub use column::{
    CollectionType, Column, ColumnOptions, DefaultValue, Generator, KeyOptions,
};
pub use registry::ColumnRegistry;
