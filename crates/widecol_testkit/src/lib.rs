//! # Widecol Testkit
//!
//! Test utilities for widecol.
//!
//! This crate provides:
//! - Ready-made record types and models
//! - Property-based test generators using proptest
//! - One-shot tracing initialisation for tests
//!
//! ## Usage
//!
//! ```rust
//! use widecol_testkit::prelude::*;
//!
//! init_tracing();
//! let mut post = new_post("rust").unwrap();
//! post.list_mut("comments").unwrap().push("first!").unwrap();
//! assert_eq!(post.flush("comments").unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
