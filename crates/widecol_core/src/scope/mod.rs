//! Scope composition.
//!
//! Each record type carries a [`ScopeContext`]: a default scope over the
//! type's table plus a "current" slot that [`ScopeContext::with_scope`]
//! overrides for the duration of a closure.

mod context;
mod query;

pub use context::ScopeContext;
pub use query::Scope;
