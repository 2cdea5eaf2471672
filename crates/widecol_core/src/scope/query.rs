//! Query scope values.

use crate::types::Consistency;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Description of a query's target table and constraints.
///
/// Scopes are immutable values built up by chaining; the statement builder
/// that turns one into an executable read or write lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    table: String,
    keyspace: Option<String>,
    /// Equality restrictions, in the order they were added. One per column.
    restrictions: Vec<(String, Value)>,
    limit: Option<usize>,
    consistency: Option<Consistency>,
}

impl Scope {
    /// Creates an unconstrained scope over `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            keyspace: None,
            restrictions: Vec::new(),
            limit: None,
            consistency: None,
        }
    }

    /// Targets a keyspace.
    #[must_use]
    pub fn in_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Restricts `column` to equal `value`, replacing any earlier restriction
    /// on the same column.
    #[must_use]
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.restrict(column.into(), value.into());
        self
    }

    /// Caps the number of rows.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the consistency level.
    #[must_use]
    pub const fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    /// Layers `other`'s constraints over this scope.
    ///
    /// The table stays this scope's. Restrictions from `other` are added or
    /// override ones on the same column; its keyspace, limit and consistency
    /// win when set.
    #[must_use]
    pub fn merge(&self, other: &Scope) -> Scope {
        let mut merged = self.clone();
        for (column, value) in &other.restrictions {
            merged.restrict(column.clone(), value.clone());
        }
        if other.keyspace.is_some() {
            merged.keyspace.clone_from(&other.keyspace);
        }
        merged.limit = other.limit.or(self.limit);
        merged.consistency = other.consistency.or(self.consistency);
        merged
    }

    /// Target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Target keyspace, if any.
    #[must_use]
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Equality restrictions in the order they were added.
    #[must_use]
    pub fn restrictions(&self) -> &[(String, Value)] {
        &self.restrictions
    }

    /// Value `column` is restricted to, if any.
    #[must_use]
    pub fn restriction(&self, column: &str) -> Option<&Value> {
        self.restrictions
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Row cap, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Consistency level, if any.
    #[must_use]
    pub const fn consistency(&self) -> Option<Consistency> {
        self.consistency
    }

    /// Whether the scope filters nothing beyond its table.
    #[must_use]
    pub fn is_unscoped(&self) -> bool {
        self.restrictions.is_empty() && self.limit.is_none()
    }

    fn restrict(&mut self, column: String, value: Value) {
        match self.restrictions.iter_mut().find(|(name, _)| *name == column) {
            Some(existing) => existing.1 = value,
            None => self.restrictions.push((column, value)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyspace) = &self.keyspace {
            write!(f, "{keyspace}.")?;
        }
        f.write_str(&self.table)?;
        if !self.restrictions.is_empty() {
            f.write_str("[")?;
            for (i, (column, value)) in self.restrictions.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{column} = {value}")?;
            }
            f.write_str("]")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {limit}")?;
        }
        if let Some(consistency) = self.consistency {
            write!(f, " @{consistency}")?;
        }
        Ok(())
    }
}
