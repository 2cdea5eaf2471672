//! Record type configuration.

use crate::types::Consistency;

/// Configuration attached to a record type at declaration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keyspace the default scope targets. `None` leaves it to the connection.
    pub keyspace: Option<String>,

    /// Consistency level carried by the default scope.
    pub default_consistency: Consistency,

    /// Maximum number of collection elements rendered by `Display` on a record.
    pub inspect_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyspace: None,
            default_consistency: Consistency::Quorum,
            inspect_limit: 10,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keyspace.
    #[must_use]
    pub fn keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Sets the default consistency level.
    #[must_use]
    pub const fn default_consistency(mut self, consistency: Consistency) -> Self {
        self.default_consistency = consistency;
        self
    }

    /// Sets how many collection elements diagnostics render.
    #[must_use]
    pub const fn inspect_limit(mut self, limit: usize) -> Self {
        self.inspect_limit = limit;
        self
    }
}
