//! Configuration for the exchange store.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::store::schema::MIGRATE_SQL;

/// Default time a statement waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A private in-memory database, gone when the store is dropped.
    Memory,
    /// A database file, shared by every store opened on the same path.
    File(PathBuf),
}

/// Configuration for an [`ExchangeStore`](crate::store::ExchangeStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where records are kept.
    pub location: StoreLocation,

    /// Script applied by `migrate()`.
    ///
    /// Default: [`MIGRATE_SQL`].
    pub schema: Cow<'static, str>,

    /// How long a statement waits for another connection to release the file.
    ///
    /// Default: 5 seconds.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Create a configuration for a database file at `path`.
    ///
    /// # Example
    ///
    /// ```
    /// use xds_harness::StoreConfig;
    /// use std::time::Duration;
    ///
    /// let config = StoreConfig::new("/tmp/xds-harness.db")
    ///     .with_busy_timeout(Duration::from_secs(1));
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_location(StoreLocation::File(path.as_ref().to_path_buf()))
    }

    /// Create a configuration for a private in-memory database.
    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::Memory)
    }

    fn with_location(location: StoreLocation) -> Self {
        Self {
            location,
            schema: Cow::Borrowed(MIGRATE_SQL),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Replace the schema script.
    ///
    /// # Errors
    ///
    /// Returns an error if `schema` contains no statements.
    pub fn with_schema(mut self, schema: impl Into<Cow<'static, str>>) -> Result<Self> {
        let schema = schema.into();
        if schema.trim().is_empty() {
            return Err(Error::InvalidConfig("schema must not be empty".into()));
        }
        self.schema = schema;
        Ok(self)
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
