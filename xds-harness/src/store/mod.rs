//! Durable history of the discovery exchanges of a test run.
//!
//! Every request sent to and every response received from the control plane
//! is stored as its canonical JSON text. Each table carries a `UNIQUE`
//! constraint on that text, so recording the same exchange twice fails with
//! [`Error::DuplicateRecord`] instead of silently storing it again. The
//! constraint is also the only concurrency control: stores opened on the same
//! file from different threads may race on an insert, and exactly one of them
//! wins.
//!
//! # Example
//!
//! ```
//! use xds_harness::{DiscoveryRequest, ExchangeStore, Node, StoreConfig};
//!
//! let store = ExchangeStore::open(&StoreConfig::in_memory())?;
//! store.migrate()?;
//!
//! let request = DiscoveryRequest::new(
//!     Node::new("envoy", "1.30"),
//!     "type.googleapis.com/envoy.config.cluster.v3.Cluster",
//! );
//! store.record_request(&request)?;
//! assert!(store.record_request(&request).unwrap_err().is_duplicate());
//!
//! store.clear_all()?;
//! store.record_request(&request)?;
//! # Ok::<(), xds_harness::Error>(())
//! ```

use std::borrow::Cow;

use rusqlite::{Connection, ErrorCode, ffi};
use tracing::{debug, trace};

use crate::error::{Error, ExchangeKind, Result};
use crate::message::{DiscoveryRequest, DiscoveryResponse};

pub mod config;
pub mod schema;

pub use config::{StoreConfig, StoreLocation};
use schema::{DELETE_REQUESTS_SQL, DELETE_RESPONSES_SQL, INSERT_REQUEST_SQL, INSERT_RESPONSE_SQL};

/// Records discovery exchanges in a SQLite database.
///
/// The store owns a single connection and takes no locks of its own.
#[derive(Debug)]
pub struct ExchangeStore {
    conn: Connection,
    schema: Cow<'static, str>,
}

impl ExchangeStore {
    /// Open the database described by `config`.
    ///
    /// The schema is not applied until [`ExchangeStore::migrate`] is called.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = match &config.location {
            StoreLocation::Memory => Connection::open_in_memory(),
            StoreLocation::File(path) => Connection::open(path),
        }
        .map_err(Error::Storage)?;
        conn.busy_timeout(config.busy_timeout).map_err(Error::Storage)?;

        debug!(location = ?config.location, "opened exchange store");
        Ok(Self::new(conn, config.schema.clone()))
    }

    /// Wrap an existing connection. `schema` is applied by
    /// [`ExchangeStore::migrate`].
    pub fn new(conn: Connection, schema: impl Into<Cow<'static, str>>) -> Self {
        Self {
            conn,
            schema: schema.into(),
        }
    }

    /// Apply the schema script.
    ///
    /// Safe to call on a database that is already migrated, provided the
    /// script is idempotent (the default one is).
    pub fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(&self.schema)
            .map_err(Error::Migration)?;
        debug!("exchange store schema applied");
        Ok(())
    }

    /// Record a request sent to the control plane.
    pub fn record_request(&self, request: &DiscoveryRequest) -> Result<()> {
        let message = request.to_canonical_json()?;
        self.insert(ExchangeKind::Request, INSERT_REQUEST_SQL, &message)
    }

    /// Record a response received from the control plane.
    pub fn record_response(&self, response: &DiscoveryResponse) -> Result<()> {
        let message = response.to_canonical_json()?;
        self.insert(ExchangeKind::Response, INSERT_RESPONSE_SQL, &message)
    }

    fn insert(&self, kind: ExchangeKind, sql: &str, message: &str) -> Result<()> {
        match self.conn.execute(sql, [message]) {
            Ok(_) => {
                trace!(%kind, text = message, "recorded exchange");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                debug!(%kind, "exchange already recorded");
                Err(Error::DuplicateRecord(kind))
            }
            Err(err) => Err(Error::Storage(err)),
        }
    }

    /// Delete every recorded exchange.
    ///
    /// Both tables are cleared in one transaction; on failure nothing is
    /// deleted.
    pub fn clear_all(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction().map_err(Error::Purge)?;
        let requests = tx.execute(DELETE_REQUESTS_SQL, []).map_err(Error::Purge)?;
        let responses = tx.execute(DELETE_RESPONSES_SQL, []).map_err(Error::Purge)?;
        tx.commit().map_err(Error::Purge)?;

        debug!(requests, responses, "cleared exchange store");
        Ok(())
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}
