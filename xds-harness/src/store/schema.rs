//! SQL used by the exchange store.

/// Default schema: one append-only table per exchange direction.
///
/// The `UNIQUE` constraint on `message` is what rejects duplicate exchanges.
pub const MIGRATE_SQL: &str = "
CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    message TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recorded_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    message TEXT NOT NULL UNIQUE
);
";

pub(crate) const INSERT_REQUEST_SQL: &str = "INSERT INTO requests (message) VALUES (?1)";

pub(crate) const INSERT_RESPONSE_SQL: &str = "INSERT INTO responses (message) VALUES (?1)";

pub(crate) const DELETE_REQUESTS_SQL: &str = "DELETE FROM requests";

pub(crate) const DELETE_RESPONSES_SQL: &str = "DELETE FROM responses";
