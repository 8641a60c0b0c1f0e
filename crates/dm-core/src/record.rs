//! Migration records (what is on disk) and ledger entries (what was applied).

use chrono::NaiveDateTime;

/// A migration file as found by the scanner.
///
/// Two records are the same migration only when both the filename and the
/// fingerprint match; they have the same content when only the fingerprints do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MigrationRecord {
    /// File name relative to the migration directory
    pub filename: String,

    /// Git blob fingerprint of the file content
    pub content_hash: String,
}

impl MigrationRecord {
    /// Create a record from a filename and fingerprint
    pub fn new(filename: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_hash: content_hash.into(),
        }
    }
}

/// A row of the ledger table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Filename the migration had when it was applied (or last renamed)
    pub filename: String,

    /// Fingerprint of the content that was applied
    pub content_hash: String,

    /// When the row was written; `None` if the stored value is NULL or unreadable
    pub applied_at: Option<NaiveDateTime>,
}

impl LedgerEntry {
    /// Create an entry without a timestamp
    pub fn new(filename: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content_hash: content_hash.into(),
            applied_at: None,
        }
    }
}

/// Parse a stored ledger timestamp.
///
/// Engines hand back dates in slightly different textual shapes (sqlite's
/// `datetime()` has no fraction, duckdb casts include microseconds and
/// sometimes an offset). Anything unparseable maps to `None`.
pub fn parse_ledger_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(ts);
        }
    }
    chrono::DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z")
        .ok()
        .map(|ts| ts.naive_utc())
}
