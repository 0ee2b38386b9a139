//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Services call store methods — they never execute SQL directly.

use crate::error::ServiceResult;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;

mod admin;
mod bank_detail;
mod customer;
mod vip_level;

pub use customer::{CustomerQuery, NewCustomerRow, UpdateCustomerRow};

/// Fixed-width UTC timestamp format. Lexicographic order equals
/// chronological order, which the date-range filters rely on.
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub(crate) fn fmt_ts(t: DateTime<Utc>) -> String {
    t.format(TS_FORMAT).to_string()
}

pub(crate) fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .ok()
        .map(|n| DateTime::from_naive_utc_and_offset(n, Utc))
}

/// Read a required timestamp column.
pub(crate) fn ts_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("bad timestamp: {raw}").into(),
        )
    })
}

/// Read a nullable timestamp column.
pub(crate) fn opt_ts_col(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_ts(&s).map(Some).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                format!("bad timestamp: {s}").into(),
            )
        }),
    }
}

pub struct Store {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl Store {
    pub fn open(path: &str) -> ServiceResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ServiceResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database. Connection handles
    /// are not shared across threads; each request handler gets its own.
    /// For in-memory databases this returns a new isolated database.
    pub fn reopen(&self) -> ServiceResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ServiceResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_schema.sql"))?;
        Ok(())
    }
}
