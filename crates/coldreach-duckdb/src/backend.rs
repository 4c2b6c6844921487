use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use coldreach_core::content::ModelType;

use crate::models::find_or_insert_model;
use crate::schema::init_sql;

/// Generate a record ID: `prefix` + "_" + 16 random lowercase alphanumerics.
pub(crate) fn generate_id(prefix: &str) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: String = (0..16)
        .map(|_| {
            let idx = rng.gen_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect();
    format!("{prefix}_{chars}")
}

/// Current time truncated to DuckDB's microsecond `TIMESTAMP` precision, so a
/// value handed back to the caller compares equal to what was stored.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Format a UTC instant as a naive `TIMESTAMP` literal.
pub(crate) fn to_sql_timestamp(at: &DateTime<Utc>) -> String {
    at.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Parse `CAST(ts AS VARCHAR)` output back into a UTC instant.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|_| anyhow!("invalid_datetime: {raw}"))
}

/// Lift a parse failure into the error type `query_map` closures return.
pub(crate) fn column_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> duckdb::Error {
    duckdb::Error::FromSqlConversionFailure(idx, duckdb::types::Type::Text, err.into())
}

/// Read a `CAST(.. AS VARCHAR)` timestamp column.
pub(crate) fn timestamp_column(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| column_error(idx, e.to_string()))
}

/// The DuckDB store for Coldreach.
///
/// DuckDB is single-writer, so the connection lives behind
/// `Arc<tokio::sync::Mutex<_>>`. Every method holds the lock for the duration
/// of its statements and never across an `.await` on anything else.
///
/// Memory and thread limits are set by [`init_sql`] at open time.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// Intended for tests; data is discarded when the struct is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Register one model per [`ModelType`] that has no row yet.
    ///
    /// Safe to call on every startup.
    pub async fn seed_models(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let mut created = 0;
        for model_type in ModelType::ALL {
            let (_, inserted) = find_or_insert_model(&conn, model_type)?;
            if inserted {
                created += 1;
            }
        }
        if created > 0 {
            info!(created, "Seeded built-in AI models");
        }
        Ok(created)
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
