// SPDX-License-Identifier: MIT

//! Query executor - the only component that touches the dataset

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::Mutex;

use super::guardrail::validate_read_only_sql;
use crate::adk::error::{AssistantError, QueryError};

/// Bundled sample dataset, loaded by [`SqliteExecutor::in_memory`]
pub const RETAIL_SEED_SQL: &str = include_str!("../../../data/retail_seed.sql");

/// Default maximum number of rows rendered into a result
pub const DEFAULT_ROW_CAP: usize = 200;

/// Runs a generated query and renders the result as a markdown table
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<String, QueryError>;
}

/// SQLite-backed executor over a read-only connection
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
    row_cap: usize,
}

impl SqliteExecutor {
    /// Open an existing database file read-only
    pub fn open(path: &Path) -> Result<Self, AssistantError> {
        if !path.exists() {
            return Err(AssistantError::config(format!(
                "database not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only = ON;")?;

        log::debug!("Opened dataset read-only: {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// In-memory database loaded with the bundled sample dataset
    pub fn in_memory() -> Result<Self, AssistantError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(RETAIL_SEED_SQL)?;
        conn.execute_batch("PRAGMA query_only = ON;")?;

        log::debug!("Loaded bundled retail dataset into memory");
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            row_cap: DEFAULT_ROW_CAP,
        }
    }

    pub fn with_row_cap(mut self, row_cap: usize) -> Self {
        self.row_cap = row_cap.max(1);
        self
    }

    /// Column names of a table, in physical order
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>, QueryError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| QueryError::Sql("connection lock poisoned".to_string()))?;

        let stmt = conn.prepare(&format!("SELECT * FROM \"{}\" LIMIT 0", table.replace('"', "")))?;
        let columns = stmt.column_names().iter().map(|c| c.to_string()).collect();
        Ok(columns)
    }

    fn execute_blocking(&self, query: &str) -> Result<String, QueryError> {
        let sql = validate_read_only_sql(query)?;

        let conn = self
            .conn
            .lock()
            .map_err(|_| QueryError::Sql("connection lock poisoned".to_string()))?;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut records: Vec<Vec<String>> = Vec::new();
        let mut truncated = false;

        while let Some(row) = rows.next()? {
            if records.len() >= self.row_cap {
                truncated = true;
                break;
            }

            let mut record = Vec::with_capacity(column_count);
            for index in 0..column_count {
                record.push(render_value(row.get_ref(index)?));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(QueryError::EmptyResult);
        }

        let mut table = format_markdown_table(&columns, &records);
        if truncated {
            table.push_str(&format!("\n(showing first {} rows)", self.row_cap));
        }
        Ok(table)
    }
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, query: &str) -> Result<String, QueryError> {
        let result = self.execute_blocking(query);
        match &result {
            Ok(_) => log::debug!("Query succeeded: {}", query),
            Err(QueryError::EmptyResult) => log::info!("Query matched no rows: {}", query),
            Err(e) => log::warn!("Query failed: {} ({})", query, e),
        }
        result
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Render rows as a markdown table
pub fn format_markdown_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let escape = |cell: &str| cell.replace('|', "\\|").replace('\n', " ");

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "| {} |",
        columns.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
    ));
    lines.push(format!("|{}|", vec!["---"; columns.len()].join("|")));
    for row in rows {
        lines.push(format!(
            "| {} |",
            row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
        ));
    }
    lines.join("\n")
}
