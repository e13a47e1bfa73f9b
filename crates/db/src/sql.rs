use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::{StoreError, StoreResult};
use crate::store::RecipeStore;

/// Result of a free-form query, one JSON object per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlRows {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Blank out string literals, quoted identifiers and comments so that only
/// SQL structure is left to inspect.
fn mask_literals(sql: &str) -> StoreResult<String> {
    let mut masked = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        let close = match c {
            '\'' | '"' | '`' => c,
            '[' => ']',
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                masked.push(' ');
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut previous = '\0';
                loop {
                    match chars.next() {
                        Some('/') if previous == '*' => break,
                        Some(c) => previous = c,
                        None => {
                            return Err(StoreError::ReadOnly(
                                "unterminated comment".to_string(),
                            ));
                        }
                    }
                }
                masked.push(' ');
                continue;
            }
            _ => {
                masked.push(c);
                continue;
            }
        };
        // '' inside a literal closes and reopens it
        if !chars.by_ref().any(|c| c == close) {
            return Err(StoreError::ReadOnly(
                "unterminated quoted text".to_string(),
            ));
        }
        masked.push_str("''");
    }
    Ok(masked)
}

/// Accept a single statement that starts with `SELECT` or `WITH`.
///
/// Writes hidden inside an accepted statement are stopped by the connection
/// running with `query_only` set.
fn read_only_statement(sql: &str) -> StoreResult<&str> {
    let statement = sql.trim().trim_end_matches(';').trim_end();
    if statement.is_empty() {
        return Err(StoreError::ReadOnly("empty query".to_string()));
    }

    let structure = mask_literals(statement)?;
    if structure.contains(';') {
        return Err(StoreError::ReadOnly(
            "only a single statement is allowed".to_string(),
        ));
    }
    let first = structure
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|word| !word.is_empty())
        .map(str::to_uppercase);
    if !matches!(first.as_deref(), Some("SELECT") | Some("WITH")) {
        return Err(StoreError::ReadOnly(
            "only SELECT or WITH queries are allowed".to_string(),
        ));
    }
    Ok(statement)
}

fn rejected_write(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.message().contains("readonly") => {
            StoreError::ReadOnly(db.message().to_string())
        }
        _ => StoreError::Database(error),
    }
}

fn row_to_json(row: &SqliteRow) -> StoreResult<Map<String, Value>> {
    let mut object = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" => Value::from(row.try_get::<f64, _>(index)?),
                "BLOB" => Value::from(row.try_get::<Vec<u8>, _>(index)?),
                _ => Value::from(row.try_get::<String, _>(index)?),
            }
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}

impl RecipeStore {
    /// Run a read-only query written by the chat model.
    #[tracing::instrument(skip(self))]
    pub async fn execute_sql(&self, sql: &str) -> StoreResult<SqlRows> {
        let statement = read_only_statement(sql)?;

        let mut conn = self.pool().acquire().await?;
        sqlx::query("PRAGMA query_only = ON")
            .execute(&mut *conn)
            .await?;
        let fetched = sqlx::query(statement).fetch_all(&mut *conn).await;
        sqlx::query("PRAGMA query_only = OFF")
            .execute(&mut *conn)
            .await?;
        let rows = fetched.map_err(rejected_write)?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows.iter().map(row_to_json).collect::<StoreResult<Vec<_>>>()?;

        tracing::debug!(rows = rows.len(), "query executed");
        Ok(SqlRows { columns, rows })
    }
}
