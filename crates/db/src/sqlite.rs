//! SQLite record store on an `sqlx` pool.
//!
//! Table and column names are validated identifiers spliced into the SQL
//! text; every value is bound.

use std::str::FromStr;

use async_trait::async_trait;
use library_kernel::Migration;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, QueryBuilder, Row, Sqlite, TypeInfo, ValueRef};

use crate::error::{StoreError, StoreResult};
use crate::query::{Direction, Filter, Query, Record, RecordId, ID_FIELD};
use crate::store::RecordStore;

const MIGRATIONS_TABLE: &str = "_migrations";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool for `url`, creating the database file if needed.
    /// In-memory databases are pinned to a single long-lived connection so
    /// every query sees the same data.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Quote a table or column name after checking it is a plain identifier.
fn quoted(name: &str) -> StoreResult<String> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(format!("\"{name}\""))
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Row ids above `i64::MAX` cannot exist in SQLite.
fn row_id(id: RecordId) -> Option<i64> {
    i64::try_from(id).ok()
}

fn push_value(
    builder: &mut QueryBuilder<'_, Sqlite>,
    field: &str,
    value: &Value,
) -> StoreResult<()> {
    match value {
        Value::Null => {
            builder.push_bind(Option::<String>::None);
        }
        Value::Bool(flag) => {
            builder.push_bind(*flag);
        }
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                builder.push_bind(integer);
            } else if let Some(float) = number.as_f64() {
                builder.push_bind(float);
            } else {
                return Err(StoreError::UnsupportedValue {
                    field: field.to_string(),
                });
            }
        }
        Value::String(text) => {
            builder.push_bind(text.clone());
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(StoreError::UnsupportedValue {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[Filter]) -> StoreResult<()> {
    for (index, filter) in filters.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Contains { field, needle } => {
                builder.push(format!("instr(lower({}), lower(", quoted(field)?));
                builder.push_bind(needle.clone());
                builder.push(")) > 0");
            }
            Filter::Equals { field, value: Value::Null } => {
                builder.push(format!("{} IS NULL", quoted(field)?));
            }
            Filter::Equals { field, value } => {
                builder.push(format!("{} = ", quoted(field)?));
                push_value(builder, field, value)?;
            }
        }
    }
    Ok(())
}

fn sql_direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascending => "ASC",
        Direction::Descending => "DESC",
    }
}

/// Convert a row into a record using the storage class of each value.
fn row_to_record(row: &SqliteRow) -> StoreResult<Record> {
    let mut record = Record::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BIGINT" | "INT8" | "BOOLEAN" => {
                    Value::from(row.try_get::<i64, _>(index)?)
                }
                "REAL" => serde_json::Number::from_f64(row.try_get::<f64, _>(index)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "TEXT" => Value::String(row.try_get::<String, _>(index)?),
                _ => {
                    return Err(StoreError::UnsupportedValue {
                        field: column.name().to_string(),
                    })
                }
            }
        };
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, collection: &str, record: Record) -> StoreResult<Record> {
        let columns: Vec<(&String, &Value)> = record
            .iter()
            .filter(|(field, _)| field.as_str() != ID_FIELD)
            .collect();

        let mut builder = QueryBuilder::<Sqlite>::new(format!("INSERT INTO {}", quoted(collection)?));
        if columns.is_empty() {
            builder.push(" DEFAULT VALUES");
        } else {
            let names = columns
                .iter()
                .map(|(field, _)| quoted(field))
                .collect::<StoreResult<Vec<_>>>()?;
            builder.push(format!(" ({}) VALUES (", names.join(", ")));
            for (index, (field, value)) in columns.iter().enumerate() {
                if index > 0 {
                    builder.push(", ");
                }
                push_value(&mut builder, field, value)?;
            }
            builder.push(")");
        }
        builder.push(" RETURNING *");

        let row = builder.build().fetch_one(&self.pool).await?;
        row_to_record(&row)
    }

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>> {
        let Some(id) = row_id(id) else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            quoted(collection)?,
            quoted(ID_FIELD)?
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn replace(
        &self,
        collection: &str,
        id: RecordId,
        record: Record,
    ) -> StoreResult<Option<Record>> {
        let Some(row_id) = row_id(id) else {
            return Ok(None);
        };
        let columns: Vec<(&String, &Value)> = record
            .iter()
            .filter(|(field, _)| field.as_str() != ID_FIELD)
            .collect();
        if columns.is_empty() {
            return self.fetch(collection, id).await;
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", quoted(collection)?));
        for (index, (field, value)) in columns.iter().enumerate() {
            if index > 0 {
                builder.push(", ");
            }
            builder.push(format!("{} = ", quoted(field)?));
            push_value(&mut builder, field, value)?;
        }
        builder.push(format!(" WHERE {} = ", quoted(ID_FIELD)?));
        builder.push_bind(row_id);
        builder.push(" RETURNING *");

        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>> {
        let Some(id) = row_id(id) else {
            return Ok(None);
        };
        let sql = format!(
            "DELETE FROM {} WHERE {} = ? RETURNING *",
            quoted(collection)?,
            quoted(ID_FIELD)?
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn select(&self, collection: &str, query: &Query) -> StoreResult<Vec<Record>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", quoted(collection)?));
        push_filters(&mut builder, &query.filters)?;

        let id = quoted(ID_FIELD)?;
        match &query.order {
            Some(order) => {
                let direction = sql_direction(order.direction);
                builder.push(format!(
                    " ORDER BY {} {direction}, {id} {direction}",
                    quoted(&order.field)?
                ));
            }
            None => {
                builder.push(format!(" ORDER BY {id} ASC"));
            }
        }

        if let Some(range) = query.range {
            builder.push(" LIMIT ");
            builder.push_bind(i64::try_from(range.limit).unwrap_or(i64::MAX));
            builder.push(" OFFSET ");
            builder.push_bind(i64::try_from(range.offset).unwrap_or(i64::MAX));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_record).collect()
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> StoreResult<u64> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", quoted(collection)?));
        push_filters(&mut builder, filters)?;

        let row = builder.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> StoreResult<usize> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                module TEXT NOT NULL,
                id TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (module, id)
            )",
        )
        .execute(&self.pool)
        .await?;

        let mut ran = 0;
        for (module, migration) in migrations {
            let applied: Option<i64> = sqlx::query_scalar(&format!(
                "SELECT 1 FROM {MIGRATIONS_TABLE} WHERE module = ? AND id = ?"
            ))
            .bind(module)
            .bind(migration.id)
            .fetch_optional(&self.pool)
            .await?;
            if applied.is_some() {
                continue;
            }

            let failed = |source| StoreError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            };

            let mut tx = self.pool.begin().await?;
            tx.execute(sqlx::raw_sql(migration.up))
                .await
                .map_err(failed)?;
            sqlx::query(&format!(
                "INSERT INTO {MIGRATIONS_TABLE} (module, id) VALUES (?, ?)"
            ))
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
            tx.commit().await.map_err(failed)?;

            tracing::info!(module = %module, migration = migration.id, "applied migration");
            ran += 1;
        }

        Ok(ran)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
