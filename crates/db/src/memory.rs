//! In-process record store.
//!
//! The store is the sole owner of its collections; all access goes through
//! the [`RecordStore`] operations behind one `RwLock`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use library_kernel::Migration;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::query::{Direction, Filter, Query, Record, RecordId, ID_FIELD};
use crate::store::RecordStore;

#[derive(Debug, Default)]
struct Collection {
    last_id: RecordId,
    rows: BTreeMap<RecordId, Record>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    applied: RwLock<BTreeSet<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Total order over JSON scalars: missing/null, then booleans, numbers,
/// strings. Arrays and objects sort last and compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or(f64::NAN)
                .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn with_id(mut record: Record, id: RecordId) -> Record {
    record.insert(ID_FIELD.to_string(), Value::from(id));
    record
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, collection: &str, record: Record) -> StoreResult<Record> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(collection.to_string()).or_default();

        collection.last_id += 1;
        let id = collection.last_id;
        let record = with_id(record, id);
        collection.rows.insert(id, record.clone());

        Ok(record)
    }

    async fn fetch(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|collection| collection.rows.get(&id))
            .cloned())
    }

    async fn replace(
        &self,
        collection: &str,
        id: RecordId,
        record: Record,
    ) -> StoreResult<Option<Record>> {
        let mut collections = self.collections.write().await;
        let Some(row) = collections
            .get_mut(collection)
            .and_then(|collection| collection.rows.get_mut(&id))
        else {
            return Ok(None);
        };

        for (field, value) in record {
            if field != ID_FIELD {
                row.insert(field, value);
            }
        }

        Ok(Some(row.clone()))
    }

    async fn remove(&self, collection: &str, id: RecordId) -> StoreResult<Option<Record>> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|collection| collection.rows.remove(&id)))
    }

    async fn select(&self, collection: &str, query: &Query) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        // Rows iterate by ascending id, which is also the tie-break.
        let mut rows: Vec<&Record> = collection
            .rows
            .values()
            .filter(|record| query.matches(record))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                compare_values(a.get(&order.field), b.get(&order.field))
                    .then_with(|| compare_values(a.get(ID_FIELD), b.get(ID_FIELD)))
            });
            if order.direction == Direction::Descending {
                rows.reverse();
            }
        }

        let (offset, limit) = match query.range {
            Some(range) => (
                usize::try_from(range.offset).unwrap_or(usize::MAX),
                usize::try_from(range.limit).unwrap_or(usize::MAX),
            ),
            None => (0, usize::MAX),
        };

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        let count = collections.get(collection).map_or(0, |collection| {
            collection
                .rows
                .values()
                .filter(|record| filters.iter().all(|filter| filter.matches(record)))
                .count()
        });
        Ok(count as u64)
    }

    async fn apply_migrations(&self, migrations: &[(String, Migration)]) -> StoreResult<usize> {
        let mut applied = self.applied.write().await;
        let mut ran = 0;
        for (module, migration) in migrations {
            // No schema to apply; remember the id so reruns report zero.
            if applied.insert((module.clone(), migration.id.to_string())) {
                tracing::debug!(module = %module, migration = migration.id, "recorded migration");
                ran += 1;
            }
        }
        Ok(ran)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (title, year) in [("b", 2001), ("a", 1999), ("c", 2001), ("a", 1950)] {
            store
                .insert("books", record(json!({"title": title, "published_year": year})))
                .await
                .unwrap();
        }
        store
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records
            .iter()
            .map(|record| record[ID_FIELD].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_ignores_supplied_id() {
        let store = MemoryStore::new();
        let first = store
            .insert("books", record(json!({"id": 42, "title": "x"})))
            .await
            .unwrap();
        let second = store
            .insert("books", record(json!({"title": "y"})))
            .await
            .unwrap();

        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
        assert_eq!(store.fetch("books", 1).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_remove() {
        let store = seeded().await;
        assert!(store.remove("books", 4).await.unwrap().is_some());
        let next = store
            .insert("books", record(json!({"title": "d"})))
            .await
            .unwrap();
        assert_eq!(next["id"], json!(5));
    }

    #[tokio::test]
    async fn replace_keeps_id_and_reports_missing_rows() {
        let store = seeded().await;
        let updated = store
            .replace("books", 2, record(json!({"id": 99, "title": "z"})))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["id"], json!(2));
        assert_eq!(updated["title"], json!("z"));
        assert_eq!(updated["published_year"], json!(1999));

        assert!(store
            .replace("books", 77, record(json!({"title": "z"})))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn ties_break_by_id_and_descending_is_exact_reverse() {
        let store = seeded().await;
        let ascending = store
            .select("books", &Query::new().order_by("title", Direction::Ascending))
            .await
            .unwrap();
        let descending = store
            .select("books", &Query::new().order_by("title", Direction::Descending))
            .await
            .unwrap();

        assert_eq!(ids(&ascending), vec![2, 4, 1, 3]);
        let mut reversed = ids(&descending);
        reversed.reverse();
        assert_eq!(ids(&ascending), reversed);
    }

    #[tokio::test]
    async fn numbers_order_numerically() {
        let store = seeded().await;
        let rows = store
            .select(
                "books",
                &Query::new().order_by("published_year", Direction::Ascending),
            )
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![4, 2, 1, 3]);
    }

    #[tokio::test]
    async fn window_past_the_end_is_empty() {
        let store = seeded().await;
        let rows = store
            .select("books", &Query::new().range(10, 5))
            .await
            .unwrap();
        assert!(rows.is_empty());

        let rows = store
            .select("books", &Query::new().range(3, 5))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![4]);
    }

    #[tokio::test]
    async fn count_ignores_window_and_unknown_collections() {
        let store = seeded().await;
        let filters = [Filter::equals("published_year", 2001)];
        assert_eq!(store.count("books", &filters).await.unwrap(), 2);
        assert_eq!(store.count("books", &[]).await.unwrap(), 4);
        assert_eq!(store.count("authors", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn migrations_are_recorded_once() {
        let store = MemoryStore::new();
        let migrations = vec![(
            "books".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE books (id INTEGER PRIMARY KEY);",
            },
        )];
        assert_eq!(store.apply_migrations(&migrations).await.unwrap(), 1);
        assert_eq!(store.apply_migrations(&migrations).await.unwrap(), 0);
    }
}
