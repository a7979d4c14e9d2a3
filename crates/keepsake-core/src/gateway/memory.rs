//! In-process gateway with the same query semantics as the hosted service.
//!
//! Used by the test suites and by the CLI's `--offline` mode.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use super::query::{Entity, Query};
use super::traits::{Gateway, StoredBlob};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<Entity, Vec<Value>>,
    blobs: HashMap<(String, String), Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows verbatim, without assigning ids or timestamps.
    pub fn seed(&self, entity: Entity, rows: impl IntoIterator<Item = Value>) {
        let mut tables = self.lock();
        tables.rows.entry(entity).or_default().extend(rows);
    }

    pub fn row_count(&self, entity: Entity) -> usize {
        self.lock().rows.get(&entity).map_or(0, Vec::len)
    }

    pub fn blob(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .blobs
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn public_url(bucket: &str, path: &str) -> String {
        format!("memory://{bucket}/{path}")
    }
}

fn as_object(fields: Value) -> Result<Map<String, Value>, GatewayError> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::Decode(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn id_matches(row: &Value, id: &str) -> bool {
    match row.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

/// Fill in what the hosted service would assign on insert.
fn stamp_new(mut map: Map<String, Value>) -> Value {
    let now = Value::String(Utc::now().to_rfc3339());
    map.entry("id")
        .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    map.entry("created_at").or_insert_with(|| now.clone());
    map.entry("updated_at").or_insert(now);
    Value::Object(map)
}

fn merge(row: &mut Value, partial: Map<String, Value>) {
    if let Value::Object(existing) = row {
        for (key, value) in partial {
            existing.insert(key, value);
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(&self, entity: Entity, query: &Query) -> Result<Vec<Value>, GatewayError> {
        let tables = self.lock();
        let rows = tables.rows.get(&entity).map(Vec::as_slice).unwrap_or(&[]);
        Ok(query.apply(rows))
    }

    async fn get_one(&self, entity: Entity, id: &str) -> Result<Value, GatewayError> {
        let tables = self.lock();
        tables
            .rows
            .get(&entity)
            .and_then(|rows| rows.iter().find(|r| id_matches(r, id)))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                entity,
                id: id.to_string(),
            })
    }

    async fn create(&self, entity: Entity, fields: Value) -> Result<Value, GatewayError> {
        let record = stamp_new(as_object(fields)?);
        debug!(%entity, "memory insert");
        self.lock()
            .rows
            .entry(entity)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        entity: Entity,
        id: &str,
        partial: Value,
    ) -> Result<Value, GatewayError> {
        let partial = as_object(partial)?;
        let mut tables = self.lock();
        let row = tables
            .rows
            .get_mut(&entity)
            .and_then(|rows| rows.iter_mut().find(|r| id_matches(r, id)))
            .ok_or_else(|| GatewayError::NotFound {
                entity,
                id: id.to_string(),
            })?;
        merge(row, partial);
        Ok(row.clone())
    }

    async fn delete(&self, entity: Entity, id: &str) -> Result<(), GatewayError> {
        let mut tables = self.lock();
        if let Some(rows) = tables.rows.get_mut(&entity) {
            rows.retain(|r| !id_matches(r, id));
        }
        Ok(())
    }

    async fn upsert_by_key(
        &self,
        entity: Entity,
        fields: Value,
        conflict_key: &str,
    ) -> Result<Value, GatewayError> {
        let map = as_object(fields)?;
        let key = map.get(conflict_key).cloned().ok_or_else(|| {
            GatewayError::Decode(format!("upsert is missing conflict key '{conflict_key}'"))
        })?;

        let mut tables = self.lock();
        let rows = tables.rows.entry(entity).or_default();
        if let Some(row) = rows.iter_mut().find(|r| r.get(conflict_key) == Some(&key)) {
            merge(row, map);
            return Ok(row.clone());
        }
        let record = stamp_new(map);
        rows.push(record.clone());
        Ok(record)
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<StoredBlob, GatewayError> {
        let mut tables = self.lock();
        let key = (bucket.to_string(), path.to_string());
        if tables.blobs.contains_key(&key) {
            return Err(GatewayError::Http {
                status: 409,
                message: format!("{bucket}/{path} already exists"),
            });
        }
        tables.blobs.insert(key, bytes);
        Ok(StoredBlob {
            path: path.to_string(),
            public_url: Self::public_url(bucket, path),
        })
    }

    async fn delete_blob(&self, bucket: &str, path: &str) -> Result<(), GatewayError> {
        self.lock()
            .blobs
            .remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let gw = MemoryGateway::new();
        let row = gw
            .create(Entity::Posts, json!({"title": "Hi"}))
            .await
            .unwrap();
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        let id = row["id"].as_str().unwrap();
        assert_eq!(gw.get_one(Entity::Posts, id).await.unwrap(), row);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let gw = MemoryGateway::new();
        let err = gw.get_one(Entity::Ideas, "nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let gw = MemoryGateway::new();
        gw.seed(Entity::Photos, [json!({"id": 1, "caption": "", "is_favorite": false})]);
        let row = gw
            .update(Entity::Photos, "1", json!({"is_favorite": true}))
            .await
            .unwrap();
        assert_eq!(row, json!({"id": 1, "caption": "", "is_favorite": true}));
    }

    #[tokio::test]
    async fn upsert_overwrites_same_key() {
        let gw = MemoryGateway::new();
        gw.upsert_by_key(Entity::Moods, json!({"mood_date": "2026-02-14", "mood_type": "happy"}), "mood_date")
            .await
            .unwrap();
        let row = gw
            .upsert_by_key(Entity::Moods, json!({"mood_date": "2026-02-14", "mood_type": "amazing"}), "mood_date")
            .await
            .unwrap();
        assert_eq!(row["mood_type"], "amazing");
        assert_eq!(gw.row_count(Entity::Moods), 1);
    }

    #[tokio::test]
    async fn upsert_requires_conflict_key() {
        let gw = MemoryGateway::new();
        let err = gw
            .upsert_by_key(Entity::Moods, json!({"mood_type": "meh"}), "mood_date")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn blobs_do_not_overwrite() {
        let gw = MemoryGateway::new();
        let stored = gw
            .upload_blob("photos", "a.png", vec![1, 2], "image/png")
            .await
            .unwrap();
        assert_eq!(stored.public_url, "memory://photos/a.png");
        assert!(gw.upload_blob("photos", "a.png", vec![3], "image/png").await.is_err());
        gw.delete_blob("photos", "a.png").await.unwrap();
        assert!(gw.blob("photos", "a.png").is_none());
    }
}
