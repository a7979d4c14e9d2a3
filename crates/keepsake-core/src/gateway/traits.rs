use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::query::{Entity, Query};
use crate::error::GatewayError;

/// Where an uploaded blob ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub path: String,
    pub public_url: String,
}

/// Hosted table + object storage.
///
/// Screens receive an implementation explicitly; nothing in the crate
/// reaches for a global client. Records travel as JSON objects so the
/// typed layer in [`crate::store`] owns the record shapes.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Records matching `query`, in the query's order.
    async fn list(&self, entity: Entity, query: &Query) -> Result<Vec<Value>, GatewayError>;

    /// One record by id. `GatewayError::NotFound` when absent.
    async fn get_one(&self, entity: Entity, id: &str) -> Result<Value, GatewayError>;

    /// Insert and return the stored record (with id and timestamps).
    async fn create(&self, entity: Entity, fields: Value) -> Result<Value, GatewayError>;

    /// Merge `partial` into the record and return the result.
    async fn update(&self, entity: Entity, id: &str, partial: Value)
        -> Result<Value, GatewayError>;

    async fn delete(&self, entity: Entity, id: &str) -> Result<(), GatewayError>;

    /// Insert, or overwrite the record whose `conflict_key` column equals
    /// the incoming value.
    async fn upsert_by_key(
        &self,
        entity: Entity,
        fields: Value,
        conflict_key: &str,
    ) -> Result<Value, GatewayError>;

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, GatewayError>;

    async fn delete_blob(&self, bucket: &str, path: &str) -> Result<(), GatewayError>;
}
