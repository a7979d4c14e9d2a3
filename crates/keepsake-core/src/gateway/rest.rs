//! HTTP gateway for a hosted PostgREST table API plus object storage.
//!
//! Tables live under `{base}/rest/v1/{table}`, blobs under
//! `{base}/storage/v1/object/{bucket}/{path}`. Every request carries the
//! project key both as `apikey` and as a bearer token. Failed requests are
//! reported once; there is no retry.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::debug;

use super::query::{encode_value, Entity, Query};
use super::traits::{Gateway, StoredBlob};
use crate::error::GatewayError;
use crate::storage::GatewayConfig;

const RETURN_REPRESENTATION: &str = "return=representation";
const MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

pub struct RestGateway {
    base_url: String,
    api_key: String,
    http: Client,
}

impl RestGateway {
    /// `base_url` must be an absolute http(s) URL.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, GatewayError> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| GatewayError::NotConfigured(format!("invalid gateway url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::NotConfigured(format!(
                "gateway url must be http(s), got {}",
                parsed.scheme()
            )));
        }
        if api_key.is_empty() {
            return Err(GatewayError::NotConfigured("missing anon key".into()));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: Client::new(),
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if config.url.is_empty() {
            return Err(GatewayError::NotConfigured(
                "set gateway.url or KEEPSAKE_GATEWAY_URL".into(),
            ));
        }
        Self::new(&config.url, &config.anon_key)
    }

    /// Public URL of a blob in a public bucket.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{}",
            self.base_url,
            encode_path(path)
        )
    }

    fn table_url(&self, entity: Entity) -> String {
        format!("{}/rest/v1/{}", self.base_url, entity.table())
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{bucket}/{}",
            self.base_url,
            encode_path(path)
        )
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [("id", format!("eq.{id}"))]
    }
}

/// Percent-encode each segment of a storage path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Query-string pairs for a list request.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for filter in &query.filters {
        params.push((
            filter.column.clone(),
            format!("{}.{}", filter.op.as_str(), encode_value(&filter.value)),
        ));
    }
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.descending { "desc" } else { "asc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Turn a non-success response into `GatewayError::Http`.
async fn check(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);
    Err(GatewayError::Http {
        status: status.as_u16(),
        message,
    })
}

async fn rows(resp: Response) -> Result<Vec<Value>, GatewayError> {
    let resp = check(resp).await?;
    match resp.json::<Value>().await? {
        Value::Array(rows) => Ok(rows),
        other => Err(GatewayError::Decode(format!("expected an array, got {other}"))),
    }
}

fn first(rows: Vec<Value>, entity: Entity, id: &str) -> Result<Value, GatewayError> {
    rows.into_iter().next().ok_or_else(|| GatewayError::NotFound {
        entity,
        id: id.to_string(),
    })
}

#[async_trait]
impl Gateway for RestGateway {
    async fn list(&self, entity: Entity, query: &Query) -> Result<Vec<Value>, GatewayError> {
        debug!(%entity, ?query, "list");
        let resp = self
            .authed(self.http.get(self.table_url(entity)))
            .query(&query_params(query))
            .send()
            .await?;
        rows(resp).await
    }

    async fn get_one(&self, entity: Entity, id: &str) -> Result<Value, GatewayError> {
        debug!(%entity, id, "get");
        let resp = self
            .authed(self.http.get(self.table_url(entity)))
            .query(&[("select", "*")])
            .query(&Self::id_filter(id))
            .send()
            .await?;
        first(rows(resp).await?, entity, id)
    }

    async fn create(&self, entity: Entity, fields: Value) -> Result<Value, GatewayError> {
        debug!(%entity, "insert");
        let resp = self
            .authed(self.http.post(self.table_url(entity)))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&json!([fields]))
            .send()
            .await?;
        rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("insert returned no rows".into()))
    }

    async fn update(
        &self,
        entity: Entity,
        id: &str,
        partial: Value,
    ) -> Result<Value, GatewayError> {
        debug!(%entity, id, "update");
        let resp = self
            .authed(self.http.patch(self.table_url(entity)))
            .query(&Self::id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&partial)
            .send()
            .await?;
        first(rows(resp).await?, entity, id)
    }

    async fn delete(&self, entity: Entity, id: &str) -> Result<(), GatewayError> {
        debug!(%entity, id, "delete");
        let resp = self
            .authed(self.http.delete(self.table_url(entity)))
            .query(&Self::id_filter(id))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn upsert_by_key(
        &self,
        entity: Entity,
        fields: Value,
        conflict_key: &str,
    ) -> Result<Value, GatewayError> {
        debug!(%entity, conflict_key, "upsert");
        let resp = self
            .authed(self.http.post(self.table_url(entity)))
            .query(&[("on_conflict", conflict_key)])
            .header("Prefer", MERGE_DUPLICATES)
            .json(&json!([fields]))
            .send()
            .await?;
        rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode("upsert returned no rows".into()))
    }

    async fn upload_blob(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredBlob, GatewayError> {
        debug!(bucket, path, size = bytes.len(), "upload");
        let resp = self
            .authed(self.http.post(self.object_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        check(resp).await?;
        Ok(StoredBlob {
            path: path.to_string(),
            public_url: self.public_url(bucket, path),
        })
    }

    async fn delete_blob(&self, bucket: &str, path: &str) -> Result<(), GatewayError> {
        debug!(bucket, path, "remove blob");
        let resp = self
            .authed(
                self.http
                    .delete(format!("{}/storage/v1/object/{bucket}", self.base_url)),
            )
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway(server: &mockito::ServerGuard) -> RestGateway {
        RestGateway::new(&server.url(), "anon-key").unwrap()
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(RestGateway::new("not a url", "k").is_err());
        assert!(RestGateway::new("ftp://example.com", "k").is_err());
        assert!(RestGateway::new("https://example.com", "").is_err());
        assert!(RestGateway::from_config(&GatewayConfig::default()).is_err());
    }

    #[test]
    fn builds_postgrest_params() {
        let query = Query::new()
            .eq("status", "published")
            .eq("is_favorite", true)
            .order_desc("is_pinned")
            .order_desc("created_at")
            .limit(10);
        let params = query_params(&query);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("status".to_string(), "eq.published".to_string()),
                ("is_favorite".to_string(), "eq.true".to_string()),
                ("order".to_string(), "is_pinned.desc,created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn encodes_storage_paths() {
        assert_eq!(encode_path("1700-our trip.jpg"), "1700-our%20trip.jpg");
        assert_eq!(encode_path("album/a b.png"), "album/a%20b.png");
    }

    #[tokio::test]
    async fn list_sends_filters_and_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/posts")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("status".into(), "eq.draft".into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"1","title":"A"}]"#)
            .create_async()
            .await;

        let rows = gateway(&server)
            .list(
                Entity::Posts,
                &Query::new().eq("status", "draft").order_desc("created_at"),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_one_empty_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/ideas")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.9".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let err = gateway(&server).get_one(Entity::Ideas, "9").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn upsert_uses_conflict_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/moods")
            .match_query(Matcher::UrlEncoded("on_conflict".into(), "mood_date".into()))
            .match_header("prefer", MERGE_DUPLICATES)
            .match_body(Matcher::Json(json!([{"mood_date": "2026-02-14"}])))
            .with_status(201)
            .with_body(r#"[{"id":3,"mood_date":"2026-02-14"}]"#)
            .create_async()
            .await;

        let row = gateway(&server)
            .upsert_by_key(Entity::Moods, json!({"mood_date": "2026-02-14"}), "mood_date")
            .await
            .unwrap();
        assert_eq!(row["id"], 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_carry_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/posts")
            .with_status(400)
            .with_body(r#"{"message":"null value in column \"title\""}"#)
            .create_async()
            .await;

        let err = gateway(&server)
            .create(Entity::Posts, json!({}))
            .await
            .unwrap_err();
        match err {
            GatewayError::Http { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("title"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/storage/v1/object/photos/1-us.png")
            .match_header("content-type", "image/png")
            .match_header("x-upsert", "false")
            .with_status(200)
            .with_body(r#"{"Key":"photos/1-us.png"}"#)
            .create_async()
            .await;

        let gw = gateway(&server);
        let stored = gw
            .upload_blob("photos", "1-us.png", vec![0x89, 0x50], "image/png")
            .await
            .unwrap();
        assert_eq!(stored.path, "1-us.png");
        assert_eq!(
            stored.public_url,
            format!("{}/storage/v1/object/public/photos/1-us.png", server.url())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_blob_sends_prefixes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/storage/v1/object/post-media")
            .match_body(Matcher::Json(json!({"prefixes": ["a.jpg"]})))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        gateway(&server)
            .delete_blob("post-media", "a.jpg")
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
