//! HTTP backend — a pre-authenticated `reqwest` client plus one thin
//! capability adapter per resource kind.
//!
//! The gateway is schema-agnostic about resource content: record payloads
//! pass through verbatim. No retries, no caching; retry policy belongs to
//! the upstream client, not here.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::{CapabilityTable, Page, ResourceCapability};
use crate::tools::name::{Operation, ResourceKind};
use crate::tools::PageQuery;
use crate::types::{ApiConfig, Error, Result};

/// Pre-authenticated client for the backend API.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build the client from configuration. Fails fast on an empty
    /// credential or an unusable client configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.api_key);
        let mut auth_value = HeaderValue::from_str(&bearer)
            .map_err(|e| Error::config(format!("api key is not a valid header value: {}", e)))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON document. Non-2xx statuses and decode failures surface as
    /// `Error::Backend` with the upstream message.
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%url, "backend request");

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::backend(format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(format!(
                "{} returned {}: {}",
                path,
                status,
                body.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::backend(format!("invalid JSON from {}: {}", path, e)))
    }
}

/// Capability adapter for one resource kind over the shared [`ApiClient`].
#[derive(Debug)]
pub struct HttpResource {
    client: Arc<ApiClient>,
    kind: ResourceKind,
}

impl HttpResource {
    pub fn new(client: Arc<ApiClient>, kind: ResourceKind) -> Self {
        Self { client, kind }
    }
}

#[async_trait]
impl ResourceCapability for HttpResource {
    fn operations(&self) -> &[Operation] {
        &Operation::ALL
    }

    async fn fetch_one(&self, id: &str) -> Result<Value> {
        let path = format!("v1/{}/{}", self.kind.as_str(), id);
        self.client.get_json(&path, &[]).await
    }

    async fn fetch_page(&self, query: PageQuery) -> Result<Page> {
        let path = format!("v1/{}", self.kind.as_str());
        let params = page_params(&query)?;
        let body = self.client.get_json(&path, &params).await?;
        page_from_response(self.kind, body)
    }
}

/// Translate a validated page query into URL query parameters.
///
/// The filter object travels as serialized JSON; extras pass through with
/// scalar values rendered bare and structured values serialized.
fn page_params(query: &PageQuery) -> Result<Vec<(String, String)>> {
    let mut params = Vec::new();
    if let Some(filter) = &query.filter {
        params.push(("filter".to_string(), serde_json::to_string(filter)?));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(cursor) = &query.cursor {
        params.push(("start".to_string(), cursor.clone()));
    }
    for (key, value) in &query.extra {
        let rendered = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        params.push((key.clone(), rendered));
    }
    Ok(params)
}

/// Extract the record list from an upstream page response and derive the
/// continuation cursor from the last record's id.
///
/// The API returns collections either under the resource-named key (e.g.
/// `{"templates": [...]}`) or as a bare array. Any other shape is an
/// upstream contract violation and surfaces as a backend error rather than
/// an empty page a caller could mistake for an empty collection.
fn page_from_response(kind: ResourceKind, body: Value) -> Result<Page> {
    let items = match &body {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .get(kind.as_str())
            .or_else(|| map.get("items"))
            .and_then(|v| v.as_array())
            .cloned()
            .ok_or_else(|| {
                Error::backend(format!("unrecognized page shape in {} response", kind))
            })?,
        _ => {
            return Err(Error::backend(format!(
                "unrecognized page shape in {} response",
                kind
            )))
        }
    };

    let next_cursor = items.last().and_then(record_id);
    Ok(Page { items, next_cursor })
}

/// Record ids may be strings or numbers upstream; cursors are strings.
fn record_id(record: &Value) -> Option<String> {
    match record.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Build the full capability table over one shared client, one adapter per
/// known resource kind.
pub fn build_capability_table(client: Arc<ApiClient>) -> CapabilityTable {
    let mut table = CapabilityTable::new();
    for kind in ResourceKind::ALL {
        table.insert(kind, Arc::new(HttpResource::new(client.clone(), kind)));
    }
    table
}
