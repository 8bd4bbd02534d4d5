//! HTTP Data API backend for the document store.
//!
//! Speaks the Atlas-style Data API: every operation is a POST to
//! `{endpoint}/action/{name}` with a JSON body naming the data source,
//! database and collection. Responses carry `documents`, `insertedId` or
//! `insertedIds` depending on the action.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::backend::DocumentBackend;
use crate::config::ResolvedStoreConfig;
use crate::telemetry;
use crate::types::{Document, InsertAck};
use crate::{JukeboxError, Result};

/// Network-level timeout for store calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Document store backend over the HTTP Data API.
pub struct DataApiBackend {
    endpoint: String,
    api_key: String,
    data_source: String,
    database: String,
    http: Client,
}

impl DataApiBackend {
    /// Build a backend from resolved configuration.
    ///
    /// The endpoint doubles as the test seam — point it at a mock server
    /// to exercise the wire protocol without a live store.
    pub(crate) fn new(config: ResolvedStoreConfig) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            data_source: config.data_source,
            database: config.database,
            http,
        }
    }

    /// POST one Data API action and decode the response body.
    async fn action<T: DeserializeOwned>(&self, action: &str, body: Value) -> Result<T> {
        let url = format!("{}/action/{}", self.endpoint, action);
        debug!(action, url = %url, "document store request");

        let outcome = self.dispatch(&url, body).await;
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            telemetry::STORE_REQUESTS_TOTAL,
            "action" => action.to_string(),
            "status" => status
        )
        .increment(1);

        outcome
    }

    async fn dispatch<T: DeserializeOwned>(&self, url: &str, body: Value) -> Result<T> {
        let response = self
            .http
            .post(url)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))?;

        handle_response_errors(&response)?;

        response
            .json()
            .await
            .map_err(|e| JukeboxError::Http(e.to_string()))
    }

    /// Common body fields every action carries.
    fn scope(&self, collection: &str) -> Value {
        json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": collection,
        })
    }
}

#[async_trait]
impl DocumentBackend for DataApiBackend {
    fn name(&self) -> &str {
        "data-api"
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        projection: &Value,
    ) -> Result<Vec<Document>> {
        let mut body = self.scope(collection);
        body["filter"] = filter.clone();
        body["projection"] = projection.clone();

        let response: DocumentsResponse = self.action("find", body).await?;
        Ok(response.documents)
    }

    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> Result<Vec<Document>> {
        let mut body = self.scope(collection);
        body["pipeline"] = Value::Array(pipeline.to_vec());

        let response: DocumentsResponse = self.action("aggregate", body).await?;
        Ok(response.documents)
    }

    async fn insert_one(&self, collection: &str, document: &Document) -> Result<InsertAck> {
        let mut body = self.scope(collection);
        body["document"] = Value::Object(document.clone().into_inner());

        let response: InsertOneResponse = self.action("insertOne", body).await?;
        Ok(InsertAck::Single {
            inserted_id: response.inserted_id,
        })
    }

    async fn insert_many(&self, collection: &str, documents: &[Document]) -> Result<InsertAck> {
        let mut body = self.scope(collection);
        body["documents"] = Value::Array(
            documents
                .iter()
                .map(|d| Value::Object(d.clone().into_inner()))
                .collect(),
        );

        let response: InsertManyResponse = self.action("insertMany", body).await?;
        Ok(InsertAck::Many {
            inserted_ids: response.inserted_ids,
        })
    }
}

/// Map non-success statuses onto the crate error taxonomy.
fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 => Err(JukeboxError::AuthenticationFailed),
        404 => Err(JukeboxError::NotFound(
            "document store endpoint or collection".to_string(),
        )),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(JukeboxError::RateLimited { retry_after })
        }
        code => Err(JukeboxError::Api {
            status: code,
            message: format!("document store error: {status}"),
        }),
    }
}

#[derive(Deserialize)]
struct DocumentsResponse {
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct InsertOneResponse {
    #[serde(rename = "insertedId")]
    inserted_id: String,
}

#[derive(Deserialize)]
struct InsertManyResponse {
    #[serde(rename = "insertedIds")]
    inserted_ids: Vec<String>,
}
