//! Chroma server collection accessed over its REST v2 API (Chroma 1.x)
//!
//! Collections live under `/api/v2/tenants/{tenant}/databases/{database}`.
//! The Chroma server stores whatever vectors it is given, so embeddings are
//! computed here with the configured `EmbeddingProvider`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::types::{Document, QueryResult};

use super::embedding::EmbeddingProvider;
use super::store::{check_add_args, DocumentStore};

/// Chroma-backed document store
pub struct ChromaStore {
    client: Client,
    base_url: String,
    /// `.../collections/{id}`, the prefix of every record operation
    collection_url: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

#[derive(Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResponse {
    id: String,
}

/// Body of both `add` and `upsert`
#[derive(Serialize)]
struct AddRequest<'a> {
    ids: &'a [String],
    documents: &'a [String],
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GetRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
    include: &'a [&'a str],
}

#[derive(Deserialize)]
struct GetResponse {
    ids: Vec<String>,
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<Vec<f32>>,
    n_results: usize,
    include: &'a [&'a str],
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl ChromaStore {
    /// Connect to the server and get or create the configured collection
    pub async fn connect(config: &StoreConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        let base_url = config.chroma_url.trim_end_matches('/').to_string();

        let collections_url = collections_url(config);
        let request = CreateCollectionRequest {
            name: &config.collection,
            get_or_create: true,
        };
        let collection: CollectionResponse =
            send_json(client.post(&collections_url).json(&request)).await?;

        tracing::info!(
            "Chroma collection '{}' ready at {} (id {})",
            config.collection,
            base_url,
            collection.id
        );

        Ok(Self {
            client,
            base_url,
            collection_url: format!("{}/{}", collections_url, collection.id),
            embedder,
        })
    }

    fn record_url(&self, op: &str) -> String {
        format!("{}/{}", self.collection_url, op)
    }

    async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(&self, op: &str, body: &T) -> Result<R> {
        send_json(self.client.post(self.record_url(op)).json(body)).await
    }

    /// POST a write whose response body carries nothing we need
    async fn post_write<T: Serialize + ?Sized>(&self, op: &str, body: &T) -> Result<()> {
        send(self.client.post(self.record_url(op)).json(body)).await?;
        Ok(())
    }

    async fn write_records(&self, op: &str, documents: &[String], ids: &[String]) -> Result<()> {
        check_add_args(documents, ids)?;
        if documents.is_empty() {
            return Ok(());
        }

        let embeddings = self.embedder.embed_batch(documents).await?;
        let request = AddRequest {
            ids,
            documents,
            embeddings,
        };
        self.post_write(op, &request).await
    }
}

fn collections_url(config: &StoreConfig) -> String {
    format!(
        "{}/api/v2/tenants/{}/databases/{}/collections",
        config.chroma_url.trim_end_matches('/'),
        config.chroma_tenant,
        config.chroma_database
    )
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::store(format!("Chroma request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::store(format!("Chroma returned HTTP {} - {}", status, body)));
    }
    Ok(response)
}

async fn send_json<R: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<R> {
    send(request)
        .await?
        .json()
        .await
        .map_err(|e| Error::store(format!("Failed to parse Chroma response: {}", e)))
}

#[async_trait]
impl DocumentStore for ChromaStore {
    async fn add(&self, documents: &[String], ids: &[String]) -> Result<()> {
        self.write_records("add", documents, ids).await
    }

    async fn upsert(&self, documents: &[String], ids: &[String]) -> Result<()> {
        self.write_records("upsert", documents, ids).await
    }

    async fn get(&self) -> Result<Vec<String>> {
        let request = GetRequest {
            ids: None,
            include: &[],
        };
        let response: GetResponse = self.post("get", &request).await?;
        Ok(response.ids)
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let request = GetRequest {
            ids: Some(ids),
            include: &["documents"],
        };
        let response: GetResponse = self.post("get", &request).await?;
        let documents = response.documents.unwrap_or_default();

        Ok(response
            .ids
            .into_iter()
            .zip(documents)
            .map(|(id, text)| Document::new(id, text.unwrap_or_default()))
            .collect())
    }

    async fn delete(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.post_write("delete", &DeleteRequest { ids }).await
    }

    async fn query(&self, texts: &[String], n_results: usize) -> Result<QueryResult> {
        let query_embeddings = self.embedder.embed_batch(texts).await?;
        let request = QueryRequest {
            query_embeddings,
            n_results,
            include: &["documents", "distances"],
        };
        let response: QueryResponse = self.post("query", &request).await?;

        let documents = response
            .documents
            .unwrap_or_default()
            .into_iter()
            .map(|docs| docs.into_iter().map(Option::unwrap_or_default).collect())
            .collect();

        Ok(QueryResult {
            ids: response.ids,
            documents,
            distances: response.distances.unwrap_or_default(),
        })
    }

    async fn count(&self) -> Result<usize> {
        send_json(self.client.get(self.record_url("count"))).await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/v2/heartbeat", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "chroma"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_shape() {
        let raw = r#"{
            "ids": [["k8s"]],
            "documents": [["Kubernetes is a container orchestration platform"]],
            "distances": [[0.21]],
            "metadatas": null,
            "embeddings": null
        }"#;
        let response: QueryResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.ids, vec![vec!["k8s".to_string()]]);
        assert_eq!(response.distances, Some(vec![vec![0.21]]));
    }

    #[test]
    fn test_collections_url_is_scoped() {
        let config = StoreConfig {
            chroma_url: "http://chroma:8000/".to_string(),
            ..StoreConfig::default()
        };
        assert_eq!(
            collections_url(&config),
            "http://chroma:8000/api/v2/tenants/default_tenant/databases/default_database/collections"
        );
    }

    #[test]
    fn test_get_request_omits_ids() {
        let request = GetRequest {
            ids: None,
            include: &[],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "include": [] })
        );
    }
}
