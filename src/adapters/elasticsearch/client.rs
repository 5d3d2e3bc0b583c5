//! Elasticsearch HTTP client
//!
//! Thin wrapper over `reqwest` that speaks the bulk and scroll APIs and maps
//! every failure onto [`StoreError`]. It never retries.

use super::models::{
    error_reason, BulkResponse, ClearScrollRequest, ErrorResponse, ScrollRequest, SearchResponse,
};
use crate::adapters::store::{BulkItemStatus, DocumentStore, ScrollPage, StoreResult};
use crate::config::ConnectionConfig;
use crate::domain::{FerryError, Result, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Certificate, Client, ClientBuilder, Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const NDJSON: &str = "application/x-ndjson";

/// Elasticsearch client
///
/// # Example
///
/// ```no_run
/// use ferry::adapters::elasticsearch::ElasticsearchClient;
/// use ferry::adapters::store::DocumentStore;
/// use ferry::config::ConnectionConfig;
///
/// # async fn example() -> ferry::domain::Result<()> {
/// let client = ElasticsearchClient::new(&ConnectionConfig::default())?;
/// client.ping().await?;
/// # Ok(())
/// # }
/// ```
pub struct ElasticsearchClient {
    /// Base URL, e.g. `https://localhost:9200/`
    base_url: Url,

    /// HTTP client for making requests
    client: Client,

    /// Precomputed `Authorization` header
    auth_header: Option<String>,
}

impl ElasticsearchClient {
    /// Create a client from connection settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid, the CA
    /// certificate cannot be read or parsed, or the HTTP client cannot be
    /// built.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url()).map_err(|e| {
            FerryError::Configuration(format!("Invalid store URL {}: {e}", config.base_url()))
        })?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(30)));

        if let Some(ca_cert) = &config.ca_cert {
            let pem = std::fs::read(ca_cert).map_err(|e| {
                FerryError::Configuration(format!("Cannot read CA certificate {ca_cert}: {e}"))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                FerryError::Configuration(format!("Invalid CA certificate {ca_cert}: {e}"))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| FerryError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            auth_header: basic_auth(config),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL for a path made of raw segments; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_header {
            Some(auth) => request.header(AUTHORIZATION, auth),
            None => request,
        }
    }

    /// Send a request and turn non-2xx answers into errors
    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| error_reason(&e.error))
            .unwrap_or(body);

        tracing::debug!(status = status.as_u16(), message = %message, "Store request failed");
        Err(StoreError::from_status(status.as_u16(), message))
    }

    async fn search_page(&self, response: Response) -> StoreResult<ScrollPage> {
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("search response: {e}")))?;

        Ok(ScrollPage {
            scroll_id: parsed.scroll_id,
            hits: parsed.hits.hits,
        })
    }
}

/// `Basic` header when both username and password are set
fn basic_auth(config: &ConnectionConfig) -> Option<String> {
    let password = config.password.as_ref()?.expose_secret();
    if password.is_empty() || config.username.is_empty() {
        return None;
    }

    let credentials = format!("{}:{}", config.username, password.as_ref());
    let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
    Some(format!("Basic {encoded}"))
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout(e.to_string())
    } else {
        StoreError::ConnectionFailed(e.to_string())
    }
}

/// Search body with the page size and a cheap default sort
fn scroll_query(query: &Value, page_size: usize) -> Value {
    let mut body = query.clone();
    if let Value::Object(object) = &mut body {
        object.insert("size".to_string(), Value::from(page_size));
        object
            .entry("sort")
            .or_insert_with(|| Value::String("_doc".to_string()));
    }
    body
}

#[async_trait]
impl DocumentStore for ElasticsearchClient {
    async fn ping(&self) -> StoreResult<()> {
        let url = self.endpoint(&[]);
        self.send(self.request(Method::GET, url)).await?;
        tracing::debug!(url = %self.base_url, "Store is reachable");
        Ok(())
    }

    async fn bulk(
        &self,
        index: &str,
        pipeline: Option<&str>,
        body: String,
    ) -> StoreResult<Vec<BulkItemStatus>> {
        let mut url = self.endpoint(&[index, "_bulk"]);
        if let Some(pipeline) = pipeline {
            url.query_pairs_mut().append_pair("pipeline", pipeline);
        }

        let response = self
            .send(
                self.request(Method::POST, url)
                    .header(CONTENT_TYPE, NDJSON)
                    .body(body),
            )
            .await?;

        let parsed: BulkResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("bulk response: {e}")))?;

        parsed
            .items
            .into_iter()
            .map(|item| {
                let (_, result) = item.into_iter().next().ok_or_else(|| {
                    StoreError::InvalidResponse("bulk item without operation".to_string())
                })?;
                Ok(BulkItemStatus {
                    status: result.status,
                    reason: result.reason(),
                })
            })
            .collect()
    }

    async fn open_scroll(
        &self,
        index: Option<&str>,
        query: &Value,
        page_size: usize,
        keep_alive: &str,
    ) -> StoreResult<ScrollPage> {
        let mut url = match index {
            Some(index) => self.endpoint(&[index, "_search"]),
            None => self.endpoint(&["_search"]),
        };
        url.query_pairs_mut().append_pair("scroll", keep_alive);

        let response = self
            .send(
                self.request(Method::POST, url)
                    .json(&scroll_query(query, page_size)),
            )
            .await?;
        self.search_page(response).await
    }

    async fn next_scroll(&self, scroll_id: &str, keep_alive: &str) -> StoreResult<ScrollPage> {
        let url = self.endpoint(&["_search", "scroll"]);
        let response = self
            .send(self.request(Method::POST, url).json(&ScrollRequest {
                scroll: keep_alive,
                scroll_id,
            }))
            .await?;
        self.search_page(response).await
    }

    async fn clear_scroll(&self, scroll_id: &str) -> StoreResult<()> {
        let url = self.endpoint(&["_search", "scroll"]);
        self.send(self.request(Method::DELETE, url).json(&ClearScrollRequest {
            scroll_id: vec![scroll_id],
        }))
        .await?;
        Ok(())
    }
}
