//! Document store factory

use crate::adapters::elasticsearch::ElasticsearchClient;
use crate::adapters::store::traits::DocumentStore;
use crate::config::ConnectionConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the store client for a connection configuration
///
/// # Errors
///
/// Returns a configuration error if the CA certificate cannot be loaded or
/// the HTTP client cannot be built.
pub fn create_document_store(config: &ConnectionConfig) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!(
        url = %config.base_url(),
        username = %config.username,
        ca_cert = ?config.ca_cert,
        "Creating Elasticsearch client"
    );
    let client = ElasticsearchClient::new(config)?;
    Ok(Arc::new(client) as Arc<dyn DocumentStore>)
}
