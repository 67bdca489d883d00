//! HTTP gateway for the grocery items REST API.
//!
//! Four logical operations over one collection resource:
//! list, create, update-by-id, delete-by-id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::models::{GroceryItem, ItemPatch, NewItem};

use super::GatewayError;

/// The request boundary the coordinators depend on.
///
/// Implementations own no cache state and perform no retries; every
/// failure propagates to the caller unmodified.
#[async_trait]
pub trait ItemGateway: Send + Sync {
    /// Fetch the full collection.
    async fn list(&self) -> Result<Vec<GroceryItem>, GatewayError>;

    /// Create an item; the server assigns the id.
    async fn create(&self, item: &NewItem) -> Result<GroceryItem, GatewayError>;

    /// Patch one or more fields of an existing item.
    async fn update(&self, id: &str, patch: &ItemPatch) -> Result<GroceryItem, GatewayError>;

    /// Delete an item, returning its last known state.
    async fn delete(&self, id: &str) -> Result<GroceryItem, GatewayError>;
}

/// Gateway over the items REST API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpItemGateway {
    client: Client,
    base_url: String,
}

impl HttpItemGateway {
    /// Build a gateway from the client configuration.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn items_url(&self) -> String {
        format!("{}/items", self.base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/items/{}", self.base_url, id)
    }

    /// Check if response is successful, mapping failures by status.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ItemGateway for HttpItemGateway {
    async fn list(&self) -> Result<Vec<GroceryItem>, GatewayError> {
        let url = self.items_url();
        debug!(url = %url, "fetching grocery list");
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    async fn create(&self, item: &NewItem) -> Result<GroceryItem, GatewayError> {
        let url = self.items_url();
        debug!(url = %url, name = %item.name, "creating item");
        let response = self.client.post(&url).json(item).send().await?;
        Self::parse(response).await
    }

    async fn update(&self, id: &str, patch: &ItemPatch) -> Result<GroceryItem, GatewayError> {
        let url = self.item_url(id);
        debug!(url = %url, "updating item");
        let response = self.client.patch(&url).json(patch).send().await?;
        Self::parse(response).await
    }

    async fn delete(&self, id: &str) -> Result<GroceryItem, GatewayError> {
        let url = self.item_url(id);
        debug!(url = %url, "deleting item");
        let response = self.client.delete(&url).send().await?;
        Self::parse(response).await
    }
}
