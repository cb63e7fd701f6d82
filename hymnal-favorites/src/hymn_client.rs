//! Hymn lookup against the service's `GET /api/hymns/{id}`

use std::time::Duration;

use async_trait::async_trait;
use hymnal_common::{Hymn, HymnId};

use crate::error::FavoriteError;
use crate::http::{build_client, error_from_response, join_url};

/// Resolves a hymn id to its full record
#[async_trait]
pub trait HymnLookup: Send + Sync {
    async fn fetch_hymn(&self, hymn_id: &HymnId) -> Result<Hymn, FavoriteError>;
}

pub struct HymnClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HymnClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FavoriteError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl HymnLookup for HymnClient {
    async fn fetch_hymn(&self, hymn_id: &HymnId) -> Result<Hymn, FavoriteError> {
        // Path segment: ids are opaque, so keep reserved characters out
        let mut url = reqwest::Url::parse(&join_url(&self.base_url, "/api/hymns/"))
            .map_err(|e| FavoriteError::Network(format!("Invalid server URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FavoriteError::Network("Server URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(hymn_id.as_str());

        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| FavoriteError::Parse(e.to_string()))
    }
}
