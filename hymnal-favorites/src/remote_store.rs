//! Favorites of an authenticated account, held by the service
//!
//! Every call carries `Authorization: Bearer <token>` except the two public
//! aggregate reads. Status codes map onto `FavoriteError`; a 401 is always
//! surfaced as `Unauthenticated`.

use std::time::Duration;

use async_trait::async_trait;
use hymnal_common::api::auth::bearer_header_value;
use hymnal_common::api::types::{
    AddFavoriteRequest, CountResponse, FavoritesResponse, IsFavoritedResponse, PopularResponse,
};
use hymnal_common::models::PopularHymn;
use hymnal_common::{HymnId, HymnSummary};
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FavoriteError;
use crate::http::{build_client, error_from_response, join_url};
use crate::store::FavoriteStore;

const FAVORITES_PATH: &str = "/api/users/favorites";

pub struct RemoteFavoriteStore {
    http_client: reqwest::Client,
    base_url: String,
    session_token: String,
}

impl RemoteFavoriteStore {
    pub fn new(
        base_url: impl Into<String>,
        session_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FavoriteError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: base_url.into(),
            session_token: session_token.into(),
        })
    }

    fn url(&self) -> String {
        join_url(&self.base_url, FAVORITES_PATH)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(AUTHORIZATION, bearer_header_value(&self.session_token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<T, FavoriteError> {
        let mut request = self.http_client.get(self.url()).query(query);
        if authenticated {
            request = self.authorized(request);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| FavoriteError::Parse(e.to_string()))
    }

    /// Summaries of every favorite, oldest first
    pub async fn list_summaries(&self) -> Result<Vec<HymnSummary>, FavoriteError> {
        let body: FavoritesResponse = self.get_json(&[], true).await?;
        Ok(body.favorites)
    }

    pub async fn is_favorited(&self, hymn_id: &HymnId) -> Result<bool, FavoriteError> {
        let body: IsFavoritedResponse = self
            .get_json(&[("checkHymn", hymn_id.as_str())], true)
            .await?;
        Ok(body.is_favorited)
    }

    /// Favorite records across all accounts (no session needed)
    pub async fn global_count(&self) -> Result<u64, FavoriteError> {
        let body: CountResponse = self.get_json(&[("globalCount", "true")], false).await?;
        Ok(body.count)
    }

    /// Most favorited hymn across all accounts (no session needed)
    pub async fn most_popular(&self) -> Result<Option<PopularHymn>, FavoriteError> {
        let body: PopularResponse = self.get_json(&[("popular", "true")], false).await?;
        Ok(body.most_popular)
    }
}

#[async_trait]
impl FavoriteStore for RemoteFavoriteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self) -> Result<Vec<HymnId>, FavoriteError> {
        let favorites = self.list_summaries().await?;
        Ok(favorites.into_iter().map(|summary| summary.id).collect())
    }

    async fn add(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        debug!(hymn_id = %hymn_id, "POST favorite");
        let body = AddFavoriteRequest {
            hymn_id: Some(hymn_id.to_string()),
        };
        let response = self
            .authorized(self.http_client.post(self.url()))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::OK => Ok(()),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn remove(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        debug!(hymn_id = %hymn_id, "DELETE favorite");
        let response = self
            .authorized(self.http_client.delete(self.url()))
            .query(&[("hymnId", hymn_id.as_str())])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}
