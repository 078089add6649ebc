use futures::future::BoxFuture;
use quick_xml::de::from_str;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::api::models::{GuildResponse, PlaysResponse};
use crate::api::GameTracker;
use crate::error::FetchError;
use crate::util::dates::{Window, DATE_FORMAT};
use crate::{fmt, str};

const BASE_URL: &str = "https://boardgamegeek.com/xmlapi2";

/// Client for the BoardGameGeek XML API 2. Issues one GET per call and
/// deserializes the body; throttling is the caller's responsibility.
pub struct BggApi {
    client: reqwest::Client,
    base_url: String,
}

impl BggApi {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: str!(BASE_URL),
        }
    }

    async fn fetch_guild_page(
        &self,
        guild_id: u32,
        page: u32,
    ) -> Result<GuildResponse, FetchError> {
        let url = fmt!(
            "{}/guild?id={guild_id}&members=1&sort=date&page={page}",
            self.base_url
        );
        info!(guild_id, page, url, "Fetching guild roster page");
        self.get_xml(&url).await
    }

    async fn fetch_plays_page(
        &self,
        username: &str,
        window: Window,
        page: u32,
    ) -> Result<PlaysResponse, FetchError> {
        let url = fmt!(
            "{}/plays?username={username}&mindate={}&maxdate={}&page={page}",
            self.base_url,
            window.start.format(DATE_FORMAT),
            window.end.format(DATE_FORMAT)
        );
        info!(username, page, url, "Fetching plays page");
        self.get_xml(&url).await
    }

    async fn get_xml<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| FetchError::Transport {
                url: str!(url),
                source,
            })?;

        let body = response.text().await.map_err(|source| FetchError::Transport {
            url: str!(url),
            source,
        })?;

        from_str(&body).map_err(|source| FetchError::Parse {
            url: str!(url),
            source,
        })
    }
}

impl GameTracker for BggApi {
    fn guild_page(
        &self,
        guild_id: u32,
        page: u32,
    ) -> BoxFuture<'_, Result<GuildResponse, FetchError>> {
        Box::pin(self.fetch_guild_page(guild_id, page))
    }

    fn plays_page<'a>(
        &'a self,
        username: &'a str,
        window: Window,
        page: u32,
    ) -> BoxFuture<'a, Result<PlaysResponse, FetchError>> {
        Box::pin(self.fetch_plays_page(username, window, page))
    }
}
