use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::models::{CatalogKind, CatalogPage, CatalogRecord, SingleEnvelope};
use super::traits::CatalogProvider;
use crate::config::AppConfig;
use crate::errors::AppError;

const USER_AGENT: &str = concat!("animark/", env!("CARGO_PKG_VERSION"));

/// Client for the Jikan v4 REST API.
pub struct JikanClient {
    client: Client,
    base_url: String,
    page_limit: u32,
}

impl JikanClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        Self::with_settings(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            config.page_limit,
        )
    }

    pub fn with_settings(
        base_url: &str,
        timeout: Duration,
        page_limit: u32,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_limit,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, AppError> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| AppError::Catalog(format!("URL parse error: {}", e)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        log::debug!("Catalog request: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let url_debug = response.url().to_string();
        let text = response.text().await?;

        if status.as_u16() == 429 {
            log::warn!("Rate limit (429) at {}", url_debug);
            return Err(AppError::Catalog("rate limited (429)".to_string()));
        }

        if !status.is_success() {
            log::warn!("Catalog request failed ({}) at {}", status, url_debug);
            return Err(AppError::Catalog(format!("HTTP {} at {}", status, url_debug)));
        }

        serde_json::from_str(&text).map_err(|e| {
            log::warn!("Malformed catalog response at {}: {}", url_debug, e);
            AppError::Serialization(format!("JSON error at {}: {}", url_debug, e))
        })
    }

    fn page_params(&self, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.max(1).to_string()),
            ("limit", self.page_limit.to_string()),
        ]
    }

    pub async fn search_page(
        &self,
        kind: CatalogKind,
        query: &str,
        page: u32,
    ) -> Result<CatalogPage, AppError> {
        let mut params = vec![("q", query.trim().to_string())];
        params.extend(self.page_params(page));
        self.get_json(&format!("/{}", kind.as_str()), &params).await
    }

    pub async fn top_page(&self, kind: CatalogKind, page: u32) -> Result<CatalogPage, AppError> {
        self.get_json(&format!("/top/{}", kind.as_str()), &self.page_params(page))
            .await
    }

    pub async fn record(&self, kind: CatalogKind, mal_id: u64) -> Result<CatalogRecord, AppError> {
        let envelope: SingleEnvelope<CatalogRecord> = self
            .get_json(&format!("/{}/{}/full", kind.as_str(), mal_id), &[])
            .await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl CatalogProvider for JikanClient {
    fn id(&self) -> &str {
        "jikan"
    }

    fn name(&self) -> &str {
        "Jikan (MyAnimeList)"
    }

    async fn search(
        &self,
        kind: CatalogKind,
        query: &str,
        page: u32,
    ) -> anyhow::Result<CatalogPage> {
        Ok(self.search_page(kind, query, page).await?)
    }

    async fn top(&self, kind: CatalogKind, page: u32) -> anyhow::Result<CatalogPage> {
        Ok(self.top_page(kind, page).await?)
    }

    async fn get(&self, kind: CatalogKind, mal_id: u64) -> anyhow::Result<CatalogRecord> {
        Ok(self.record(kind, mal_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> JikanClient {
        JikanClient::with_settings(&server.url(), Duration::from_secs(5), 10).unwrap()
    }

    #[tokio::test]
    async fn test_search_sends_query_page_and_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/anime")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "fullmetal".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[{"mal_id":5114,"title":"Fullmetal Alchemist: Brotherhood"}],
                    "pagination":{"last_visible_page":3,"has_next_page":true}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client.search_anime(" fullmetal ", 2).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].mal_id, 5114);
        assert!(page.has_next_page());
    }

    #[tokio::test]
    async fn test_top_uses_top_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/top/manga")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(r#"{"data":[{"mal_id":2,"title":"Berserk","chapters":null}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client.top_manga(0).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.data[0].chapters, None);
    }

    #[tokio::test]
    async fn test_get_character_unwraps_single_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/characters/11/full")
            .with_status(200)
            .with_body(
                r#"{"data":{"mal_id":11,"name":"Edward Elric","favorites":90000,
                    "anime":[{"role":"Main","anime":{"mal_id":5114,"title":"FMA:B"}}]}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let record = client.get_character(11).await.unwrap();

        assert_eq!(record.display_name(), "Edward Elric");
        assert_eq!(record.first_work_title().as_deref(), Some("FMA:B"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/anime/1/full")
            .with_status(404)
            .with_body(r#"{"status":404,"message":"Resource does not exist"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.record(CatalogKind::Anime, 1).await.unwrap_err();

        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_serialization_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/manga")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .search_page(CatalogKind::Manga, "berserk", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Serialization(_)));
    }
}
