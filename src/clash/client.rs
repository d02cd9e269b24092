use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::tag::encode_tag;
use super::{ApiResponse, ClashApi, Clan, ClientError, Connector, Player};
use crate::config::ClashConfig;

/// Builds a fresh [`HttpClient`] per lookup from the configured endpoint,
/// timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl HttpConnector {
    pub fn new(config: &ClashConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Connector for HttpConnector {
    type Client = HttpClient;

    fn connect(&self, api_key: &str) -> Result<HttpClient, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| ClientError::InvalidConfig("api token contains invalid header characters".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .default_headers(headers)
            .build()?;

        Ok(HttpClient {
            http,
            base_url: self.base_url.clone(),
        })
    }
}

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let resp = self.http.get(&url).query(query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "clash api returned an error");
            return Err(ClientError::from_status(status, &body));
        }

        let raw_data: Value = serde_json::from_str(&body)?;
        Ok(ApiResponse::decode(raw_data)?)
    }
}

#[async_trait::async_trait]
impl ClashApi for HttpClient {
    async fn get_player(&self, tag: &str) -> Result<ApiResponse<Player>, ClientError> {
        self.get(&format!("/players/{}", encode_tag(tag)), &[]).await
    }

    async fn get_player_battles(&self, tag: &str) -> Result<ApiResponse<Value>, ClientError> {
        self.get(&format!("/players/{}/battlelog", encode_tag(tag)), &[]).await
    }

    async fn get_clan(&self, tag: &str) -> Result<ApiResponse<Clan>, ClientError> {
        self.get(&format!("/clans/{}", encode_tag(tag)), &[]).await
    }

    async fn get_all_cards(&self) -> Result<ApiResponse<Value>, ClientError> {
        self.get("/cards", &[]).await
    }

    async fn get_top_players(&self, region: &str, limit: u32) -> Result<ApiResponse<Value>, ClientError> {
        self.get(
            &format!("/locations/{region}/rankings/players"),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn get_top_clans(&self, limit: u32) -> Result<ApiResponse<Value>, ClientError> {
        self.get("/locations/global/rankings/clans", &[("limit", limit.to_string())])
            .await
    }
}
