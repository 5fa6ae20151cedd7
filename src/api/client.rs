//! HTTP client for the admin REST API.
//!
//! Handles authentication, JSON encoding, error mapping and retry of
//! transient failures on read requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::auth::{Auth, TokenSource};
use super::backend::CityBackend;
use super::error::{ApiError, Result};
use super::types::{City, Country, NewCity};
use crate::config::Settings;

/// Maximum number of attempts for read requests.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// The admin API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CityClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for CityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CityClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CityClient {
    /// Create a client from settings.
    ///
    /// A missing token is not an error here: the access guard keeps the
    /// screen from issuing requests without a session.
    #[instrument(skip(settings, tokens), fields(api_url = %settings.api_url))]
    pub fn from_settings(settings: &Settings, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        info!("Creating admin API client");
        if tokens.token().is_none() {
            warn!("No session token stored yet; requests stay unauthenticated until one is");
        }
        Self::new(
            &settings.api_url,
            tokens,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Create a client reading its token from `tokens`.
    pub fn new(base_url: &str, tokens: Arc<dyn TokenSource>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(auth) = self.tokens.token().map(|token| Auth::bearer(&token)) {
            builder = builder.header(header::AUTHORIZATION, auth.header_value());
        }
        builder
    }

    /// GET with retry of transient failures.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(path, "Request attempt {}/{}", attempts, MAX_RETRIES);

            let result = match self.request(Method::GET, path).send().await {
                Ok(response) => Self::parse_json(response).await,
                Err(e) => Err(ApiError::Network(e)),
            };

            match result {
                Err(e) if e.is_transient() && attempts < MAX_RETRIES => {
                    let delay = calculate_retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                other => return other,
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Turn a non-success response into an `ApiError`.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(error_from_response(status, &url, &body))
    }
}

#[async_trait]
impl CityBackend for CityClient {
    #[instrument(skip(self))]
    async fn list_cities(&self) -> Result<Vec<City>> {
        let cities: Vec<City> = self.get("cities").await?;
        debug!("Fetched {} cities", cities.len());
        Ok(cities)
    }

    #[instrument(skip(self, city), fields(name = %city.name))]
    async fn create_city(&self, city: NewCity) -> Result<City> {
        let response = self.request(Method::POST, "cities").json(&city).send().await?;
        let created: City = Self::parse_json(response).await?;
        info!(id = ?created.id, "City created");
        Ok(created)
    }

    #[instrument(skip(self, city), fields(id = ?city.id))]
    async fn update_city(&self, city: City) -> Result<City> {
        let id = city.id.ok_or(ApiError::MissingId)?;
        let response = self
            .request(Method::PUT, &format!("cities/{}", id))
            .json(&city)
            .send()
            .await?;
        let updated: City = Self::parse_json(response).await?;
        info!("City updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_city(&self, id: i64) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("cities/{}", id))
            .send()
            .await?;
        Self::check_status(response).await.map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!("city {}", id)),
            other => other,
        })?;
        info!("City deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_countries(&self) -> Result<Vec<Country>> {
        let countries: Vec<Country> = self.get("countries").await?;
        debug!("Fetched {} countries", countries.len());
        Ok(countries)
    }
}

/// Build an error from a failed response, preferring the server's message.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "title"] {
            if let Some(message) = json.get(key).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return ApiError::from_status(status, message);
                }
            }
        }
    }
    ApiError::from_status(status, url)
}

/// Exponential backoff.
fn calculate_retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt.saturating_sub(1))
}

/// Strip trailing slashes and check the scheme.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            url
        )));
    }

    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    Ok(url.to_string())
}
