//! dog.ceo API client.
//!
//! Two read-only endpoints feed the gallery:
//!
//! - **Breed listing**: `GET {base}/breeds/list/all`, a map of breed name to
//!   sub-breeds, flattened into a sorted list of breed names.
//! - **Image sample**: `GET {base}/breed/{breed}/images/random/{n}`, up to
//!   `n` image URLs for one breed.
//!
//! Both return a `{status, message}` envelope. A non-2xx status or an
//! envelope whose status is not `"success"` is an error, never an empty
//! success. The client applies no timeout of its own; the fetch pipeline
//! bounds each call.

pub mod response;

pub use response::{ApiEnvelope, BreedMap, SUCCESS_STATUS, breed_names};

use kennel_core::{AppConfig, Error};
use reqwest::{StatusCode, header};
use std::time::Instant;
use url::Url;

/// Default base URL for the dog.ceo API.
const DEFAULT_BASE_URL: &str = "https://dog.ceo/api";

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "kennel/0.1";

/// dog.ceo client configuration.
#[derive(Debug, Clone)]
pub struct DogApiConfig {
    /// Base URL (default: https://dog.ceo/api).
    pub base_url: String,
    /// User-agent string (default: kennel/0.1).
    pub user_agent: String,
    /// Size of the random image sample per breed (default: 50).
    pub images_per_breed: u32,
}

impl Default for DogApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), user_agent: DEFAULT_USER_AGENT.to_string(), images_per_breed: 50 }
    }
}

impl From<&AppConfig> for DogApiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            user_agent: config.user_agent.clone(),
            images_per_breed: config.images_per_breed,
        }
    }
}

/// dog.ceo API client.
#[derive(Debug, Clone)]
pub struct DogApiClient {
    http: reqwest::Client,
    base_url: Url,
    images_per_breed: u32,
}

impl DogApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DogApiConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("{} cannot be a base URL", config.base_url)));
        }

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, base_url, images_per_breed: config.images_per_breed })
    }

    /// Fetch every top-level breed name.
    pub async fn list_breeds(&self) -> Result<Vec<String>, Error> {
        let url = self.endpoint(&["breeds", "list", "all"])?;
        let map: BreedMap = self.get_message(url).await?;
        Ok(breed_names(map))
    }

    /// Fetch a random sample of image URLs for `breed`.
    pub async fn breed_images(&self, breed: &str) -> Result<Vec<String>, Error> {
        let count = self.images_per_breed.to_string();
        let url = self.endpoint(&["breed", breed, "images", "random", &count])?;
        self.get_message(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_message<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let start = Instant::now();
        tracing::debug!("requesting {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Network(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(http_status_error(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        let message = ApiEnvelope::parse(&bytes)?.into_message()?;

        tracing::debug!("{} completed in {:?} ({} bytes)", url, start.elapsed(), bytes.len());

        Ok(message)
    }
}

fn http_status_error(status: StatusCode) -> Error {
    Error::HttpError(format!(
        "status {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    ))
}
