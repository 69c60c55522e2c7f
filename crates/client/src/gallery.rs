//! Gallery data access and view-state helpers.
//!
//! [`Gallery`] binds the dog.ceo client to the fetch pipeline with the right
//! cache key and timeout per resource. The free functions interpret the
//! gallery's query parameters.

use std::time::Duration;

use kennel_core::{AppConfig, CacheKey, Error, ExpiringStore};

use crate::dogapi::{DogApiClient, DogApiConfig};
use crate::fetch::{FetchOutcome, FetchPipeline};
use crate::network::NetworkStatus;
use crate::sync::QueryParamSet;

/// Free-text breed filter.
pub const SEARCH_PARAM: &str = "search";
/// Index of the selected image in a breed's sample.
pub const IMAGE_PARAM: &str = "image";
/// Provenance marker set by the host when it links into a breed page.
pub const FROM_PARAM: &str = "from";

/// Declared parameters of the gallery views, with their defaults.
pub const GALLERY_PARAMS: [(&str, &str); 2] = [(SEARCH_PARAM, ""), (IMAGE_PARAM, "")];

#[derive(Debug, Clone)]
pub struct Gallery {
    pipeline: FetchPipeline,
    api: DogApiClient,
    network: NetworkStatus,
    list_timeout: Duration,
    images_timeout: Duration,
}

impl Gallery {
    pub fn new(config: &AppConfig, store: ExpiringStore, network: NetworkStatus) -> Result<Self, Error> {
        let api = DogApiClient::new(DogApiConfig::from(config))?;
        Ok(Self {
            pipeline: FetchPipeline::new(store),
            api,
            network,
            list_timeout: config.list_timeout(),
            images_timeout: config.images_timeout(),
        })
    }

    pub fn pipeline(&self) -> &FetchPipeline {
        &self.pipeline
    }

    pub fn network(&self) -> &NetworkStatus {
        &self.network
    }

    /// All breed names, sorted.
    pub async fn breeds(&self) -> FetchOutcome<Vec<String>> {
        let key = CacheKey::breed_list();
        self.pipeline
            .resolve(&key, self.list_timeout, self.network.is_online(), || self.api.list_breeds())
            .await
    }

    /// A sample of image URLs for one breed.
    ///
    /// An empty sample is never cached, and an empty cached sample is a miss.
    pub async fn breed_images(&self, breed: &str) -> FetchOutcome<Vec<String>> {
        let key = CacheKey::breed_images(breed);
        self.pipeline
            .resolve_where(
                &key,
                self.images_timeout,
                self.network.is_online(),
                || self.api.breed_images(breed),
                |images: &Vec<String>| !images.is_empty(),
            )
            .await
    }
}

/// Breeds whose name contains `query`, ignoring case. An empty query keeps all.
pub fn filter_breeds<'a>(breeds: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    breeds
        .iter()
        .map(String::as_str)
        .filter(|breed| needle.is_empty() || breed.to_lowercase().contains(&needle))
        .collect()
}

/// The selected image index, if the `image` param names one of `available` images.
pub fn selected_image(params: &QueryParamSet, available: usize) -> Option<usize> {
    params
        .get(IMAGE_PARAM)
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|&index| index < available)
}
