//! Client side of kennel.
//!
//! This crate provides the dog.ceo API client, the cache-first fetch
//! pipeline, the network-reachability signal and the view-state
//! synchronisation (debounce and URL query params) used by the CLI.

pub mod dogapi;
pub mod fetch;
pub mod gallery;
pub mod network;
pub mod sync;

pub use dogapi::{DogApiClient, DogApiConfig};
pub use fetch::{Advisory, FetchOutcome, FetchPipeline};
pub use gallery::{FROM_PARAM, GALLERY_PARAMS, Gallery, IMAGE_PARAM, SEARCH_PARAM, filter_breeds, selected_image};
pub use network::{NetworkMonitor, NetworkStatus};
pub use sync::{DebounceState, Debouncer, History, MemoryHistory, QueryParamSet, QueryState, Reconciliation};
