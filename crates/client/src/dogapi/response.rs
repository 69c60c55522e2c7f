//! dog.ceo response envelope and normalization.

use std::collections::BTreeMap;

use kennel_core::Error;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Status value the API uses for a successful envelope.
pub const SUCCESS_STATUS: &str = "success";

/// Raw `{status, message}` envelope returned by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: serde_json::Value,
}

/// `message` payload of `/breeds/list/all`: breed name to sub-breeds.
pub type BreedMap = BTreeMap<String, Vec<String>>;

impl ApiEnvelope {
    /// Parse a response body into an envelope.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedData(format!("invalid envelope: {e}")))
    }

    /// Unwrap the payload, treating any non-success status as a failure.
    pub fn into_message<T: DeserializeOwned>(self) -> Result<T, Error> {
        if self.status != SUCCESS_STATUS {
            let detail = self.message.as_str().unwrap_or("no detail");
            return Err(Error::HttpError(format!("API returned status {:?}: {detail}", self.status)));
        }

        serde_json::from_value(self.message).map_err(|e| Error::MalformedData(format!("unexpected payload: {e}")))
    }
}

/// Flatten the breed map into its (sorted) breed names.
pub fn breed_names(map: BreedMap) -> Vec<String> {
    map.into_keys().collect()
}
