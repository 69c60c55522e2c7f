//! Cache keys for the two resource families.

use std::fmt;

/// Opaque identifier for one cacheable resource.
///
/// The store only compares keys for equality; the constructors below fix the
/// persisted layout (one singleton for the breed list, one entry per breed).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Singleton key for the full breed listing.
    pub fn breed_list() -> Self {
        Self::new("dog-breeds-list")
    }

    /// Key for the image sample of one breed.
    pub fn breed_images(breed: &str) -> Self {
        Self(format!("dog-images-{breed}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
