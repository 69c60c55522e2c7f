//! Result of one cache-first resolution.

use std::fmt;

use kennel_core::{Error, ErrorKind};

/// Banner shown next to stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The device is offline.
    Offline,
    /// The network was reachable but the fetch failed or timed out.
    FetchFailed,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::Offline => "You're currently offline. Showing cached data.",
            Advisory::FetchFailed => "There was an error fetching the latest data. Showing cached results instead.",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Exactly one of: live data, cached fallback data, or nothing at all.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// Data from a valid cache record or a successful network call.
    Fresh(T),
    /// The network path failed; `data` is the most recent stored value, possibly expired.
    Stale { data: T, cause: Error },
    /// No data of any kind could be produced.
    Unavailable(Error),
}

impl<T> FetchOutcome<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, FetchOutcome::Fresh(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, FetchOutcome::Stale { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Fresh(data) | FetchOutcome::Stale { data, .. } => Some(data),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Fresh(data) | FetchOutcome::Stale { data, .. } => Some(data),
            FetchOutcome::Unavailable(_) => None,
        }
    }

    /// The error that kept this outcome from being fresh, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            FetchOutcome::Fresh(_) => None,
            FetchOutcome::Stale { cause, .. } => Some(cause),
            FetchOutcome::Unavailable(err) => Some(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Fresh(data) => FetchOutcome::Fresh(f(data)),
            FetchOutcome::Stale { data, cause } => FetchOutcome::Stale { data: f(data), cause },
            FetchOutcome::Unavailable(err) => FetchOutcome::Unavailable(err),
        }
    }

    /// Non-blocking banner to show next to stale data.
    pub fn advisory(&self) -> Option<Advisory> {
        match self {
            FetchOutcome::Stale { cause, .. } if cause.kind() == ErrorKind::Offline => Some(Advisory::Offline),
            FetchOutcome::Stale { .. } => Some(Advisory::FetchFailed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_accessors() {
        let fresh = FetchOutcome::Fresh(vec![1]);
        assert!(fresh.is_fresh());
        assert_eq!(fresh.data(), Some(&vec![1]));
        assert!(fresh.error().is_none());

        let stale = FetchOutcome::Stale { data: 2, cause: Error::Timeout(Duration::from_secs(10)) };
        assert!(stale.is_stale());
        assert!(matches!(stale.error(), Some(Error::Timeout(_))));
        assert_eq!(stale.into_data(), Some(2));

        let unavailable: FetchOutcome<i32> = FetchOutcome::Unavailable(Error::Offline("x".into()));
        assert!(unavailable.data().is_none());
        assert!(unavailable.advisory().is_none());
    }

    #[test]
    fn test_map_preserves_case() {
        let stale = FetchOutcome::Stale { data: 2, cause: Error::HttpError("500".into()) }.map(|n| n * 10);
        assert!(matches!(stale, FetchOutcome::Stale { data: 20, .. }));
    }

    #[test]
    fn test_advisory_wording() {
        let offline = FetchOutcome::Stale { data: (), cause: Error::Offline("x".into()) };
        assert_eq!(offline.advisory(), Some(Advisory::Offline));
        assert!(Advisory::Offline.message().contains("offline"));

        let failed = FetchOutcome::Stale { data: (), cause: Error::Timeout(Duration::from_secs(15)) };
        assert_eq!(failed.advisory(), Some(Advisory::FetchFailed));
        assert!(Advisory::FetchFailed.to_string().contains("error fetching"));

        assert!(FetchOutcome::Fresh(()).advisory().is_none());
    }
}
