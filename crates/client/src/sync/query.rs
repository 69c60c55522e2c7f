//! URL query-state engine.
//!
//! Keeps a typed set of declared query parameters in step with the location's
//! query string, in both directions:
//!
//! - [`QueryState::update`] changes one parameter and writes the whole set back
//!   with an in-place `replace` (no new history entry). Undeclared parameters
//!   already in the URL are carried over untouched; declared ones are written
//!   only when non-empty and different from their default.
//! - [`QueryState::on_location_changed`] is called by the host after every
//!   location change, including the engine's own writes. It recognises its own
//!   write echoing back and skips it, and otherwise re-derives the declared
//!   parameters from the URL, publishing only if one of them really changed.
//!
//! An update arms a one-shot guard. The next observation consumes it: if the
//! location still shows the engine's write this is an echo, and if something
//! else changed the URL in the same tick the caller's update wins and is
//! written again.

use std::collections::BTreeMap;

use kennel_core::Error;
use tokio::sync::watch;
use url::{Url, form_urlencoded};

use super::history::History;

/// Values of the declared parameters. Absent and empty both mean "default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamSet {
    values: BTreeMap<String, String>,
}

impl QueryParamSet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set(&mut self, name: &str, value: String) {
        self.values.insert(name.to_string(), value);
    }
}

/// What an observed location change did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The location still shows this engine's last write.
    Echo,
    /// A pending update overrode a concurrent location change and was rewritten.
    CallerWins,
    /// The location changed but no declared parameter did.
    Unchanged,
    /// Declared parameters were re-derived from the location.
    Applied,
}

/// Two-way binding between declared parameters and a [`History`].
#[derive(Debug)]
pub struct QueryState<H> {
    history: H,
    declared: Vec<(String, String)>,
    params: QueryParamSet,
    last_serialized: String,
    update_pending: bool,
    revision: u64,
    tx: watch::Sender<QueryParamSet>,
}

impl<H: History> QueryState<H> {
    /// Bind `declared` (name, default) pairs to `history`, seeding values from
    /// the current location.
    pub fn new<N, D>(history: H, declared: impl IntoIterator<Item = (N, D)>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        let declared: Vec<(String, String)> = declared.into_iter().map(|(n, d)| (n.into(), d.into())).collect();
        let location = history.location();
        let params = project(&declared, &location);
        let last_serialized = location.query().unwrap_or_default().to_string();
        let (tx, _) = watch::channel(params.clone());

        Self { history, declared, params, last_serialized, update_pending: false, revision: 0, tx }
    }

    pub fn params(&self) -> &QueryParamSet {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Number of state transitions applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receiver notified on every applied transition.
    pub fn subscribe(&self) -> watch::Receiver<QueryParamSet> {
        self.tx.subscribe()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Set `name` to `value`, or back to its default for `None`/empty.
    ///
    /// Returns whether the value changed. An unchanged value writes nothing.
    pub fn update(&mut self, name: &str, value: Option<&str>) -> Result<bool, Error> {
        let default = self
            .default_for(name)
            .ok_or_else(|| Error::UnknownParam(name.to_string()))?;
        let next = match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => default.to_string(),
        };

        if self.params.get(name) == Some(next.as_str()) {
            return Ok(false);
        }

        tracing::debug!(param = name, value = %next, "updating query param");
        let mut params = self.params.clone();
        params.set(name, next);
        self.apply(params);
        self.write_location();
        self.update_pending = true;
        Ok(true)
    }

    /// Reconcile with the current location after the host saw it change.
    pub fn on_location_changed(&mut self) -> Reconciliation {
        let location = self.history.location();
        let current = location.query().unwrap_or_default();

        if std::mem::take(&mut self.update_pending) {
            if current == self.last_serialized {
                return Reconciliation::Echo;
            }
            tracing::debug!(query = current, "pending update overrides concurrent location change");
            self.write_location();
            return Reconciliation::CallerWins;
        }

        if current == self.last_serialized {
            return Reconciliation::Echo;
        }

        self.last_serialized = current.to_string();
        let derived = project(&self.declared, &location);
        if derived == self.params {
            return Reconciliation::Unchanged;
        }

        tracing::debug!(query = current, "query params changed externally");
        self.apply(derived);
        Reconciliation::Applied
    }

    fn default_for(&self, name: &str) -> Option<&str> {
        self.declared
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, default)| default.as_str())
    }

    fn apply(&mut self, params: QueryParamSet) {
        self.params = params;
        self.revision += 1;
        self.tx.send_replace(self.params.clone());
    }

    fn write_location(&mut self) {
        let mut url = self.history.location();
        let query = self.serialize(&url);
        url.set_query(if query.is_empty() { None } else { Some(query.as_str()) });

        self.last_serialized = url.query().unwrap_or_default().to_string();
        tracing::debug!("replacing location with {}", url);
        self.history.replace(url);
    }

    fn serialize(&self, location: &Url) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        for (key, value) in location.query_pairs() {
            if self.default_for(&key).is_none() {
                out.append_pair(&key, &value);
            }
        }

        for (name, default) in &self.declared {
            match self.params.get(name) {
                Some(value) if !value.is_empty() && value != default.as_str() => {
                    out.append_pair(name, value);
                }
                _ => {}
            }
        }

        out.finish()
    }
}

/// Read every declared parameter from `url`, falling back to its default.
fn project(declared: &[(String, String)], url: &Url) -> QueryParamSet {
    let mut params = QueryParamSet::default();
    for (name, default) in declared {
        let value = url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default.clone());
        params.set(name, value);
    }
    params
}
