//! View-state synchronisation: debounced input and URL query parameters.

pub mod debounce;
pub mod history;
pub mod query;

pub use debounce::{DebounceState, Debouncer};
pub use history::{History, MemoryHistory};
pub use query::{QueryParamSet, QueryState, Reconciliation};
