//! IO Select Core
//!
//! Headless engine behind the IO Select widget: selection state bridged to a
//! host form control, local or paginated remote candidates, debounced search,
//! and fixed-height list virtualization. No browser dependency; the Leptos
//! frontend drives it.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod models;
pub mod pool;
pub mod selection;
pub mod virtualizer;

pub use config::{default_results, DataMapper, InitialSelection, IoSelectOptions, RemoteOptions, ResultsMapper};
pub use controller::{
    DropdownController, DropdownState, Key, KeyOutcome, ListState, RowClick, RowRenderer, ScrollOutcome,
    SearchOutcome,
};
pub use debounce::{Debouncer, TaskId};
pub use error::{FetchError, IoSelectError};
pub use fetch::{FetchKind, FetchOutcome, FetchState, FetchTicket, RemoteFetcher, RequestParams};
pub use host::{HostControl, MemoryControl};
pub use lifecycle::{Lifecycle, Method, Registry};
pub use models::{FetchPage, Item, ScrollMetrics, SearchQuery};
pub use pool::{CandidatePool, PoolMode};
pub use selection::SelectionStore;
pub use virtualizer::{VirtualWindow, Virtualizer};
