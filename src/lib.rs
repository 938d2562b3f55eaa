//! IO Select
//!
//! Upgrades a native `<select>` into a searchable dropdown with a tag
//! summary, optional remote paging and a virtualized option list. The
//! `<select>` stays in the form as the source of truth for submitted values.
//!
//! From JavaScript: `ioSelect(selectElement, options)` or
//! `new IoSelect(selectElement).initialize(options)`.

pub mod binding;
pub mod components;
pub mod context;
pub mod host;
pub mod logger;
pub mod options;
pub mod timers;
pub mod transport;

pub use binding::{io_select, IoSelect};
pub use io_select_core as core;
pub use io_select_core::{IoSelectError, IoSelectOptions, RemoteOptions};
