//! Core Models
//!
//! Data structures shared by every part of the engine.

use serde::{Deserialize, Serialize};

/// A selectable entry: `id` is unique within one control, `name` is the label.
///
/// The empty id is reserved for the control's "no selection" placeholder and
/// never appears as a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(alias = "text")]
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// True for the placeholder entry (empty id)
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty()
    }
}

/// Search parameters handed to the request data mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
}

/// One page of remote candidates after results mapping
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchPage {
    pub results: Vec<Item>,
    pub has_more: bool,
}

/// Scroll geometry of the option list, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// Distance left to scroll before reaching the end of the list
    pub fn remaining(&self) -> f64 {
        (self.scroll_height - self.scroll_top - self.client_height).max(0.0)
    }
}
