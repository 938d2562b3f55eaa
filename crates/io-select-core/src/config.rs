//! Widget Options
//!
//! Recognized configuration keys, parsed from camelCase JSON / JS objects.
//! Every field has a default so a bare `{}` is valid.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FetchError, IoSelectError};
use crate::models::{FetchPage, Item, SearchQuery};

pub const DEFAULT_ROW_HEIGHT: f64 = 36.0;
pub const DEFAULT_BUFFER_ROWS: usize = 5;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 240.0;
pub const DEFAULT_SCROLL_DELAY_MS: u32 = 16;
pub const DEFAULT_SEARCH_DELAY_MS: u32 = 250;

/// Top-level widget options
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IoSelectOptions {
    pub placeholder: String,
    pub search_placeholder: String,
    pub no_results_text: String,
    pub loading_text: String,
    pub error_text: String,
    pub searchable: bool,
    /// Overrides the host's own multiple attribute when set
    pub multiple: Option<bool>,
    pub virtualize: bool,
    pub row_height: f64,
    pub buffer_rows: usize,
    /// Height of the option list before the first scroll event is seen
    pub viewport_height: f64,
    /// Debounce for virtual window recomputation while scrolling
    pub scroll_delay: u32,
    pub remote: Option<RemoteOptions>,
    pub initial_selection: Vec<InitialSelection>,
}

impl Default for IoSelectOptions {
    fn default() -> Self {
        Self {
            placeholder: "Make a selection".to_string(),
            search_placeholder: "Search...".to_string(),
            no_results_text: "No results found".to_string(),
            loading_text: "Loading...".to_string(),
            error_text: "Failed to load results".to_string(),
            searchable: true,
            multiple: None,
            virtualize: false,
            row_height: DEFAULT_ROW_HEIGHT,
            buffer_rows: DEFAULT_BUFFER_ROWS,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_delay: DEFAULT_SCROLL_DELAY_MS,
            remote: None,
            initial_selection: Vec::new(),
        }
    }
}

impl IoSelectOptions {
    pub fn from_json(value: Value) -> Result<Self, IoSelectError> {
        let options: Self =
            serde_json::from_value(value).map_err(|e| IoSelectError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), IoSelectError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(IoSelectError::InvalidOptions(format!(
                "rowHeight must be positive, got {}",
                self.row_height
            )));
        }
        if !(self.viewport_height.is_finite() && self.viewport_height >= 0.0) {
            return Err(IoSelectError::InvalidOptions(format!(
                "viewportHeight must not be negative, got {}",
                self.viewport_height
            )));
        }
        if let Some(remote) = &self.remote {
            if remote.url.trim().is_empty() {
                return Err(IoSelectError::InvalidOptions("remote.url is required".to_string()));
            }
        }
        Ok(())
    }
}

/// A preselected item, optionally known only by id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InitialSelection {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default, alias = "text")]
    pub name: Option<String>,
}

/// Remote data source settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteOptions {
    pub url: String,
    pub method: String,
    pub data_type: String,
    /// Search debounce in milliseconds
    pub delay: u32,
    pub minimum_input_length: usize,
    pub page_param: String,
    pub search_param: String,
    /// Endpoint resolving labels for ids preselected without a name
    pub initial_value_url: Option<String>,
    #[serde(skip)]
    pub data: Option<DataMapper>,
    #[serde(skip)]
    pub process_results: Option<ResultsMapper>,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: "GET".to_string(),
            data_type: "json".to_string(),
            delay: DEFAULT_SEARCH_DELAY_MS,
            minimum_input_length: 0,
            page_param: "page".to_string(),
            search_param: "search".to_string(),
            initial_value_url: None,
            data: None,
            process_results: None,
        }
    }
}

impl RemoteOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_data_mapper(mut self, mapper: impl Fn(&SearchQuery) -> Value + 'static) -> Self {
        self.data = Some(DataMapper::new(mapper));
        self
    }

    pub fn with_results_mapper(
        mut self,
        mapper: impl Fn(&Value, &SearchQuery) -> Result<FetchPage, FetchError> + 'static,
    ) -> Self {
        self.process_results = Some(ResultsMapper::new(mapper));
        self
    }

    /// Transport parameters for one search/page request
    pub fn map_request(&self, query: &SearchQuery) -> Value {
        match &self.data {
            Some(mapper) => mapper.map(query),
            None => {
                let mut params = Map::new();
                params.insert(self.search_param.clone(), Value::from(query.term.as_str()));
                params.insert(self.page_param.clone(), Value::from(query.page));
                Value::Object(params)
            }
        }
    }

    pub fn map_results(&self, raw: &Value, query: &SearchQuery) -> Result<FetchPage, FetchError> {
        match &self.process_results {
            Some(mapper) => mapper.map(raw, query),
            None => default_results(raw),
        }
    }
}

// ========================
// Mapping Functions
// ========================

/// Maps `{term, page}` to the request payload
#[derive(Clone)]
pub struct DataMapper(Rc<dyn Fn(&SearchQuery) -> Value>);

impl DataMapper {
    pub fn new(f: impl Fn(&SearchQuery) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn map(&self, query: &SearchQuery) -> Value {
        (self.0)(query)
    }
}

impl fmt::Debug for DataMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataMapper(..)")
    }
}

/// Maps a raw response body to a page of items
#[derive(Clone)]
pub struct ResultsMapper(Rc<dyn Fn(&Value, &SearchQuery) -> Result<FetchPage, FetchError>>);

impl ResultsMapper {
    pub fn new(f: impl Fn(&Value, &SearchQuery) -> Result<FetchPage, FetchError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn map(&self, raw: &Value, query: &SearchQuery) -> Result<FetchPage, FetchError> {
        (self.0)(raw, query)
    }
}

impl fmt::Debug for ResultsMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultsMapper(..)")
    }
}

/// Default response shape: `{results: [...], hasMore}` or
/// `{results: [...], pagination: {more}}`. A bare array is one final page.
pub fn default_results(raw: &Value) -> Result<FetchPage, FetchError> {
    let (entries, has_more) = match raw {
        Value::Array(entries) => (entries, false),
        Value::Object(map) => {
            let entries = map
                .get("results")
                .and_then(Value::as_array)
                .ok_or_else(|| FetchError::InvalidResponse("missing `results` array".to_string()))?;
            let has_more = map
                .get("hasMore")
                .and_then(Value::as_bool)
                .or_else(|| map.get("pagination").and_then(|p| p.get("more")).and_then(Value::as_bool))
                .unwrap_or(false);
            (entries, has_more)
        }
        _ => return Err(FetchError::InvalidResponse("expected an object or array".to_string())),
    };

    let results = entries.iter().map(item_from_value).collect::<Result<Vec<_>, _>>()?;
    Ok(FetchPage { results, has_more })
}

fn item_from_value(value: &Value) -> Result<Item, FetchError> {
    let id = value
        .get("id")
        .and_then(scalar_to_string)
        .ok_or_else(|| FetchError::InvalidResponse(format!("result without id: {value}")))?;
    let name = value
        .get("name")
        .or_else(|| value.get("text"))
        .and_then(scalar_to_string)
        .unwrap_or_else(|| id.clone());
    Ok(Item { id, name })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| serde::de::Error::custom("id must be a string or number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_uses_defaults() {
        let options = IoSelectOptions::from_json(json!({})).unwrap();
        assert_eq!(options.placeholder, "Make a selection");
        assert_eq!(options.search_placeholder, "Search...");
        assert_eq!(options.no_results_text, "No results found");
        assert!(options.searchable);
        assert!(!options.virtualize);
        assert_eq!(options.row_height, 36.0);
        assert!(options.remote.is_none());
    }

    #[test]
    fn test_camel_case_keys() {
        let options = IoSelectOptions::from_json(json!({
            "noResultsText": "Nothing",
            "rowHeight": 24,
            "bufferRows": 2,
            "remote": { "url": "/api/users", "minimumInputLength": 2, "pageParam": "p" },
            "initialSelection": [{ "id": 7 }, { "id": "a", "text": "Alpha" }]
        }))
        .unwrap();
        assert_eq!(options.no_results_text, "Nothing");
        assert_eq!(options.row_height, 24.0);
        assert_eq!(options.buffer_rows, 2);
        let remote = options.remote.unwrap();
        assert_eq!(remote.minimum_input_length, 2);
        assert_eq!(remote.page_param, "p");
        assert_eq!(remote.method, "GET");
        assert_eq!(options.initial_selection[0].id, "7");
        assert_eq!(options.initial_selection[1].name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_invalid_row_height_rejected() {
        let err = IoSelectOptions::from_json(json!({ "rowHeight": 0 })).unwrap_err();
        assert!(matches!(err, IoSelectError::InvalidOptions(_)));
    }

    #[test]
    fn test_remote_requires_url() {
        assert!(IoSelectOptions::from_json(json!({ "remote": {} })).is_err());
    }

    #[test]
    fn test_default_request_mapping() {
        let remote = RemoteOptions::new("/api");
        let query = SearchQuery { term: "ab".to_string(), page: 3 };
        assert_eq!(remote.map_request(&query), json!({ "search": "ab", "page": 3 }));
    }

    #[test]
    fn test_custom_request_mapping() {
        let remote = RemoteOptions::new("/api").with_data_mapper(|q| json!({ "q": q.term, "offset": (q.page - 1) * 20 }));
        let query = SearchQuery { term: "x".to_string(), page: 2 };
        assert_eq!(remote.map_request(&query), json!({ "q": "x", "offset": 20 }));
    }

    #[test]
    fn test_default_results_shapes() {
        let page = default_results(&json!({
            "results": [{ "id": 5, "name": "X" }, { "id": "6", "text": "Y" }],
            "pagination": { "more": true }
        }))
        .unwrap();
        assert_eq!(page.results, vec![Item::new("5", "X"), Item::new("6", "Y")]);
        assert!(page.has_more);

        let page = default_results(&json!({ "results": [], "hasMore": false })).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more);

        let page = default_results(&json!([{ "id": "1", "name": "A" }])).unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(!page.has_more);
    }

    #[test]
    fn test_default_results_rejects_garbage() {
        assert!(default_results(&json!("nope")).is_err());
        assert!(default_results(&json!({ "items": [] })).is_err());
        assert!(default_results(&json!({ "results": [{ "name": "no id" }] })).is_err());
    }
}
