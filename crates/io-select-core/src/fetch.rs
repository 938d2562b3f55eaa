//! Remote Fetcher
//!
//! Issues search and pagination requests against the configured endpoint and
//! applies their responses to the candidate pool.
//!
//! Requests are split in two halves so the engine stays free of any async
//! runtime: [`RemoteFetcher::request`] hands out a [`FetchTicket`] describing
//! what to send, and [`RemoteFetcher::complete`] takes the transport result
//! for that ticket. At most one ticket is in flight per fetcher. Every ticket
//! carries a sequence number; responses for anything but the latest
//! issued ticket are discarded.

use log::{debug, warn};
use serde_json::Value;

use crate::config::RemoteOptions;
use crate::error::FetchError;
use crate::models::{FetchPage, Item, SearchQuery};
use crate::pool::CandidatePool;

/// Progress of the active search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState {
    pub page: u32,
    pub search_term: String,
    pub is_loading: bool,
    pub has_more: bool,
    pub error: Option<FetchError>,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            page: 1,
            search_term: String::new(),
            is_loading: false,
            has_more: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Search or pagination page
    Page,
    /// Label lookup for preselected ids
    Labels,
}

/// What the transport should send
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParams {
    pub url: String,
    pub method: String,
    pub data_type: String,
    pub data: Value,
}

/// One issued request, handed back on completion
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub seq: u64,
    pub kind: FetchKind,
    pub query: SearchQuery,
    pub is_new_search: bool,
    pub params: RequestParams,
}

/// Result of feeding a response back into the fetcher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    /// The response changed pool or fetch state
    pub applied: bool,
    /// A search deferred while this request was in flight, now issued
    pub follow_up: Option<FetchTicket>,
}

pub struct RemoteFetcher {
    options: RemoteOptions,
    state: FetchState,
    next_seq: u64,
    latest_seq: u64,
    in_flight: Option<u64>,
    deferred: Option<String>,
}

impl RemoteFetcher {
    pub fn new(options: RemoteOptions) -> Self {
        Self {
            options,
            state: FetchState::default(),
            next_seq: 0,
            latest_seq: 0,
            in_flight: None,
            deferred: None,
        }
    }

    pub fn options(&self) -> &RemoteOptions {
        &self.options
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    /// True when `term` is long enough to be sent
    pub fn accepts_term(&self, term: &str) -> bool {
        term.chars().count() >= self.options.minimum_input_length
    }

    /// Issue a request for `page` of `term`. Refused while another request
    /// is in flight. A new search resets paging state; a previous error
    /// stays until a page is applied.
    pub fn request(&mut self, term: &str, page: u32, is_new_search: bool) -> Option<FetchTicket> {
        if self.state.is_loading {
            debug!("fetch refused, request {:?} still in flight", self.in_flight);
            return None;
        }

        if is_new_search {
            self.state = FetchState {
                search_term: term.to_string(),
                error: self.state.error.take(),
                ..FetchState::default()
            };
        }

        let query = SearchQuery {
            term: term.to_string(),
            page,
        };
        let params = RequestParams {
            url: self.options.url.clone(),
            method: self.options.method.to_uppercase(),
            data_type: self.options.data_type.clone(),
            data: self.options.map_request(&query),
        };

        let seq = self.issue();
        self.in_flight = Some(seq);
        self.state.is_loading = true;
        debug!("fetch #{seq} issued: term={:?} page={page} new={is_new_search}", query.term);

        Some(FetchTicket {
            seq,
            kind: FetchKind::Page,
            query,
            is_new_search,
            params,
        })
    }

    /// Start a new search, or remember it if a request is in flight. A
    /// remembered search invalidates the in-flight response and is issued
    /// from [`complete`](Self::complete).
    pub fn search(&mut self, term: &str) -> Option<FetchTicket> {
        if self.state.is_loading {
            debug!("search {term:?} deferred behind in-flight request");
            self.deferred = Some(term.to_string());
            self.latest_seq = self.bump();
            return None;
        }
        self.request(term, 1, true)
    }

    /// Pagination continuation of the active search
    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if !self.state.has_more || self.state.is_loading {
            return None;
        }
        let term = self.state.search_term.clone();
        let page = self.state.page + 1;
        self.request(&term, page, false)
    }

    /// Drop any deferred search and make the in-flight response stale
    pub fn invalidate(&mut self) {
        self.deferred = None;
        self.latest_seq = self.bump();
    }

    /// Label lookup for ids known only by id. Not gated by the in-flight
    /// lock; it targets a separate endpoint.
    pub fn label_request(&mut self, ids: &[String]) -> Option<FetchTicket> {
        let url = self.options.initial_value_url.clone()?;
        if ids.is_empty() {
            return None;
        }
        Some(FetchTicket {
            seq: self.bump(),
            kind: FetchKind::Labels,
            query: SearchQuery {
                term: String::new(),
                page: 1,
            },
            is_new_search: false,
            params: RequestParams {
                url,
                method: self.options.method.to_uppercase(),
                data_type: self.options.data_type.clone(),
                data: serde_json::json!({ "ids": ids }),
            },
        })
    }

    /// Interpret a label lookup response
    pub fn complete_labels(&self, ticket: &FetchTicket, result: Result<Value, FetchError>) -> Result<Vec<Item>, FetchError> {
        let raw = result?;
        let page = self.options.map_results(&raw, &ticket.query)?;
        Ok(page.results)
    }

    /// Apply the transport result for `ticket`
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Value, FetchError>,
        pool: &mut CandidatePool,
    ) -> FetchOutcome {
        if self.in_flight == Some(ticket.seq) {
            self.in_flight = None;
            self.state.is_loading = false;
        } else {
            debug!("fetch #{} completed but is not in flight, ignoring", ticket.seq);
            return FetchOutcome::default();
        }

        let mut outcome = FetchOutcome::default();
        if ticket.seq == self.latest_seq {
            outcome.applied = true;
            match result.and_then(|raw| self.options.map_results(&raw, &ticket.query)) {
                Ok(page) => self.apply_page(ticket, page, pool),
                Err(err) => {
                    warn!("fetch #{} failed: {err}", ticket.seq);
                    self.state.has_more = false;
                    self.state.error = Some(err);
                }
            }
        } else {
            debug!("fetch #{} is stale (latest #{}), discarding", ticket.seq, self.latest_seq);
        }

        if let Some(term) = self.deferred.take() {
            outcome.follow_up = self.request(&term, 1, true);
        }
        outcome
    }

    fn apply_page(&mut self, ticket: &FetchTicket, page: FetchPage, pool: &mut CandidatePool) {
        let count = page.results.len();
        if ticket.is_new_search {
            pool.replace(page.results);
        } else {
            pool.append(page.results);
        }
        self.state.page = ticket.query.page;
        self.state.has_more = page.has_more;
        self.state.error = None;
        debug!(
            "fetch #{} applied: {count} results, page={}, has_more={}",
            ticket.seq, self.state.page, self.state.has_more
        );
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn issue(&mut self) -> u64 {
        let seq = self.bump();
        self.latest_seq = seq;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolMode;
    use serde_json::json;

    fn fetcher() -> (RemoteFetcher, CandidatePool) {
        (RemoteFetcher::new(RemoteOptions::new("/api/items")), CandidatePool::new(PoolMode::Dynamic))
    }

    #[test]
    fn test_first_page_then_pagination() {
        let (mut fetcher, mut pool) = fetcher();

        let ticket = fetcher.request("", 1, true).unwrap();
        assert_eq!(ticket.params.data, json!({ "search": "", "page": 1 }));
        let outcome = fetcher.complete(
            &ticket,
            Ok(json!({ "results": [{ "id": "5", "name": "X" }], "hasMore": true })),
            &mut pool,
        );
        assert!(outcome.applied);
        assert_eq!(pool.items(), &[Item::new("5", "X")]);
        assert_eq!(fetcher.state().page, 1);
        assert!(fetcher.has_more());

        let ticket = fetcher.next_page().unwrap();
        assert_eq!(ticket.query.page, 2);
        assert!(!ticket.is_new_search);
        fetcher.complete(
            &ticket,
            Ok(json!({ "results": [{ "id": "5", "name": "X" }, { "id": "6", "name": "Y" }], "hasMore": false })),
            &mut pool,
        );
        assert_eq!(pool.items(), &[Item::new("5", "X"), Item::new("6", "Y")]);
        assert_eq!(fetcher.state().page, 2);
        assert!(!fetcher.has_more());
        assert!(fetcher.next_page().is_none());
    }

    #[test]
    fn test_request_refused_while_loading() {
        let (mut fetcher, _) = fetcher();
        let _first = fetcher.request("a", 1, true).unwrap();
        assert!(fetcher.is_loading());
        assert!(fetcher.request("a", 2, false).is_none());
        assert!(fetcher.next_page().is_none());
    }

    #[test]
    fn test_failure_halts_pagination_and_keeps_pool() {
        let (mut fetcher, mut pool) = fetcher();
        let ticket = fetcher.request("", 1, true).unwrap();
        fetcher.complete(&ticket, Ok(json!({ "results": [{ "id": "1", "name": "A" }], "hasMore": true })), &mut pool);

        let ticket = fetcher.next_page().unwrap();
        let outcome = fetcher.complete(
            &ticket,
            Err(FetchError::RequestFailed { status: Some(500), message: "boom".to_string() }),
            &mut pool,
        );
        assert!(outcome.applied);
        assert!(!fetcher.is_loading());
        assert!(!fetcher.has_more());
        assert!(fetcher.state().error.is_some());
        assert_eq!(pool.items(), &[Item::new("1", "A")]);
        assert!(fetcher.next_page().is_none());

        // a new search resets paging; the error stays until it succeeds
        let ticket = fetcher.search("b").unwrap();
        assert!(fetcher.has_more());
        assert!(fetcher.state().error.is_some());
        assert_eq!(ticket.query.page, 1);

        fetcher.complete(&ticket, Ok(json!({ "results": [] })), &mut pool);
        assert!(fetcher.state().error.is_none());
    }

    #[test]
    fn test_invalid_response_is_a_failure() {
        let (mut fetcher, mut pool) = fetcher();
        let ticket = fetcher.request("", 1, true).unwrap();
        fetcher.complete(&ticket, Ok(json!("not a page")), &mut pool);
        assert!(matches!(fetcher.state().error, Some(FetchError::InvalidResponse(_))));
        assert!(!fetcher.is_loading());
    }

    #[test]
    fn test_search_during_flight_is_deferred_and_stale_response_dropped() {
        let (mut fetcher, mut pool) = fetcher();
        let first = fetcher.search("ap").unwrap();
        assert!(fetcher.search("app").is_none());

        let outcome = fetcher.complete(
            &first,
            Ok(json!({ "results": [{ "id": "1", "name": "Apricot" }], "hasMore": false })),
            &mut pool,
        );
        assert!(!outcome.applied);
        assert!(pool.is_empty());

        let follow_up = outcome.follow_up.unwrap();
        assert_eq!(follow_up.query.term, "app");
        assert!(follow_up.is_new_search);
        assert!(fetcher.is_loading());

        let outcome = fetcher.complete(
            &follow_up,
            Ok(json!({ "results": [{ "id": "2", "name": "Apple" }], "hasMore": false })),
            &mut pool,
        );
        assert!(outcome.applied);
        assert_eq!(pool.items(), &[Item::new("2", "Apple")]);
        assert_eq!(fetcher.state().search_term, "app");
    }

    #[test]
    fn test_invalidate_discards_in_flight_response() {
        let (mut fetcher, mut pool) = fetcher();
        let ticket = fetcher.search("abc").unwrap();
        fetcher.invalidate();
        let outcome = fetcher.complete(&ticket, Ok(json!({ "results": [{ "id": "1", "name": "A" }] })), &mut pool);
        assert!(!outcome.applied);
        assert!(outcome.follow_up.is_none());
        assert!(pool.is_empty());
        assert!(!fetcher.is_loading());
    }

    #[test]
    fn test_unknown_ticket_does_not_release_lock() {
        let (mut fetcher, mut pool) = fetcher();
        let first = fetcher.request("", 1, true).unwrap();
        let mut forged = first.clone();
        forged.seq += 100;
        fetcher.complete(&forged, Ok(json!([])), &mut pool);
        assert!(fetcher.is_loading());
        fetcher.complete(&first, Ok(json!([])), &mut pool);
        assert!(!fetcher.is_loading());
    }

    #[test]
    fn test_minimum_input_length() {
        let mut options = RemoteOptions::new("/api");
        options.minimum_input_length = 2;
        let fetcher = RemoteFetcher::new(options);
        assert!(!fetcher.accepts_term("a"));
        assert!(fetcher.accepts_term("ab"));
        assert!(fetcher.accepts_term("éé"));
    }

    #[test]
    fn test_label_request_needs_url() {
        let (mut fetcher, _) = fetcher();
        assert!(fetcher.label_request(&["1".to_string()]).is_none());

        let mut options = RemoteOptions::new("/api");
        options.initial_value_url = Some("/api/labels".to_string());
        let mut fetcher = RemoteFetcher::new(options);
        let ticket = fetcher.label_request(&["1".to_string(), "2".to_string()]).unwrap();
        assert_eq!(ticket.kind, FetchKind::Labels);
        assert_eq!(ticket.params.url, "/api/labels");
        assert_eq!(ticket.params.data, json!({ "ids": ["1", "2"] }));
        // label lookups do not take the in-flight lock
        assert!(!fetcher.is_loading());

        let labels = fetcher
            .complete_labels(&ticket, Ok(json!({ "results": [{ "id": 1, "name": "One" }] })))
            .unwrap();
        assert_eq!(labels, vec![Item::new("1", "One")]);
    }
}
