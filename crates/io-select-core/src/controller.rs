//! Dropdown Controller
//!
//! Per-instance context tying the selection store, candidate pool, remote
//! fetcher and virtualizer together behind a Closed/Open state machine.
//!
//! Every entry point is synchronous. Work that has to happen later is
//! returned to the caller: a [`FetchTicket`] to send, or a debounced
//! [`TaskId`] plus delay to arm a timer for.

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::Value;

use crate::config::IoSelectOptions;
use crate::debounce::{Debouncer, TaskId};
use crate::error::{FetchError, IoSelectError};
use crate::fetch::{FetchOutcome, FetchTicket, RemoteFetcher};
use crate::host::HostControl;
use crate::models::{Item, ScrollMetrics};
use crate::pool::{CandidatePool, PoolMode};
use crate::selection::SelectionStore;
use crate::virtualizer::{is_near_bottom, VirtualWindow, Virtualizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Closed,
    Open,
}

/// Keys the select box reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

impl Key {
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            " " | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// What the option list area should show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Loading(String),
    Error(String),
    Empty(String),
    Rows,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Local filter applied immediately
    Filtered,
    /// Term below the minimum length, candidates cleared
    Cleared,
    /// Remote search waits for `fire_search(task)` after `delay_ms`
    Scheduled { task: TaskId, delay_ms: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollOutcome {
    /// Window recomputation to run through `fire_scroll` after the delay
    pub recompute: Option<(TaskId, u32)>,
    /// Pagination request triggered by reaching the bottom
    pub fetch: Option<FetchTicket>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    pub handled: bool,
    pub fetch: Option<FetchTicket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowClick {
    pub selected: bool,
    pub closed: bool,
}

/// Turns one candidate into whatever the presentation layer displays
pub trait RowRenderer {
    type Row;

    fn render(&mut self, index: usize, item: &Item, is_selected: bool) -> Self::Row;
}

pub struct DropdownController<H: HostControl> {
    options: IoSelectOptions,
    selection: SelectionStore<H>,
    pool: CandidatePool,
    fetcher: Option<RemoteFetcher>,
    virtualizer: Option<Virtualizer>,
    state: DropdownState,
    search_term: String,
    /// Candidates currently displayable, in display order
    visible: Vec<Item>,
    scroll: ScrollMetrics,
    window: VirtualWindow,
    search_debounce: Debouncer<String>,
    scroll_debounce: Debouncer<ScrollMetrics>,
    scroll_reset: bool,
    /// Preselected ids waiting for a label lookup
    unresolved: Vec<String>,
}

impl<H: HostControl> DropdownController<H> {
    pub fn new(host: H, options: IoSelectOptions) -> Result<Self, IoSelectError> {
        options.validate()?;

        let mut selection = SelectionStore::new(host);
        if let Some(multiple) = options.multiple {
            selection.set_multiple(multiple);
        }

        let fetcher = options.remote.clone().map(RemoteFetcher::new);
        let virtualizer = options
            .virtualize
            .then(|| Virtualizer::new(options.row_height, options.buffer_rows));
        let search_delay = options.remote.as_ref().map(|remote| remote.delay).unwrap_or(0);

        let mut controller = Self {
            pool: CandidatePool::new(if fetcher.is_some() { PoolMode::Dynamic } else { PoolMode::Static }),
            selection,
            fetcher,
            virtualizer,
            state: DropdownState::Closed,
            search_term: String::new(),
            visible: Vec::new(),
            scroll: ScrollMetrics {
                scroll_top: 0.0,
                client_height: options.viewport_height,
                scroll_height: 0.0,
            },
            window: VirtualWindow::default(),
            search_debounce: Debouncer::new(search_delay),
            scroll_debounce: Debouncer::new(options.scroll_delay),
            scroll_reset: false,
            unresolved: Vec::new(),
            options,
        };

        controller.apply_initial_selection();
        if controller.pool.mode() == PoolMode::Static {
            controller.pool.load_static(controller.selection.host().items());
            controller.visible = controller.pool.items().to_vec();
        }
        for item in controller.selection.selected() {
            controller.pool.ensure_known(&item);
        }
        controller.recompute_window();
        Ok(controller)
    }

    fn apply_initial_selection(&mut self) {
        if self.options.initial_selection.is_empty() {
            return;
        }
        let can_resolve = self
            .fetcher
            .as_ref()
            .is_some_and(|fetcher| fetcher.options().initial_value_url.is_some());

        let mut ids = Vec::new();
        for initial in self.options.initial_selection.clone() {
            if initial.id.is_empty() {
                continue;
            }
            match initial.name {
                Some(name) => self.selection.adopt(&Item::new(initial.id.clone(), name)),
                None if self.selection.host().contains(&initial.id) => {}
                None if can_resolve => {
                    self.unresolved.push(initial.id);
                    continue;
                }
                None => self.selection.adopt(&Item::new(initial.id.clone(), initial.id.clone())),
            }
            ids.push(initial.id);
        }
        if !ids.is_empty() {
            self.selection.set_selected(&ids);
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn options(&self) -> &IoSelectOptions {
        &self.options
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    pub fn is_multiple(&self) -> bool {
        self.selection.is_multiple()
    }

    pub fn selection(&self) -> &SelectionStore<H> {
        &self.selection
    }

    /// Called with the selected items after every selection change
    pub fn on_selection_change(&mut self, listener: impl FnMut(&[Item]) + 'static) {
        self.selection.subscribe(listener);
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn visible(&self) -> &[Item] {
        &self.visible
    }

    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    pub fn is_virtualized(&self) -> bool {
        self.virtualizer.is_some()
    }

    /// Selected items for the tag summary
    pub fn tags(&self) -> Vec<Item> {
        self.selection.selected()
    }

    /// A pagination request is in flight while rows are shown
    pub fn is_loading_more(&self) -> bool {
        !self.visible.is_empty() && self.fetcher.as_ref().is_some_and(RemoteFetcher::is_loading)
    }

    /// True once after a fresh search; the view scrolls the list back to 0
    pub fn take_scroll_reset(&mut self) -> bool {
        std::mem::take(&mut self.scroll_reset)
    }

    pub fn list_state(&self) -> ListState {
        if let Some(fetcher) = &self.fetcher {
            if fetcher.state().error.is_some() {
                return ListState::Error(self.options.error_text.clone());
            }
            if self.visible.is_empty() && (fetcher.is_loading() || self.search_debounce.is_pending()) {
                return ListState::Loading(self.options.loading_text.clone());
            }
        }
        if self.visible.is_empty() {
            ListState::Empty(self.options.no_results_text.clone())
        } else {
            ListState::Rows
        }
    }

    /// Render the materialized rows: the virtual window, or everything when
    /// virtualization is off
    pub fn rows<R: RowRenderer>(&self, renderer: &mut R) -> Vec<R::Row> {
        let selected: HashSet<String> = self.selection.host().selected_ids().into_iter().collect();
        let end = self.window.end_index.min(self.visible.len());
        let start = self.window.start_index.min(end);
        self.visible[start..end]
            .iter()
            .enumerate()
            .map(|(offset, item)| renderer.render(start + offset, item, selected.contains(&item.id)))
            .collect()
    }

    // ========================
    // Open / Close
    // ========================

    pub fn open(&mut self) -> Option<FetchTicket> {
        if self.is_open() {
            return None;
        }
        self.state = DropdownState::Open;
        self.reset_scroll();

        let mut ticket = None;
        match self.fetcher.as_mut() {
            None => self.visible = self.pool.filter_local(&self.search_term),
            Some(fetcher) if !fetcher.accepts_term(&self.search_term) => self.visible.clear(),
            Some(fetcher) if self.pool.is_empty() => {
                ticket = fetcher.search(&self.search_term);
                self.visible.clear();
            }
            Some(_) => self.visible = self.pool.items().to_vec(),
        }
        self.recompute_window();
        ticket
    }

    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.state = DropdownState::Closed;
        self.scroll_debounce.cancel();
    }

    pub fn toggle(&mut self) -> Option<FetchTicket> {
        if self.is_open() {
            self.close();
            None
        } else {
            self.open()
        }
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Enter | Key::Space => KeyOutcome {
                handled: true,
                fetch: self.toggle(),
            },
            Key::Escape if self.is_open() => {
                self.close();
                KeyOutcome {
                    handled: true,
                    fetch: None,
                }
            }
            _ => KeyOutcome::default(),
        }
    }

    // ========================
    // Search
    // ========================

    pub fn set_search_term(&mut self, term: &str) -> SearchOutcome {
        self.search_term = term.to_string();
        let Some(fetcher) = self.fetcher.as_mut() else {
            self.visible = self.pool.filter_local(term);
            self.reset_scroll();
            self.recompute_window();
            return SearchOutcome::Filtered;
        };

        if !fetcher.accepts_term(term) {
            self.search_debounce.cancel();
            fetcher.invalidate();
            self.pool.clear();
            self.visible.clear();
            self.reset_scroll();
            self.recompute_window();
            return SearchOutcome::Cleared;
        }

        SearchOutcome::Scheduled {
            task: self.search_debounce.schedule(term.to_string()),
            delay_ms: self.search_debounce.delay_ms(),
        }
    }

    /// Debounce timer expiry for a scheduled search
    pub fn fire_search(&mut self, task: TaskId) -> Option<FetchTicket> {
        let term = self.search_debounce.fire(task)?;
        self.fetcher.as_mut()?.search(&term)
    }

    // ========================
    // Scrolling
    // ========================

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> ScrollOutcome {
        self.scroll = metrics;
        let recompute = self
            .virtualizer
            .is_some()
            .then(|| (self.scroll_debounce.schedule(metrics), self.scroll_debounce.delay_ms()));

        let mut fetch = None;
        if self.is_open() && !self.pool.is_empty() && is_near_bottom(&metrics, self.options.row_height) {
            if let Some(fetcher) = self.fetcher.as_mut() {
                fetch = fetcher.next_page();
            }
        }
        ScrollOutcome { recompute, fetch }
    }

    /// Debounce timer expiry for a scheduled window recomputation
    pub fn fire_scroll(&mut self, task: TaskId) -> bool {
        match self.scroll_debounce.fire(task) {
            Some(metrics) => {
                self.scroll = metrics;
                self.recompute_window();
                true
            }
            None => false,
        }
    }

    // ========================
    // Remote Completion
    // ========================

    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: Result<Value, FetchError>) -> FetchOutcome {
        let Some(fetcher) = self.fetcher.as_mut() else {
            return FetchOutcome::default();
        };
        let outcome = fetcher.complete(ticket, result, &mut self.pool);
        if outcome.applied {
            if self.search_term == ticket.query.term || !ticket.is_new_search {
                self.visible = self.pool.items().to_vec();
            }
            if ticket.is_new_search {
                self.reset_scroll();
            }
            self.recompute_window();
        }
        outcome
    }

    /// Label lookup for preselected ids known only by id
    pub fn pending_label_request(&mut self) -> Option<FetchTicket> {
        if self.unresolved.is_empty() {
            return None;
        }
        let ids = self.unresolved.clone();
        self.fetcher.as_mut()?.label_request(&ids)
    }

    pub fn complete_labels(&mut self, ticket: &FetchTicket, result: Result<Value, FetchError>) {
        let Some(fetcher) = self.fetcher.as_ref() else {
            return;
        };
        let resolved = match fetcher.complete_labels(ticket, result) {
            Ok(items) => items,
            Err(err) => {
                warn!("label lookup failed, falling back to ids: {err}");
                Vec::new()
            }
        };

        let unresolved = std::mem::take(&mut self.unresolved);
        for id in &unresolved {
            let item = resolved
                .iter()
                .find(|item| item.id == *id)
                .cloned()
                .unwrap_or_else(|| Item::new(id.clone(), id.clone()));
            self.selection.adopt(&item);
            self.pool.ensure_known(&item);
        }

        let mut ids = if self.selection.is_multiple() {
            self.selection.host().selected_ids()
        } else {
            Vec::new()
        };
        ids.extend(unresolved);
        debug!("resolved labels for {} preselected ids", ids.len());
        self.selection.set_selected(&ids);
    }

    // ========================
    // Selection
    // ========================

    /// Row click: toggle the item; single mode closes the dropdown
    pub fn click_row(&mut self, id: &str) -> Option<RowClick> {
        let item = self
            .visible
            .iter()
            .find(|item| item.id == id)
            .or_else(|| self.pool.resolve(id))
            .cloned()?;
        self.pool.ensure_known(&item);
        let selected = self.selection.toggle(&item)?;

        let closed = !self.selection.is_multiple();
        if closed {
            self.close();
        }
        Some(RowClick { selected, closed })
    }

    /// Tag remove button
    pub fn remove(&mut self, id: &str) -> bool {
        self.selection.remove(id)
    }

    /// Give the host control back
    pub fn teardown(self) -> H {
        self.selection.into_host()
    }

    fn reset_scroll(&mut self) {
        self.scroll.scroll_top = 0.0;
        self.scroll_reset = true;
        self.scroll_debounce.cancel();
    }

    fn viewport_height(&self) -> f64 {
        if self.scroll.client_height > 0.0 {
            self.scroll.client_height
        } else {
            self.options.viewport_height
        }
    }

    fn recompute_window(&mut self) {
        let count = self.visible.len();
        self.window = match &self.virtualizer {
            Some(virtualizer) => virtualizer.compute_window(self.scroll.scroll_top, self.viewport_height(), count),
            None => VirtualWindow {
                start_index: 0,
                end_index: count,
                total_extent: count as f64 * self.options.row_height,
                offset_top: 0.0,
            },
        };
    }
}
