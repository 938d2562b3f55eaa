//! Widget Context
//!
//! Per-instance state shared by the widget's components via Leptos context.
//! The engine lives in a local `StoredValue`; every mutation goes through
//! [`IoSelectContext::update`], which bumps a revision signal so views
//! re-read the engine. The tag summary follows its own signal, fed by the
//! selection's change listener.

use io_select_core::{DropdownController, FetchKind, FetchTicket, Item, Key, ScrollMetrics, SearchOutcome};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::host::NativeSelect;
use crate::timers::Timers;
use crate::transport;

pub type Controller = DropdownController<NativeSelect>;

#[derive(Clone, Copy)]
pub struct IoSelectContext {
    controller: StoredValue<Controller, LocalStorage>,
    timers: StoredValue<Timers, LocalStorage>,
    /// Bumped after every engine mutation - read
    pub revision: ReadSignal<u64>,
    /// Bumped after every engine mutation - write
    set_revision: WriteSignal<u64>,
    /// Selected items, updated on every selection change
    pub tags: ReadSignal<Vec<Item>>,
}

impl IoSelectContext {
    pub fn new(mut controller: Controller) -> Self {
        let (revision, set_revision) = signal(0u64);
        let (tags, set_tags) = signal(controller.tags());
        controller.on_selection_change(move |items| set_tags.set(items.to_vec()));
        Self {
            controller: StoredValue::new_local(controller),
            timers: StoredValue::new_local(Timers::default()),
            revision,
            set_revision,
            tags,
        }
    }

    /// Read the engine without triggering a re-render
    pub fn with<R>(&self, f: impl FnOnce(&Controller) -> R) -> Option<R> {
        self.controller.try_with_value(f)
    }

    /// Mutate the engine and notify views
    pub fn update<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        let result = self.controller.try_update_value(f);
        if result.is_some() {
            self.set_revision.update(|v| *v += 1);
        }
        result
    }

    /// Consume the pending scroll reset. Does not bump the revision, so it is
    /// safe to call from an effect that tracks it.
    pub fn take_scroll_reset(&self) -> bool {
        self.controller
            .try_update_value(|c| c.take_scroll_reset())
            .unwrap_or(false)
    }

    /// Send a ticket and feed the response back. Deferred searches released
    /// by the completion are sent in turn.
    pub fn run_fetch(self, ticket: FetchTicket) {
        spawn_local(async move {
            let result = transport::send(&ticket.params).await;
            match ticket.kind {
                FetchKind::Page => {
                    let follow_up = self.update(|c| c.complete_fetch(&ticket, result).follow_up).flatten();
                    if let Some(next) = follow_up {
                        self.run_fetch(next);
                    }
                }
                FetchKind::Labels => {
                    self.update(|c| c.complete_labels(&ticket, result));
                }
            }
        });
    }

    fn run_if(self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            self.run_fetch(ticket);
        }
    }

    // ========================
    // User Intents
    // ========================

    pub fn toggle(self) {
        let ticket = self.update(|c| c.toggle()).flatten();
        self.run_if(ticket);
    }

    pub fn close(self) {
        if self.with(|c| c.is_open()).unwrap_or(false) {
            self.update(|c| c.close());
        }
    }

    /// Returns true when the key was consumed
    pub fn key(self, key: Key) -> bool {
        let Some(outcome) = self.update(|c| c.handle_key(key)) else {
            return false;
        };
        self.run_if(outcome.fetch);
        outcome.handled
    }

    pub fn search(self, term: String) {
        let Some(SearchOutcome::Scheduled { task, delay_ms }) = self.update(|c| c.set_search_term(&term)) else {
            return;
        };
        self.timers.update_value(|timers| {
            timers.arm_search(delay_ms, move || {
                let ticket = self.update(|c| c.fire_search(task)).flatten();
                self.run_if(ticket);
            })
        });
    }

    pub fn scroll(self, metrics: ScrollMetrics) {
        let Some(outcome) = self.update(|c| c.on_scroll(metrics)) else {
            return;
        };
        if let Some((task, delay_ms)) = outcome.recompute {
            self.timers.update_value(|timers| {
                timers.arm_scroll(delay_ms, move || {
                    self.update(|c| c.fire_scroll(task));
                })
            });
        }
        self.run_if(outcome.fetch);
    }

    pub fn click_row(self, id: String) {
        self.update(|c| c.click_row(&id));
    }

    pub fn remove(self, id: String) {
        self.update(|c| c.remove(&id));
    }

    /// Kick off the label lookup for ids preselected without a name
    pub fn resolve_initial_labels(self) {
        let ticket = self.update(|c| c.pending_label_request()).flatten();
        self.run_if(ticket);
    }

    pub fn cancel_timers(self) {
        self.timers.try_update_value(|timers| timers.cancel_all());
    }
}
