//! Selection Store
//!
//! Reads and writes the host control's selection, enforcing the
//! single/multiple cardinality rule and notifying listeners after every
//! mutation.

use crate::host::HostControl;
use crate::models::Item;

type ChangeListener = Box<dyn FnMut(&[Item])>;

/// Authoritative selection, backed by the host control
pub struct SelectionStore<H: HostControl> {
    host: H,
    listeners: Vec<ChangeListener>,
}

impl<H: HostControl> SelectionStore<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            listeners: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn is_multiple(&self) -> bool {
        self.host.is_multiple()
    }

    pub fn set_multiple(&mut self, multiple: bool) {
        self.host.set_multiple(multiple);
    }

    /// Register a listener called with the new selection after every mutation
    pub fn subscribe(&mut self, listener: impl FnMut(&[Item]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn selected(&self) -> Vec<Item> {
        self.host.selected_items()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.host.selected_ids().iter().any(|selected| selected == id)
    }

    /// Replace the selection. Unknown and empty ids are ignored; single mode
    /// keeps only the first id.
    pub fn set_selected(&mut self, ids: &[String]) {
        let mut next: Vec<String> = Vec::new();
        for id in ids {
            if id.is_empty() || !self.host.contains(id) || next.contains(id) {
                continue;
            }
            next.push(id.clone());
        }
        if !self.host.is_multiple() {
            next.truncate(1);
        }
        self.commit(next);
    }

    /// Flip membership of `item`. Items the host has never seen are added to
    /// it first. Returns the new selected state, or `None` for the placeholder.
    pub fn toggle(&mut self, item: &Item) -> Option<bool> {
        if item.is_placeholder() {
            return None;
        }
        self.adopt(item);

        let current = self.host.selected_ids();
        let was_selected = current.contains(&item.id);
        let next = if self.host.is_multiple() {
            if was_selected {
                current.into_iter().filter(|id| *id != item.id).collect()
            } else {
                let mut ids = current;
                ids.push(item.id.clone());
                ids
            }
        } else if was_selected {
            Vec::new()
        } else {
            vec![item.id.clone()]
        };

        self.commit(next);
        Some(!was_selected)
    }

    /// Deselect one id (tag removal). Returns false if it was not selected.
    pub fn remove(&mut self, id: &str) -> bool {
        let current = self.host.selected_ids();
        if !current.iter().any(|selected| selected == id) {
            return false;
        }
        self.commit(current.into_iter().filter(|selected| selected != id).collect());
        true
    }

    /// Make sure the host declares `item` so it can be selected and labeled
    pub fn adopt(&mut self, item: &Item) {
        if !item.is_placeholder() && !self.host.contains(&item.id) {
            self.host.insert_item(item);
        }
    }

    fn commit(&mut self, ids: Vec<String>) {
        self.host.set_selected_ids(&ids);
        self.host.notify_change();

        let selected = self.host.selected_items();
        for listener in self.listeners.iter_mut() {
            listener(&selected);
        }
    }
}
