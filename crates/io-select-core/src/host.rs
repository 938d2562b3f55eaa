//! Host Control Bridge
//!
//! The form control being upgraded owns the authoritative selection.
//! The engine only talks to it through [`HostControl`].

use crate::models::Item;

/// Operations the engine needs from the underlying form control
pub trait HostControl {
    /// All declared items, excluding the empty-value placeholder
    fn items(&self) -> Vec<Item>;

    /// Currently selected items in declaration order (never the placeholder)
    fn selected_items(&self) -> Vec<Item>;

    fn is_multiple(&self) -> bool;

    fn set_multiple(&mut self, multiple: bool);

    /// Make exactly `ids` selected. An empty slice clears the selection; in
    /// single mode that selects the placeholder if the control has one.
    fn set_selected_ids(&mut self, ids: &[String]);

    fn contains(&self, id: &str) -> bool;

    /// Add an item the control has never declared (a remote-origin pick)
    fn insert_item(&mut self, item: &Item);

    /// Tell outside listeners the value changed
    fn notify_change(&mut self);

    fn selected_ids(&self) -> Vec<String> {
        self.selected_items().into_iter().map(|item| item.id).collect()
    }
}

/// In-memory host used by tests and non-DOM embedders
#[derive(Debug, Clone, Default)]
pub struct MemoryControl {
    items: Vec<Item>,
    selected: Vec<String>,
    multiple: bool,
    has_placeholder: bool,
    placeholder_selected: bool,
    change_count: usize,
}

impl MemoryControl {
    pub fn new(items: Vec<Item>, multiple: bool) -> Self {
        let has_placeholder = items.iter().any(Item::is_placeholder);
        Self {
            items: items.into_iter().filter(|item| !item.is_placeholder()).collect(),
            selected: Vec::new(),
            multiple,
            has_placeholder,
            placeholder_selected: has_placeholder && !multiple,
            change_count: 0,
        }
    }

    /// Builder-style preselection used to model markup with `selected` options
    pub fn with_selected(mut self, ids: &[&str]) -> Self {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        self.apply(&ids);
        self
    }

    /// Number of change notifications received
    pub fn change_count(&self) -> usize {
        self.change_count
    }

    pub fn placeholder_selected(&self) -> bool {
        self.placeholder_selected
    }

    fn apply(&mut self, ids: &[String]) {
        self.selected = self
            .items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .map(|item| item.id.clone())
            .collect();
        self.placeholder_selected = self.has_placeholder && !self.multiple && self.selected.is_empty();
    }
}

impl HostControl for MemoryControl {
    fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn selected_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .cloned()
            .collect()
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
        if !multiple && self.selected.len() > 1 {
            self.selected.truncate(1);
        }
    }

    fn set_selected_ids(&mut self, ids: &[String]) {
        self.apply(ids);
    }

    fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    fn insert_item(&mut self, item: &Item) {
        if !item.is_placeholder() && !self.contains(&item.id) {
            self.items.push(item.clone());
        }
    }

    fn notify_change(&mut self) {
        self.change_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_hidden_from_items() {
        let host = MemoryControl::new(
            vec![Item::new("", "Pick one"), Item::new("1", "Apple")],
            false,
        );
        assert_eq!(host.items(), vec![Item::new("1", "Apple")]);
        assert!(host.placeholder_selected());
    }

    #[test]
    fn test_selected_items_follow_declaration_order() {
        let host = MemoryControl::new(
            vec![Item::new("1", "Apple"), Item::new("2", "Banana"), Item::new("3", "Cherry")],
            true,
        )
        .with_selected(&["3", "1"]);
        assert_eq!(host.selected_ids(), vec!["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_insert_item_ignores_duplicates() {
        let mut host = MemoryControl::new(vec![Item::new("1", "Apple")], true);
        host.insert_item(&Item::new("1", "Other"));
        host.insert_item(&Item::new("9", "Remote"));
        assert_eq!(host.items().len(), 2);
        assert!(host.contains("9"));
    }
}
