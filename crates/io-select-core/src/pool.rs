//! Candidate Pool
//!
//! Working set of items the dropdown can display. A static pool holds the
//! host's declared items and is filtered locally; a dynamic pool is built
//! from fetched pages.

use std::collections::{HashMap, HashSet};

use crate::models::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMode {
    Static,
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct CandidatePool {
    mode: PoolMode,
    items: Vec<Item>,
    ids: HashSet<String>,
    /// Labels kept resolvable even when absent from `items`
    known: HashMap<String, Item>,
}

impl CandidatePool {
    pub fn new(mode: PoolMode) -> Self {
        Self {
            mode,
            items: Vec::new(),
            ids: HashSet::new(),
            known: HashMap::new(),
        }
    }

    pub fn mode(&self) -> PoolMode {
        self.mode
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Install the fixed candidate set, dropping placeholder entries
    pub fn load_static(&mut self, items: Vec<Item>) {
        self.mode = PoolMode::Static;
        self.items.clear();
        self.ids.clear();
        self.push_unique(items);
    }

    /// Case-insensitive substring match on `name`, original order kept
    pub fn filter_local(&self, term: &str) -> Vec<Item> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return self.items.clone();
        }
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Discard current contents in favor of a fresh first page
    pub fn replace(&mut self, items: Vec<Item>) {
        self.items.clear();
        self.ids.clear();
        self.push_unique(items);
    }

    /// Continue with another page. Ids already present are dropped; returns
    /// the number of items added.
    pub fn append(&mut self, items: Vec<Item>) -> usize {
        self.push_unique(items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }

    /// Keep `item` resolvable for label lookup regardless of later pages
    pub fn ensure_known(&mut self, item: &Item) {
        if item.is_placeholder() {
            return;
        }
        self.known.entry(item.id.clone()).or_insert_with(|| item.clone());
    }

    /// Look up an item by id among candidates, then remembered items
    pub fn resolve(&self, id: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .or_else(|| self.known.get(id))
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.resolve(id).map(|item| item.name.as_str())
    }

    fn push_unique(&mut self, items: Vec<Item>) -> usize {
        let before = self.items.len();
        for item in items {
            if item.is_placeholder() || self.ids.contains(&item.id) {
                continue;
            }
            self.ids.insert(item.id.clone());
            self.items.push(item);
        }
        self.items.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_pool() -> CandidatePool {
        let mut pool = CandidatePool::new(PoolMode::Static);
        pool.load_static(vec![
            Item::new("", "Pick one"),
            Item::new("1", "Apple"),
            Item::new("2", "Banana"),
            Item::new("3", "Mango"),
        ]);
        pool
    }

    #[test]
    fn test_load_static_skips_placeholder() {
        let pool = static_pool();
        assert_eq!(pool.len(), 3);
        assert!(pool.items().iter().all(|item| !item.id.is_empty()));
    }

    #[test]
    fn test_filter_local_substring() {
        let mut pool = CandidatePool::new(PoolMode::Static);
        pool.load_static(vec![Item::new("1", "Apple"), Item::new("2", "Banana")]);
        assert_eq!(pool.filter_local("an"), vec![Item::new("2", "Banana")]);
    }

    #[test]
    fn test_filter_local_case_insensitive_and_ordered() {
        let pool = static_pool();
        let names: Vec<String> = pool.filter_local("AN").into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["Banana", "Mango"]);
    }

    #[test]
    fn test_filter_local_empty_term_is_identity() {
        let pool = static_pool();
        assert_eq!(pool.filter_local(""), pool.items().to_vec());
    }

    #[test]
    fn test_append_deduplicates_keeping_first() {
        let mut pool = CandidatePool::new(PoolMode::Dynamic);
        pool.replace(vec![Item::new("5", "X")]);
        let added = pool.append(vec![Item::new("5", "X renamed"), Item::new("6", "Y")]);
        assert_eq!(added, 1);
        assert_eq!(pool.items(), &[Item::new("5", "X"), Item::new("6", "Y")]);

        pool.append(vec![Item::new("7", "Z"), Item::new("6", "Y again"), Item::new("7", "Z again")]);
        let ids: Vec<&str> = pool.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "6", "7"]);
    }

    #[test]
    fn test_replace_discards_previous_pages() {
        let mut pool = CandidatePool::new(PoolMode::Dynamic);
        pool.replace(vec![Item::new("1", "A"), Item::new("2", "B")]);
        pool.replace(vec![Item::new("2", "B2")]);
        assert_eq!(pool.items(), &[Item::new("2", "B2")]);
        // id 1 is free again after replacement
        assert_eq!(pool.append(vec![Item::new("1", "A")]), 1);
    }

    #[test]
    fn test_ensure_known_survives_replace() {
        let mut pool = CandidatePool::new(PoolMode::Dynamic);
        pool.ensure_known(&Item::new("9", "Chosen earlier"));
        pool.replace(vec![Item::new("1", "A")]);
        assert_eq!(pool.label("9"), Some("Chosen earlier"));
        assert_eq!(pool.label("1"), Some("A"));
        assert_eq!(pool.label("404"), None);
        assert_eq!(pool.len(), 1);
    }
}
