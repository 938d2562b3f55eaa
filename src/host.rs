//! Native Select Host
//!
//! [`HostControl`] over a real `<select>` element. The element stays in the
//! form (hidden) so submitted values come from it.

use io_select_core::{HostControl, Item};
use wasm_bindgen::JsCast;
use web_sys::{Event, EventInit, HtmlOptionElement, HtmlSelectElement};

#[derive(Clone)]
pub struct NativeSelect {
    select: HtmlSelectElement,
}

impl NativeSelect {
    pub fn new(select: HtmlSelectElement) -> Self {
        Self { select }
    }

    pub fn element(&self) -> &HtmlSelectElement {
        &self.select
    }

    fn options(&self) -> Vec<HtmlOptionElement> {
        let collection = self.select.options();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .filter_map(|el| el.dyn_into::<HtmlOptionElement>().ok())
            .collect()
    }

    fn to_item(option: &HtmlOptionElement) -> Item {
        Item::new(option.value(), option.text())
    }
}

impl HostControl for NativeSelect {
    fn items(&self) -> Vec<Item> {
        self.options()
            .iter()
            .map(Self::to_item)
            .filter(|item| !item.is_placeholder())
            .collect()
    }

    fn selected_items(&self) -> Vec<Item> {
        self.options()
            .iter()
            .filter(|option| option.selected())
            .map(Self::to_item)
            .filter(|item| !item.is_placeholder())
            .collect()
    }

    fn is_multiple(&self) -> bool {
        self.select.multiple()
    }

    fn set_multiple(&mut self, multiple: bool) {
        self.select.set_multiple(multiple);
    }

    fn set_selected_ids(&mut self, ids: &[String]) {
        let options = self.options();
        for option in &options {
            option.set_selected(false);
        }
        for option in &options {
            let value = option.value();
            if !value.is_empty() && ids.contains(&value) {
                option.set_selected(true);
            }
        }
        if ids.is_empty() && !self.select.multiple() {
            if let Some(placeholder) = options.iter().find(|option| option.value().is_empty()) {
                placeholder.set_selected(true);
            }
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.options().iter().any(|option| option.value() == id)
    }

    fn insert_item(&mut self, item: &Item) {
        match HtmlOptionElement::new_with_text_and_value(&item.name, &item.id) {
            Ok(option) => {
                if let Err(err) = self.select.add_with_html_option_element(&option) {
                    log::warn!("could not add option {:?}: {err:?}", item.id);
                }
            }
            Err(err) => log::warn!("could not create option {:?}: {err:?}", item.id),
        }
    }

    fn notify_change(&mut self) {
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict("change", &init) {
            Ok(event) => {
                if let Err(err) = self.select.dispatch_event(&event) {
                    log::warn!("change event dispatch failed: {err:?}");
                }
            }
            Err(err) => log::warn!("could not build change event: {err:?}"),
        }
    }
}
