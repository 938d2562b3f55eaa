//! Option List Component
//!
//! The dropdown body: optional search input, then the option rows or a
//! status line. With virtualization on only the window rows exist in the DOM,
//! positioned inside a spacer as tall as the whole list.

use io_select_core::{Item, Key, ListState, RowRenderer, ScrollMetrics};
use leptos::html;
use leptos::prelude::*;

use crate::context::IoSelectContext;

/// Row data handed to the view for one materialized option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRow {
    pub index: usize,
    pub item: Item,
    pub selected: bool,
}

struct CollectRows;

impl RowRenderer for CollectRows {
    type Row = OptionRow;

    fn render(&mut self, index: usize, item: &Item, is_selected: bool) -> OptionRow {
        OptionRow {
            index,
            item: item.clone(),
            selected: is_selected,
        }
    }
}

#[component]
fn OptionItem(row: OptionRow, multiple: bool, row_height: f64) -> impl IntoView {
    let ctx = expect_context::<IoSelectContext>();
    let OptionRow { index, item, selected } = row;
    let id = item.id.clone();

    view! {
        <li
            role="option"
            class=if selected { "io-select-option selected" } else { "io-select-option" }
            aria-selected=selected.to_string()
            data-index=index.to_string()
            style=format!("height: {row_height}px; box-sizing: border-box;")
            on:click=move |_| ctx.click_row(id.clone())
        >
            {multiple.then(|| view! {
                <input
                    type="checkbox"
                    class="io-select-checkbox"
                    tabindex="-1"
                    aria-hidden="true"
                    prop:checked=selected
                />
            })}
            <span class="io-select-option-label">{item.name}</span>
        </li>
    }
}

#[component]
fn StatusLine(state: ListState) -> impl IntoView {
    let (class, text) = match state {
        ListState::Loading(text) => ("io-select-status io-select-loading", text),
        ListState::Error(text) => ("io-select-status io-select-error", text),
        ListState::Empty(text) => ("io-select-status io-select-empty", text),
        ListState::Rows => ("io-select-status", String::new()),
    };
    view! { <div class=class role="status">{text}</div> }
}

#[component]
pub fn OptionList() -> impl IntoView {
    let ctx = expect_context::<IoSelectContext>();

    let list_ref = NodeRef::<html::Div>::new();
    let search_ref = NodeRef::<html::Input>::new();

    let (searchable, multiple, row_height, viewport_height) = ctx
        .with(|c| {
            let options = c.options();
            (options.searchable, c.is_multiple(), options.row_height, options.viewport_height)
        })
        .unwrap_or((false, false, 0.0, 0.0));
    let search_placeholder = ctx.with(|c| c.options().search_placeholder.clone()).unwrap_or_default();
    let initial_term = ctx.with(|c| c.search_term().to_string()).unwrap_or_default();

    let list_state = move || {
        ctx.revision.track();
        ctx.with(|c| c.list_state()).unwrap_or(ListState::Rows)
    };
    let rows = move || {
        ctx.revision.track();
        ctx.with(|c| c.rows(&mut CollectRows)).unwrap_or_default()
    };
    let spacer_style = move || {
        ctx.revision.track();
        ctx.with(|c| {
            if c.is_virtualized() {
                format!("position: relative; height: {}px;", c.window().total_extent)
            } else {
                String::new()
            }
        })
        .unwrap_or_default()
    };
    let window_style = move || {
        ctx.revision.track();
        ctx.with(|c| {
            if c.is_virtualized() {
                format!("position: absolute; top: {}px; left: 0; right: 0;", c.window().offset_top)
            } else {
                String::new()
            }
        })
        .unwrap_or_default()
    };
    let loading_more = move || {
        ctx.revision.track();
        ctx.with(|c| c.is_loading_more()).unwrap_or(false)
    };
    let loading_text = move || ctx.with(|c| c.options().loading_text.clone()).unwrap_or_default();

    // Fresh searches start at the top of the list
    Effect::new(move |_| {
        ctx.revision.track();
        if ctx.take_scroll_reset() {
            if let Some(list) = list_ref.get_untracked() {
                list.set_scroll_top(0);
            }
        }
    });

    Effect::new(move |_| {
        if let Some(input) = search_ref.get() {
            if let Err(err) = input.focus() {
                log::debug!("search input focus failed: {err:?}");
            }
        }
    });

    let on_scroll = move |_: web_sys::Event| {
        let Some(list) = list_ref.get_untracked() else {
            return;
        };
        ctx.scroll(ScrollMetrics {
            scroll_top: f64::from(list.scroll_top()),
            client_height: f64::from(list.client_height()),
            scroll_height: f64::from(list.scroll_height()),
        });
    };

    let on_search_keydown = move |ev: web_sys::KeyboardEvent| {
        if Key::from_key_name(&ev.key()) == Key::Escape && ctx.key(Key::Escape) {
            ev.prevent_default();
        }
    };

    view! {
        <div
            class="io-select-dropdown"
            role="listbox"
            aria-multiselectable=multiple.to_string()
        >
            {searchable.then(|| view! {
                <div class="io-select-search">
                    <input
                        type="text"
                        autocomplete="off"
                        node_ref=search_ref
                        placeholder=search_placeholder
                        prop:value=initial_term
                        on:input=move |ev| ctx.search(event_target_value(&ev))
                        on:keydown=on_search_keydown
                    />
                </div>
            })}
            <div
                class="io-select-options"
                node_ref=list_ref
                style=format!("max-height: {viewport_height}px; overflow-y: auto;")
                on:scroll=on_scroll
            >
                <Show
                    when=move || list_state() == ListState::Rows
                    fallback=move || view! { {move || view! { <StatusLine state=list_state() /> }} }
                >
                    <div class="io-select-spacer" style=spacer_style>
                        <ul class="io-select-rows" style=window_style>
                            <For
                                each=rows
                                key=|row: &OptionRow| (row.item.id.clone(), row.selected)
                                children=move |row| {
                                    view! { <OptionItem row=row multiple=multiple row_height=row_height /> }
                                }
                            />
                        </ul>
                    </div>
                    <Show when=loading_more>
                        <div class="io-select-status io-select-loading" role="status">{loading_text}</div>
                    </Show>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_rows_keeps_index_and_flag() {
        let item = Item::new("7", "Seven");
        let row = CollectRows.render(3, &item, true);
        assert_eq!(row.index, 3);
        assert_eq!(row.item, item);
        assert!(row.selected);
    }
}
