//! Select Box Component
//!
//! The always-visible trigger: selected tags with remove buttons, or the
//! placeholder when nothing is selected.

use io_select_core::{Item, Key};
use leptos::prelude::*;

use crate::context::IoSelectContext;

/// One selected item in the summary
#[component]
fn SelectedTag(item: Item) -> impl IntoView {
    let ctx = expect_context::<IoSelectContext>();
    let id = item.id.clone();

    view! {
        <span class="io-select-tag" data-id=item.id.clone()>
            <span class="io-select-tag-label">{item.name}</span>
            <button
                type="button"
                class="io-select-tag-remove"
                aria-label="Remove"
                on:click=move |ev| {
                    ev.stop_propagation();
                    ctx.remove(id.clone());
                }
            >
                "×"
            </button>
        </span>
    }
}

#[component]
pub fn SelectBox() -> impl IntoView {
    let ctx = expect_context::<IoSelectContext>();

    let expanded = move || {
        ctx.revision.track();
        ctx.with(|c| c.is_open()).unwrap_or(false).to_string()
    };
    let placeholder = move || ctx.with(|c| c.options().placeholder.clone()).unwrap_or_default();

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        if ctx.key(Key::from_key_name(&ev.key())) {
            ev.prevent_default();
        }
    };

    view! {
        <div
            class="io-select-box"
            role="combobox"
            aria-haspopup="listbox"
            aria-expanded=expanded
            tabindex="0"
            on:click=move |_| ctx.toggle()
            on:keydown=on_keydown
        >
            <div class="io-select-tags">
                {move || {
                    let tags = ctx.tags.get();
                    if tags.is_empty() {
                        view! { <span class="io-select-placeholder">{placeholder()}</span> }.into_any()
                    } else {
                        tags.into_iter()
                            .map(|item| view! { <SelectedTag item=item /> })
                            .collect_view()
                            .into_any()
                    }
                }}
            </div>
            <span class="io-select-arrow" aria-hidden="true">"▾"</span>
        </div>
    }
}
