//! IO Select Widget
//!
//! Root view mounted next to the hidden `<select>`: the select box plus the
//! dropdown, and the window listener that closes it on outside clicks.

use leptos::ev;
use leptos::html;
use leptos::prelude::*;

use super::{OptionList, SelectBox};
use crate::context::IoSelectContext;

#[component]
pub fn IoSelectWidget(ctx: IoSelectContext) -> impl IntoView {
    provide_context(ctx);

    let root = NodeRef::<html::Div>::new();

    // The composed path is captured at dispatch time, so rows re-rendered by
    // the click itself still count as inside.
    let outside_click = window_event_listener(ev::click, move |event| {
        let Some(root) = root.get_untracked() else {
            return;
        };
        if !event.composed_path().includes(&root, 0) {
            ctx.close();
        }
    });

    on_cleanup(move || {
        outside_click.remove();
        ctx.cancel_timers();
    });

    // Preselected ids known only by id get their labels once, at mount
    ctx.resolve_initial_labels();

    let is_open = move || {
        ctx.revision.track();
        ctx.with(|c| c.is_open()).unwrap_or(false)
    };
    let multiple = move || {
        ctx.revision.track();
        ctx.with(|c| c.is_multiple()).unwrap_or(false)
    };

    view! {
        <div
            class=move || if multiple() { "io-select io-select-multiple" } else { "io-select" }
            class:open=is_open
            node_ref=root
        >
            <SelectBox />
            <Show when=is_open>
                <OptionList />
            </Show>
        </div>
    }
}
