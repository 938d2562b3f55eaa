//! IO Select Demo App
//!
//! Two upgraded selects: a local single select and a remote, virtualized
//! multi select. Change events from the hidden selects are echoed below.

use io_select::{IoSelect, IoSelectOptions, RemoteOptions};
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

const FRUITS: &[(&str, &str)] = &[
    ("apple", "Apple"),
    ("banana", "Banana"),
    ("cherry", "Cherry"),
    ("grape", "Grape"),
    ("mango", "Mango"),
    ("pear", "Pear"),
];

fn selected_labels(ev: &web_sys::Event) -> String {
    let Some(select) = ev
        .target()
        .and_then(|target| target.dyn_into::<web_sys::HtmlSelectElement>().ok())
    else {
        return String::new();
    };
    let options = select.selected_options();
    (0..options.length())
        .filter_map(|i| options.item(i))
        .filter_map(|el| el.text_content())
        .collect::<Vec<_>>()
        .join(", ")
}

fn fruit_options() -> IoSelectOptions {
    IoSelectOptions::default()
}

fn user_options() -> IoSelectOptions {
    IoSelectOptions {
        virtualize: true,
        placeholder: "Pick some users".to_string(),
        remote: Some(RemoteOptions::new("/api/users")),
        ..IoSelectOptions::default()
    }
}

type DemoHandle = (IoSelect, fn() -> IoSelectOptions);

/// Attach once the select element is in the DOM
fn attach_when_mounted(
    node: NodeRef<html::Select>,
    handles: StoredValue<Vec<DemoHandle>, LocalStorage>,
    options: fn() -> IoSelectOptions,
) {
    Effect::new(move |attached: Option<bool>| {
        if attached == Some(true) {
            return true;
        }
        let Some(select) = node.get() else {
            return false;
        };
        let handle = IoSelect::new(select);
        match handle.initialize_with(options()) {
            Ok(()) => {
                handles.update_value(|h| h.push((handle, options)));
                true
            }
            Err(err) => {
                log::error!("demo select failed to attach: {err}");
                false
            }
        }
    });
}

#[component]
pub fn App() -> impl IntoView {
    let fruit_ref = NodeRef::<html::Select>::new();
    let user_ref = NodeRef::<html::Select>::new();
    let handles = StoredValue::new_local(Vec::<DemoHandle>::new());

    let (fruit_value, set_fruit_value) = signal(String::new());
    let (user_value, set_user_value) = signal(String::new());
    let (attached, set_attached) = signal(true);

    attach_when_mounted(fruit_ref, handles, fruit_options);
    attach_when_mounted(user_ref, handles, user_options);

    // Destroy and re-create every widget to exercise the lifecycle
    let toggle_widgets = move |_: web_sys::MouseEvent| {
        let now_attached = !attached.get_untracked();
        handles.with_value(|handles| {
            for (handle, options) in handles {
                if now_attached {
                    if let Err(err) = handle.initialize_with(options()) {
                        log::error!("{err}");
                    }
                } else {
                    handle.destroy();
                }
            }
        });
        set_attached.set(now_attached);
    };

    view! {
        <main class="io-select-demo">
            <h1>"IO Select"</h1>

            <section>
                <label for="fruit">"Fruit"</label>
                <select id="fruit" name="fruit" node_ref=fruit_ref
                    on:change=move |ev| set_fruit_value.set(selected_labels(&ev))
                >
                    <option value="">"Choose a fruit"</option>
                    {FRUITS.iter().map(|(value, label)| view! {
                        <option value=*value>{*label}</option>
                    }).collect_view()}
                </select>
                <p class="io-select-demo-value">"Selected: " {fruit_value}</p>
            </section>

            <section>
                <label for="users">"Users"</label>
                <select id="users" name="users" multiple=true node_ref=user_ref
                    on:change=move |ev| set_user_value.set(selected_labels(&ev))
                ></select>
                <p class="io-select-demo-value">"Selected: " {user_value}</p>
            </section>

            <button type="button" on:click=toggle_widgets>
                {move || if attached.get() { "Destroy widgets" } else { "Re-create widgets" }}
            </button>
        </main>
    }
}
