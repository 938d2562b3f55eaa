//! Element Binding
//!
//! Attaches the widget to a `<select>`: hides it, mounts the Leptos view in a
//! sibling container and keeps the mount alive until destroy. Live bindings
//! are registered per element, so initializing an element again destroys the
//! previous widget first. [`IoSelect`] is the JS-facing handle.

use std::any::Any;
use std::cell::RefCell;

use io_select_core::{DropdownController, IoSelectError, IoSelectOptions, Lifecycle, Registry};
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlSelectElement};

use crate::components::IoSelectWidget;
use crate::context::IoSelectContext;
use crate::host::NativeSelect;
use crate::{logger, options};

pub const CONTAINER_CLASS: &str = "io-select-container";

/// A live widget mounted next to its select element
pub struct Binding {
    select: HtmlSelectElement,
    container: HtmlElement,
    /// Leptos unmount handle; dropping it disposes the view and its owner
    mount: Box<dyn Any>,
}

thread_local! {
    static INSTANCES: RefCell<Registry<HtmlSelectElement, Binding>> = RefCell::new(Registry::default());
}

/// Run `f` on the lifecycle registered for `select`. The registry is not
/// borrowed while `f` runs, so change listeners fired during attach or
/// destroy may call back in.
fn with_lifecycle<R>(select: &HtmlSelectElement, f: impl FnOnce(&mut Lifecycle<Binding>) -> R) -> R {
    let mut lifecycle = INSTANCES.with_borrow_mut(|instances| instances.take(|el| is_same(el, select)));
    let result = f(&mut lifecycle);
    INSTANCES.with_borrow_mut(|instances| instances.put(select.clone(), lifecycle));
    result
}

fn is_same(a: &HtmlSelectElement, b: &HtmlSelectElement) -> bool {
    a.is_same_node(Some(b.as_ref()))
}

/// Build the engine over `select` and mount the widget after it
fn attach(select: HtmlSelectElement, options: IoSelectOptions) -> Result<Binding, IoSelectError> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(IoSelectError::MissingCollaborator("document"))?;

    let controller = DropdownController::new(NativeSelect::new(select.clone()), options)?;

    let container: HtmlElement = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into().ok())
        .ok_or(IoSelectError::MissingCollaborator("container element"))?;
    container.set_class_name(CONTAINER_CLASS);
    select
        .after_with_node_1(&container)
        .map_err(|_| IoSelectError::MissingCollaborator("select parent node"))?;
    select.set_hidden(true);

    let handle = leptos::mount::mount_to(container.clone(), move || {
        let ctx = IoSelectContext::new(controller);
        view! { <IoSelectWidget ctx=ctx /> }
    });

    debug!("attached to select #{}", select.id());
    Ok(Binding {
        select,
        container,
        mount: Box::new(handle),
    })
}

impl Binding {
    /// Unmount the view, remove the container and show the select again.
    /// Selection state stays on the select element.
    pub fn destroy(self) {
        let Binding { select, container, mount } = self;
        drop(mount);
        container.remove();
        select.set_hidden(false);
        debug!("detached from select #{}", select.id());
    }
}

// ========================
// JavaScript API
// ========================

/// Handle returned to JavaScript for one select element. Handles for the
/// same element share its registered widget.
#[wasm_bindgen]
#[derive(Clone)]
pub struct IoSelect {
    select: HtmlSelectElement,
}

#[wasm_bindgen]
impl IoSelect {
    #[wasm_bindgen(constructor)]
    pub fn new(select: HtmlSelectElement) -> IoSelect {
        logger::init(log::LevelFilter::Info);
        IoSelect { select }
    }

    /// Attach with a JS options object, replacing any widget already on
    /// the element
    pub fn initialize(&self, options: JsValue) -> Result<(), JsValue> {
        let options = options::from_js(&options).map_err(to_js_error)?;
        self.initialize_with(options).map_err(to_js_error)
    }

    /// Dispatch a method by name; only "destroy" exists. Returns the handle
    /// so calls chain, unknown names included.
    pub fn call(&self, method: &str) -> IoSelect {
        with_lifecycle(&self.select, |lifecycle| {
            lifecycle.call(method, Binding::destroy);
        });
        self.clone()
    }

    pub fn destroy(&self) {
        with_lifecycle(&self.select, |lifecycle| {
            lifecycle.call("destroy", Binding::destroy);
        });
    }

    #[wasm_bindgen(getter, js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        INSTANCES.with_borrow(|instances| instances.is_initialized(|el| is_same(el, &self.select)))
    }
}

impl IoSelect {
    pub fn initialize_with(&self, options: IoSelectOptions) -> Result<(), IoSelectError> {
        let select = self.select.clone();
        with_lifecycle(&self.select, |lifecycle| {
            lifecycle.reinitialize(Binding::destroy, || attach(select, options))
        })
        .inspect_err(|err| error!("{err}"))
    }
}

/// `ioSelect(select, options)`: initialize the element, tearing down any
/// widget a previous call left on it
#[wasm_bindgen(js_name = ioSelect)]
pub fn io_select(select: HtmlSelectElement, options: JsValue) -> Result<IoSelect, JsValue> {
    let handle = IoSelect::new(select);
    handle.initialize(options)?;
    Ok(handle)
}

fn to_js_error(err: IoSelectError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
