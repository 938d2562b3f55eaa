//! JavaScript Options
//!
//! Turns a JS options object into [`IoSelectOptions`]. Plain fields go
//! through serde; `remote.data` and `remote.processResults` may be JS
//! functions and are wrapped as mappers.

use io_select_core::{default_results, FetchError, FetchPage, IoSelectError, IoSelectOptions, SearchQuery};
use js_sys::{Function, Object, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};

const REMOTE: &str = "remote";
const DATA: &str = "data";
const PROCESS_RESULTS: &str = "processResults";

pub fn from_js(options: &JsValue) -> Result<IoSelectOptions, IoSelectError> {
    if options.is_undefined() || options.is_null() {
        return Ok(IoSelectOptions::default());
    }
    if !options.is_object() {
        return Err(IoSelectError::InvalidOptions("options must be an object".to_string()));
    }

    let remote = get(options, REMOTE);
    let (data_fn, results_fn) = if remote.is_object() {
        (function(&remote, DATA), function(&remote, PROCESS_RESULTS))
    } else {
        (None, None)
    };

    // Shallow copies without the function fields so serde only sees data
    let plain = Object::assign(&Object::new(), options.unchecked_ref());
    if remote.is_object() {
        let plain_remote = Object::assign(&Object::new(), remote.unchecked_ref());
        if data_fn.is_some() {
            warn_on_err(Reflect::delete_property(&plain_remote, &JsValue::from_str(DATA)), "remove remote.data");
        }
        warn_on_err(
            Reflect::delete_property(&plain_remote, &JsValue::from_str(PROCESS_RESULTS)),
            "remove remote.processResults",
        );
        warn_on_err(Reflect::set(&plain, &JsValue::from_str(REMOTE), &plain_remote), "copy remote options");
    }

    let value: Value = serde_wasm_bindgen::from_value(plain.into())
        .map_err(|e| IoSelectError::InvalidOptions(e.to_string()))?;
    let mut options = IoSelectOptions::from_json(value)?;

    if let Some(mut remote) = options.remote.take() {
        if let Some(f) = data_fn {
            remote = remote.with_data_mapper(move |query| call_data_mapper(&f, query));
        }
        if let Some(f) = results_fn {
            remote = remote.with_results_mapper(move |raw, query| call_results_mapper(&f, raw, query));
        }
        options.remote = Some(remote);
    }
    Ok(options)
}

fn warn_on_err<T, E: std::fmt::Debug>(result: Result<T, E>, action: &str) -> Option<T> {
    result.inspect_err(|err| log::warn!("could not {action}: {err:?}")).ok()
}

fn get(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn function(target: &JsValue, key: &str) -> Option<Function> {
    get(target, key).dyn_into::<Function>().ok()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

fn call_data_mapper(f: &Function, query: &SearchQuery) -> Value {
    let result = to_js(query)
        .map_err(|e| format!("{e}"))
        .and_then(|arg| f.call1(&JsValue::NULL, &arg).map_err(|e| format!("{e:?}")))
        .and_then(|out| serde_wasm_bindgen::from_value::<Value>(out).map_err(|e| format!("{e}")));
    match result {
        Ok(value) => value,
        Err(err) => {
            log::warn!("remote.data mapper failed: {err}");
            Value::Null
        }
    }
}

fn call_results_mapper(f: &Function, raw: &Value, query: &SearchQuery) -> Result<FetchPage, FetchError> {
    let invalid = |msg: String| FetchError::InvalidResponse(msg);
    let raw = to_js(raw).map_err(|e| invalid(e.to_string()))?;
    let query = to_js(query).map_err(|e| invalid(e.to_string()))?;
    let mapped = f
        .call2(&JsValue::NULL, &raw, &query)
        .map_err(|e| invalid(format!("processResults threw: {e:?}")))?;
    let mapped: Value = serde_wasm_bindgen::from_value(mapped).map_err(|e| invalid(e.to_string()))?;
    default_results(&mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_on_err_passes_value_and_swallows_failure() {
        assert_eq!(warn_on_err(Ok::<bool, String>(true), "copy remote options"), Some(true));
        assert_eq!(warn_on_err(Err::<bool, _>("frozen object".to_string()), "remove remote.data"), None);
    }
}
