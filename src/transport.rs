//! Fetch Transport
//!
//! Sends a [`RequestParams`] with the browser `fetch` API and returns the
//! decoded body. GET/HEAD/DELETE carry the mapped data as a query string,
//! everything else as a JSON body.

use io_select_core::{FetchError, RequestParams};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

pub async fn send(params: &RequestParams) -> Result<Value, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::request_failed("no window available"))?;

    let init = RequestInit::new();
    init.set_method(&params.method);
    let headers = Headers::new().map_err(js_error)?;
    headers.set("Accept", accept_header(&params.data_type)).map_err(js_error)?;

    let url = if sends_query(&params.method) {
        with_query(&params.url, &params.data)
    } else {
        headers.set("Content-Type", "application/json").map_err(js_error)?;
        init.set_body(&JsValue::from_str(&params.data.to_string()));
        params.url.clone()
    };
    init.set_headers(&headers);

    let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;

    if !response.ok() {
        return Err(FetchError::RequestFailed {
            status: Some(response.status()),
            message: response.status_text(),
        });
    }

    if params.data_type.eq_ignore_ascii_case("json") {
        let body = JsFuture::from(response.json().map_err(js_error)?).await.map_err(js_error)?;
        serde_wasm_bindgen::from_value(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    } else {
        let body = JsFuture::from(response.text().map_err(js_error)?).await.map_err(js_error)?;
        Ok(Value::String(body.as_string().unwrap_or_default()))
    }
}

fn js_error(err: JsValue) -> FetchError {
    FetchError::request_failed(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn sends_query(method: &str) -> bool {
    matches!(method.to_ascii_uppercase().as_str(), "GET" | "HEAD" | "DELETE")
}

fn accept_header(data_type: &str) -> &'static str {
    if data_type.eq_ignore_ascii_case("json") {
        "application/json"
    } else {
        "*/*"
    }
}

/// Append `data` to `url` as `key=value` pairs. Arrays repeat the key,
/// nulls are skipped, nested objects are sent as JSON text.
pub fn with_query(url: &str, data: &Value) -> String {
    let Value::Object(map) = data else {
        return url.to_string();
    };

    let mut pairs = Vec::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(values) => {
                for value in values {
                    if let Some(text) = query_value(value) {
                        pairs.push(encode_pair(key, &text));
                    }
                }
            }
            other => {
                if let Some(text) = query_value(other) {
                    pairs.push(encode_pair(key, &text));
                }
            }
        }
    }

    if pairs.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{}", pairs.join("&"))
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    format!(
        "{}={}",
        utf8_percent_encode(key, NON_ALPHANUMERIC),
        utf8_percent_encode(value, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_query_basic() {
        let url = with_query("/api/users", &json!({ "search": "ann lee", "page": 2 }));
        assert_eq!(url, "/api/users?page=2&search=ann%20lee");
    }

    #[test]
    fn test_with_query_existing_query_and_arrays() {
        let url = with_query("/api?x=1", &json!({ "ids": ["a", "b"], "skip": null }));
        assert_eq!(url, "/api?x=1&ids=a&ids=b");
    }

    #[test]
    fn test_with_query_non_object() {
        assert_eq!(with_query("/api", &json!("raw")), "/api");
        assert_eq!(with_query("/api", &json!({})), "/api");
    }

    #[test]
    fn test_method_routing() {
        assert!(sends_query("get"));
        assert!(sends_query("GET"));
        assert!(!sends_query("POST"));
    }
}
