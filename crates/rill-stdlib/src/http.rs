//! HTTP client.
//!
//! Thin wrapper over reqwest's blocking client. Responses come back as a
//! map with `status` and `body` so scripts can branch on either.

use once_cell::sync::Lazy;
use rill_engine::native::arg_str;
use rill_engine::{EngineError, EngineResult, NativeFunctionRegistry, Value};
use std::collections::BTreeMap;
use std::time::Duration;

static CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("http client construction cannot fail with static options")
});

fn validate_url(raw: &str, name: &str) -> EngineResult<url::Url> {
    url::Url::parse(raw).map_err(|e| EngineError::Runtime(format!("{}: {}: {}", name, raw, e)))
}

fn response_value(response: reqwest::blocking::Response, name: &str) -> EngineResult<Value> {
    let status = response.status().as_u16() as i64;
    let body = response
        .text()
        .map_err(|e| EngineError::Runtime(format!("{}: {}", name, e)))?;
    let mut entries = BTreeMap::new();
    entries.insert("status".to_string(), Value::Int(status));
    entries.insert("body".to_string(), Value::str(body));
    Ok(Value::map(entries))
}

/// Register http native functions
pub fn register_http(registry: &mut NativeFunctionRegistry) {
    registry.register("http.get", |_ctx, args| {
        let raw = arg_str(args, 0, "http.get")?;
        let url = validate_url(raw, "http.get")?;
        let response = CLIENT
            .get(url)
            .send()
            .map_err(|e| EngineError::Runtime(format!("http.get: {}", e)))?;
        response_value(response, "http.get")
    });

    registry.register("http.post", |_ctx, args| {
        let raw = arg_str(args, 0, "http.post")?;
        let url = validate_url(raw, "http.post")?;
        let body = arg_str(args, 1, "http.post")?.to_string();
        let content_type = match args.get(2) {
            Some(_) => arg_str(args, 2, "http.post")?.to_string(),
            None => "application/octet-stream".to_string(),
        };
        let response = CLIENT
            .post(url)
            .header("content-type", content_type)
            .body(body)
            .send()
            .map_err(|e| EngineError::Runtime(format!("http.post: {}", e)))?;
        response_value(response, "http.post")
    });
}
