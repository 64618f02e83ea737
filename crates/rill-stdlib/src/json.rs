//! JSON encoding and decoding.
//!
//! Also home to the shared bridge between Rill values and
//! `serde_json::Value`, which the YAML and XML modules reuse.

use rill_engine::native::{arg_str, arg_value};
use rill_engine::{EngineError, EngineResult, NativeFunctionRegistry, Value};
use std::collections::BTreeMap;

/// Convert a Rill value into a serde_json value.
pub(crate) fn to_json(value: &Value) -> EngineResult<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(v) => serde_json::Value::from(*v),
        Value::Float(v) => {
            if !v.is_finite() {
                return Err(EngineError::Runtime(
                    "cannot encode a non-finite float".to_string(),
                ));
            }
            serde_json::Value::from(*v)
        }
        Value::Str(s) => serde_json::Value::from(s.as_ref()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(to_json(item)?);
            }
            serde_json::Value::Array(out)
        }
        Value::Map(entries) => {
            let mut out = serde_json::Map::new();
            for (key, value) in entries.iter() {
                out.insert(key.clone(), to_json(value)?);
            }
            serde_json::Value::Object(out)
        }
    })
}

/// Convert a serde_json value into a Rill value.
pub(crate) fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::str(s),
        serde_json::Value::Array(items) => {
            Value::array(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(entries) => {
            let map: BTreeMap<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect();
            Value::map(map)
        }
    }
}

/// Register json native functions
pub fn register_json(registry: &mut NativeFunctionRegistry) {
    registry.register("json.encode", |_ctx, args| {
        let value = arg_value(args, 0, "json.encode")?;
        let json = to_json(value)?;
        serde_json::to_string(&json)
            .map(Value::str)
            .map_err(|e| EngineError::Runtime(format!("json.encode: {}", e)))
    });

    registry.register("json.decode", |_ctx, args| {
        let text = arg_str(args, 0, "json.decode")?;
        let json: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| EngineError::Runtime(format!("json.decode: {}", e)))?;
        Ok(from_json(json))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, NativeCtx};

    fn call(name: &str, args: &[Value]) -> EngineResult<Value> {
        let mut registry = NativeFunctionRegistry::new();
        register_json(&mut registry);
        registry.call(name, &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_decode_into_typed_values() {
        let decoded = call(
            "json.decode",
            &[Value::str(r#"{"a": 1, "b": [true, "x"], "c": 2.5}"#)],
        )
        .unwrap();
        let map = decoded.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(
            map["b"],
            Value::array(vec![Value::Bool(true), Value::str("x")])
        );
        assert_eq!(map["c"], Value::Float(2.5));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let mut entries = BTreeMap::new();
        entries.insert("b".to_string(), Value::Int(2));
        entries.insert("a".to_string(), Value::Int(1));
        let encoded = call("json.encode", &[Value::map(entries)]).unwrap();
        assert_eq!(encoded, Value::str(r#"{"a":1,"b":2}"#));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let err = call("json.decode", &[Value::str("{not json")]).unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }

    #[test]
    fn test_encode_rejects_non_finite_float() {
        let err = call("json.encode", &[Value::Float(f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }
}
