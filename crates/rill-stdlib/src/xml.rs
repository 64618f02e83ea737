//! XML decoding.
//!
//! Decodes element trees into maps via quick-xml's serde support. Text
//! content of leaf elements comes back as strings; attributes are keyed
//! with a leading `@`.

use crate::json::from_json;
use rill_engine::native::arg_str;
use rill_engine::{EngineError, NativeFunctionRegistry, Value};

/// Register xml native functions
pub fn register_xml(registry: &mut NativeFunctionRegistry) {
    registry.register("xml.decode", |_ctx, args| {
        let text = arg_str(args, 0, "xml.decode")?;
        let json: serde_json::Value = quick_xml::de::from_str(text)
            .map_err(|e| EngineError::Runtime(format!("xml.decode: {}", e)))?;
        Ok(from_json(json))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, EngineResult, NativeCtx};

    fn call(args: &[Value]) -> EngineResult<Value> {
        let mut registry = NativeFunctionRegistry::new();
        register_xml(&mut registry);
        registry.call("xml.decode", &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_decode_element_tree() {
        let decoded = call(&[Value::str("<root><a>1</a><b>x</b></root>")]).unwrap();
        let map = decoded.as_map().unwrap();
        assert!(map.contains_key("a"));
        assert_eq!(map["b"], Value::str("x"));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        let err = call(&[Value::str("<root><unclosed></root>")]).unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }
}
