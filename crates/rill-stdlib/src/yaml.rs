//! YAML encoding and decoding.

use crate::json::{from_json, to_json};
use rill_engine::native::{arg_str, arg_value};
use rill_engine::{EngineError, NativeFunctionRegistry, Value};

/// Register yaml native functions
pub fn register_yaml(registry: &mut NativeFunctionRegistry) {
    registry.register("yaml.encode", |_ctx, args| {
        let value = arg_value(args, 0, "yaml.encode")?;
        let json = to_json(value)?;
        serde_yaml::to_string(&json)
            .map(Value::str)
            .map_err(|e| EngineError::Runtime(format!("yaml.encode: {}", e)))
    });

    registry.register("yaml.decode", |_ctx, args| {
        let text = arg_str(args, 0, "yaml.decode")?;
        let json: serde_json::Value = serde_yaml::from_str(text)
            .map_err(|e| EngineError::Runtime(format!("yaml.decode: {}", e)))?;
        Ok(from_json(json))
    });
}
