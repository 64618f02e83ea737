//! Bare-named builtins available in every instance.
//!
//! `error` is how a script raises a fault: the message travels through the
//! engine's error return path and surfaces as the run's terminal error.

use rill_engine::native::arg_value;
use rill_engine::{EngineError, NativeFunctionRegistry, Value};

/// Register the global builtins: `error`, `len`, `type`, `str`.
pub fn register_globals(registry: &mut NativeFunctionRegistry) {
    registry.register("error", |_ctx, args| {
        let message = match args.first() {
            Some(value) => value.to_string(),
            None => "error".to_string(),
        };
        Err(EngineError::Runtime(message))
    });

    registry.register("len", |_ctx, args| {
        let value = arg_value(args, 0, "len")?;
        match value {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::Array(items) => Ok(Value::Int(items.len() as i64)),
            Value::Map(entries) => Ok(Value::Int(entries.len() as i64)),
            other => Err(EngineError::Type(format!(
                "len: cannot measure {}",
                other.type_name()
            ))),
        }
    });

    registry.register("type", |_ctx, args| {
        let value = arg_value(args, 0, "type")?;
        Ok(Value::str(value.type_name()))
    });

    registry.register("str", |_ctx, args| {
        let value = arg_value(args, 0, "str")?;
        Ok(Value::str(value.to_string()))
    });
}
