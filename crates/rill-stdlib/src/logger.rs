//! Logger native implementations
//!
//! Leveled logging to stdout/stderr. `print` is an alias for `logger.info`
//! so scripts have the conventional spelling.

use rill_engine::{NativeFunctionRegistry, Value};

/// Log a debug message to stdout
pub fn debug(message: &str) {
    println!("[DEBUG] {}", message);
}

/// Log an info message to stdout
pub fn info(message: &str) {
    println!("{}", message);
}

/// Log a warning message to stderr
pub fn warn(message: &str) {
    eprintln!("[WARN] {}", message);
}

/// Log an error message to stderr
pub fn error(message: &str) {
    eprintln!("[ERROR] {}", message);
}

fn join_args(args: &[Value]) -> String {
    args.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Register logger native functions
pub fn register_logger(registry: &mut NativeFunctionRegistry) {
    registry.register("logger.debug", |_ctx, args| {
        debug(&join_args(args));
        Ok(Value::Null)
    });

    registry.register("logger.info", |_ctx, args| {
        info(&join_args(args));
        Ok(Value::Null)
    });

    registry.register("logger.warn", |_ctx, args| {
        warn(&join_args(args));
        Ok(Value::Null)
    });

    registry.register("logger.error", |_ctx, args| {
        error(&join_args(args));
        Ok(Value::Null)
    });

    registry.register("print", |_ctx, args| {
        info(&join_args(args));
        Ok(Value::Null)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_args_uses_display() {
        let joined = join_args(&[Value::Int(1), Value::str("two"), Value::Bool(true)]);
        assert_eq!(joined, "1 two true");
    }

    #[test]
    fn test_info_does_not_panic() {
        info("hello world");
    }

    #[test]
    fn test_warn_does_not_panic() {
        warn("warning msg");
    }
}
