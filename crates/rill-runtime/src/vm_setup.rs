//! Engine instance creation and configuration.

use rill_engine::{CancelToken, Interp, NativeFunctionRegistry};

/// Create a fully-configured engine instance with the complete capability
/// set, bound to the given cancellation token.
///
/// Every call builds a fresh registry and a fresh interpreter; instances
/// share no mutable state. The plugin bindings are part of the set, so a
/// program running inside the instance can itself spawn nested runs.
pub fn create_instance(cancel: CancelToken) -> Interp {
    let mut registry = NativeFunctionRegistry::new();
    rill_stdlib::register_stdlib(&mut registry);
    crate::bindings::register_plugin(&mut registry);
    Interp::new(registry, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::Value;

    #[test]
    fn test_instance_carries_full_capability_set() {
        let mut instance = create_instance(CancelToken::new());
        let result = instance.run(r#"return strings.upper("ok");"#).unwrap();
        assert_eq!(result, Value::str("OK"));
    }

    #[test]
    fn test_instances_are_isolated() {
        let mut first = create_instance(CancelToken::new());
        let mut second = create_instance(CancelToken::new());
        first.run("let x = 1;").unwrap();
        // `x` must not leak into the second instance
        let err = second.run("return x;").unwrap_err();
        assert!(matches!(err, rill_engine::EngineError::Runtime(_)));
    }
}
