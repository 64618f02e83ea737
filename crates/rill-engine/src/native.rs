//! Symbolic native function registry.
//!
//! Capability modules are plain Rust functions registered by dotted name
//! (e.g. "json.encode", "time.sleep") into a per-instance registry. The
//! interpreter resolves call sites against the registry at evaluation time,
//! so two instances with different registries expose different capability
//! sets. Bare names ("error", "len") register global builtins the same way.

use crate::cancel::CancelToken;
use crate::error::{EngineError, EngineResult};
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Per-call context handed to every native function.
///
/// Carries the run's cancellation token so blocking natives (sleep, network
/// reads) can slice their waits and abort promptly.
pub struct NativeCtx {
    cancel: CancelToken,
}

impl NativeCtx {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// The cancellation token bound to the running instance.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Fail with [`EngineError::Cancelled`] if cancellation was requested.
    pub fn checkpoint(&self) -> EngineResult<()> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A registered native function.
pub type NativeFn = Arc<dyn Fn(&NativeCtx, &[Value]) -> EngineResult<Value> + Send + Sync>;

/// Registry of native functions keyed by symbolic name.
#[derive(Default)]
pub struct NativeFunctionRegistry {
    funcs: FxHashMap<String, NativeFn>,
}

impl NativeFunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&NativeCtx, &[Value]) -> EngineResult<Value> + Send + Sync + 'static,
    {
        self.funcs.insert(name.to_string(), Arc::new(func));
    }

    /// Look up a native by its symbolic name.
    pub fn lookup(&self, name: &str) -> Option<NativeFn> {
        self.funcs.get(name).cloned()
    }

    /// Invoke the native registered under `name`.
    pub fn call(&self, name: &str, ctx: &NativeCtx, args: &[Value]) -> EngineResult<Value> {
        match self.funcs.get(name) {
            Some(func) => (**func)(ctx, args),
            None => Err(EngineError::Runtime(format!("unknown function '{}'", name))),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

/// Extract a string argument or fail with a uniform message.
pub fn arg_str<'a>(args: &'a [Value], idx: usize, name: &str) -> EngineResult<&'a str> {
    match args.get(idx) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(EngineError::Type(format!(
            "{}: argument {} must be a string, got {}",
            name,
            idx + 1,
            other.type_name()
        ))),
        None => Err(EngineError::Runtime(format!(
            "{}: missing argument {}",
            name,
            idx + 1
        ))),
    }
}

/// Extract an integer argument or fail with a uniform message.
pub fn arg_int(args: &[Value], idx: usize, name: &str) -> EngineResult<i64> {
    match args.get(idx) {
        Some(Value::Int(v)) => Ok(*v),
        Some(other) => Err(EngineError::Type(format!(
            "{}: argument {} must be an int, got {}",
            name,
            idx + 1,
            other.type_name()
        ))),
        None => Err(EngineError::Runtime(format!(
            "{}: missing argument {}",
            name,
            idx + 1
        ))),
    }
}

/// Extract any argument or fail if it is absent.
pub fn arg_value<'a>(args: &'a [Value], idx: usize, name: &str) -> EngineResult<&'a Value> {
    args.get(idx).ok_or_else(|| {
        EngineError::Runtime(format!("{}: missing argument {}", name, idx + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = NativeFunctionRegistry::new();
        registry.register("math.double", |_ctx, args| {
            Ok(Value::Int(arg_int(args, 0, "math.double")? * 2))
        });

        assert!(registry.contains("math.double"));
        let ctx = NativeCtx::new(CancelToken::new());
        let result = registry.call("math.double", &ctx, &[Value::Int(21)]).unwrap();
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn test_call_unknown_name() {
        let registry = NativeFunctionRegistry::new();
        assert!(registry.lookup("nope").is_none());
        let ctx = NativeCtx::new(CancelToken::new());
        let err = registry.call("nope", &ctx, &[]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Runtime("unknown function 'nope'".to_string())
        );
    }

    #[test]
    fn test_checkpoint_observes_cancellation() {
        let token = CancelToken::new();
        let ctx = NativeCtx::new(token.clone());
        assert!(ctx.checkpoint().is_ok());
        token.cancel();
        assert_eq!(ctx.checkpoint(), Err(EngineError::Cancelled));
    }

    #[test]
    fn test_arg_helpers_report_position_and_type() {
        let args = [Value::Int(1)];
        let err = arg_str(&args, 0, "f").unwrap_err();
        assert!(matches!(err, EngineError::Type(_)));
        let err = arg_int(&args, 1, "f").unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }
}
