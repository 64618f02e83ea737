//! Pattern matching over the regex crate.

use regex::Regex;
use rill_engine::native::arg_str;
use rill_engine::{EngineError, EngineResult, NativeFunctionRegistry, Value};

fn compile(pattern: &str, name: &str) -> EngineResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| EngineError::Runtime(format!("{}: invalid pattern: {}", name, e)))
}

/// Register regexp native functions
pub fn register_regexp(registry: &mut NativeFunctionRegistry) {
    registry.register("regexp.match", |_ctx, args| {
        let pattern = arg_str(args, 0, "regexp.match")?;
        let text = arg_str(args, 1, "regexp.match")?;
        Ok(Value::Bool(compile(pattern, "regexp.match")?.is_match(text)))
    });

    registry.register("regexp.find", |_ctx, args| {
        let pattern = arg_str(args, 0, "regexp.find")?;
        let text = arg_str(args, 1, "regexp.find")?;
        let found = compile(pattern, "regexp.find")?
            .find(text)
            .map(|m| Value::str(m.as_str()))
            .unwrap_or(Value::Null);
        Ok(found)
    });

    registry.register("regexp.find_all", |_ctx, args| {
        let pattern = arg_str(args, 0, "regexp.find_all")?;
        let text = arg_str(args, 1, "regexp.find_all")?;
        let matches = compile(pattern, "regexp.find_all")?
            .find_iter(text)
            .map(|m| Value::str(m.as_str()))
            .collect();
        Ok(Value::array(matches))
    });

    registry.register("regexp.replace", |_ctx, args| {
        let pattern = arg_str(args, 0, "regexp.replace")?;
        let text = arg_str(args, 1, "regexp.replace")?;
        let replacement = arg_str(args, 2, "regexp.replace")?;
        let replaced = compile(pattern, "regexp.replace")?.replace_all(text, replacement);
        Ok(Value::str(replaced))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, NativeCtx};

    fn call(name: &str, args: &[Value]) -> EngineResult<Value> {
        let mut registry = NativeFunctionRegistry::new();
        register_regexp(&mut registry);
        registry.call(name, &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_match_and_find() {
        assert_eq!(
            call("regexp.match", &[Value::str(r"\d+"), Value::str("abc 123")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("regexp.find", &[Value::str(r"\d+"), Value::str("abc 123")]).unwrap(),
            Value::str("123")
        );
        assert_eq!(
            call("regexp.find", &[Value::str(r"\d+"), Value::str("abc")]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_find_all_and_replace() {
        assert_eq!(
            call(
                "regexp.find_all",
                &[Value::str(r"\d+"), Value::str("1 a 22 b 333")]
            )
            .unwrap(),
            Value::array(vec![Value::str("1"), Value::str("22"), Value::str("333")])
        );
        assert_eq!(
            call(
                "regexp.replace",
                &[Value::str(r"\s+"), Value::str("a  b   c"), Value::str(" ")]
            )
            .unwrap(),
            Value::str("a b c")
        );
    }

    #[test]
    fn test_invalid_pattern_reports_error() {
        let err = call("regexp.match", &[Value::str("("), Value::str("x")]).unwrap_err();
        assert!(matches!(err, EngineError::Runtime(_)));
    }
}
