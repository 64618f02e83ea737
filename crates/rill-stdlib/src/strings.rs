//! Text utilities.

use rill_engine::native::arg_str;
use rill_engine::{NativeFunctionRegistry, Value};

/// Register string native functions
pub fn register_strings(registry: &mut NativeFunctionRegistry) {
    registry.register("strings.upper", |_ctx, args| {
        Ok(Value::str(arg_str(args, 0, "strings.upper")?.to_uppercase()))
    });

    registry.register("strings.lower", |_ctx, args| {
        Ok(Value::str(arg_str(args, 0, "strings.lower")?.to_lowercase()))
    });

    registry.register("strings.trim", |_ctx, args| {
        Ok(Value::str(arg_str(args, 0, "strings.trim")?.trim()))
    });

    registry.register("strings.split", |_ctx, args| {
        let s = arg_str(args, 0, "strings.split")?;
        let sep = arg_str(args, 1, "strings.split")?;
        let parts = s.split(sep).map(Value::str).collect();
        Ok(Value::array(parts))
    });

    registry.register("strings.join", |_ctx, args| {
        let items = match args.first() {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(rill_engine::EngineError::Type(
                    "strings.join: argument 1 must be an array".to_string(),
                ))
            }
        };
        let sep = arg_str(args, 1, "strings.join")?;
        let joined = items
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(sep);
        Ok(Value::str(joined))
    });

    registry.register("strings.contains", |_ctx, args| {
        let s = arg_str(args, 0, "strings.contains")?;
        let needle = arg_str(args, 1, "strings.contains")?;
        Ok(Value::Bool(s.contains(needle)))
    });

    registry.register("strings.replace", |_ctx, args| {
        let s = arg_str(args, 0, "strings.replace")?;
        let from = arg_str(args, 1, "strings.replace")?;
        let to = arg_str(args, 2, "strings.replace")?;
        Ok(Value::str(s.replace(from, to)))
    });

    registry.register("strings.starts_with", |_ctx, args| {
        let s = arg_str(args, 0, "strings.starts_with")?;
        let prefix = arg_str(args, 1, "strings.starts_with")?;
        Ok(Value::Bool(s.starts_with(prefix)))
    });

    registry.register("strings.ends_with", |_ctx, args| {
        let s = arg_str(args, 0, "strings.ends_with")?;
        let suffix = arg_str(args, 1, "strings.ends_with")?;
        Ok(Value::Bool(s.ends_with(suffix)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, NativeCtx};

    fn call(name: &str, args: &[Value]) -> Value {
        let mut registry = NativeFunctionRegistry::new();
        register_strings(&mut registry);
        registry.call(name, &NativeCtx::new(CancelToken::new()), args).unwrap()
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(call("strings.upper", &[Value::str("abc")]), Value::str("ABC"));
        assert_eq!(call("strings.lower", &[Value::str("ABC")]), Value::str("abc"));
    }

    #[test]
    fn test_split_and_join_round() {
        let parts = call("strings.split", &[Value::str("a,b,c"), Value::str(",")]);
        assert_eq!(
            parts,
            Value::array(vec![Value::str("a"), Value::str("b"), Value::str("c")])
        );
        let joined = call("strings.join", &[parts, Value::str("-")]);
        assert_eq!(joined, Value::str("a-b-c"));
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            call("strings.contains", &[Value::str("hello"), Value::str("ell")]),
            Value::Bool(true)
        );
        assert_eq!(
            call(
                "strings.starts_with",
                &[Value::str("hello"), Value::str("he")]
            ),
            Value::Bool(true)
        );
        assert_eq!(
            call("strings.ends_with", &[Value::str("hello"), Value::str("xx")]),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(
            call(
                "strings.replace",
                &[Value::str("a-b-c"), Value::str("-"), Value::str("+")]
            ),
            Value::str("a+b+c")
        );
    }
}
