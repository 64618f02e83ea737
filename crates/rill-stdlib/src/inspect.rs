//! Human-readable value dumps for debugging scripts.

use rill_engine::native::arg_value;
use rill_engine::{NativeFunctionRegistry, Value};

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump(value: &Value, out: &mut String, depth: usize) {
    match value {
        Value::Str(s) => {
            out.push('"');
            for c in s.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    other => out.push(other),
                }
            }
            out.push('"');
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[\n");
            for item in items.iter() {
                write_indent(out, depth + 1);
                dump(item, out, depth + 1);
                out.push_str(",\n");
            }
            write_indent(out, depth);
            out.push(']');
        }
        Value::Map(entries) => {
            if entries.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (key, value) in entries.iter() {
                write_indent(out, depth + 1);
                out.push_str(key);
                out.push_str(": ");
                dump(value, out, depth + 1);
                out.push_str(",\n");
            }
            write_indent(out, depth);
            out.push('}');
        }
        other => out.push_str(&other.to_string()),
    }
}

/// Render a value as a multi-line, indented dump.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    dump(value, &mut out, 0);
    out
}

/// Register inspect native functions
pub fn register_inspect(registry: &mut NativeFunctionRegistry) {
    registry.register("inspect.inspect", |_ctx, args| {
        let value = arg_value(args, 0, "inspect.inspect")?;
        Ok(Value::str(render(value)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_scalars_render_inline() {
        assert_eq!(render(&Value::Int(1)), "1");
        assert_eq!(render(&Value::str("a\"b")), "\"a\\\"b\"");
    }

    #[test]
    fn test_nested_structure_renders_indented() {
        let mut inner = BTreeMap::new();
        inner.insert("flag".to_string(), Value::Bool(true));
        let value = Value::array(vec![Value::map(inner)]);
        assert_eq!(render(&value), "[\n  {\n    flag: true,\n  },\n]");
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(render(&Value::array(vec![])), "[]");
        assert_eq!(render(&Value::map(BTreeMap::new())), "{}");
    }
}
