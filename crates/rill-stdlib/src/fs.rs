//! Filesystem access.

use rill_engine::native::arg_str;
use rill_engine::{EngineError, NativeFunctionRegistry, Value};
use std::fs;
use std::path::Path;

/// Register fs native functions
pub fn register_fs(registry: &mut NativeFunctionRegistry) {
    registry.register("fs.read_file", |_ctx, args| {
        let path = arg_str(args, 0, "fs.read_file")?;
        fs::read_to_string(path)
            .map(Value::str)
            .map_err(|e| EngineError::Runtime(format!("fs.read_file: {}: {}", path, e)))
    });

    registry.register("fs.write_file", |_ctx, args| {
        let path = arg_str(args, 0, "fs.write_file")?;
        let content = arg_str(args, 1, "fs.write_file")?;
        fs::write(path, content)
            .map(|_| Value::Null)
            .map_err(|e| EngineError::Runtime(format!("fs.write_file: {}: {}", path, e)))
    });

    registry.register("fs.exists", |_ctx, args| {
        let path = arg_str(args, 0, "fs.exists")?;
        Ok(Value::Bool(Path::new(path).exists()))
    });

    registry.register("fs.remove", |_ctx, args| {
        let path = arg_str(args, 0, "fs.remove")?;
        fs::remove_file(path)
            .map(|_| Value::Null)
            .map_err(|e| EngineError::Runtime(format!("fs.remove: {}: {}", path, e)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, EngineResult, NativeCtx};

    fn call(name: &str, args: &[Value]) -> EngineResult<Value> {
        let mut registry = NativeFunctionRegistry::new();
        register_fs(&mut registry);
        registry.call(name, &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_write_read_remove_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let path_value = Value::str(path.to_str().unwrap());

        call("fs.write_file", &[path_value.clone(), Value::str("hello")]).unwrap();
        assert_eq!(call("fs.exists", &[path_value.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(
            call("fs.read_file", &[path_value.clone()]).unwrap(),
            Value::str("hello")
        );
        call("fs.remove", &[path_value.clone()]).unwrap();
        assert_eq!(call("fs.exists", &[path_value]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let err = call("fs.read_file", &[Value::str("/no/such/file")]).unwrap_err();
        match err {
            EngineError::Runtime(msg) => assert!(msg.contains("/no/such/file")),
            other => panic!("expected runtime error, got {:?}", other),
        }
    }
}
