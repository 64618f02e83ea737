//! Path utilities.

use rill_engine::native::arg_str;
use rill_engine::{EngineError, NativeFunctionRegistry, Value};
use std::path::{Path, PathBuf};

/// Register path native functions
pub fn register_path(registry: &mut NativeFunctionRegistry) {
    registry.register("path.join", |_ctx, args| {
        if args.is_empty() {
            return Err(EngineError::Runtime(
                "path.join: missing argument 1".to_string(),
            ));
        }
        let mut joined = PathBuf::new();
        for (i, _) in args.iter().enumerate() {
            joined.push(arg_str(args, i, "path.join")?);
        }
        Ok(Value::str(joined.to_string_lossy()))
    });

    registry.register("path.base", |_ctx, args| {
        let path = arg_str(args, 0, "path.base")?;
        let base = Path::new(path)
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Value::str(base))
    });

    registry.register("path.dir", |_ctx, args| {
        let path = arg_str(args, 0, "path.dir")?;
        let dir = Path::new(path)
            .parent()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Value::str(dir))
    });

    registry.register("path.ext", |_ctx, args| {
        let path = arg_str(args, 0, "path.ext")?;
        let ext = Path::new(path)
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Value::str(ext))
    });

    registry.register("path.glob", |_ctx, args| {
        let pattern = arg_str(args, 0, "path.glob")?;
        let paths = glob::glob(pattern)
            .map_err(|e| EngineError::Runtime(format!("path.glob: {}", e)))?;
        let mut matches = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => matches.push(Value::str(path.to_string_lossy())),
                Err(e) => return Err(EngineError::Runtime(format!("path.glob: {}", e))),
            }
        }
        Ok(Value::array(matches))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, EngineResult, NativeCtx};

    fn call(name: &str, args: &[Value]) -> EngineResult<Value> {
        let mut registry = NativeFunctionRegistry::new();
        register_path(&mut registry);
        registry.call(name, &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_join_components() {
        assert_eq!(
            call("path.join", &[Value::str("/tmp"), Value::str("a"), Value::str("b.txt")])
                .unwrap(),
            Value::str("/tmp/a/b.txt")
        );
    }

    #[test]
    fn test_base_dir_ext() {
        let path = Value::str("/tmp/a/b.txt");
        assert_eq!(call("path.base", &[path.clone()]).unwrap(), Value::str("b.txt"));
        assert_eq!(call("path.dir", &[path.clone()]).unwrap(), Value::str("/tmp/a"));
        assert_eq!(call("path.ext", &[path]).unwrap(), Value::str("txt"));
    }

    #[test]
    fn test_glob_finds_created_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.rill"), "").unwrap();
        std::fs::write(dir.path().join("two.rill"), "").unwrap();
        std::fs::write(dir.path().join("other.txt"), "").unwrap();

        let pattern = format!("{}/*.rill", dir.path().to_str().unwrap());
        let matches = call("path.glob", &[Value::str(pattern)]).unwrap();
        assert_eq!(matches.as_array().unwrap().len(), 2);
    }
}
