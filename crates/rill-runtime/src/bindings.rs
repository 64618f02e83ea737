//! Script-facing plugin bindings.
//!
//! Exposes the handle operations as `plugin.*` natives so a running script
//! can spawn, observe, and cancel nested runs. Handles are addressed by
//! opaque u64 ids in a process-wide table; the table entry keeps the handle
//! alive for the life of the process, mirroring how the ids behave like
//! file descriptors rather than scoped values.

use crate::plugin::Plugin;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rill_engine::native::{arg_int, arg_str};
use rill_engine::{EngineError, EngineResult, NativeFunctionRegistry, Value};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static PLUGINS: Lazy<Mutex<FxHashMap<u64, Arc<Plugin>>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn get(id: i64, name: &str) -> EngineResult<Arc<Plugin>> {
    PLUGINS
        .lock()
        .get(&(id as u64))
        .cloned()
        .ok_or_else(|| EngineError::Runtime(format!("{}: unknown plugin handle {}", name, id)))
}

/// Register plugin native functions
pub fn register_plugin(registry: &mut NativeFunctionRegistry) {
    registry.register("plugin.new", |_ctx, args| {
        let body = arg_str(args, 0, "plugin.new")?;
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        PLUGINS.lock().insert(id, Plugin::new(body));
        Ok(Value::Int(id as i64))
    });

    registry.register("plugin.run", |_ctx, args| {
        let id = arg_int(args, 0, "plugin.run")?;
        let plugin = get(id, "plugin.run")?;
        plugin
            .start()
            .map_err(|e| EngineError::Runtime(format!("plugin.run: {}", e)))?;
        Ok(Value::Null)
    });

    registry.register("plugin.is_running", |_ctx, args| {
        let id = arg_int(args, 0, "plugin.is_running")?;
        Ok(Value::Bool(get(id, "plugin.is_running")?.is_running()))
    });

    registry.register("plugin.error", |_ctx, args| {
        let id = arg_int(args, 0, "plugin.error")?;
        let error = get(id, "plugin.error")?.error();
        Ok(error.map(Value::str).unwrap_or(Value::Null))
    });

    registry.register("plugin.stop", |_ctx, args| {
        let id = arg_int(args, 0, "plugin.stop")?;
        get(id, "plugin.stop")?.cancel();
        Ok(Value::Null)
    });
}
