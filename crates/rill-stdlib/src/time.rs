//! Time access and cancellation-aware sleeping.

use rill_engine::native::arg_int;
use rill_engine::{EngineError, NativeFunctionRegistry, Value};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Granularity at which a sleeping script notices cancellation.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Register time native functions
pub fn register_time(registry: &mut NativeFunctionRegistry) {
    registry.register("time.now", |_ctx, _args| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Ok(Value::Float(now.as_secs_f64()))
    });

    registry.register("time.millis", |_ctx, _args| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Ok(Value::Int(now.as_millis() as i64))
    });

    registry.register("time.sleep", |ctx, args| {
        let millis = arg_int(args, 0, "time.sleep")?;
        if millis < 0 {
            return Err(EngineError::Runtime(
                "time.sleep: duration must be non-negative".to_string(),
            ));
        }
        // Sleep in slices so a cancellation request interrupts the wait
        // instead of running it out.
        let mut remaining = Duration::from_millis(millis as u64);
        while !remaining.is_zero() {
            ctx.checkpoint()?;
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining -= slice;
        }
        ctx.checkpoint()?;
        Ok(Value::Null)
    });
}
