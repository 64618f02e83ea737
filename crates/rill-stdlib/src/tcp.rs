//! TCP client connections.
//!
//! Connections are addressed by opaque u64 ids in a process-wide table;
//! `tcp.close` drops the stream. Receives poll in short slices so a
//! cancellation request interrupts a quiet socket.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rill_engine::native::{arg_int, arg_str};
use rill_engine::{EngineError, EngineResult, NativeFunctionRegistry, Value};
use rustc_hash::FxHashMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static CONNECTIONS: Lazy<Mutex<FxHashMap<u64, TcpStream>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Poll granularity for reads, which doubles as the cancellation latency.
const RECV_SLICE: Duration = Duration::from_millis(100);

fn with_stream<T>(
    id: i64,
    name: &str,
    f: impl FnOnce(&mut TcpStream) -> EngineResult<T>,
) -> EngineResult<T> {
    let mut connections = CONNECTIONS.lock();
    let stream = connections
        .get_mut(&(id as u64))
        .ok_or_else(|| EngineError::Runtime(format!("{}: unknown connection {}", name, id)))?;
    f(stream)
}

/// Register tcp native functions
pub fn register_tcp(registry: &mut NativeFunctionRegistry) {
    registry.register("tcp.connect", |_ctx, args| {
        let addr = arg_str(args, 0, "tcp.connect")?;
        let stream = TcpStream::connect(addr)
            .map_err(|e| EngineError::Runtime(format!("tcp.connect: {}: {}", addr, e)))?;
        stream
            .set_read_timeout(Some(RECV_SLICE))
            .map_err(|e| EngineError::Runtime(format!("tcp.connect: {}", e)))?;
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        CONNECTIONS.lock().insert(id, stream);
        Ok(Value::Int(id as i64))
    });

    registry.register("tcp.send", |_ctx, args| {
        let id = arg_int(args, 0, "tcp.send")?;
        let data = arg_str(args, 1, "tcp.send")?.to_string();
        with_stream(id, "tcp.send", |stream| {
            stream
                .write_all(data.as_bytes())
                .map_err(|e| EngineError::Runtime(format!("tcp.send: {}", e)))?;
            Ok(Value::Null)
        })
    });

    registry.register("tcp.recv", |ctx, args| {
        let id = arg_int(args, 0, "tcp.recv")?;
        let max = arg_int(args, 1, "tcp.recv")?;
        if max <= 0 {
            return Err(EngineError::Runtime(
                "tcp.recv: max bytes must be positive".to_string(),
            ));
        }
        let mut buf = vec![0u8; max as usize];
        loop {
            ctx.checkpoint()?;
            let read = with_stream(id, "tcp.recv", |stream| match stream.read(&mut buf) {
                Ok(n) => Ok(Some(n)),
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    Ok(None)
                }
                Err(e) => Err(EngineError::Runtime(format!("tcp.recv: {}", e))),
            })?;
            if let Some(n) = read {
                return Ok(Value::str(String::from_utf8_lossy(&buf[..n])));
            }
        }
    });

    registry.register("tcp.close", |_ctx, args| {
        let id = arg_int(args, 0, "tcp.close")?;
        match CONNECTIONS.lock().remove(&(id as u64)) {
            Some(_) => Ok(Value::Null),
            None => Err(EngineError::Runtime(format!(
                "tcp.close: unknown connection {}",
                id
            ))),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rill_engine::{CancelToken, NativeCtx};
    use std::net::TcpListener;

    fn call(
        registry: &NativeFunctionRegistry,
        name: &str,
        args: &[Value],
    ) -> EngineResult<Value> {
        registry.call(name, &NativeCtx::new(CancelToken::new()), args)
    }

    #[test]
    fn test_connect_send_recv_close_against_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = std::thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let n = socket.read(&mut buf).unwrap();
            socket.write_all(&buf[..n]).unwrap();
        });

        let mut registry = NativeFunctionRegistry::new();
        register_tcp(&mut registry);

        let id = call(&registry, "tcp.connect", &[Value::str(&addr)]).unwrap();
        call(&registry, "tcp.send", &[id.clone(), Value::str("ping")]).unwrap();
        let echoed = call(&registry, "tcp.recv", &[id.clone(), Value::Int(64)]).unwrap();
        assert_eq!(echoed, Value::str("ping"));
        call(&registry, "tcp.close", &[id.clone()]).unwrap();

        // Operations on a closed id fail cleanly
        assert!(call(&registry, "tcp.send", &[id, Value::str("x")]).is_err());
        server.join().unwrap();
    }

    #[test]
    fn test_connect_refused_reports_address() {
        let mut registry = NativeFunctionRegistry::new();
        register_tcp(&mut registry);
        // Port 1 on loopback is almost certainly closed
        let err = call(&registry, "tcp.connect", &[Value::str("127.0.0.1:1")]).unwrap_err();
        match err {
            EngineError::Runtime(msg) => assert!(msg.contains("127.0.0.1:1")),
            other => panic!("expected runtime error, got {:?}", other),
        }
    }
}
