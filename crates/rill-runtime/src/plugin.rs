//! The plugin execution handle.
//!
//! A [`Plugin`] represents one spawnable nested run: it holds the program
//! body, the guarded running/error record, and the cancellation control for
//! the run in flight. `start` fires the evaluation on its own OS thread and
//! returns immediately; callers observe completion by polling
//! [`is_running`](Plugin::is_running) / [`error`](Plugin::error) (or by
//! blocking on [`wait_completion`](Plugin::wait_completion)) and may abort
//! the run at any time with [`cancel`](Plugin::cancel).
//!
//! All mutable state lives in one `PluginState` behind a single mutex.
//! The worker writes the terminal error and clears the running flag in the
//! same critical section, so an observer that sees `running == false` is
//! guaranteed to see that run's final outcome.

use crate::error::RuntimeError;
use crate::vm_setup;
use parking_lot::{Condvar, Mutex};
use rill_engine::CancelToken;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Mutable handle state. Guarded by the handle's mutex; never read or
/// written outside it.
struct PluginState {
    running: bool,
    error: Option<String>,
    cancel: Option<CancelToken>,
}

/// Lifecycle handle for one nested script execution.
pub struct Plugin {
    body: String,
    state: Mutex<PluginState>,
    done: Condvar,
}

impl Plugin {
    /// Create a handle bound to `body`. Nothing runs until
    /// [`start`](Plugin::start).
    pub fn new(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: body.into(),
            state: Mutex::new(PluginState {
                running: false,
                error: None,
                cancel: None,
            }),
            done: Condvar::new(),
        })
    }

    /// The program body this handle executes.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Launch the evaluation on its own thread and return immediately.
    ///
    /// Under the lock: constructs a fresh engine instance with a fresh
    /// cancellation token, clears the previous terminal error, and flips the
    /// handle to running. The instance is then moved into the worker, which
    /// owns it exclusively for the duration of the run and writes back the
    /// terminal state before exiting.
    ///
    /// Fails with [`RuntimeError::AlreadyRunning`] while a run is in
    /// flight; restarting after completion is safe and discards the prior
    /// run's error and token. Evaluation failures are never reported here;
    /// poll [`error`](Plugin::error) after completion.
    pub fn start(self: &Arc<Self>) -> Result<(), RuntimeError> {
        let instance = {
            let mut state = self.state.lock();
            if state.running {
                return Err(RuntimeError::AlreadyRunning);
            }
            let cancel = CancelToken::new();
            let instance = vm_setup::create_instance(cancel.clone());
            state.error = None;
            state.running = true;
            state.cancel = Some(cancel);
            instance
        };

        let plugin = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("rill-plugin".to_string())
            .spawn(move || {
                let mut instance = instance;
                // The evaluation runs entirely outside the lock. A panic
                // escaping a native must still write back terminal state,
                // or the handle would report running forever.
                let result =
                    panic::catch_unwind(AssertUnwindSafe(|| instance.run(plugin.body())));
                let error = match result {
                    Ok(Ok(_)) => None,
                    Ok(Err(e)) => Some(e.to_string()),
                    Err(_) => Some("evaluation panicked".to_string()),
                };

                let mut state = plugin.state.lock();
                state.error = error;
                state.running = false;
                plugin.done.notify_all();
            });

        if let Err(e) = spawned {
            let mut state = self.state.lock();
            state.running = false;
            state.cancel = None;
            return Err(RuntimeError::Spawn(e));
        }
        Ok(())
    }

    /// Whether a run is currently in flight.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// The terminal error of the most recently completed run.
    ///
    /// `None` covers three states the handle does not distinguish: never
    /// started, still running, and completed successfully.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    /// Request cooperative interruption of the run in flight.
    ///
    /// Idempotent, and a safe no-op before the first start. The handle's
    /// state only changes once the interrupted evaluation actually returns
    /// and the worker records the outcome.
    pub fn cancel(&self) {
        let state = self.state.lock();
        if let Some(cancel) = &state.cancel {
            cancel.cancel();
        }
    }

    /// Block until the current run completes or `timeout` elapses.
    ///
    /// Returns true if the handle is idle when this returns. Purely a
    /// convenience over polling [`is_running`](Plugin::is_running); it is
    /// also true for a handle that was never started.
    pub fn wait_completion(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.running {
            if self.done.wait_until(&mut state, deadline).timed_out() {
                return !state.running;
            }
        }
        true
    }
}
