//! Rill runtime
//!
//! Binds the engine with the standard library and provides the plugin
//! execution handle: spawn a program body on its own thread, poll its
//! running/error state, and cancel it cooperatively. The same operations
//! are exposed to scripts as `plugin.*` natives, so Rill code can spawn
//! nested Rill runs.

#![warn(missing_docs)]

pub mod bindings;
pub mod error;
pub mod plugin;
pub mod vm_setup;

pub use error::RuntimeError;
pub use plugin::Plugin;
pub use vm_setup::create_instance;
