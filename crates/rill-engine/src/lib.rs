//! Rill language engine
//!
//! Lexer, parser, and tree-walking interpreter for the Rill scripting
//! language, plus the native-function registry through which capability
//! modules are installed into an instance and the cancellation token that
//! makes evaluation interruptible.

#![warn(missing_docs)]

pub mod ast;
pub mod cancel;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod native;
pub mod parser;
pub mod token;
pub mod value;

pub use cancel::CancelToken;
pub use error::{EngineError, EngineResult};
pub use interp::Interp;
pub use native::{NativeCtx, NativeFn, NativeFunctionRegistry};
pub use value::Value;
