//! Engine error types.

use thiserror::Error;

/// Errors produced while parsing or evaluating a program.
///
/// Every failure mode of an evaluation (bad syntax, a type mismatch, a
/// script-raised fault, runaway recursion, a cancellation request) comes
/// back through this one type. Callers that only need a message can rely on
/// the `Display` impl.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed source, detected before any statement runs
    #[error("parse error: {0}")]
    Parse(String),

    /// Operand or condition of the wrong type
    #[error("type error: {0}")]
    Type(String),

    /// Runtime fault, including faults raised by the script itself
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Call depth limit exceeded
    #[error("stack overflow")]
    StackOverflow,

    /// Evaluation aborted by a cancellation request
    #[error("execution cancelled")]
    Cancelled,
}

/// Engine result alias
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = EngineError::Runtime("boom".to_string());
        assert_eq!(err.to_string(), "runtime error: boom");
    }

    #[test]
    fn test_cancelled_display() {
        assert_eq!(EngineError::Cancelled.to_string(), "execution cancelled");
    }
}
