//! Runtime error types.

/// Errors reported synchronously by handle operations.
///
/// Evaluation failures never appear here: they surface asynchronously
/// through [`crate::Plugin::error`] once the run completes.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// `start` was called while a run was still in flight
    #[error("plugin is already running")]
    AlreadyRunning,

    /// The OS refused to spawn the execution thread
    #[error("failed to spawn execution thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_running_message() {
        assert_eq!(
            RuntimeError::AlreadyRunning.to_string(),
            "plugin is already running"
        );
    }
}
