//! Error types for the program bridge.

use thiserror::Error;

/// Errors that can occur in the IPC layer.
///
/// Only spawn-time problems surface as errors; once a bridge is running,
/// I/O failures demote the robot instead of propagating.
#[derive(Debug, Error)]
pub enum IpcError {
    /// The program process could not be spawned.
    #[error("failed to spawn robot program '{program}': {source}")]
    Spawn {
        /// The command that failed.
        program: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The spawned child was missing a standard pipe.
    #[error("robot program '{program}' has no piped {stream}")]
    MissingPipe {
        /// The command.
        program: String,
        /// Which stream was absent.
        stream: &'static str,
    },

    /// Platform configuration of the pipe failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IpcError {
    /// Create a spawn error.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}

/// Result type for IPC operations.
pub type Result<T> = std::result::Result<T, IpcError>;
