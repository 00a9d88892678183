//! Error type for scene realization and startup.

use thiserror::Error;

/// Startup-fatal errors. Everything recoverable (missing robot definition,
/// missing mesh, failed program spawn) is logged and degraded instead of
/// surfacing here, per the simulator's failure taxonomy.
#[derive(Debug, Error)]
pub enum SimError {
    /// Scene file problems.
    #[error(transparent)]
    Config(#[from] iq_config::ConfigError),

    /// Assembly document problems.
    #[error(transparent)]
    Ldraw(#[from] iq_ldraw::LdrawError),

    /// Bridge problems during teardown-sensitive operations.
    #[error(transparent)]
    Ipc(#[from] iq_ipc::IpcError),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, SimError>;
