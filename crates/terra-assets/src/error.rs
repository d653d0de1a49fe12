//! Asset database error types.

/// Errors returned by the asset database and its fetch sources.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// A descriptor with the same uri is already registered.
    #[error("asset already registered: {0}")]
    AlreadyRegistered(String),

    /// A fetch worker thread could not be started.
    #[error("failed to spawn fetch worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
