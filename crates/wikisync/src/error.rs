//! CLI error types.

use wikisync_config::ConfigError;
use wikisync_renderer::ConversionError;
use wikisync_sync::SyncError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("{0} document(s) failed to synchronize")]
    DocumentsFailed(usize),
}
