//! CLI error types.

use mdblock_config::ConfigError;
use mdblock_element::RenderError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Failed to load {0}")]
    Fetch(String),

    #[error("{0}")]
    Validation(String),
}
