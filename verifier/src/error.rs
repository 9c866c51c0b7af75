//! Crate-wide error type.
//!
//! Each component reports its own error enum; [`SixerError`] gathers the
//! ones that can end a run so that the binary has a single type to print.

use thiserror::Error;

use crate::artefact::fetch::FetchError;
use crate::config::ConfigError;
use crate::keys::KeyError;
use crate::pipeline::LinkError;

/// Errors that abort a verification run.
#[derive(Debug, Error)]
pub enum SixerError {
    /// Configuration could not be loaded or is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A link could not be probed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The announcer key could not be resolved.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The cache could not be cleaned.
    #[error(transparent)]
    Cache(#[from] FetchError),

    /// The report could not be written.
    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

/// Convenience alias for results carrying a [`SixerError`].
pub type Result<T> = std::result::Result<T, SixerError>;
