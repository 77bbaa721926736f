//! Top-level errors for the `parlor` binary.

use thiserror::Error;

use crate::TerminalError;

/// Errors that end the client.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command-line arguments.
    #[error("invalid argument: {0}")]
    Args(String),

    /// Failure in the terminal driver.
    #[error(transparent)]
    Terminal(#[from] TerminalError),
}
