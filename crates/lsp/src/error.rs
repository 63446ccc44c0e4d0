use std::path::PathBuf;
use thiserror::Error;

/// Runtime errors for the LSP server.
#[derive(Debug, Error)]
pub enum Error {
    /// The URI could not be turned into a local file path.
    #[error("uri is not a file path: {0}")]
    InvalidUri(String),
    /// The document was never opened, or was already closed.
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
}
