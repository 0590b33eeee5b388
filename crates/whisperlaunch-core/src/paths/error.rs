//! Path-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while deriving the model argument.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path was expected to be absolute.
    #[error("{} is not an absolute path", .0.display())]
    NotAbsolute(PathBuf),

    /// The executable path has no parent directory to run from.
    #[error("{} has no parent directory", .0.display())]
    NoParentDirectory(PathBuf),

    /// The resolved model argument contains characters outside 7-bit ASCII.
    ///
    /// whisper-server exits without a message when handed such a path, so
    /// this is reported before anything is spawned.
    #[error(
        "model path contains non-ASCII characters: {path}\n\
         The server cannot open it. Move the model (or the server) to a folder \
         whose full path uses only English letters, digits and punctuation, \
         or rename the file."
    )]
    UnsupportedPathEncoding { path: String },
}
