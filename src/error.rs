use std::io;
use std::path::PathBuf;

use camino::Utf8PathBuf;

/// Error types for the logsanitizer library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file or directory to process does not exist.
    #[error("path does not exist: {path}")]
    NotFound { path: Utf8PathBuf },

    /// A file could not be opened or read.
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be created or written.
    #[error("failed to write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Streaming a file through the sanitizer failed part way.
    #[error("failed to sanitize {path}")]
    Sanitize {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// A path found while walking a directory is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Directory traversal failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// The address patterns could not be compiled.
    #[error(transparent)]
    Pattern(#[from] ip_redact::BuildError),

    /// The worker pool could not be started.
    #[error("failed to start worker threads")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An I/O error on stdin or stdout.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
