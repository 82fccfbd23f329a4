use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced by the file, process and system tools
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request, rejected before touching the OS
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The executable could not be started; `program` is the file that was launched
    #[error("failed to execute `{program}`{}: {source}", in_directory(.directory.as_deref()))]
    Spawn {
        program: String,
        directory: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The wait for a child process did not complete
    #[error("interrupted while waiting for `{0}` to exit")]
    Interrupted(String),
}

/// Coarse classification used by the surfaces to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Io,
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Spawn { .. } | Error::Io { .. } => ErrorKind::Io,
            Error::Interrupted(_) => ErrorKind::Interrupted,
        }
    }

    /// True when the underlying I/O error is `NotFound`
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Spawn { source, .. } | Error::Io { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

fn in_directory(directory: Option<&Path>) -> String {
    match directory {
        Some(dir) => format!(" in `{}`", dir.display()),
        None => String::new(),
    }
}
