use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The tool exited with a code outside the command's accepted set
    #[error("{message}")]
    Execution {
        command: String,
        code: i32,
        message: String,
    },

    /// An item did not converge before its timeout elapsed
    #[error("{0}")]
    Timeout(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("failed to read settings from {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings in {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("polling task ended without a result: {0}")]
    Coordinator(String),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Exit code of a failed execution, if this is one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Execution { code, .. } => Some(*code),
            _ => None,
        }
    }
}
