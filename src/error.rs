//! Library-level error type.
//!
//! `detect`/`detect_all` are infallible per §7: they always resolve to one
//! of the three observable outcomes. The only fallible operations are
//! loading an external model/confusion artifact and the CLI's file I/O,
//! both represented here as distinct variants so callers can match on
//! failure mode instead of string-sniffing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to read model artifact at {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    ModelFormat(String),

    #[error("failed to read input file {path}: {source}")]
    InputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown encoding era '{0}'")]
    UnknownEra(String),
}

pub type DetectResult<T> = Result<T, DetectError>;
