//! Error types for reading map containers and their entity text.

use serde::Serialize;
use std::io;
use thiserror::Error;

/// Everything that can go wrong while reading one map file.
///
/// Every variant is fatal for the file it came from but never for a
/// multi-file scan: the scanner records the failure and moves on.
#[derive(Debug, Error)]
pub enum MapError {
    /// The file could not be opened or mapped.
    #[error("Could not open file for reading: {0}")]
    Open(#[from] io::Error),

    /// The file ended before the fixed-size header was complete.
    #[error("Truncated header: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    /// The version field is not one of the supported BSP versions.
    #[error("Unexpected BSP version: {0}")]
    UnsupportedVersion(i32),

    /// A lump points outside the file.
    #[error("Lump {lump} out of bounds: offset {offset}, length {length}, file is {file_len} bytes")]
    LumpOutOfBounds {
        lump: &'static str,
        offset: i32,
        length: i32,
        file_len: usize,
    },

    /// Neither the entity lump nor the planes lump starts with entity text.
    #[error("Unexpected BSP format: no entity data found")]
    UnexpectedFormat,

    /// A quoted key was not followed by a quoted value, or a token never closed.
    #[error("Unexpected entity data at byte {offset} near {raw}")]
    Token { offset: usize, raw: String },
}

/// Coarse classification of a [`MapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Open,
    Format,
    Token,
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Open(_) => ErrorKind::Open,
            MapError::TruncatedHeader { .. }
            | MapError::UnsupportedVersion(_)
            | MapError::LumpOutOfBounds { .. }
            | MapError::UnexpectedFormat => ErrorKind::Format,
            MapError::Token { .. } => ErrorKind::Token,
        }
    }
}

/// Result alias used throughout the map reading code.
pub type Result<T> = std::result::Result<T, MapError>;
