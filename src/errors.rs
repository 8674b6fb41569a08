use std::io;
use std::str;

use thiserror::Error;

/// Possible errors that arise from attempting to convert `.osr` bytes into a
/// decoded [`Replay`](crate::Replay), or vice-versa.
#[derive(Debug, Error)]
pub enum OsrError {
    #[error("input truncated: needed {needed} byte(s) at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },

    #[error("string marker {0:#04x} is invalid and not supported")]
    InvalidStringMarker(u8),

    #[error("variable-length integer exceeds 64 bits")]
    InvalidVarint,

    #[error("invalid text encoding: {0}")]
    InvalidTextEncoding(#[from] str::Utf8Error),

    #[error("could not decompress frame data: {0}")]
    Decompression(#[from] lzma_rs::error::Error),

    #[error("malformed life bar entry `{0}`")]
    MalformedTimelineEntry(String),

    #[error("malformed frame `{0}`")]
    MalformedFrame(String),

    #[error("malformed action header `{0}`")]
    MalformedActionHeader(String),

    #[error("{0}")]
    Io(#[from] io::Error),
}
