use std::io;

use gelf_core::codec::CodecError;
use gelf_core::{ConfigError, GroupId};

use crate::framer::FramingError;

/// Everything that can go wrong constructing a publisher or publishing.
///
/// Nothing is retried internally. Calling `publish` again after any of
/// these is safe: every call frames under a fresh group id.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid publisher configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("message is missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("failed to open transport to {host}:{port}: {source}")]
    Transport {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("chunk {index} of {count} in group {group_id} was not sent ({written} bytes written)")]
    Transmission {
        group_id: GroupId,
        index: u8,
        count: u8,
        written: usize,
        #[source]
        source: Option<io::Error>,
    },

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
