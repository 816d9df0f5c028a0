//! Payload codec: JSON, then zlib.
//!
//! Collectors detect zlib by its 0x78 header byte, so this must be the
//! RFC 1950 stream format, not raw deflate or gzip.

use std::io::Write;

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::message::GelfPayload;

/// Serialize the message's field map and compress it.
pub fn prepare<M: GelfPayload + ?Sized>(message: &M) -> Result<Bytes, CodecError> {
    let json = serde_json::to_vec(&message.to_map()).map_err(CodecError::Serialize)?;
    compress(&json)
}

/// zlib-compress an arbitrary byte sequence.
pub fn compress(data: &[u8]) -> Result<Bytes, CodecError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data).map_err(CodecError::Compress)?;
    let out = encoder.finish().map_err(CodecError::Compress)?;
    Ok(Bytes::from(out))
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to serialize message: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to compress message: {0}")]
    Compress(std::io::Error),
}
