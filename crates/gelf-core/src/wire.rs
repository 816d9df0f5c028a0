//! GELF chunked wire format: the on-wire header for every UDP datagram
//! that carries part of a message.
//!
//! These types ARE the protocol. Graylog-compatible receivers reassemble
//! chunks using exactly this layout; changing a field or its size breaks
//! every collector.
//!
//! The header is #[repr(C, packed)] for deterministic layout and uses
//! zerocopy derives for allocation-free serialization. Every field is a
//! byte or a byte array, so there is no endianness to get wrong.

use bytes::Bytes;
use static_assertions::assert_eq_size;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::group_id::GroupId;

// ── Chunk Header ─────────────────────────────────────────────────────────────

/// Prefix of every chunked GELF datagram.
///
/// A receiver groups datagrams by `group_id` and reassembles the payload
/// once `sequence_count` distinct indices have arrived.
///
/// Wire size: 12 bytes.
#[derive(Debug, Clone, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C, packed)]
pub struct ChunkHeader {
    /// Always CHUNK_MAGIC. Distinguishes a chunk from a bare
    /// zlib/gzip/plain GELF datagram.
    pub magic: [u8; 2],

    /// Identifier shared by all chunks of one message.
    pub group_id: [u8; 8],

    /// Zero-based position of this chunk within the group.
    pub sequence_index: u8,

    /// Total number of chunks in the group. Never zero.
    pub sequence_count: u8,
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(ChunkHeader, [u8; 12]);

impl ChunkHeader {
    pub fn new(group_id: GroupId, sequence_index: u8, sequence_count: u8) -> Self {
        Self {
            magic: CHUNK_MAGIC,
            group_id: *group_id.as_bytes(),
            sequence_index,
            sequence_count,
        }
    }

    /// Parse a header from the front of a received datagram.
    pub fn parse(datagram: &[u8]) -> Result<Self, WireError> {
        let header = Self::read_from_prefix(datagram)
            .ok_or(WireError::Truncated(datagram.len()))?;
        if header.magic != CHUNK_MAGIC {
            return Err(WireError::BadMagic(header.magic));
        }
        if header.sequence_count == 0 || header.sequence_index >= header.sequence_count {
            return Err(WireError::BadSequence {
                index: header.sequence_index,
                count: header.sequence_count,
            });
        }
        Ok(header)
    }
}

// ── Chunk ────────────────────────────────────────────────────────────────────

/// One framed fragment of a compressed message, ready to be sent as a
/// single datagram.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub data: Bytes,
}

impl Chunk {
    pub fn group_id(&self) -> GroupId {
        GroupId::from_bytes(self.header.group_id)
    }

    pub fn index(&self) -> u8 {
        self.header.sequence_index
    }

    pub fn count(&self) -> u8 {
        self.header.sequence_count
    }

    /// Header plus payload, the exact bytes of the datagram.
    pub fn to_datagram(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CHUNK_HEADER_LEN + self.data.len());
        out.extend_from_slice(self.header.as_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

// ── Constants ─────────────────────────────────────────────────────────────────

/// First two bytes of every chunked datagram.
pub const CHUNK_MAGIC: [u8; 2] = [0x1e, 0x0f];

/// Size of ChunkHeader on the wire.
pub const CHUNK_HEADER_LEN: usize = 12;

/// The sequence count is a single byte.
pub const MAX_CHUNKS: usize = u8::MAX as usize;

/// GELF protocol version stamped on every published message.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Default collector port.
pub const DEFAULT_PORT: u16 = 12201;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when interpreting wire-format data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("datagram of {0} bytes is shorter than a chunk header")]
    Truncated(usize),

    #[error("bad chunk magic: {:02x}{:02x}", .0[0], .0[1])]
    BadMagic([u8; 2]),

    #[error("sequence index {index} out of range for count {count}")]
    BadSequence { index: u8, count: u8 },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
