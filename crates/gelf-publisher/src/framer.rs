//! Chunk framing: split a compressed payload into GELF chunks.
//!
//! Payloads larger than the chunk size are cut into fixed-width pieces.
//! Payloads that fit are, by default, still cut into two halves; see
//! `SmallPayloadPolicy` for why.

use bytes::Bytes;

use gelf_core::config::SmallPayloadPolicy;
use gelf_core::wire::{Chunk, ChunkHeader, MAX_CHUNKS};
use gelf_core::GroupId;

/// How a payload of a given length will be cut. Decided once per publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPlan {
    /// Consecutive pieces of `chunk_size` bytes, the last possibly shorter.
    Fixed { chunk_size: usize },
    /// Two pieces: `len / 2` bytes, then the remainder.
    Halves,
    /// The payload as a single piece.
    Whole,
}

impl ChunkPlan {
    /// Number of pieces this plan produces for a payload of `len` bytes.
    pub fn piece_count(self, len: usize) -> usize {
        match self {
            ChunkPlan::Fixed { chunk_size } => len.div_ceil(chunk_size),
            ChunkPlan::Halves => 2,
            ChunkPlan::Whole => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Framer {
    chunk_size: usize,
    small_payload: SmallPayloadPolicy,
}

impl Framer {
    pub fn new(chunk_size: usize, small_payload: SmallPayloadPolicy) -> Result<Self, FramingError> {
        if chunk_size == 0 {
            return Err(FramingError::InvalidChunkSize);
        }
        Ok(Self {
            chunk_size,
            small_payload,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn plan(&self, len: usize) -> ChunkPlan {
        if len > self.chunk_size {
            return ChunkPlan::Fixed {
                chunk_size: self.chunk_size,
            };
        }
        match self.small_payload {
            SmallPayloadPolicy::SplitInTwo => ChunkPlan::Halves,
            SmallPayloadPolicy::SendWhole => ChunkPlan::Whole,
        }
    }

    /// Cut `payload` into chunks that all carry `group_id`.
    pub fn frame(&self, payload: &Bytes, group_id: GroupId) -> Result<Vec<Chunk>, FramingError> {
        self.frame_with(self.plan(payload.len()), payload, group_id)
    }

    fn frame_with(
        &self,
        plan: ChunkPlan,
        payload: &Bytes,
        group_id: GroupId,
    ) -> Result<Vec<Chunk>, FramingError> {
        if payload.is_empty() {
            return Err(FramingError::EmptyPiece);
        }

        let count = plan.piece_count(payload.len());
        if count > MAX_CHUNKS {
            return Err(FramingError::TooManyChunks {
                needed: count,
                payload_len: payload.len(),
            });
        }

        let pieces: Vec<Bytes> = match plan {
            ChunkPlan::Fixed { chunk_size } => (0..payload.len())
                .step_by(chunk_size)
                .map(|start| payload.slice(start..(start + chunk_size).min(payload.len())))
                .collect(),
            ChunkPlan::Halves => {
                let mid = payload.len() / 2;
                vec![payload.slice(..mid), payload.slice(mid..)]
            }
            ChunkPlan::Whole => vec![payload.clone()],
        };

        if pieces.iter().any(Bytes::is_empty) {
            return Err(FramingError::EmptyPiece);
        }

        // count <= MAX_CHUNKS was checked above.
        let count = count as u8;
        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(index, data)| Chunk {
                header: ChunkHeader::new(group_id, index as u8, count),
                data,
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("payload would produce an empty chunk")]
    EmptyPiece,

    #[error("payload of {payload_len} bytes needs {needed} chunks, protocol limit is {}", MAX_CHUNKS)]
    TooManyChunks { needed: usize, payload_len: usize },
}
