//! Chunk group identifiers.
//!
//! Every published message gets a fresh 8-byte id that all of its chunks
//! carry. The receiver uses it to correlate chunks, so two messages in
//! flight must never share one.
//!
//!   group_id = BLAKE3(nanos_since_epoch || random_u64)[..8]

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

/// Identifier shared by all chunks of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId([u8; 8]);

impl GroupId {
    /// Generate a fresh id from the current time and a random integer.
    pub fn generate() -> Self {
        // A clock before the epoch only weakens the token; the random half
        // still makes it unique.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let mut token = [0u8; 24];
        token[..16].copy_from_slice(&nanos.to_be_bytes());
        token[16..].copy_from_slice(&rand::thread_rng().next_u64().to_be_bytes());
        Self::from_token(&token)
    }

    /// Derive an id deterministically from an arbitrary token.
    pub fn from_token(token: &[u8]) -> Self {
        let digest = blake3::hash(token);
        let mut id = [0u8; 8];
        id.copy_from_slice(&digest.as_bytes()[..8]);
        Self(id)
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
