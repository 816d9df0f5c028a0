//! gelf-core: wire format, message model, codec, and configuration
//! for publishing GELF messages over chunked UDP.
//! The publisher crate depends on this one.

pub mod codec;
pub mod config;
pub mod group_id;
pub mod message;
pub mod wire;

pub use config::{ChunkProfile, ConfigError, PublisherConfig, SmallPayloadPolicy};
pub use group_id::GroupId;
pub use message::{GelfMessage, GelfPayload, Level};
pub use wire::{Chunk, ChunkHeader};
