//! gelf-publisher: sends GELF messages to a collector as chunked UDP
//! datagrams.
//!
//! ```no_run
//! use gelf_core::{GelfMessage, Level, PublisherConfig};
//! use gelf_publisher::Publisher;
//!
//! let mut publisher = Publisher::new(PublisherConfig::new("graylog.local"))?;
//! let mut msg = GelfMessage::new("web-1", "cache warmed").with_level(Level::Notice);
//! publisher.publish(&mut msg)?;
//! # Ok::<(), gelf_publisher::PublishError>(())
//! ```

pub mod error;
pub mod framer;
pub mod publisher;
pub mod transport;

pub use error::PublishError;
pub use framer::{ChunkPlan, Framer, FramingError};
pub use publisher::Publisher;
pub use transport::{Connect, Transport, UdpConnector, UdpTransport};
