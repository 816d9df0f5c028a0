//! Publisher: validate, encode, frame, transmit.
//!
//! One `publish` call is fully synchronous: it either writes every chunk
//! of the message in index order or stops at the first chunk that fails.
//! Chunks already on the wire are not recalled; the collector drops the
//! incomplete group when its reassembly window expires.

use gelf_core::codec;
use gelf_core::wire::PROTOCOL_VERSION;
use gelf_core::{GelfPayload, GroupId, PublisherConfig};

use crate::error::PublishError;
use crate::framer::Framer;
use crate::transport::{Connect, Transport, UdpConnector};

/// Sends GELF messages to one collector.
///
/// The transport is opened on the first publish and reused until the
/// publisher is dropped. `publish` takes `&mut self`; wrap the publisher in
/// a `Mutex` (or keep one per thread) to publish from several threads.
pub struct Publisher<C: Connect = UdpConnector> {
    config: PublisherConfig,
    framer: Framer,
    connector: C,
    transport: Option<C::Transport>,
}

impl Publisher<UdpConnector> {
    /// Validate `config`. No socket is opened until the first publish.
    pub fn new(config: PublisherConfig) -> Result<Self, PublishError> {
        Self::with_connector(config, UdpConnector)
    }

    /// Construct from untyped host, port and chunk size inputs.
    pub fn from_parts(host: &str, port: &str, chunk_size: &str) -> Result<Self, PublishError> {
        Self::new(PublisherConfig::from_parts(host, port, chunk_size)?)
    }
}

impl<C: Connect> Publisher<C> {
    pub fn with_connector(config: PublisherConfig, connector: C) -> Result<Self, PublishError> {
        config.validate()?;
        let framer = Framer::new(config.chunk_size, config.small_payload)?;
        Ok(Self {
            config,
            framer,
            connector,
            transport: None,
        })
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Publish one message.
    ///
    /// Stamps the protocol version on `message`. Fails before any network
    /// activity if required fields are missing or the payload cannot be
    /// framed.
    pub fn publish<M: GelfPayload + ?Sized>(&mut self, message: &mut M) -> Result<(), PublishError> {
        if !message.has_required_fields() {
            return Err(PublishError::Validation {
                missing: message.missing_fields(),
            });
        }
        message.set_protocol_version(PROTOCOL_VERSION);

        let payload = codec::prepare(message)?;
        let plan = self.framer.plan(payload.len());
        let group_id = GroupId::generate();
        let chunks = self.framer.frame(&payload, group_id)?;
        let count = chunks.len() as u8;

        let transport = self.transport()?;
        for chunk in &chunks {
            let datagram = chunk.to_datagram();
            let index = chunk.index();
            let (written, source) = match transport.write(&datagram) {
                Ok(n) if n == datagram.len() => continue,
                Ok(n) => (n, None),
                Err(e) => {
                    tracing::debug!(%group_id, index, error = %e, "chunk write error");
                    (0, Some(e))
                }
            };
            tracing::warn!(
                %group_id,
                index,
                count,
                written,
                expected = datagram.len(),
                "chunk write failed, aborting message"
            );
            return Err(PublishError::Transmission {
                group_id,
                index,
                count,
                written,
                source,
            });
        }

        tracing::debug!(
            %group_id,
            ?plan,
            chunks = count,
            payload_len = payload.len(),
            "message published"
        );

        std::thread::sleep(self.config.pacing());
        Ok(())
    }

    /// The cached transport, connecting on first use. A failed connect is
    /// not cached, so the next publish tries again.
    fn transport(&mut self) -> Result<&mut C::Transport, PublishError> {
        let transport = match self.transport.take() {
            Some(t) => t,
            None => self
                .connector
                .connect(&self.config.host, self.config.port)
                .map_err(|source| {
                    tracing::warn!(
                        host = %self.config.host,
                        port = self.config.port,
                        error = %source,
                        "failed to open gelf transport"
                    );
                    PublishError::Transport {
                        host: self.config.host.clone(),
                        port: self.config.port,
                        source,
                    }
                })?,
        };
        Ok(self.transport.insert(transport))
    }
}
