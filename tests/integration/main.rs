//! GELF publisher integration test harness.
//!
//! Tests publish through a real UDP socket to a collector bound on
//! loopback, then reassemble the received chunks the way a GELF receiver
//! does. No root or network setup is required.
//!
//!   cargo test --test integration

use std::collections::BTreeMap;
use std::io::Read;
use std::net::UdpSocket;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flate2::read::ZlibDecoder;
use serde_json::{Map, Value};

use gelf_core::wire::{ChunkHeader, CHUNK_HEADER_LEN};
use gelf_core::{GroupId, PublisherConfig};
use gelf_publisher::Publisher;

mod failures;
mod publishing;

// ── Harness ───────────────────────────────────────────────────────────────────

/// One received chunk.
#[derive(Debug, Clone)]
pub struct Received {
    pub header: ChunkHeader,
    pub data: Vec<u8>,
}

impl Received {
    pub fn group_id(&self) -> GroupId {
        GroupId::from_bytes(self.header.group_id)
    }
}

/// A loopback UDP receiver standing in for a GELF collector.
pub struct Collector {
    socket: UdpSocket,
}

impl Collector {
    pub fn bind() -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").context("failed to bind collector")?;
        socket.set_read_timeout(Some(Duration::from_millis(500)))?;
        Ok(Self { socket })
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// A publisher aimed at this collector with pacing disabled.
    pub fn publisher(&self, config: PublisherConfig) -> Publisher {
        let config = config
            .with_port(self.port())
            .with_pacing(Duration::ZERO);
        Publisher::new(config).expect("valid test config")
    }

    /// Receive exactly `n` chunks, in arrival order.
    pub fn recv_chunks(&self, n: usize) -> Result<Vec<Received>> {
        let mut buf = vec![0u8; 65536];
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let (len, _) = self
                .socket
                .recv_from(&mut buf)
                .with_context(|| format!("timed out after {} of {n} chunks", out.len()))?;
            let header = ChunkHeader::parse(&buf[..len])?;
            out.push(Received {
                header,
                data: buf[CHUNK_HEADER_LEN..len].to_vec(),
            });
        }
        Ok(out)
    }

    /// True if nothing arrives within the read timeout.
    pub fn is_silent(&self) -> bool {
        let mut buf = [0u8; 64];
        self.socket.recv_from(&mut buf).is_err()
    }
}

/// Random-looking text that zlib cannot shrink much.
pub fn noise(len: usize) -> String {
    let mut state = 0x9e37_79b9_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            char::from(b'a' + (state % 26) as u8)
        })
        .collect()
}

/// Group chunks by id and rebuild each message's JSON, in first-seen order.
pub fn reassemble(chunks: &[Received]) -> Result<Vec<Map<String, Value>>> {
    let mut order: Vec<GroupId> = Vec::new();
    let mut groups: BTreeMap<[u8; 8], BTreeMap<u8, &Received>> = BTreeMap::new();

    for chunk in chunks {
        let id = chunk.group_id();
        if !order.contains(&id) {
            order.push(id);
        }
        let slots = groups.entry(*id.as_bytes()).or_default();
        if slots.insert(chunk.header.sequence_index, chunk).is_some() {
            bail!("duplicate chunk {} in group {id}", chunk.header.sequence_index);
        }
    }

    let mut messages = Vec::new();
    for id in order {
        let slots = &groups[id.as_bytes()];
        let count = slots.values().next().map(|c| c.header.sequence_count).unwrap_or(0);
        if slots.len() != count as usize {
            bail!("group {id} incomplete: {} of {count} chunks", slots.len());
        }
        let compressed: Vec<u8> = slots.values().flat_map(|c| c.data.iter().copied()).collect();
        let mut json = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut json)
            .with_context(|| format!("group {id} did not inflate"))?;
        messages.push(serde_json::from_slice(&json)?);
    }
    Ok(messages)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_collector_binds_loopback() {
    let collector = Collector::bind().expect("collector should bind");
    assert_ne!(collector.port(), 0);
    assert!(collector.is_silent(), "nothing has been published yet");
}
