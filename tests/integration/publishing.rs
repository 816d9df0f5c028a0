use std::collections::HashSet;

use serde_json::Value;

use gelf_core::{ChunkProfile, GelfMessage, Level, PublisherConfig, SmallPayloadPolicy};

use crate::*;

fn config() -> PublisherConfig {
    PublisherConfig::new("127.0.0.1")
}

#[test]
fn test_small_message_arrives_in_two_chunks() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(config());

    let mut msg = GelfMessage::new("web-1", "user signed in").with_level(Level::Informational);
    msg.add_field("user_id", 42).unwrap();
    publisher.publish(&mut msg).unwrap();

    let chunks = collector.recv_chunks(2).unwrap();
    assert_eq!(chunks[0].group_id(), chunks[1].group_id());
    assert_eq!(chunks[0].header.sequence_count, 2);
    let halves = (chunks[0].data.len(), chunks[1].data.len());
    assert!(halves.1 == halves.0 || halves.1 == halves.0 + 1, "uneven halves {halves:?}");

    let messages = reassemble(&chunks).unwrap();
    let json = &messages[0];
    assert_eq!(json["version"], Value::from("1.0"));
    assert_eq!(json["host"], Value::from("web-1"));
    assert_eq!(json["short_message"], Value::from("user signed in"));
    assert_eq!(json["level"], Value::from(6));
    assert_eq!(json["_user_id"], Value::from(42));
    assert!(collector.is_silent());
}

#[test]
fn test_large_message_split_at_wan_chunk_size() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(config().with_profile(ChunkProfile::Wan));

    let body = noise(8000);
    let mut msg = GelfMessage::new("batch-7", "report generated").with_full_message(body.clone());
    publisher.publish(&mut msg).unwrap();

    let compressed_len = gelf_core::codec::prepare(&msg).unwrap().len();
    let expected = compressed_len.div_ceil(1420);
    assert!(expected > 2);

    let chunks = collector.recv_chunks(expected).unwrap();
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.header.sequence_index as usize, i);
        assert_eq!(chunk.header.sequence_count as usize, expected);
        if i + 1 < expected {
            assert_eq!(chunk.data.len(), 1420);
        }
    }

    let messages = reassemble(&chunks).unwrap();
    assert_eq!(messages[0]["full_message"], Value::from(body));
}

#[test]
fn test_lan_profile_uses_fewer_chunks() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(config().with_profile(ChunkProfile::Lan));

    let mut msg = GelfMessage::new("batch-7", "big").with_full_message(noise(20_000));
    publisher.publish(&mut msg).unwrap();

    let compressed_len = gelf_core::codec::prepare(&msg).unwrap().len();
    let expected = compressed_len.div_ceil(8154);
    let chunks = collector.recv_chunks(expected).unwrap();
    assert!(expected < compressed_len.div_ceil(1420));
    assert_eq!(reassemble(&chunks).unwrap().len(), 1);
}

#[test]
fn test_send_whole_policy_sends_single_datagram() {
    let collector = Collector::bind().unwrap();
    let mut publisher =
        collector.publisher(config().with_small_payload(SmallPayloadPolicy::SendWhole));

    publisher
        .publish(&mut GelfMessage::new("web-1", "tiny"))
        .unwrap();

    let chunks = collector.recv_chunks(1).unwrap();
    assert_eq!(chunks[0].header.sequence_count, 1);
    assert_eq!(reassemble(&chunks).unwrap()[0]["short_message"], Value::from("tiny"));
    assert!(collector.is_silent());
}

#[test]
fn test_identical_messages_get_distinct_groups() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(config());

    for _ in 0..10 {
        publisher
            .publish(&mut GelfMessage::new("web-1", "heartbeat"))
            .unwrap();
    }

    let chunks = collector.recv_chunks(20).unwrap();
    let ids: HashSet<_> = chunks.iter().map(Received::group_id).collect();
    assert_eq!(ids.len(), 10);

    let messages = reassemble(&chunks).unwrap();
    assert_eq!(messages.len(), 10);
    assert!(messages
        .iter()
        .all(|m| m["short_message"] == Value::from("heartbeat")));
}

#[test]
fn test_default_pacing_still_delivers() {
    let collector = Collector::bind().unwrap();
    let config = config().with_port(collector.port());
    let mut publisher = gelf_publisher::Publisher::new(config).unwrap();

    for i in 0..5 {
        publisher
            .publish(&mut GelfMessage::new("web-1", format!("tick {i}")))
            .unwrap();
    }
    let messages = reassemble(&collector.recv_chunks(10).unwrap()).unwrap();
    let texts: Vec<_> = messages
        .iter()
        .map(|m| m["short_message"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(texts, vec!["tick 0", "tick 1", "tick 2", "tick 3", "tick 4"]);
}
