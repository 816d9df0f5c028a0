use gelf_core::{GelfMessage, PublisherConfig};
use gelf_publisher::{PublishError, Publisher};

use crate::*;

#[test]
fn test_blank_host_rejected() {
    for host in ["", "   "] {
        let result = Publisher::new(PublisherConfig::new(host));
        assert!(
            matches!(result, Err(PublishError::Configuration(_))),
            "host {host:?} should be rejected"
        );
    }
}

#[test]
fn test_non_numeric_port_rejected() {
    let result = Publisher::from_parts("127.0.0.1", "abc", "1420");
    assert!(matches!(result, Err(PublishError::Configuration(_))));
}

#[test]
fn test_invalid_message_sends_nothing() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(PublisherConfig::new("127.0.0.1"));

    let err = publisher
        .publish(&mut GelfMessage::new("web-1", "   "))
        .unwrap_err();
    assert!(matches!(err, PublishError::Validation { .. }));
    assert!(!publisher.is_connected());
    assert!(collector.is_silent());
}

#[test]
fn test_unresolvable_host_is_transport_error() {
    let mut publisher = Publisher::new(PublisherConfig::new("collector.invalid")).unwrap();
    let err = publisher
        .publish(&mut GelfMessage::new("web-1", "hello"))
        .unwrap_err();
    match err {
        PublishError::Transport { host, port, .. } => {
            assert_eq!(host, "collector.invalid");
            assert_eq!(port, 12201);
        }
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(!publisher.is_connected());
}

#[test]
fn test_oversized_message_rejected_before_sending() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(PublisherConfig::new("127.0.0.1").with_chunk_size(8));

    let mut msg = GelfMessage::new("web-1", "oversized");
    msg.add_field("filler", noise(8000)).unwrap();

    let err = publisher.publish(&mut msg).unwrap_err();
    assert!(matches!(err, PublishError::Framing(_)), "got {err:?}");
    assert!(!publisher.is_connected());
    assert!(collector.is_silent());
}

#[test]
fn test_publisher_recovers_after_failed_publish() {
    let collector = Collector::bind().unwrap();
    let mut publisher = collector.publisher(PublisherConfig::new("127.0.0.1"));

    assert!(publisher.publish(&mut GelfMessage::new("", "no host")).is_err());
    publisher
        .publish(&mut GelfMessage::new("web-1", "ok"))
        .unwrap();

    let messages = reassemble(&collector.recv_chunks(2).unwrap()).unwrap();
    assert_eq!(messages[0]["short_message"], serde_json::Value::from("ok"));
}
