//! Integration tests for the command channel against a scripted fake
//! appliance on loopback.
//!
//! These cover the correlation rules that make request/reply work over UDP:
//! sequence numbers advance on every call (failures included), a reply is
//! accepted only when its command, sequence, and origin all match, and
//! oversized payloads are chunked wire-accurately.

mod common;

use std::time::Duration;

use common::FakeAppliance;
use hidlink_core::{CommandId, DeviceId, PacketHeader};
use hidlink_driver::net::command::{
    CommandChannel, CommandOutcome, MAX_CHUNK_PAYLOAD, MAX_DATAGRAM,
};

fn identity() -> DeviceId {
    DeviceId::from_hex("3E4A9C21").expect("test identity")
}

fn short_timeout_channel(appliance: &FakeAppliance) -> CommandChannel {
    CommandChannel::open(appliance.addr(), identity(), Duration::from_millis(200))
        .expect("channel open")
}

#[test]
fn test_matching_reply_is_accepted() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let acker = appliance.spawn_acker(1);
    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert!(outcome.accepted());
    let seen = acker.join().expect("acker");
    assert_eq!(seen[0].0.command, CommandId::Connect as u32);
    assert_eq!(seen[0].0.sequence, 1, "first call carries sequence 1");
    assert_eq!(seen[0].0.identity, 0x3E4A9C21);
    assert!(seen[0].1.is_empty());
}

#[test]
fn test_sequence_advances_across_failed_calls() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let script = std::thread::spawn(move || {
        // First command: observed but never answered.
        let (first, _, _) = appliance.recv_command();
        // Second command: acknowledged.
        let (second, _, src) = appliance.recv_command();
        appliance.ack(&second, src);
        (first.sequence, second.sequence)
    });

    let first = channel.send(CommandId::MouseMove, &[0u8; 56], None).expect("send");
    let second = channel.send(CommandId::MouseMove, &[0u8; 56], None).expect("send");

    assert_eq!(first, CommandOutcome::TimedOut);
    assert!(second.accepted());
    let (seq1, seq2) = script.join().expect("script");
    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2, "a timed-out call still burns its sequence number");
    assert_eq!(channel.last_sequence(), 2);
}

#[test]
fn test_stale_sequence_reply_is_rejected() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let script = std::thread::spawn(move || {
        let (header, _, src) = appliance.recv_command();
        // Answer as if replying to the previous call.
        let stale = PacketHeader {
            sequence: header.sequence.wrapping_sub(1),
            ..header
        };
        appliance.ack(&stale, src);
    });

    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert_eq!(outcome, CommandOutcome::Mismatched);
    script.join().expect("script");
}

#[test]
fn test_wrong_command_reply_is_rejected() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let script = std::thread::spawn(move || {
        let (header, _, src) = appliance.recv_command();
        let wrong = PacketHeader {
            command: CommandId::Reboot as u32,
            ..header
        };
        appliance.ack(&wrong, src);
    });

    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert_eq!(outcome, CommandOutcome::Mismatched);
    script.join().expect("script");
}

#[test]
fn test_reply_from_wrong_origin_is_rejected() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let intruder = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let script = std::thread::spawn(move || {
        // A perfectly-formed echo, but sent from a different socket than the
        // configured peer. It must not be attributed to the call.
        let (header, _, src) = appliance.recv_command();
        intruder.ack(&header, src);
    });

    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert_eq!(outcome, CommandOutcome::Mismatched);
    script.join().expect("script");
}

#[test]
fn test_truncated_reply_is_rejected() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let script = std::thread::spawn(move || {
        let (header, _, src) = appliance.recv_command();
        appliance.send_raw(&header.to_bytes()[..8], src);
    });

    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert_eq!(outcome, CommandOutcome::Mismatched);
    script.join().expect("script");
}

#[test]
fn test_silence_times_out() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let outcome = channel.send(CommandId::Connect, &[], None).expect("send");

    assert_eq!(outcome, CommandOutcome::TimedOut);
}

#[test]
fn test_nonce_override_reaches_the_wire() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let acker = appliance.spawn_acker(1);
    channel
        .send(CommandId::Monitor, &[], Some(0xAA55_138A))
        .expect("send");

    let seen = acker.join().expect("acker");
    assert_eq!(seen[0].0.nonce, 0xAA55_138A);
}

#[test]
fn test_default_nonce_stays_within_31_bits() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let acker = appliance.spawn_acker(3);
    for _ in 0..3 {
        channel.send(CommandId::MouseMove, &[0u8; 56], None).expect("send");
    }

    for (header, _) in acker.join().expect("acker") {
        assert!(header.nonce <= 0x7FFF_FFFF);
    }
}

#[test]
fn test_oversized_payload_is_chunked_with_a_shared_sequence() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    // A full LCD frame: 40960 bytes → ceil(40960 / 1484) = 28 datagrams.
    let frame = vec![0x5Au8; 40960];
    let outcome = channel
        .send(CommandId::ShowPicture, &frame, Some(0))
        .expect("send");
    assert!(
        outcome.accepted(),
        "multi-datagram transfers report acceptance on send success"
    );
    assert!(outcome.reply().is_empty());

    let mut datagrams = Vec::new();
    while let Some((bytes, _)) = appliance.try_recv_raw(Duration::from_millis(300)) {
        datagrams.push(bytes);
    }

    assert_eq!(datagrams.len(), 40960usize.div_ceil(MAX_CHUNK_PAYLOAD));
    let first = PacketHeader::parse(&datagrams[0]).expect("chunk header");
    for bytes in &datagrams {
        let header = PacketHeader::parse(bytes).expect("chunk header");
        assert_eq!(
            header.sequence, first.sequence,
            "every chunk shares the logical command's sequence"
        );
        assert_eq!(header.command, CommandId::ShowPicture as u32);
        assert!(bytes.len() <= MAX_DATAGRAM);
    }
    // All full-size chunks except the tail.
    for bytes in &datagrams[..datagrams.len() - 1] {
        assert_eq!(bytes.len(), MAX_DATAGRAM);
    }
    let payload_total: usize = datagrams.iter().map(|d| d.len() - 16).sum();
    assert_eq!(payload_total, 40960, "no payload byte lost or duplicated");
}

#[test]
fn test_one_byte_over_capacity_makes_two_chunks() {
    common::init_logging();
    let appliance = FakeAppliance::bind();
    let mut channel = short_timeout_channel(&appliance);

    let payload = vec![1u8; MAX_CHUNK_PAYLOAD + 1];
    channel
        .send(CommandId::ShowPicture, &payload, Some(0))
        .expect("send");

    let mut datagrams = Vec::new();
    while let Some((bytes, _)) = appliance.try_recv_raw(Duration::from_millis(300)) {
        datagrams.push(bytes);
    }

    assert_eq!(datagrams.len(), 2);
    assert_eq!(datagrams[0].len(), MAX_DATAGRAM);
    assert_eq!(datagrams[1].len(), 16 + 1);
}
