//! Criterion benchmarks for the hidlink wire codec.
//!
//! The command path runs lock-step with a 2-second reply window, so encoding
//! cost is irrelevant there; the interesting numbers are on the monitor
//! path, where the appliance streams hardware reports continuously and every
//! datagram goes through `parse_report`.
//!
//! Run with:
//! ```bash
//! cargo bench --package hidlink-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hidlink_core::{
    parse_report, CommandId, KeyboardState, MouseState, PacketHeader, HidKey,
};

fn make_header() -> PacketHeader {
    PacketHeader {
        identity: 0x3E4A_9C21,
        nonce: 0x1234_5678,
        sequence: 42,
        command: CommandId::MouseMove as u32,
    }
}

fn make_report_bytes() -> [u8; 20] {
    let mut bytes = [0u8; 20];
    bytes[0] = 1;
    bytes[1] = 0x01;
    bytes[2..4].copy_from_slice(&10i16.to_le_bytes());
    bytes[4..6].copy_from_slice(&(-7i16).to_le_bytes());
    bytes[8] = 2;
    bytes[9] = 0xE1;
    bytes[10] = 0x04;
    bytes
}

fn bench_header(c: &mut Criterion) {
    let header = make_header();
    let bytes = header.to_bytes();

    let mut group = c.benchmark_group("header");
    group.bench_function("encode", |b| b.iter(|| black_box(&header).to_bytes()));
    group.bench_function("parse", |b| {
        b.iter(|| PacketHeader::parse(black_box(&bytes)).expect("parse must succeed"))
    });
    group.finish();
}

fn bench_report_decode(c: &mut Criterion) {
    let bytes = make_report_bytes();

    c.bench_function("parse_report", |b| {
        b.iter(|| parse_report(black_box(&bytes)).expect("decode must succeed"))
    });
}

fn bench_payload_encode(c: &mut Criterion) {
    let mut mouse = MouseState::default();
    mouse.x = 150;
    mouse.y = -150;
    let mut keyboard = KeyboardState::default();
    keyboard.press(HidKey::LeftShift);
    keyboard.press(HidKey::KeyA);

    let mut group = c.benchmark_group("payload");
    group.bench_function("mouse", |b| b.iter(|| black_box(&mouse).to_payload()));
    group.bench_function("keyboard", |b| b.iter(|| black_box(&keyboard).to_payload()));
    group.finish();
}

criterion_group!(benches, bench_header, bench_report_decode, bench_payload_encode);
criterion_main!(benches);
