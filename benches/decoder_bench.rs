//! Performance benchmarks for the frame decoder and encoder.
//!
//! The decoder runs once per poll and the encoder once per write, so these
//! mostly guard against accidental regressions in the bit loops.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench decoder_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wiegand_core::Payload24;
use wiegand_protocol::{BitSnapshot, FrameDecoder, Wiegand26, cast_hex_as_dec};

/// Benchmark decoding complete 26-bit frames, with and without parity checks.
fn bench_decode_data_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_data_frame");
    group.throughput(Throughput::Elements(1));

    let raw = Wiegand26::new(Payload24::new(10_000_123).unwrap()).raw();
    let snapshot = BitSnapshot::new(raw, 26);

    for verify in [false, true] {
        group.bench_with_input(
            BenchmarkId::new("verify_parity", verify),
            &verify,
            |b, &verify| {
                let mut decoder = FrameDecoder::new(26, 10).with_parity_check(verify);
                b.iter(|| black_box(decoder.decode(black_box(snapshot))));
            },
        );
    }

    group.finish();
}

/// Benchmark framing a payload and walking its 26 wire bits.
fn bench_encode_wiegand26(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_wiegand26");
    group.throughput(Throughput::Elements(1));

    let payload = Payload24::new(0xAB_CDEF).unwrap();

    group.bench_function("frame_and_bits", |b| {
        b.iter(|| {
            let frame = Wiegand26::new(black_box(payload));
            let ones = frame.bits().filter(|bit| bit.as_u64() == 1).count();
            black_box(ones);
        });
    });

    group.finish();
}

/// Benchmark the hex-as-decimal transform across input widths.
fn bench_hex_as_dec(c: &mut Criterion) {
    let mut group = c.benchmark_group("hex_as_dec");

    for value in [0x12u64, 0x1234, 0x1234_5678, 0xFFFF_FFFF_FFFF] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{value:#x}")), &value, |b, &v| {
            b.iter(|| black_box(cast_hex_as_dec(black_box(v))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_data_frame,
    bench_encode_wiegand26,
    bench_hex_as_dec
);
criterion_main!(benches);
