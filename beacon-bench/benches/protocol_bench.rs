//! Codec and framing benchmarks.

use beacon_protocol::v1::V1Codec;
use beacon_protocol::{
    Batch, BatchOption, Decoder, Encoder, Event, Frame, MessageKind, Metric, WireCodec,
};
use bytes::{Bytes, BytesMut};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn sample_metric() -> Metric {
    Metric::empty()
        .with_proc("collectd")
        .with_time(1456)
        .with_key("cpu.idle")
        .with_value(98.5)
        .with_host("node1")
        .tag("prod")
        .tag("eu")
        .attribute("core", "0")
}

fn sample_event() -> Event {
    Event::empty()
        .with_time(1456)
        .with_key("deploy")
        .with_state("done")
        .with_description("rollout finished")
        .with_ttl(300)
        .tag("release")
        .attribute("version", "1.4.2")
}

fn sample_batch(size: usize) -> Batch {
    let metrics = (0..size).map(|i| sample_metric().with_value(i as f64)).collect();
    let events = (0..size / 4).map(|i| sample_event().with_time(i as i64)).collect();
    Batch::new(Default::default(), events, metrics)
}

fn bench_metric_encode(c: &mut Criterion) {
    let metric = sample_metric();
    c.bench_function("metric_encode", |b| {
        b.iter(|| black_box(V1Codec.encode_metric(&metric).unwrap()));
    });
}

fn bench_metric_decode(c: &mut Criterion) {
    let encoded = V1Codec.encode_metric(&sample_metric()).unwrap().freeze();
    c.bench_function("metric_decode", |b| {
        b.iter(|| {
            let mut payload = encoded.clone();
            black_box(V1Codec.decode_metric(&mut payload).unwrap())
        });
    });
}

fn bench_event_encode(c: &mut Criterion) {
    let event = sample_event();
    c.bench_function("event_encode", |b| {
        b.iter(|| black_box(V1Codec.encode_event(&event).unwrap()));
    });
}

fn bench_batch_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_encode");

    for size in [16, 128, 1024] {
        let batch = sample_batch(size);
        let plain_len = V1Codec.encode_batch(&batch, &[]).unwrap().len();
        group.throughput(Throughput::Bytes(plain_len as u64));

        group.bench_with_input(BenchmarkId::new("plain", size), &batch, |b, batch| {
            b.iter(|| black_box(V1Codec.encode_batch(batch, &[]).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("gzip", size), &batch, |b, batch| {
            b.iter(|| {
                black_box(
                    V1Codec
                        .encode_batch(batch, &[BatchOption::CompressGzip])
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_batch_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_decode");

    for size in [16, 128, 1024] {
        let batch = sample_batch(size);
        let plain = V1Codec.encode_batch(&batch, &[]).unwrap().freeze();
        let gzipped = V1Codec
            .encode_batch(&batch, &[BatchOption::CompressGzip])
            .unwrap()
            .freeze();

        group.throughput(Throughput::Bytes(plain.len() as u64));
        group.bench_with_input(BenchmarkId::new("plain", size), &plain, |b, encoded| {
            b.iter(|| {
                let mut payload = encoded.clone();
                black_box(V1Codec.decode_batch(&mut payload).unwrap())
            });
        });
        group.bench_with_input(BenchmarkId::new("gzip", size), &gzipped, |b, encoded| {
            b.iter(|| {
                let mut payload = encoded.clone();
                black_box(V1Codec.decode_batch(&mut payload).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_frame_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");

    for size in [100, 1000, 10000] {
        let payload = Bytes::from(vec![0x5A; size]);
        let frame = Frame::new(MessageKind::Metric, payload);
        let encoded = frame.encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &frame, |b, frame| {
            b.iter(|| black_box(frame.encode().unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut buf = BytesMut::from(&encoded[..]);
                black_box(Frame::decode(&mut buf).unwrap().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_decoder_stream(c: &mut Criterion) {
    let frames: Vec<u8> = (0..32)
        .flat_map(|_| Encoder::encode_metric(&sample_metric()).unwrap())
        .collect();

    c.bench_function("decoder_stream_32", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            decoder.extend(&frames);
            let mut count = 0;
            while let Some(message) = decoder.decode_message().unwrap() {
                black_box(message);
                count += 1;
            }
            assert_eq!(count, 32);
        });
    });
}

criterion_group!(
    benches,
    bench_metric_encode,
    bench_metric_decode,
    bench_event_encode,
    bench_batch_encode,
    bench_batch_decode,
    bench_frame_roundtrip,
    bench_decoder_stream
);
criterion_main!(benches);
