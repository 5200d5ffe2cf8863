//! Criterion benchmarks for annuli-core primitives
//!
//! Run with: cargo bench -p annuli-core
#![allow(missing_docs)]

use annuli_core::{
    EnvelopeFollower, FrameQueue, MonoFrame, SampleRateConverter, SchmittTrigger, StereoFrame,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const ENGINE_RATE: f32 = 48000.0;
const HOST_RATES: &[f32] = &[44100.0, 48000.0, 96000.0];
const BLOCK: usize = 24;

fn generate_test_signal(size: usize, sample_rate: f32) -> Vec<MonoFrame> {
    (0..size)
        .map(|i| {
            let t = i as f32 / sample_rate;
            MonoFrame::mono((2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5)
        })
        .collect()
}

fn bench_input_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("SampleRateConverter/input");

    for &host_rate in HOST_RATES {
        let input = generate_test_signal(128, host_rate);
        let ratio = ENGINE_RATE / host_rate;

        group.bench_with_input(
            BenchmarkId::new("block", host_rate as u32),
            &host_rate,
            |b, _| {
                let mut src = SampleRateConverter::<1>::new();
                let mut block = [MonoFrame::SILENCE; BLOCK];
                b.iter(|| black_box(src.process(black_box(&input), &mut block, ratio)));
            },
        );
    }

    group.finish();
}

fn bench_output_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("SampleRateConverter/output");
    let block = [StereoFrame::stereo(0.6, -0.3); BLOCK];

    for &host_rate in HOST_RATES {
        let ratio = host_rate / ENGINE_RATE;

        group.bench_with_input(
            BenchmarkId::new("block", host_rate as u32),
            &host_rate,
            |b, _| {
                let mut src = SampleRateConverter::<2>::new();
                let mut out = [StereoFrame::SILENCE; 64];
                b.iter(|| black_box(src.process(black_box(&block), &mut out, ratio)));
            },
        );
    }

    group.finish();
}

fn bench_frame_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("FrameQueue");

    group.bench_function("push_advance", |b| {
        let mut queue: FrameQueue<MonoFrame, 256> = FrameQueue::new();
        b.iter(|| {
            for i in 0..BLOCK {
                queue.push(black_box(MonoFrame::mono(i as f32)));
            }
            queue.advance(BLOCK);
        });
    });

    group.bench_function("commit_pop", |b| {
        let mut queue: FrameQueue<StereoFrame, 256> = FrameQueue::new();
        b.iter(|| {
            for slot in queue.write_window().iter_mut().take(BLOCK) {
                *slot = StereoFrame::stereo(0.1, 0.2);
            }
            queue.commit(BLOCK);
            while let Some(frame) = queue.pop() {
                black_box(frame);
            }
        });
    });

    group.finish();
}

fn bench_control(c: &mut Criterion) {
    let mut group = c.benchmark_group("Control");

    group.bench_function("schmitt_trigger", |b| {
        let mut trig = SchmittTrigger::default();
        let mut v = 0.0f32;
        b.iter(|| {
            v = if v > 0.5 { 0.0 } else { 1.0 };
            black_box(trig.process(black_box(v)))
        });
    });

    group.bench_function("envelope_follower", |b| {
        let mut env = EnvelopeFollower::with_times(ENGINE_RATE, 0.5, 20.0);
        let input = generate_test_signal(BLOCK, ENGINE_RATE);
        b.iter(|| {
            for frame in &input {
                black_box(env.process(black_box(frame.samples[0])));
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_input_conversion,
    bench_output_conversion,
    bench_frame_queue,
    bench_control,
);

criterion_main!(benches);
