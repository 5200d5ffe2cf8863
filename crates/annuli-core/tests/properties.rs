//! Property-based tests for annuli-core primitives.
//!
//! Covers trigger hysteresis, frame queue bookkeeping, and the response
//! curves using proptest for randomized input generation.

use proptest::prelude::*;
use annuli_core::{
    FrameQueue, MonoFrame, SampleRateConverter, SchmittTrigger, quadratic_bipolar,
    quartic_bipolar,
};
use std::collections::VecDeque;

/// Queue operations exercised by the model test.
#[derive(Debug, Clone)]
enum QueueOp {
    Push(f32),
    Pop,
    Advance(usize),
    Commit(usize),
}

fn queue_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        (-1.0f32..1.0).prop_map(QueueOp::Push),
        Just(QueueOp::Pop),
        (0usize..40).prop_map(QueueOp::Advance),
        (0usize..40).prop_map(QueueOp::Commit),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Each excursion from the low threshold to the high threshold fires
    /// exactly once, however many samples are spent above the high threshold.
    #[test]
    fn trigger_fires_once_per_crossing_pair(
        pulses in prop::collection::vec((1usize..20, 1usize..20), 1..20),
    ) {
        let mut trig = SchmittTrigger::new(0.0, 1.0);
        let mut fires = 0;
        for &(low_len, high_len) in &pulses {
            for _ in 0..low_len {
                if trig.process(-0.5) { fires += 1; }
            }
            for _ in 0..high_len {
                if trig.process(2.0) { fires += 1; }
            }
        }
        prop_assert_eq!(fires, pulses.len());
    }

    /// Samples strictly between the thresholds never fire or re-arm.
    #[test]
    fn trigger_ignores_values_between_thresholds(
        values in prop::collection::vec(0.01f32..0.99, 1..200),
    ) {
        let mut trig = SchmittTrigger::new(0.0, 1.0);
        trig.process(1.0);
        for &v in &values {
            prop_assert!(!trig.process(v));
        }
        prop_assert!(!trig.process(1.0), "held trigger must not fire without re-arming");
    }

    /// Under any sequence of operations the queue length stays within
    /// [0, capacity] and pushed frames come out in FIFO order.
    #[test]
    fn frame_queue_matches_model(ops in prop::collection::vec(queue_op(), 1..300)) {
        let mut queue: FrameQueue<MonoFrame, 32> = FrameQueue::new();
        let mut model: VecDeque<f32> = VecDeque::new();
        let mut next = 1000.0f32;

        for op in ops {
            match op {
                QueueOp::Push(v) => {
                    if !queue.is_full() {
                        queue.push(MonoFrame::mono(v));
                        model.push_back(v);
                    }
                }
                QueueOp::Pop => {
                    let got = queue.pop().map(|f| f.samples[0]);
                    prop_assert_eq!(got, model.pop_front());
                }
                QueueOp::Advance(n) => {
                    let n = n.min(queue.len());
                    queue.advance(n);
                    for _ in 0..n { model.pop_front(); }
                }
                QueueOp::Commit(n) => {
                    let n = {
                        let window = queue.write_window();
                        let n = n.min(window.len());
                        for slot in window.iter_mut().take(n) {
                            *slot = MonoFrame::mono(next);
                            next += 1.0;
                        }
                        n
                    };
                    queue.commit(n);
                    for i in 0..n {
                        model.push_back(next - (n - i) as f32);
                    }
                }
            }
            prop_assert!(queue.len() <= queue.capacity());
            prop_assert_eq!(queue.len(), model.len());
            let window: Vec<f32> = queue.peek().iter().map(|f| f.samples[0]).collect();
            let expected: Vec<f32> = model.iter().copied().collect();
            prop_assert_eq!(window, expected);
        }
    }

    /// Both response curves are odd and non-decreasing on [0, 1].
    #[test]
    fn response_curves_odd_and_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        prop_assert_eq!(quadratic_bipolar(-a), -quadratic_bipolar(a));
        prop_assert_eq!(quartic_bipolar(-a), -quartic_bipolar(a));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(quadratic_bipolar(lo) <= quadratic_bipolar(hi));
        prop_assert!(quartic_bipolar(lo) <= quartic_bipolar(hi));
    }

    /// Feeding a stream in arbitrary chunk sizes gives the same output as
    /// feeding it in one call.
    #[test]
    fn converter_chunking_is_transparent(
        chunks in prop::collection::vec(1usize..50, 1..20),
        ratio in 0.5f32..2.0,
    ) {
        let total: usize = chunks.iter().sum();
        let input: Vec<MonoFrame> = (0..total)
            .map(|i| MonoFrame::mono(libm::sinf(i as f32 * 0.1)))
            .collect();

        let mut whole = SampleRateConverter::<1>::new();
        let mut whole_out = vec![MonoFrame::SILENCE; total * 3];
        let (_, whole_produced) = whole.process(&input, &mut whole_out, ratio);

        let mut chunked = SampleRateConverter::<1>::new();
        let mut chunked_out = Vec::new();
        let mut offset = 0;
        for &len in &chunks {
            let mut buf = vec![MonoFrame::SILENCE; len * 3];
            let (consumed, produced) = chunked.process(&input[offset..offset + len], &mut buf, ratio);
            prop_assert_eq!(consumed, len);
            chunked_out.extend_from_slice(&buf[..produced]);
            offset += len;
        }

        prop_assert_eq!(chunked_out.len(), whole_produced);
        prop_assert_eq!(&chunked_out[..], &whole_out[..whole_produced]);
    }
}
