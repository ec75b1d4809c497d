//! Property-based tests for window sizing and step accounting.
//!
//! Uses proptest to verify the invariants the streaming layer relies on:
//! valid window sizes for any sane configuration, a fractional step counter
//! that never leaves `[0, 1)`, and a strictly non-mutating no-op step.

use lento_core::{RealFft, StretchEngine, window_size_for};
use proptest::prelude::*;

/// Whether `n` factors into 2s, 3s and 5s only.
fn is_five_smooth(mut n: usize) -> bool {
    for factor in [2usize, 3, 5] {
        while n > 1 && n % factor == 0 {
            n /= factor;
        }
    }
    n == 1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// For any window duration and sample rate, the selected size is even,
    /// at least 16, 5-smooth, and minimal among qualifying sizes.
    #[test]
    fn window_size_is_even_bounded_and_five_smooth(
        seconds in 0.0001f64..2.0,
        sample_rate in 1_000u32..192_000,
    ) {
        let size = window_size_for(seconds, sample_rate);
        prop_assert!(size >= 16);
        prop_assert_eq!(size % 2, 0);
        prop_assert!(is_five_smooth(size), "{} is not 5-smooth", size);

        let raw = ((seconds * f64::from(sample_rate)).floor() as usize).max(16);
        prop_assert!(size >= raw);
        let mut candidate = raw + (raw % 2);
        while candidate < size {
            prop_assert!(
                !is_five_smooth(candidate),
                "{} qualifies but {} was returned",
                candidate,
                size
            );
            candidate += 2;
        }
    }

    /// The fractional step remainder stays in [0, 1) across any sequence of
    /// completed steps at any legal stretch amount.
    #[test]
    fn step_remainder_stays_in_unit_interval(
        stretch in 0.5f64..32.0,
        extra in 0usize..200,
        steps in 1usize..12,
    ) {
        let mut engine = StretchEngine::new(0.016, 1000);
        let mut fft = RealFft::new(engine.window_size());
        for i in 0..engine.window_size() + extra {
            engine.feed((i as f32 * 0.37).sin());
        }

        for _ in 0..steps {
            engine.feed_until_ready(0.0);
            engine.step(stretch, &mut fft);
            let remainder = engine.step_remainder();
            prop_assert!(
                (0.0..1.0).contains(&remainder),
                "remainder {} escaped [0, 1)",
                remainder
            );
        }
    }

    /// A step on an engine without a full window queued changes nothing:
    /// not the queue, not the remainder, not the output.
    #[test]
    fn unready_step_never_mutates(
        fill in 0usize..16,
        stretch in 0.5f64..32.0,
    ) {
        let mut engine = StretchEngine::new(0.016, 1000);
        let mut fft = RealFft::new(engine.window_size());
        for i in 0..fill {
            engine.feed(i as f32 * 0.01);
        }

        let queued = engine.buffered_samples();
        let remainder = engine.step_remainder();
        let output = engine.output().to_vec();

        let rendered = engine.step(stretch, &mut fft).to_vec();

        prop_assert_eq!(rendered, output);
        prop_assert_eq!(engine.buffered_samples(), queued);
        prop_assert_eq!(engine.step_remainder(), remainder);
    }

    /// Draining arithmetic: 0 for an empty queue, ceil(L / step_size)
    /// otherwise.
    #[test]
    fn final_steps_required_is_the_ceiling(
        queued in 0usize..400,
        stretch in 0.5f64..32.0,
    ) {
        let mut engine = StretchEngine::new(0.016, 1000);
        for _ in 0..queued {
            engine.feed(0.0);
        }

        let required = engine.final_steps_required(stretch);
        if queued == 0 {
            prop_assert_eq!(required, 0);
        } else {
            let step_size = engine.window_size() as f64 / 2.0 / stretch;
            let expected = (queued as f64 / step_size).ceil() as usize;
            prop_assert_eq!(required, expected);
        }
    }
}
