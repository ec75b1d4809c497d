//! Analysis window weights and window sizing.
//!
//! Paulstretch tapers each analysis block twice with the same window: once
//! before the spectral pass and once after, so two half-overlapped blocks
//! cross-fade smoothly. The shape is `(1 - x^2)^1.25` over `x in [-1, 1]`,
//! steeper than a Hann window at the edges, which keeps the block-edge
//! discontinuities introduced by phase randomization from becoming audible.

use crate::buffer::SampleBuffer;

/// Smallest window the engine will operate on.
const MIN_WINDOW_SAMPLES: usize = 16;

/// Precomputed tapering weights for one analysis window size.
///
/// Regenerated whenever the window size changes, never mutated afterwards.
#[derive(Clone, Debug)]
pub struct WindowShape {
    weights: SampleBuffer,
}

impl WindowShape {
    /// Build the `(1 - x^2)^1.25` weights for a window of `len` samples,
    /// with `x` spanning `[-1, 1]` across the window.
    pub fn new(len: usize) -> Self {
        let mut weights = SampleBuffer::new(len);
        weights.linspace(-1.0, 1.0);
        weights.apply(|x| x * x);
        weights.scale(-1.0);
        weights.offset(1.0);
        weights.apply(|x| x.powf(1.25));
        Self { weights }
    }

    /// Number of weights, equal to the window size.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The weights as a buffer, for elementwise application.
    pub fn weights(&self) -> &SampleBuffer {
        &self.weights
    }
}

/// Select the analysis window size for a requested duration.
///
/// Returns the smallest even integer that is at least
/// `max(16, floor(seconds * sample_rate))` and whose only prime factors are
/// 2, 3 and 5. The 5-smooth guarantee keeps the FFT backend on its fast
/// mixed-radix paths.
pub fn window_size_for(seconds: f64, sample_rate: u32) -> usize {
    let raw = (seconds * f64::from(sample_rate)).floor();
    let raw = if raw.is_finite() && raw > 0.0 {
        raw as usize
    } else {
        0
    };
    let raw = raw.max(MIN_WINDOW_SAMPLES);

    // Round up to even, then walk even numbers until one is 5-smooth.
    let mut size = raw + (raw % 2);
    while !is_five_smooth(size) {
        size += 2;
    }
    size
}

/// Whether `n` has no prime factors other than 2, 3 and 5.
fn is_five_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for factor in [2, 3, 5] {
        while n % factor == 0 {
            n /= factor;
        }
    }
    n == 1
}
