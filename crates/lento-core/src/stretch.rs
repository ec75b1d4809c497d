//! The per-channel stretch state machine.
//!
//! A [`StretchEngine`] buffers incoming samples in an unbounded FIFO and, on
//! every [`step`](StretchEngine::step), renders half a window of output:
//!
//! 1. the oldest window of queued samples is copied into the current
//!    analysis slot and tapered by the [`WindowShape`],
//! 2. the slot goes through forward FFT, per-bin phase substitution and
//!    inverse FFT, is normalized by the window size and tapered a second
//!    time,
//! 3. the first half of the slot is overlap-added with the second half of
//!    the other slot from the previous step,
//! 4. `window_size / 2 / stretch_amount` samples (tracked fractionally, so
//!    non-integer stretch ratios never drift) are retired from the FIFO and
//!    the slots swap roles.
//!
//! The two analysis slots are a fixed two-element array indexed by a parity
//! flag; no buffer is reallocated while streaming.

use crate::buffer::SampleBuffer;
use crate::phase::{PhaseSource, RandomPhase};
use crate::spectral::{RealFft, TransformError};
use crate::window::{WindowShape, window_size_for};
use rustfft::num_complex::Complex;
use std::collections::VecDeque;

/// Streaming paulstretch for a single channel.
///
/// Engines are driven from outside: feed samples until
/// [`can_step`](Self::can_step) reports readiness, then call
/// [`step`](Self::step) to render. Multichannel callers must keep their
/// engines in lockstep; see `lento-stream`.
pub struct StretchEngine {
    pending: VecDeque<f32>,
    window_size: usize,
    slots: [SampleBuffer; 2],
    window: WindowShape,
    output: SampleBuffer,
    spectrum: Vec<Complex<f32>>,
    parity: usize,
    accumulated: f64,
    phase: Box<dyn PhaseSource>,
}

impl StretchEngine {
    /// Create an engine for the given window duration, with uniform-random
    /// phase substitution seeded from entropy.
    pub fn new(window_seconds: f64, sample_rate: u32) -> Self {
        Self::with_phase_source(window_seconds, sample_rate, Box::new(RandomPhase::new()))
    }

    /// Create an engine with an explicit phase policy.
    pub fn with_phase_source(
        window_seconds: f64,
        sample_rate: u32,
        phase: Box<dyn PhaseSource>,
    ) -> Self {
        let window_size = window_size_for(window_seconds, sample_rate);
        Self {
            pending: VecDeque::new(),
            window_size,
            slots: [SampleBuffer::new(window_size), SampleBuffer::new(window_size)],
            window: WindowShape::new(window_size),
            output: SampleBuffer::new(window_size / 2),
            spectrum: vec![Complex::new(0.0, 0.0); window_size / 2 + 1],
            parity: 0,
            accumulated: 0.0,
            phase,
        }
    }

    /// Current analysis window size in samples (even, >= 16, 5-smooth).
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of samples queued and not yet retired.
    pub fn buffered_samples(&self) -> usize {
        self.pending.len()
    }

    /// Fractional step remainder carried between steps, in `[0, 1)`.
    pub fn step_remainder(&self) -> f64 {
        self.accumulated
    }

    /// The most recently rendered half-window of output.
    pub fn output(&self) -> &[f32] {
        self.output.as_slice()
    }

    /// Queue one sample. Always succeeds.
    pub fn feed(&mut self, sample: f32) {
        self.pending.push_back(sample);
    }

    /// Whether a full analysis window is queued.
    pub fn can_step(&self) -> bool {
        self.pending.len() >= self.window_size
    }

    /// How many more samples [`feed`](Self::feed) must supply before
    /// [`can_step`](Self::can_step) becomes true.
    pub fn samples_required_for_step(&self) -> usize {
        self.window_size.saturating_sub(self.pending.len())
    }

    /// Pad the queue with `value` until a step is possible.
    ///
    /// Used while draining at end of stream, where the tail of the signal is
    /// padded with silence.
    pub fn feed_until_ready(&mut self, value: f32) {
        for _ in 0..self.samples_required_for_step() {
            self.pending.push_back(value);
        }
    }

    /// Number of further steps (each preceded by zero padding) needed to
    /// fully drain the queue at `stretch_amount`.
    pub fn final_steps_required(&self, stretch_amount: f64) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let per_step = step_size(self.window_size, stretch_amount);
        (self.pending.len() as f64 / per_step).ceil() as usize
    }

    /// Render the next half-window of stretched audio.
    ///
    /// If no full window is queued this is a safe no-op: the previous output
    /// is returned and neither the queue nor the step accounting is touched.
    ///
    /// `transform` must be tuned to [`window_size`](Self::window_size). If it
    /// is not, the step degrades instead of failing: the once-windowed block
    /// skips the spectral pass and flows into the overlap-add dry, keeping
    /// the engine's timing consistent and resumable.
    ///
    /// The returned slice is reused storage; consume it before the next call.
    pub fn step(&mut self, stretch_amount: f64, transform: &mut RealFft) -> &[f32] {
        if !self.can_step() {
            return self.output.as_slice();
        }

        // Oldest window of queued samples into the current slot; anything
        // beyond one window stays queued for future steps.
        {
            let slot = &mut self.slots[self.parity];
            for (value, &queued) in slot.iter_mut().zip(self.pending.iter()) {
                *value = queued;
            }
            slot.multiply(self.window.weights());
        }

        if self.spectral_pass(transform).is_ok() {
            let slot = &mut self.slots[self.parity];
            // The forward/inverse pair has gain window_size; cancel it, then
            // taper again so overlapping halves cross-fade.
            slot.scale(1.0 / self.window_size as f32);
            slot.multiply(self.window.weights());
        }

        let half = self.window_size / 2;
        {
            let current = &self.slots[self.parity];
            let previous = &self.slots[1 - self.parity];
            for i in 0..half {
                self.output[i] = previous[i + half] + current[i];
            }
        }

        self.accumulated += step_size(self.window_size, stretch_amount);
        let whole = self.accumulated.floor();
        let retire = (whole as usize).min(self.pending.len());
        self.pending.drain(..retire);
        self.accumulated -= whole;
        if self.accumulated < 0.0 {
            self.accumulated = 0.0;
        }

        self.parity = 1 - self.parity;
        self.output.as_slice()
    }

    /// Full reset: zero both slots and the output, drop all queued samples,
    /// clear the step remainder. Used on seek or track change.
    pub fn flush(&mut self) {
        self.slots[0].clear();
        self.slots[1].clear();
        self.output.clear();
        self.pending.clear();
        self.accumulated = 0.0;
    }

    /// Adopt a new window duration and/or sample rate.
    ///
    /// Both slots, the output buffer and the window weights are reallocated
    /// at the new size; as many trailing (most recent) samples as fit are
    /// carried over from each old slot, tail-aligned. The queue and the step
    /// remainder are discarded, losing at most one window of not-yet-stepped
    /// audio.
    pub fn resize(&mut self, window_seconds: f64, sample_rate: u32) {
        self.window_size = window_size_for(window_seconds, sample_rate);
        let mut slots = [
            SampleBuffer::new(self.window_size),
            SampleBuffer::new(self.window_size),
        ];
        for (new, old) in slots.iter_mut().zip(self.slots.iter()) {
            let keep = new.len().min(old.len());
            let (n_new, n_old) = (new.len(), old.len());
            new[n_new - keep..].copy_from_slice(&old[n_old - keep..]);
        }
        self.slots = slots;
        self.window = WindowShape::new(self.window_size);
        self.output = SampleBuffer::new(self.window_size / 2);
        self.spectrum = vec![Complex::new(0.0, 0.0); self.window_size / 2 + 1];
        self.pending.clear();
        self.accumulated = 0.0;
    }

    /// Forward transform, per-bin phase substitution, inverse transform.
    fn spectral_pass(&mut self, transform: &mut RealFft) -> Result<(), TransformError> {
        let parity = self.parity;
        transform.forward(self.slots[parity].as_slice(), &mut self.spectrum)?;
        for bin in self.spectrum.iter_mut() {
            *bin = self.phase.rephase(*bin);
        }
        transform.inverse(&self.spectrum, self.slots[parity].as_mut_slice())
    }
}

/// Samples retired from the queue per step, as a real number.
fn step_size(window_size: usize, stretch_amount: f64) -> f64 {
    (window_size as f64 / 2.0) / stretch_amount
}
