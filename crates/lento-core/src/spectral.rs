//! Real-input spectral transform over `rustfft`.
//!
//! The stretch engine only ever needs the positive-frequency half spectrum of
//! a real signal. [`RealFft`] drives a full-size complex FFT and exposes the
//! real-input view of it: `forward` maps `N` samples to `N/2 + 1` bins and
//! `inverse` maps the bins back to `N` samples by conjugate mirroring.
//!
//! Neither direction applies any scaling, so a forward/inverse round trip has
//! a combined gain of exactly `N`; callers divide by the window size once per
//! pass. Plans are cached and `resize` replans only when the size actually
//! changes.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use thiserror::Error;

/// Spectral transform failures.
///
/// These only arise when a buffer does not match the transform's current
/// size, i.e. the transform was not retuned after a window-size change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A buffer length did not match the transform's configured size.
    #[error("transform is tuned for {expected} samples, got a buffer of {actual}")]
    SizeMismatch {
        /// Length the transform is currently planned for.
        expected: usize,
        /// Length of the offending buffer.
        actual: usize,
    },
}

/// Cached forward/inverse real-FFT pair of a fixed size.
pub struct RealFft {
    planner: FftPlanner<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl RealFft {
    /// Plan a transform pair for `size` samples.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            planner,
            forward,
            inverse,
            scratch: vec![Complex::new(0.0, 0.0); size],
            size,
        }
    }

    /// The number of time-domain samples the transform operates on.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the transform is planned for zero samples.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of spectrum bins produced by [`forward`](Self::forward).
    pub fn num_bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Replan for a new size. A no-op when the size is unchanged.
    pub fn resize(&mut self, size: usize) {
        if size != self.size {
            self.forward = self.planner.plan_fft_forward(size);
            self.inverse = self.planner.plan_fft_inverse(size);
            self.scratch.resize(size, Complex::new(0.0, 0.0));
            self.size = size;
        }
    }

    /// Forward transform of `input` into `spectrum` (`size/2 + 1` bins).
    ///
    /// Bin layout: bin 0 is DC and bin `size/2` is Nyquist, both with
    /// (numerically) zero imaginary part for real input. Nothing is packed
    /// into the DC bin's imaginary slot, unlike some space-saving real-FFT
    /// conventions.
    pub fn forward(
        &mut self,
        input: &[f32],
        spectrum: &mut [Complex<f32>],
    ) -> Result<(), TransformError> {
        self.check_len(input.len())?;
        self.check_bins(spectrum.len())?;

        for (slot, &sample) in self.scratch.iter_mut().zip(input.iter()) {
            *slot = Complex::new(sample, 0.0);
        }
        self.forward.process(&mut self.scratch);
        spectrum.copy_from_slice(&self.scratch[..self.num_bins()]);
        Ok(())
    }

    /// Inverse transform of a half spectrum back into `output` samples.
    ///
    /// The negative-frequency half is reconstructed by conjugate symmetry, so
    /// the result is real for any input spectrum.
    pub fn inverse(
        &mut self,
        spectrum: &[Complex<f32>],
        output: &mut [f32],
    ) -> Result<(), TransformError> {
        self.check_bins(spectrum.len())?;
        self.check_len(output.len())?;

        self.scratch[..spectrum.len()].copy_from_slice(spectrum);
        for k in 1..self.size.div_ceil(2) {
            self.scratch[self.size - k] = spectrum[k].conj();
        }
        self.inverse.process(&mut self.scratch);
        for (sample, slot) in output.iter_mut().zip(self.scratch.iter()) {
            *sample = slot.re;
        }
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), TransformError> {
        if actual == self.size {
            Ok(())
        } else {
            Err(TransformError::SizeMismatch {
                expected: self.size,
                actual,
            })
        }
    }

    fn check_bins(&self, actual: usize) -> Result<(), TransformError> {
        if actual == self.num_bins() {
            Ok(())
        } else {
            Err(TransformError::SizeMismatch {
                expected: self.num_bins(),
                actual,
            })
        }
    }
}
