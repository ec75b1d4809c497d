//! Lento Core - the per-channel paulstretch algorithm
//!
//! Paulstretch lengthens (or shortens) audio without changing pitch by
//! discarding short-time phase information: each analysis window is
//! transformed to the frequency domain, every bin keeps its magnitude but
//! receives a fresh uniform-random phase, and the result is overlap-added
//! back into the time domain. Because consecutive windows advance through the
//! input by a fraction of the window length, the output plays slower than the
//! input by the configured stretch amount.
//!
//! # Building Blocks
//!
//! - [`SampleBuffer`] - fixed-length real-valued buffer with elementwise ops
//! - [`WindowShape`] - the `(1 - x^2)^1.25` tapering weights
//! - [`window_size_for`] - even, >= 16, 5-smooth window sizing
//! - [`RealFft`] - real-input forward/inverse transform pair over `rustfft`
//! - [`PhaseSource`] - the phase-substitution seam ([`RandomPhase`],
//!   [`KeepPhase`])
//! - [`StretchEngine`] - the per-channel state machine: input FIFO, ping-pong
//!   analysis slots, half-window output, fractional step accounting
//!
//! Multichannel orchestration (chunk de-/re-interleaving, lockstep stepping,
//! draining) lives in the `lento-stream` crate.
//!
//! # Example
//!
//! ```rust
//! use lento_core::{RealFft, StretchEngine};
//!
//! let mut engine = StretchEngine::new(0.05, 48_000);
//! let mut fft = RealFft::new(engine.window_size());
//! let half_window = engine.window_size() / 2;
//!
//! // Feed one window of input, then render half a window of output.
//! for _ in 0..engine.window_size() {
//!     engine.feed(0.25);
//! }
//! assert!(engine.can_step());
//! let rendered = engine.step(4.0, &mut fft);
//! assert_eq!(rendered.len(), half_window);
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe stepping**: all working storage (slots, output,
//!   spectrum scratch) is allocated up front and reused on every step; the
//!   only growth is the input FIFO itself.
//! - **No errors on the audio path**: a mistuned transform degrades a step to
//!   the windowed dry block instead of failing (see [`StretchEngine::step`]).
//! - **Traits at the seams**: the spectral transform and the phase policy are
//!   injected, not baked in.

pub mod buffer;
pub mod phase;
pub mod spectral;
pub mod stretch;
pub mod window;

pub use buffer::SampleBuffer;
pub use phase::{KeepPhase, PhaseSource, RandomPhase};
pub use spectral::{RealFft, TransformError};
pub use stretch::StretchEngine;
pub use window::{WindowShape, window_size_for};
