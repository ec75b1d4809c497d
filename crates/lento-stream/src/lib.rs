//! Lento Stream - multichannel chunk orchestration for paulstretch
//!
//! This crate turns the per-channel engine from `lento-core` into an inline
//! pipeline effect: interleaved [`AudioChunk`]s go in, stretched replacement
//! chunks come out. One [`lento_core::StretchEngine`] per channel is kept in
//! lockstep behind an all-channels-ready barrier, a shared FFT is retuned on
//! format changes, and end-of-stream draining empties the queues with
//! zero padding.
//!
//! # Example
//!
//! ```rust
//! use lento_stream::{AudioChunk, MultichannelStretcher, NeverAbort, StretchConfig};
//!
//! let config = StretchConfig::new(4.0, 0.05, true);
//! let mut stretcher = MultichannelStretcher::new(config);
//!
//! let input = AudioChunk::silent(4096, 2, 48_000, 0x3);
//! let mut output = stretcher.process(&input, &NeverAbort);
//! output.extend(stretcher.finish(&NeverAbort));
//! assert!(!output.is_empty());
//! ```
//!
//! The stretcher runs single-threaded, call-and-return, on whatever thread
//! feeds it chunks; it never blocks and never spawns work. Configuration is a
//! per-instance [`StretchConfig`] value object passed in explicitly.

pub mod abort;
pub mod chunk;
pub mod config;
pub mod stretcher;

pub use abort::{AbortSignal, NeverAbort};
pub use chunk::AudioChunk;
pub use config::StretchConfig;
pub use stretcher::MultichannelStretcher;
