//! Multichannel orchestration of per-channel stretch engines.
//!
//! [`MultichannelStretcher`] sits inline in a chunk pipeline. It owns one
//! [`StretchEngine`] per live channel plus one shared [`RealFft`], retuned
//! whenever the channel count, sample rate or configured window duration
//! changes. Operation moves between three modes:
//!
//! - **Disabled** - chunks pass through unmodified and no engine is touched.
//! - **Buffering** - input chunks are de-interleaved into the engines; while
//!   *every* engine has a full window queued, one synchronized step per
//!   channel renders half a window, which is re-interleaved and emitted.
//!   The original chunk is never forwarded.
//! - **Draining** - on end of stream, each remaining step is produced by
//!   zero-padding every channel to readiness, until the queues are empty;
//!   then everything is flushed and the stretcher is back to Buffering.
//!
//! The all-channels-ready barrier is an invariant, not an optimization: no
//! engine's queue is ever consumed unless every channel steps in the same
//! iteration, which is what keeps the channels phase-aligned in time.

use crate::abort::AbortSignal;
use crate::chunk::AudioChunk;
use crate::config::StretchConfig;
use lento_core::{RealFft, StretchEngine};

/// Streaming multichannel paulstretch.
///
/// Because the effect buffers internally, one input chunk can produce zero,
/// one or several output chunks, and output chunk boundaries are unrelated to
/// input chunk boundaries. Nothing is persisted between process lifetimes.
pub struct MultichannelStretcher {
    config: StretchConfig,
    engines: Vec<StretchEngine>,
    transform: RealFft,
    last_channels: usize,
    last_sample_rate: u32,
    last_channel_mask: u32,
    last_window_seconds: f64,
}

impl MultichannelStretcher {
    /// Create a stretcher with the given configuration and no channels yet;
    /// engines are built when the first chunk arrives.
    pub fn new(config: StretchConfig) -> Self {
        Self {
            config,
            engines: Vec::new(),
            transform: RealFft::new(16),
            last_channels: 0,
            last_sample_rate: 0,
            last_channel_mask: 0,
            last_window_seconds: 0.0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &StretchConfig {
        &self.config
    }

    /// Replace the configuration. A changed window duration takes effect on
    /// the next processed chunk, exactly like a format change.
    pub fn set_config(&mut self, config: StretchConfig) {
        self.config = config;
    }

    /// Number of channels currently being stretched.
    pub fn channel_count(&self) -> usize {
        self.engines.len()
    }

    /// Samples queued per channel and not yet rendered (channels are always
    /// length-synchronized, so channel 0 speaks for all). Zero when no
    /// engines exist.
    pub fn buffered_samples(&self) -> usize {
        self.engines.first().map_or(0, StretchEngine::buffered_samples)
    }

    /// Approximate latency: the configured window duration while enabled,
    /// else zero. Informational only.
    pub fn latency_seconds(&self) -> f64 {
        if self.config.enabled() {
            self.config.window_seconds()
        } else {
            0.0
        }
    }

    /// Process one input chunk, returning the replacement chunks.
    ///
    /// Disabled: returns the input unmodified. Enabled: the input is consumed
    /// into the per-channel queues and every completed synchronized step
    /// yields one half-window output chunk; the input chunk itself is never
    /// forwarded. `abort` is polled between steps.
    pub fn process<A: AbortSignal>(&mut self, chunk: &AudioChunk, abort: &A) -> Vec<AudioChunk> {
        if !self.config.enabled() {
            return vec![chunk.clone()];
        }

        self.sync_format(chunk);
        self.feed(chunk);

        let mut rendered = Vec::new();
        while self.all_ready() && !abort.is_aborting() {
            rendered.push(self.step_all());
        }
        rendered
    }

    /// Drain every queued sample at end of stream.
    ///
    /// Channel 0 is the length reference; each of the
    /// [`final_steps_required`](StretchEngine::final_steps_required)
    /// iterations zero-pads every channel to readiness and performs one
    /// synchronized step. If `abort` fires mid-drain the chunks rendered so
    /// far are returned and the remaining residue simply stays buffered.
    /// A completed drain flushes every engine.
    pub fn finish<A: AbortSignal>(&mut self, abort: &A) -> Vec<AudioChunk> {
        if !self.config.enabled() || self.engines.is_empty() {
            return Vec::new();
        }

        let amount = self.config.stretch_amount();
        let required = self.engines[0].final_steps_required(amount);
        let mut rendered = Vec::with_capacity(required);
        for _ in 0..required {
            if abort.is_aborting() {
                return rendered;
            }
            for engine in &mut self.engines {
                engine.feed_until_ready(0.0);
            }
            rendered.push(self.step_all());
        }

        for engine in &mut self.engines {
            engine.flush();
        }
        if required > 0 {
            tracing::debug!(chunks = required, "drained stretch engines at end of stream");
        }
        rendered
    }

    /// Drop all buffered audio and reset every engine. Used on seek or track
    /// change.
    pub fn flush(&mut self) {
        for engine in &mut self.engines {
            engine.flush();
        }
    }

    /// Rebuild engines and retune the shared transform when the incoming
    /// format or the configured window duration changed.
    fn sync_format(&mut self, chunk: &AudioChunk) {
        let window_seconds = self.config.window_seconds();
        if chunk.channels() != self.last_channels
            || chunk.sample_rate() != self.last_sample_rate
            || window_seconds != self.last_window_seconds
        {
            self.rebuild(chunk.channels(), chunk.sample_rate(), window_seconds);
        }
        self.last_channels = chunk.channels();
        self.last_sample_rate = chunk.sample_rate();
        self.last_channel_mask = chunk.channel_mask();
        self.last_window_seconds = window_seconds;
    }

    /// Destructively resize the engine collection. Surviving engines lose
    /// their queues (at most one window of audio each); slots carry their
    /// tails over.
    fn rebuild(&mut self, channels: usize, sample_rate: u32, window_seconds: f64) {
        self.engines.truncate(channels);
        while self.engines.len() < channels {
            self.engines.push(StretchEngine::new(window_seconds, sample_rate));
        }
        for engine in &mut self.engines {
            engine.resize(window_seconds, sample_rate);
        }
        if let Some(first) = self.engines.first() {
            self.transform.resize(first.window_size());
        }
        tracing::debug!(
            channels,
            sample_rate,
            window_seconds,
            window_size = self.engines.first().map_or(0, StretchEngine::window_size),
            "rebuilt stretch engines"
        );
    }

    /// De-interleave a chunk into the per-channel queues.
    fn feed(&mut self, chunk: &AudioChunk) {
        let channels = self.engines.len().min(chunk.channels());
        for frame in 0..chunk.frames() {
            for channel in 0..channels {
                self.engines[channel].feed(chunk.sample(frame, channel));
            }
        }
    }

    /// Whether every channel has a full window queued. False with no
    /// channels, so an empty stretcher never loops.
    fn all_ready(&self) -> bool {
        !self.engines.is_empty() && self.engines.iter().all(StretchEngine::can_step)
    }

    /// One synchronized step across all channels, re-interleaved into a
    /// single chunk tagged with the last-seen format.
    fn step_all(&mut self) -> AudioChunk {
        let channels = self.engines.len();
        let half = self.engines[0].window_size() / 2;
        let amount = self.config.stretch_amount();

        let mut samples = vec![0.0f32; half * channels];
        for (channel, engine) in self.engines.iter_mut().enumerate() {
            let rendered = engine.step(amount, &mut self.transform);
            for (frame, &value) in rendered.iter().enumerate() {
                samples[frame * channels + channel] = value;
            }
        }

        AudioChunk::new(
            samples,
            channels,
            self.last_sample_rate,
            self.last_channel_mask,
        )
    }
}

impl Default for MultichannelStretcher {
    fn default() -> Self {
        Self::new(StretchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::NeverAbort;

    /// 16-sample windows at a 1 kHz tag keep the arithmetic easy to follow.
    fn enabled_config() -> StretchConfig {
        StretchConfig::new(1.0, 0.016, true)
    }

    fn chunk(frames: usize, channels: usize) -> AudioChunk {
        let samples = (0..frames * channels).map(|i| i as f32 * 0.01).collect();
        AudioChunk::new(samples, channels, 1000, 0x3)
    }

    #[test]
    fn channels_only_step_in_lockstep() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());

        // Feed partial chunks of awkward sizes; after every call both
        // channels must hold identical queue lengths.
        for frames in [5, 7, 3, 11, 2, 40] {
            stretcher.process(&chunk(frames, 2), &NeverAbort);
            let lengths: Vec<usize> = stretcher
                .engines
                .iter()
                .map(StretchEngine::buffered_samples)
                .collect();
            assert!(
                lengths.windows(2).all(|pair| pair[0] == pair[1]),
                "queues diverged: {lengths:?}"
            );
        }
    }

    #[test]
    fn emits_only_when_every_channel_is_ready() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());

        // 15 frames: one short of a window, nothing to emit.
        let rendered = stretcher.process(&chunk(15, 2), &NeverAbort);
        assert!(rendered.is_empty());
        assert_eq!(stretcher.buffered_samples(), 15);

        // One more frame completes the window for both channels at once.
        let rendered = stretcher.process(&chunk(1, 2), &NeverAbort);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].frames(), 8);
        assert_eq!(rendered[0].channels(), 2);
    }

    #[test]
    fn channel_count_change_rebuilds_once_and_discards_queues() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());
        stretcher.process(&chunk(10, 2), &NeverAbort);
        assert_eq!(stretcher.channel_count(), 2);
        assert_eq!(stretcher.buffered_samples(), 10);

        // Mono chunk: engines rebuilt, the 10 buffered frames (less than one
        // window) are discarded, the new chunk is what remains.
        let rendered = stretcher.process(&chunk(6, 1), &NeverAbort);
        assert!(rendered.is_empty());
        assert_eq!(stretcher.channel_count(), 1);
        assert_eq!(stretcher.buffered_samples(), 6);
    }

    #[test]
    fn zero_channel_transitions_never_fault() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());

        // 0 -> 2
        let rendered = stretcher.process(&chunk(0, 0), &NeverAbort);
        assert!(rendered.is_empty());
        stretcher.process(&chunk(16, 2), &NeverAbort);
        assert_eq!(stretcher.channel_count(), 2);

        // 2 -> 0: no engines, no output, no panic.
        let rendered = stretcher.process(&chunk(0, 0), &NeverAbort);
        assert!(rendered.is_empty());
        assert_eq!(stretcher.channel_count(), 0);
        assert!(stretcher.finish(&NeverAbort).is_empty());
    }

    #[test]
    fn sample_rate_change_triggers_rebuild() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());
        stretcher.process(&chunk(10, 1), &NeverAbort);
        let before = stretcher.engines[0].window_size();
        assert_eq!(before, 16);

        // Same channel count, new rate: the window is recomputed.
        let retagged = AudioChunk::new(vec![0.0; 10], 1, 2000, 0x3);
        stretcher.process(&retagged, &NeverAbort);
        assert_eq!(stretcher.engines[0].window_size(), 32);
        assert_eq!(stretcher.buffered_samples(), 10);
    }

    #[test]
    fn window_change_applies_on_next_chunk() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());
        stretcher.process(&chunk(10, 1), &NeverAbort);
        assert_eq!(stretcher.engines[0].window_size(), 16);

        let mut config = *stretcher.config();
        config.set_window_seconds(0.032);
        stretcher.set_config(config);
        stretcher.process(&chunk(4, 1), &NeverAbort);
        assert_eq!(stretcher.engines[0].window_size(), 32);
    }

    #[test]
    fn interleaving_keeps_channels_separate() {
        let mut stretcher = MultichannelStretcher::new(enabled_config());

        // Left channel carries signal, right channel is silent. Phase
        // randomization scrambles the left arbitrarily, but a silent channel
        // has zero magnitude in every bin and must come out silent; any
        // cross-channel leakage in the de-/re-interleaving would break that.
        let samples: Vec<f32> = (0..32).flat_map(|i| [(i as f32 * 0.2).sin(), 0.0]).collect();
        let input = AudioChunk::new(samples, 2, 1000, 0x3);
        let rendered = stretcher.process(&input, &NeverAbort);
        assert!(!rendered.is_empty());

        let mut left_energy = 0.0f32;
        for out in &rendered {
            for frame in 0..out.frames() {
                left_energy += out.sample(frame, 0).powi(2);
                assert_eq!(out.sample(frame, 1), 0.0, "silence leaked at {frame}");
            }
        }
        assert!(left_energy > 0.0, "signal channel should carry energy");
    }
}
