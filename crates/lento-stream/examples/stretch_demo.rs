//! Stream a sine through the stretcher and report the length change.
//!
//! Run with: cargo run --example stretch_demo
//!
//! Set RUST_LOG=debug to watch the engine rebuilds and the final drain.

use lento_stream::{AudioChunk, MultichannelStretcher, NeverAbort, StretchConfig};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: u32 = 48_000;
const CHANNELS: usize = 2;
const CHUNK_FRAMES: usize = 1024;
const INPUT_SECONDS: usize = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = StretchConfig::new(8.0, 0.25, true);
    let mut stretcher = MultichannelStretcher::new(config);

    println!("lento stretch demo");
    println!("==================");
    println!(
        "stretch {:.1}x, window {:.2} s, latency {:.2} s",
        config.stretch_amount(),
        config.window_seconds(),
        stretcher.latency_seconds()
    );

    let total_frames = SAMPLE_RATE as usize * INPUT_SECONDS;
    let mut input_frames = 0;
    let mut output_frames = 0;
    let mut chunks_out = 0;

    while input_frames < total_frames {
        let frames = CHUNK_FRAMES.min(total_frames - input_frames);
        let chunk = sine_chunk(input_frames, frames);
        input_frames += frames;

        for rendered in stretcher.process(&chunk, &NeverAbort) {
            output_frames += rendered.frames();
            chunks_out += 1;
        }
    }

    for rendered in stretcher.finish(&NeverAbort) {
        output_frames += rendered.frames();
        chunks_out += 1;
    }

    let in_seconds = input_frames as f64 / f64::from(SAMPLE_RATE);
    let out_seconds = output_frames as f64 / f64::from(SAMPLE_RATE);
    println!();
    println!("fed      {input_frames} frames ({in_seconds:.2} s)");
    println!("rendered {output_frames} frames ({out_seconds:.2} s) in {chunks_out} chunks");
    println!("measured stretch: {:.2}x", out_seconds / in_seconds);
}

/// A 220 Hz stereo sine, phase-continuous across chunks.
fn sine_chunk(start_frame: usize, frames: usize) -> AudioChunk {
    let mut samples = Vec::with_capacity(frames * CHANNELS);
    for frame in 0..frames {
        let t = (start_frame + frame) as f32 / SAMPLE_RATE as f32;
        let value = (std::f32::consts::TAU * 220.0 * t).sin() * 0.5;
        for _ in 0..CHANNELS {
            samples.push(value);
        }
    }
    AudioChunk::new(samples, CHANNELS, SAMPLE_RATE, 0x3)
}
