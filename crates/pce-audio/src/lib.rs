//! Audio output path for the pce-station PC Engine frontend
//!
//! The engine synthesizes at an internal rate chosen so that one
//! emulated frame produces exactly the samples the host consumes per
//! presentation frame. This crate holds the sink contract the session
//! writes into and the rate derivation that keeps pitch correct across
//! the machine's two line-count timing modes.

pub mod rate;
pub mod sink;

pub use rate::{core_sound_rate, MAX_FRAME_SAMPLES};
pub use sink::{AudioFormat, AudioSink};
