//! Engine sample-rate derivation

use tracing::debug;

use pce_core::timing::TimingMode;

/// Most sample frames one emulated frame can produce at the host rate.
/// 54 Hz is safely below either timing mode's frame rate, so this bounds
/// the scratch buffer without tracking the exact count.
pub const MAX_FRAME_SAMPLES: usize = 48_000 / 54;

/// Rate the engine should synthesize at so one emulated frame yields the
/// samples the host consumes per presentation frame:
/// `round(host_rate / system_frame_period * host_frame_period)`.
///
/// Recomputed whenever the machine's timing mode changes; keeps pitch
/// correct as the emulated line count moves between 262 and 263.
pub fn core_sound_rate(host_rate: u32, host_frame_period: f64, mode: TimingMode) -> f64 {
    let rate = (host_rate as f64 / mode.frame_period() * host_frame_period).round();
    debug!(rate, ?mode, "engine sound rate");
    rate
}
