//! Per-frame drive loop

use tracing::debug;

use pce_audio::rate::{core_sound_rate, MAX_FRAME_SAMPLES};
use pce_audio::sink::{AudioFormat, AudioSink};
use pce_core::engine::{EmulateSpec, FrameHost};
use pce_core::timing::MAX_SCANLINES;
use pce_core::video::{DisplayRect, SurfaceMut, SurfaceView};
use pce_video::compositor;
use pce_video::sink::VideoSink;

use crate::session::Session;

/// The synchronous visitor handed to the engine for one frame: mid-frame
/// audio goes straight to the sink, the video commit runs the
/// compositor.
struct FrameCallbacks<'a, 'b> {
    video: Option<&'a mut dyn VideoSink>,
    audio: Option<&'b mut dyn AudioSink>,
}

impl FrameHost for FrameCallbacks<'_, '_> {
    fn mid_frame_audio(&mut self, samples: &[i16]) {
        if let Some(audio) = self.audio.as_deref_mut() {
            audio.write_frames(samples);
        }
    }

    fn commit_video(&mut self, surface: SurfaceView<'_>, rect: DisplayRect, line_widths: &[u32]) {
        if let Some(video) = self.video.as_deref_mut() {
            compositor::commit_frame(video, surface, rect, line_widths);
        }
    }
}

impl Session {
    /// Advance the emulated machine by exactly one video frame.
    ///
    /// Video is rendered iff a video sink was supplied; audio is
    /// harvested iff an audio sink was supplied. A no-op without loaded
    /// content.
    pub fn run_frame(
        &mut self,
        video: Option<&mut dyn VideoSink>,
        audio: Option<&mut dyn AudioSink>,
    ) {
        let host_frame_period = 1.0 / self.config.video.host_refresh_rate;
        let Some(handle) = self.handle.as_mut() else {
            debug!("run_frame without content");
            return;
        };

        // Scratch sized to the most samples one frame can produce; the
        // engine reports the exact count used
        let mut audio_buf = [0i16; MAX_FRAME_SAMPLES * 2];

        if let Some(audio) = audio.as_deref() {
            let mode = handle.engine.timing_mode();
            if mode != self.prev_timing_mode {
                let rate = core_sound_rate(audio.format().rate, host_frame_period, mode);
                handle.engine.apply_sound_format(rate);
                self.prev_timing_mode = mode;
            }
        }

        let (fb_width, fb_height) = handle.engine.framebuffer_size();
        let mut line_widths = [0u32; MAX_SCANLINES];
        let has_audio = audio.is_some();
        let mut spec = EmulateSpec {
            surface: SurfaceMut::new(
                &mut self.surface_pixels,
                fb_width,
                fb_height,
                fb_width,
                self.surface_format,
            ),
            sound_buf: if has_audio {
                Some(&mut audio_buf[..])
            } else {
                None
            },
            sound_buf_len: 0,
            skip_video: video.is_none(),
            display_rect: DisplayRect::default(),
            line_widths: &mut line_widths,
        };
        let mut host = FrameCallbacks { video, audio };

        handle.engine.emulate_frame(&mut spec, &mut host);

        // Whatever the mid-frame flushes left behind goes out now
        let residue = spec.sound_buf_len;
        drop(spec);
        if let Some(audio) = host.audio {
            audio.write_frames(&audio_buf[..residue * 2]);
        }
    }

    /// Apply the engine's audio sample rate for the host stream format.
    ///
    /// Called when the host's audio stream opens; after that the rate is
    /// recomputed automatically whenever the timing mode changes.
    pub fn apply_audio_format(&mut self, format: AudioFormat) {
        let host_frame_period = 1.0 / self.config.video.host_refresh_rate;
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let mode = handle.engine.timing_mode();
        let rate = core_sound_rate(format.rate, host_frame_period, mode);
        handle.engine.apply_sound_format(rate);
        self.prev_timing_mode = mode;
    }
}
