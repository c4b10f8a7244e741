//! Callback contract between the frontend core and the emulation engine
//!
//! The engine is an opaque machine simulation. The core drives it one
//! video frame at a time through [`Engine::emulate_frame`] and receives
//! two synchronous callbacks through the [`FrameHost`] passed into that
//! call: zero or more mid-frame audio flushes, and exactly one video
//! commit per produced frame when video output was requested. The host
//! parameter is explicit by design; there is no global callback registry.

use std::path::Path;
use std::sync::atomic::AtomicU16;
use std::sync::Arc;

use crate::disc::DiscInterface;
use crate::error::LoadError;
use crate::timing::TimingMode;
use crate::video::{DisplayRect, PixelFormat, SurfaceMut, SurfaceView};

/// Number of logical input ports registered with the engine.
pub const INPUT_PORTS: usize = 5;

/// Input device kind bound to a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDevice {
    Gamepad,
}

/// Parameterless engine commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleCommand {
    Reset,
}

/// Staged cartridge content.
///
/// The logical name and directory are preserved so the engine can
/// resolve companion files (backup RAM) next to the content.
#[derive(Debug, Clone)]
pub struct GameFile {
    /// Content name without extension.
    pub name: String,
    /// Directory containing the content.
    pub directory: std::path::PathBuf,
    /// The complete, size-bounded image.
    pub data: Vec<u8>,
}

/// Per-frame emulation descriptor, built fresh for every
/// [`Engine::emulate_frame`] call.
pub struct EmulateSpec<'a> {
    /// Destination pixel surface the engine renders into.
    pub surface: SurfaceMut<'a>,
    /// Interleaved stereo scratch buffer, present iff an audio sink was
    /// supplied this frame. Sized to the most samples one frame can
    /// produce, not the exact count.
    pub sound_buf: Option<&'a mut [i16]>,
    /// Sample frames currently accumulated in `sound_buf`. The engine
    /// advances this as it synthesizes; [`mid_sync`] resets it.
    pub sound_buf_len: usize,
    /// True when no video output is wanted; the engine may skip
    /// rendering work and must not commit a frame.
    pub skip_video: bool,
    /// Engine-reported visible region, filled during the frame.
    pub display_rect: DisplayRect,
    /// Native pixel width per frame-buffer row, filled for the rows
    /// covered by `display_rect`.
    pub line_widths: &'a mut [u32],
}

/// Synchronous visitor the engine calls back into mid-emulation.
pub trait FrameHost {
    /// Partial audio delivered before the frame completes, keeping
    /// audio latency bounded within a frame.
    fn mid_frame_audio(&mut self, samples: &[i16]);

    /// The produced frame's pixels are ready. Called exactly once per
    /// frame, and only when video output was requested.
    fn commit_video(&mut self, surface: SurfaceView<'_>, rect: DisplayRect, line_widths: &[u32]);
}

/// Flush the accumulated audio to the host mid-frame and reset the
/// buffer cursor. Engines call this between scanline batches.
pub fn mid_sync(spec: &mut EmulateSpec<'_>, host: &mut dyn FrameHost) {
    let frames = std::mem::replace(&mut spec.sound_buf_len, 0);
    if let Some(buf) = spec.sound_buf.as_deref() {
        host.mid_frame_audio(&buf[..frames * 2]);
    }
}

/// The opaque emulation engine the core drives.
///
/// Implementations must not retain disc interfaces past a failed
/// [`Engine::load_disc`] or past [`Engine::close_content`].
pub trait Engine {
    /// Bind staged cartridge content.
    fn load_cartridge(&mut self, file: &GameFile) -> Result<(), LoadError>;

    /// Bind opened disc media.
    fn load_disc(&mut self, discs: &[Arc<dyn DiscInterface>]) -> Result<(), LoadError>;

    /// Unbind the current content and drop engine-held disc references.
    fn close_content(&mut self);

    /// Register an addressable input buffer for a port; the host writes
    /// player input into it each frame.
    fn set_input(&mut self, port: usize, device: InputDevice, buffer: Arc<AtomicU16>);

    /// Propagate the destination surface pixel format.
    fn set_pixel_format(&mut self, format: PixelFormat);

    fn do_simple_command(&mut self, command: SimpleCommand);

    /// Advance the machine by exactly one video frame.
    fn emulate_frame(&mut self, spec: &mut EmulateSpec<'_>, host: &mut dyn FrameHost);

    /// Current line-count variant; mutated by the engine from emulated
    /// display state, observed once per frame by the session.
    fn timing_mode(&self) -> TimingMode;

    /// Apply a new internal audio sample rate in Hz.
    fn apply_sound_format(&mut self, rate: f64);

    /// Full frame buffer dimensions in pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Load battery-backed save RAM from the content's companion file.
    fn load_backup_memory(&mut self);

    /// Persist battery-backed save RAM to the content's companion file.
    fn flush_backup_memory(&mut self);

    /// Serialize complete internal state to `path`.
    fn save_state(&mut self, path: &Path, slot: u32) -> std::io::Result<()>;

    /// Restore complete internal state from `path`.
    fn load_state(&mut self, path: &Path, slot: u32) -> std::io::Result<()>;
}
