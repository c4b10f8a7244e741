//! Emulation session lifecycle

use std::path::Path;
use std::sync::atomic::Ordering;
use tracing::info;

use pce_core::config::Config;
use pce_core::engine::{Engine, SimpleCommand};
use pce_core::error::LoadError;
use pce_core::timing::TimingMode;
use pce_core::video::PixelFormat;
use pce_content::identity::ContentIdentity;
use pce_content::loader::{load_content, EngineHandle, LoadRequest};

/// One running emulation session.
///
/// Owns the bound engine and its disc interface exclusively; the host
/// serializes `run_frame`, load, and state calls against it. All
/// operations are synchronous.
pub struct Session {
    pub(crate) config: Config,
    pub(crate) handle: Option<EngineHandle>,
    pub(crate) surface_pixels: Vec<u8>,
    pub(crate) surface_format: PixelFormat,
    pub(crate) prev_timing_mode: TimingMode,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handle: None,
            surface_pixels: Vec::new(),
            surface_format: PixelFormat::default(),
            prev_timing_mode: TimingMode::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_content(&self) -> bool {
        self.handle.is_some()
    }

    /// Load content from `path` and bind it to `engine`.
    ///
    /// On success the engine becomes the session's active instance and
    /// backup memory is loaded once. On failure nothing stays bound and
    /// any partially opened disc interface has been released.
    pub fn load_content(
        &mut self,
        engine: Box<dyn Engine>,
        path: &Path,
    ) -> Result<(), LoadError> {
        self.close_content();

        let request = LoadRequest {
            content_path: path,
            system_card_path: &self.config.paths.system_card,
            pixel_format: self.surface_format,
        };
        let handle = load_content(engine, &request)?;

        self.prev_timing_mode = handle.engine.timing_mode();
        self.allocate_surface(&handle);
        self.handle = Some(handle);
        self.load_backup_memory();
        Ok(())
    }

    /// Close the current content, flushing backup memory first.
    pub fn close_content(&mut self) {
        if self.handle.is_none() {
            return;
        }
        // Flush while the engine still holds the state it reads from
        self.flush_backup_memory();
        if let Some(mut handle) = self.handle.take() {
            info!("closing {}", handle.content_name);
            handle.engine.close_content();
            // Dropping the handle releases the disc interface
        }
    }

    /// Hard-reset the emulated machine.
    pub fn reset(&mut self) {
        debug_assert!(self.has_content());
        if let Some(handle) = self.handle.as_mut() {
            handle.engine.do_simple_command(SimpleCommand::Reset);
        }
    }

    /// Write one port's input bits into engine-visible memory.
    pub fn set_input(&self, port: usize, bits: u16) {
        if let Some(handle) = self.handle.as_ref() {
            handle.input[port].store(bits, Ordering::Relaxed);
        }
    }

    /// Identity of the loaded content, the persistence key.
    pub fn content_identity(&self) -> Option<ContentIdentity> {
        self.handle.as_ref().map(|h| h.identity)
    }

    pub fn content_name(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.content_name.as_str())
    }

    /// The host's render format changed; re-derive the surface and tell
    /// the engine.
    pub fn render_format_changed(&mut self, format: PixelFormat) {
        self.surface_format = format;
        if let Some(mut handle) = self.handle.take() {
            self.allocate_surface(&handle);
            handle.engine.set_pixel_format(format);
            self.handle = Some(handle);
        }
    }

    /// Vertical scale that maps the configured visible line range onto
    /// the standard 224-line picture, or 1.0 when aspect correction is
    /// off.
    pub fn video_aspect_ratio_scale(&self) -> f64 {
        let line_count = self.config.visible_line_count() as f64;
        debug_assert!(line_count > 0.0);
        if self.config.video.correct_line_aspect {
            224.0 / line_count
        } else {
            1.0
        }
    }

    fn allocate_surface(&mut self, handle: &EngineHandle) {
        let (width, height) = handle.engine.framebuffer_size();
        self.surface_pixels = vec![
            0;
            width as usize * height as usize * self.surface_format.bytes_per_pixel()
        ];
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close_content();
    }
}
