//! Content loading and engine binding

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU16;
use std::sync::Arc;
use tracing::{debug, info};

use pce_core::disc::DiscInterface;
use pce_core::engine::{Engine, GameFile, InputDevice, INPUT_PORTS};
use pce_core::error::LoadError;
use pce_core::video::PixelFormat;

use crate::disc::open_disc;
use crate::identity::{layout_identity, ContentIdentity};
use crate::media::{classify, MediaKind};

/// Upper bound on staged HuCard images (3 MiB, the largest released
/// cartridge size).
pub const MAX_ROM_SIZE: usize = 0x30_0000;

/// What to load and the environment it loads into.
pub struct LoadRequest<'a> {
    pub content_path: &'a Path,
    /// System card image required for CD content.
    pub system_card_path: &'a Path,
    /// Pixel format of the current destination surface, propagated to
    /// the engine after binding.
    pub pixel_format: PixelFormat,
}

/// A successfully bound engine and the session-owned resources that go
/// with it. Exactly one exists per running session; dropping it releases
/// the disc interface.
pub struct EngineHandle {
    pub engine: Box<dyn Engine>,
    /// Zero or one open disc interface.
    pub disc: Option<Arc<dyn DiscInterface>>,
    /// Persistence key for save data.
    pub identity: ContentIdentity,
    /// Content name without extension.
    pub content_name: String,
    /// Directory containing the content and its companion files.
    pub content_directory: PathBuf,
    /// Addressable per-port input buffers registered with the engine.
    pub input: [Arc<AtomicU16>; INPUT_PORTS],
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("disc", &self.disc.is_some())
            .field("identity", &self.identity)
            .field("content_name", &self.content_name)
            .field("content_directory", &self.content_directory)
            .finish_non_exhaustive()
    }
}

/// Load content and bind it to `engine`.
///
/// On any failure the engine is dropped unbound and a partially opened
/// disc interface is released before the error propagates.
pub fn load_content(
    mut engine: Box<dyn Engine>,
    request: &LoadRequest<'_>,
) -> Result<EngineHandle, LoadError> {
    let path = request.content_path;
    let content_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let content_directory = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

    let (disc, identity) = match classify(path) {
        MediaKind::CdImage => {
            info!("loading CD content {}", path.display());
            // Companion and save paths resolve against the content
            // directory, so CD content must have one
            if content_directory.as_os_str().is_empty() {
                return Err(LoadError::MissingDirectory);
            }
            if request.system_card_path.as_os_str().is_empty()
                || !request.system_card_path.exists()
            {
                return Err(LoadError::MissingFirmware(
                    request.system_card_path.to_path_buf(),
                ));
            }
            let disc = open_disc(path)?;
            let identity = layout_identity(&disc.read_toc());
            debug!(%identity, "disc layout identity");
            // A bind failure drops `disc` here, closing the interface
            // before the error reaches the caller
            engine.load_disc(std::slice::from_ref(&disc))?;
            (Some(disc), identity)
        }
        MediaKind::HuCard => {
            info!("loading HuCard content {}", path.display());
            let data = stage_rom(path)?;
            let identity = ContentIdentity::of_image(&data);
            debug!(%identity, bytes = data.len(), "staged image");
            let file = GameFile {
                name: content_name.clone(),
                directory: content_directory.clone(),
                data,
            };
            engine.load_cartridge(&file)?;
            (None, identity)
        }
    };

    // Register addressable input buffers so player input lands directly
    // in engine-visible memory each frame
    let input: [Arc<AtomicU16>; INPUT_PORTS] =
        std::array::from_fn(|_| Arc::new(AtomicU16::new(0)));
    for (port, buffer) in input.iter().enumerate() {
        engine.set_input(port, InputDevice::Gamepad, buffer.clone());
    }

    engine.set_pixel_format(request.pixel_format);

    Ok(EngineHandle {
        engine,
        disc,
        identity,
        content_name,
        content_directory,
        input,
    })
}

/// Stage the whole cartridge image into a size-bounded buffer.
fn stage_rom(path: &Path) -> Result<Vec<u8>, LoadError> {
    let file =
        std::fs::File::open(path).map_err(|e| LoadError::ReadFailure(e.to_string()))?;
    let mut data = Vec::new();
    // Read one byte past the bound so oversized content is detected
    // without staging all of it
    file.take(MAX_ROM_SIZE as u64 + 1)
        .read_to_end(&mut data)
        .map_err(|e| LoadError::ReadFailure(e.to_string()))?;
    if data.len() > MAX_ROM_SIZE {
        return Err(LoadError::ContentTooLarge { limit: MAX_ROM_SIZE });
    }
    if data.is_empty() {
        return Err(LoadError::ReadFailure("content is empty".into()));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pce_core::engine::{EmulateSpec, FrameHost, SimpleCommand};
    use pce_core::timing::TimingMode;

    /// Engine stub that records bind calls.
    #[derive(Default)]
    struct RecordingEngine {
        cartridge: Option<GameFile>,
        discs: usize,
        inputs: usize,
        pixel_format: Option<PixelFormat>,
        fail_disc_bind: bool,
    }

    impl Engine for RecordingEngine {
        fn load_cartridge(&mut self, file: &GameFile) -> Result<(), LoadError> {
            self.cartridge = Some(file.clone());
            Ok(())
        }

        fn load_disc(&mut self, discs: &[Arc<dyn DiscInterface>]) -> Result<(), LoadError> {
            if self.fail_disc_bind {
                return Err(LoadError::ReadFailure("bad disc".into()));
            }
            self.discs = discs.len();
            Ok(())
        }

        fn close_content(&mut self) {}

        fn set_input(&mut self, _port: usize, _device: InputDevice, _buffer: Arc<AtomicU16>) {
            self.inputs += 1;
        }

        fn set_pixel_format(&mut self, format: PixelFormat) {
            self.pixel_format = Some(format);
        }

        fn do_simple_command(&mut self, _command: SimpleCommand) {}

        fn emulate_frame(&mut self, _spec: &mut EmulateSpec<'_>, _host: &mut dyn FrameHost) {}

        fn timing_mode(&self) -> TimingMode {
            TimingMode::default()
        }

        fn apply_sound_format(&mut self, _rate: f64) {}

        fn framebuffer_size(&self) -> (u32, u32) {
            (512, 242)
        }

        fn load_backup_memory(&mut self) {}

        fn flush_backup_memory(&mut self) {}

        fn save_state(&mut self, _path: &Path, _slot: u32) -> std::io::Result<()> {
            Ok(())
        }

        fn load_state(&mut self, _path: &Path, _slot: u32) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn request<'a>(content: &'a Path, system_card: &'a Path) -> LoadRequest<'a> {
        LoadRequest {
            content_path: content,
            system_card_path: system_card,
            pixel_format: PixelFormat::Rgb565,
        }
    }

    #[test]
    fn test_hucard_load_binds_and_registers_ports() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("bonk.pce");
        std::fs::write(&rom, vec![0xAA; 0x4_0000]).unwrap();

        let handle =
            load_content(Box::new(RecordingEngine::default()), &request(&rom, Path::new("")))
                .unwrap();
        assert!(handle.disc.is_none());
        assert_eq!(handle.content_name, "bonk");
        assert_eq!(handle.content_directory, dir.path());
        assert_eq!(handle.input.len(), INPUT_PORTS);
    }

    #[test]
    fn test_oversized_hucard_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("huge.pce");
        std::fs::write(&rom, vec![0; MAX_ROM_SIZE + 1]).unwrap();

        let err = load_content(
            Box::new(RecordingEngine::default()),
            &request(&rom, Path::new("")),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::ContentTooLarge { .. }));
    }

    #[test]
    fn test_empty_hucard_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("empty.pce");
        std::fs::write(&rom, b"").unwrap();

        let err = load_content(
            Box::new(RecordingEngine::default()),
            &request(&rom, Path::new("")),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::ReadFailure(_)));
    }

    #[test]
    fn test_cd_without_directory_fails_before_opening() {
        // Bare relative file name: no containing directory
        let err = load_content(
            Box::new(RecordingEngine::default()),
            &request(Path::new("game.cue"), Path::new("/nonexistent/syscard3.pce")),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingDirectory));
    }

    #[test]
    fn test_cd_without_system_card_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cue = dir.path().join("game.cue");
        std::fs::write(&cue, "").unwrap();

        let err = load_content(
            Box::new(RecordingEngine::default()),
            &request(&cue, &dir.path().join("syscard3.pce")),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MissingFirmware(_)));
    }

    #[test]
    fn test_cd_bind_failure_releases_interface() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.bin"), vec![0; 2352 * 2]).unwrap();
        let cue = dir.path().join("game.cue");
        std::fs::write(
            &cue,
            "FILE \"track01.bin\" BINARY\n  TRACK 01 MODE1/2352\n    INDEX 01 00:00:00\n",
        )
        .unwrap();
        let syscard = dir.path().join("syscard3.pce");
        std::fs::write(&syscard, vec![0; 0x100]).unwrap();

        let engine = Box::new(RecordingEngine {
            fail_disc_bind: true,
            ..Default::default()
        });
        let err = load_content(engine, &request(&cue, &syscard)).unwrap_err();
        // The bind error surfaces; the interface was dropped on the way
        // out
        assert!(matches!(err, LoadError::ReadFailure(_)));
    }

    #[test]
    fn test_cd_load_succeeds_with_system_card() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.bin"), vec![0; 2352 * 2]).unwrap();
        let cue = dir.path().join("game.cue");
        std::fs::write(
            &cue,
            "FILE \"track01.bin\" BINARY\n  TRACK 01 MODE1/2352\n    INDEX 01 00:00:00\n",
        )
        .unwrap();
        let syscard = dir.path().join("syscard3.pce");
        std::fs::write(&syscard, vec![0; 0x100]).unwrap();

        let handle = load_content(
            Box::new(RecordingEngine::default()),
            &request(&cue, &syscard),
        )
        .unwrap();
        assert!(handle.disc.is_some());
        assert_eq!(handle.content_name, "game");
    }
}
