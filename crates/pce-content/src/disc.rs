//! Disc image opening
//!
//! Only CUE sheets are opened natively. The other recognized disc
//! extensions classify as CD media for filtering purposes but report
//! `DiscOpenFailure` here.

use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use pce_core::disc::{DiscInterface, Toc, TocTrack, RAW_SECTOR_SIZE, TRACK_CONTROL_DATA};
use pce_core::error::LoadError;

/// Open a disc image, returning the session-owned interface.
pub fn open_disc(path: &Path) -> Result<Arc<dyn DiscInterface>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "cue" => Ok(Arc::new(CueDisc::open(path)?)),
        "toc" | "ccd" | "chd" => Err(LoadError::DiscOpenFailure(format!(
            "{ext} images are not handled by this core"
        ))),
        _ => Err(LoadError::DiscOpenFailure(format!(
            "unrecognized disc image {}",
            path.display()
        ))),
    }
}

/// A disc opened from a CUE sheet and its data files.
pub struct CueDisc {
    toc: Toc,
    files: Mutex<Vec<DataFile>>,
}

struct DataFile {
    file: File,
    base_lba: u32,
    sectors: u32,
}

/// One TRACK declaration while parsing.
struct CueTrack {
    number: u32,
    control: u8,
    /// INDEX 01 offset in frames, relative to the containing file.
    index_frames: u32,
}

struct CueFileDecl {
    name: String,
    tracks: Vec<CueTrack>,
}

impl CueDisc {
    pub fn open(path: &Path) -> Result<CueDisc, LoadError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LoadError::DiscOpenFailure(format!("{}: {e}", path.display())))?;
        let decls = parse_cue(&text)?;
        if decls.is_empty() {
            return Err(LoadError::DiscOpenFailure("CUE sheet declares no files".into()));
        }

        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut toc = Toc::new();
        let mut files = Vec::with_capacity(decls.len());
        let mut base_lba = 0u32;
        for decl in &decls {
            let data_path = dir.join(&decl.name);
            let file = File::open(&data_path)
                .map_err(|e| LoadError::DiscOpenFailure(format!("{}: {e}", data_path.display())))?;
            let len = file
                .metadata()
                .map_err(|e| LoadError::DiscOpenFailure(e.to_string()))?
                .len();
            let sectors = (len / RAW_SECTOR_SIZE as u64) as u32;
            for track in &decl.tracks {
                toc.set_track(
                    track.number,
                    TocTrack {
                        lba: base_lba + track.index_frames,
                        control: track.control,
                    },
                );
                toc.first_track = if toc.first_track == 0 {
                    track.number
                } else {
                    toc.first_track.min(track.number)
                };
                toc.last_track = toc.last_track.max(track.number);
                debug!(
                    track = track.number,
                    lba = base_lba + track.index_frames,
                    data = track.control & TRACK_CONTROL_DATA != 0,
                    "cue track"
                );
            }
            files.push(DataFile {
                file,
                base_lba,
                sectors,
            });
            base_lba += sectors;
        }
        toc.set_leadout(TocTrack {
            lba: base_lba,
            control: 0,
        });

        info!(
            tracks = toc.last_track - toc.first_track + 1,
            sectors = base_lba,
            "opened CUE disc {}",
            path.display()
        );
        Ok(CueDisc {
            toc,
            files: Mutex::new(files),
        })
    }
}

impl DiscInterface for CueDisc {
    fn read_toc(&self) -> Toc {
        self.toc.clone()
    }

    fn read_sector(&self, lba: u32, buf: &mut [u8]) -> std::io::Result<()> {
        assert_eq!(buf.len(), RAW_SECTOR_SIZE);
        let mut files = self.files.lock();
        let data = files
            .iter_mut()
            .find(|f| lba >= f.base_lba && lba < f.base_lba + f.sectors)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("sector {lba} is past the lead-out"),
                )
            })?;
        let offset = (lba - data.base_lba) as u64 * RAW_SECTOR_SIZE as u64;
        data.file.seek(SeekFrom::Start(offset))?;
        data.file.read_exact(buf)
    }
}

fn parse_cue(text: &str) -> Result<Vec<CueFileDecl>, LoadError> {
    let mut decls: Vec<CueFileDecl> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        let mut words = line.split_whitespace();
        match words.next() {
            Some("FILE") => {
                let name = line
                    .split('"')
                    .nth(1)
                    .ok_or_else(|| bad_cue("FILE entry without a quoted name"))?;
                decls.push(CueFileDecl {
                    name: name.to_string(),
                    tracks: Vec::new(),
                });
            }
            Some("TRACK") => {
                let decl = decls
                    .last_mut()
                    .ok_or_else(|| bad_cue("TRACK before any FILE"))?;
                let number: u32 = words
                    .next()
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| bad_cue("TRACK without a number"))?;
                if !(1..=99).contains(&number) {
                    return Err(bad_cue("track number out of range"));
                }
                let control = match words.next() {
                    Some("AUDIO") => 0,
                    Some("MODE1/2352") | Some("MODE2/2352") => TRACK_CONTROL_DATA,
                    Some(mode) => return Err(bad_cue(&format!("unsupported track mode {mode}"))),
                    None => return Err(bad_cue("TRACK without a mode")),
                };
                decl.tracks.push(CueTrack {
                    number,
                    control,
                    index_frames: 0,
                });
            }
            Some("INDEX") => {
                let track = decls
                    .last_mut()
                    .and_then(|d| d.tracks.last_mut())
                    .ok_or_else(|| bad_cue("INDEX before any TRACK"))?;
                let index_no = words.next();
                let msf = words.next().ok_or_else(|| bad_cue("INDEX without a time"))?;
                // Only INDEX 01 marks the track start; pregap indices are
                // ignored
                if index_no == Some("01") {
                    track.index_frames = msf_to_frames(msf)?;
                }
            }
            // REM, PREGAP, FLAGS, blank lines
            _ => {}
        }
    }
    Ok(decls)
}

/// MM:SS:FF at 75 frames per second.
fn msf_to_frames(msf: &str) -> Result<u32, LoadError> {
    let mut parts = msf.split(':');
    let mut next = || {
        parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| bad_cue(&format!("bad MSF time {msf}")))
    };
    let (m, s, f) = (next()?, next()?, next()?);
    if s >= 60 || f >= 75 {
        return Err(bad_cue(&format!("bad MSF time {msf}")));
    }
    Ok(m * 60 * 75 + s * 75 + f)
}

fn bad_cue(message: &str) -> LoadError {
    LoadError::DiscOpenFailure(format!("malformed CUE sheet: {message}"))
}
