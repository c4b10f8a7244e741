//! Content identity derived from disc layout

use md5::{Digest, Md5};
use std::fmt;

use pce_core::disc::{Toc, TRACK_CONTROL_DATA};

/// 16-byte content identity, the persistence key for backup memory and
/// save states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentIdentity([u8; 16]);

impl ContentIdentity {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Identity of staged cartridge content: a digest of the whole image.
    pub fn of_image(data: &[u8]) -> ContentIdentity {
        ContentIdentity(Md5::digest(data).into())
    }
}

impl From<[u8; 16]> for ContentIdentity {
    fn from(bytes: [u8; 16]) -> Self {
        ContentIdentity(bytes)
    }
}

impl fmt::Display for ContentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Fold the disc layout through MD5: first track, last track, lead-out
/// sector, then every track's start sector and data-flag bit, each as a
/// little-endian `u32` in that fixed order.
///
/// A pure function of layout — track content is deliberately ignored, so
/// a re-ripped disc with the same layout keeps the same identity.
pub fn layout_identity(toc: &Toc) -> ContentIdentity {
    let mut md5 = Md5::new();
    update_u32_le(&mut md5, toc.first_track);
    update_u32_le(&mut md5, toc.last_track);
    update_u32_le(&mut md5, toc.leadout().lba);
    for number in toc.first_track..=toc.last_track {
        let track = toc.track(number);
        update_u32_le(&mut md5, track.lba);
        update_u32_le(&mut md5, (track.control & TRACK_CONTROL_DATA) as u32);
    }
    ContentIdentity(md5.finalize().into())
}

fn update_u32_le(md5: &mut Md5, value: u32) {
    md5.update(value.to_le_bytes());
}
