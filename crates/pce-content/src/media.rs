//! Media classification by file extension

use std::path::Path;

/// HuCard ROM image extensions.
const HUCARD_EXTENSIONS: &[&str] = &["pce", "sgx"];

/// Optical disc layout descriptor extensions.
const CD_EXTENSIONS: &[&str] = &["toc", "cue", "ccd", "chd"];

/// Kind of content medium, decided by extension class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    HuCard,
    CdImage,
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

pub fn has_hucard_extension(path: &Path) -> bool {
    has_extension(path, HUCARD_EXTENSIONS)
}

pub fn has_cd_extension(path: &Path) -> bool {
    has_extension(path, CD_EXTENSIONS)
}

/// Combined filter: HuCard or CD media. Contexts that cannot accept disc
/// media use [`has_hucard_extension`] directly.
pub fn has_content_extension(path: &Path) -> bool {
    has_hucard_extension(path) || has_cd_extension(path)
}

/// Classify a content path. Anything without a CD extension goes down
/// the cartridge path.
pub fn classify(path: &Path) -> MediaKind {
    if has_cd_extension(path) {
        MediaKind::CdImage
    } else {
        MediaKind::HuCard
    }
}
