//! Content identification and loading for the pce-station PC Engine frontend
//!
//! Classifies content paths as HuCard or CD media, opens disc images,
//! derives the layout-based content identity used to key save data, and
//! binds content to the emulation engine.

pub mod disc;
pub mod identity;
pub mod loader;
pub mod media;

pub use disc::{open_disc, CueDisc};
pub use identity::{layout_identity, ContentIdentity};
pub use loader::{load_content, EngineHandle, LoadRequest, MAX_ROM_SIZE};
pub use media::{
    classify, has_cd_extension, has_content_extension, has_hucard_extension, MediaKind,
};
