//! Session layer for the pce-station PC Engine frontend
//!
//! Ties the content, video, and audio crates together into the uniform
//! lifecycle the host drives: load content, run frames, save and restore
//! state, persist backup memory.

pub mod frame;
pub mod persist;
pub mod session;

pub use session::Session;
