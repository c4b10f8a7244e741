//! Core types for the pce-station PC Engine (TurboGrafx-16) frontend
//!
//! This crate provides the foundational types, error handling,
//! configuration, and the engine callback contract shared by the
//! content, video, audio, and session crates.

pub mod config;
pub mod disc;
pub mod engine;
pub mod error;
pub mod timing;
pub mod video;

pub use config::Config;
pub use disc::{DiscInterface, Toc, TocTrack};
pub use engine::{
    mid_sync, EmulateSpec, Engine, FrameHost, GameFile, InputDevice, SimpleCommand, INPUT_PORTS,
};
pub use error::{CoreError, LoadError, Result, StateError};
pub use timing::TimingMode;
pub use video::{DisplayRect, PixelFormat, SurfaceMut, SurfaceView};
