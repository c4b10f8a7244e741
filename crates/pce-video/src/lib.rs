//! Video output path for the pce-station PC Engine frontend
//!
//! The VDC can change horizontal resolution mid-frame, so a single frame
//! may mix scanlines of three native widths. This crate classifies the
//! widths a frame actually uses, picks one output width for the whole
//! frame, and assembles the destination image with exact integer pixel
//! replication.

pub mod compositor;
pub mod sink;

pub use compositor::{commit_frame, LineWidth, OutputPlan, TierSet};
pub use sink::{OutputFrame, VideoSink};
