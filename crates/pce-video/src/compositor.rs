//! Mixed-resolution frame assembly
//!
//! A frame's scanlines each report one of three native widths. When a
//! frame mixes widths, every row is expanded to a single fixed output
//! width by exact integer replication, so the destination image stays
//! rectangular with no distortion at resolution-transition boundaries.
//! A frame using one width throughout is copied row-for-row with no
//! resampling.
//!
//! An unknown width, or a width the active plan cannot contain, means
//! the engine state is corrupt; both are fatal rather than guessed
//! around.

use bytemuck::Pod;
use tracing::trace;

use pce_core::video::{DisplayRect, PixelFormat, SurfaceView};

use crate::sink::VideoSink;

/// The three native scanline widths the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineWidth {
    Narrow,
    Medium,
    Wide,
}

impl LineWidth {
    pub fn from_raw(width: u32) -> Option<Self> {
        match width {
            256 => Some(LineWidth::Narrow),
            341 => Some(LineWidth::Medium),
            512 => Some(LineWidth::Wide),
            _ => None,
        }
    }

    pub fn pixels(self) -> u32 {
        match self {
            LineWidth::Narrow => 256,
            LineWidth::Medium => 341,
            LineWidth::Wide => 512,
        }
    }
}

/// Which width tiers occur within one frame's display rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierSet {
    pub narrow: bool,
    pub medium: bool,
    pub wide: bool,
}

impl TierSet {
    /// Classify every scanline row covered by `rect`.
    ///
    /// Panics on a width outside the three supported tiers.
    pub fn scan(rect: DisplayRect, line_widths: &[u32]) -> TierSet {
        let mut tiers = TierSet::default();
        let rows = &line_widths[rect.y as usize..][..rect.h as usize];
        for &width in rows {
            match LineWidth::from_raw(width) {
                Some(LineWidth::Narrow) => tiers.narrow = true,
                Some(LineWidth::Medium) => tiers.medium = true,
                Some(LineWidth::Wide) => tiers.wide = true,
                None => panic!("unsupported scanline width {width}"),
            }
        }
        tiers
    }
}

/// Output geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPlan {
    /// Widest source tier present; the horizontal extent read from the
    /// source surface.
    pub base_width: u32,
    /// Fixed output width when tiers are mixed; `None` selects the
    /// direct per-row copy path.
    pub multires_width: Option<u32>,
}

impl OutputPlan {
    /// The closed tier-set table. Every representable combination is
    /// enumerated; there is no fallback.
    pub fn for_tiers(tiers: TierSet) -> OutputPlan {
        match (tiers.wide, tiers.medium, tiers.narrow) {
            (true, true, _) => OutputPlan {
                base_width: 512,
                multires_width: Some(1024),
            },
            (true, false, true) => OutputPlan {
                base_width: 512,
                multires_width: Some(512),
            },
            (true, false, false) => OutputPlan {
                base_width: 512,
                multires_width: None,
            },
            (false, true, true) => OutputPlan {
                base_width: 341,
                multires_width: Some(1024),
            },
            (false, true, false) => OutputPlan {
                base_width: 341,
                multires_width: None,
            },
            (false, false, true) => OutputPlan {
                base_width: 256,
                multires_width: None,
            },
            (false, false, false) => unreachable!("frame with no classified scanlines"),
        }
    }
}

/// Assemble the destination image for one frame.
///
/// Invoked synchronously from the engine's video-ready callback with the
/// engine's surface, the frame's display rectangle, and the full
/// per-row width array (indexed by absolute frame-buffer row).
pub fn commit_frame(
    sink: &mut dyn VideoSink,
    surface: SurfaceView<'_>,
    rect: DisplayRect,
    line_widths: &[u32],
) {
    assert!(rect.w > 0 && rect.h > 0, "malformed display rect {rect:?}");
    assert!(
        rect.y + rect.h <= surface.height() && (rect.y + rect.h) as usize <= line_widths.len(),
        "display rect {rect:?} exceeds surface"
    );

    let tiers = TierSet::scan(rect, line_widths);
    let plan = OutputPlan::for_tiers(tiers);
    trace!(?tiers, ?plan, height = rect.h, "committing frame");

    let src = surface.sub_view(rect.x, rect.y, plan.base_width, rect.h);
    let rows = &line_widths[rect.y as usize..][..rect.h as usize];

    match plan.multires_width {
        // Single tier: the common case, a straight row-major copy.
        None => {
            let frame = sink.start_frame(plan.base_width, rect.h, src.format());
            for y in 0..rect.h {
                frame.row_bytes_mut(y).copy_from_slice(src.row_bytes(y));
            }
        }
        Some(out_width) => match src.format() {
            PixelFormat::Rgb565 => render_multires::<u16>(sink, src, rows, out_width),
            PixelFormat::Xrgb8888 => render_multires::<u32>(sink, src, rows, out_width),
        },
    }
    sink.finish_frame();
}

/// Expand every row to `out_width` pixels with the per-tier replication
/// pattern. Row widths must stay inside the tiers the plan was built
/// from.
fn render_multires<P: Pod + Copy>(
    sink: &mut dyn VideoSink,
    src: SurfaceView<'_>,
    row_widths: &[u32],
    out_width: u32,
) {
    let frame = sink.start_frame(out_width, src.height(), src.format());
    for y in 0..src.height() {
        let width = row_widths[y as usize];
        let srow: &[P] = src.row(y);
        let drow: &mut [P] = frame.row_mut(y);
        match (out_width, LineWidth::from_raw(width)) {
            (1024, Some(LineWidth::Narrow)) => replicate(&srow[..256], drow, 4),
            (1024, Some(LineWidth::Medium)) => {
                // 340 * 3 + 1 * 4 = 1024: the final source pixel absorbs
                // the remainder so the row width is exact.
                replicate(&srow[..340], &mut drow[..1020], 3);
                drow[1020..].fill(srow[340]);
            }
            (1024, Some(LineWidth::Wide)) => replicate(&srow[..512], drow, 2),
            (512, Some(LineWidth::Narrow)) => replicate(&srow[..256], drow, 2),
            (512, Some(LineWidth::Wide)) => drow.copy_from_slice(&srow[..512]),
            (out, _) => panic!("scanline width {width} is unreachable in a {out}-wide frame"),
        }
    }
}

fn replicate<P: Copy>(src: &[P], dst: &mut [P], factor: usize) {
    debug_assert_eq!(src.len() * factor, dst.len());
    for (s, d) in src.iter().zip(dst.chunks_exact_mut(factor)) {
        d.fill(*s);
    }
}
