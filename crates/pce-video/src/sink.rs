//! Destination frame contract for composited output

use bytemuck::Pod;
use pce_core::video::PixelFormat;

/// A caller-supplied destination image.
///
/// Row-major with `stride` pixels per row; rows may carry padding past
/// `width`, which the compositor skips rather than writes.
pub struct OutputFrame {
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl OutputFrame {
    pub fn new(width: u32, height: u32, stride: u32, format: PixelFormat) -> Self {
        assert!(stride >= width);
        Self {
            width,
            height,
            stride,
            format,
            pixels: vec![0; height as usize * stride as usize * format.bytes_per_pixel()],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw backing store including row padding.
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Row `y` as typed pixels, `width` entries.
    pub fn row<P: Pod>(&self, y: u32) -> &[P] {
        bytemuck::cast_slice(self.row_bytes(y))
    }

    /// Row `y` as typed pixels, `width` entries, mutable.
    pub fn row_mut<P: Pod>(&mut self, y: u32) -> &mut [P] {
        assert!(y < self.height);
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride as usize * bpp;
        let len = self.width as usize * bpp;
        bytemuck::cast_slice_mut(&mut self.pixels[start..start + len])
    }

    /// Row `y` as raw bytes, excluding padding.
    pub fn row_bytes(&self, y: u32) -> &[u8] {
        assert!(y < self.height);
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride as usize * bpp;
        &self.pixels[start..start + self.width as usize * bpp]
    }

    /// Row `y` as raw bytes, excluding padding, mutable.
    pub fn row_bytes_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height);
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride as usize * bpp;
        let len = self.width as usize * bpp;
        &mut self.pixels[start..start + len]
    }
}

/// Receives composited frames.
///
/// Called synchronously from within the engine's per-frame callback;
/// implementations typically hand the finished frame to the presentation
/// layer on `finish_frame`.
pub trait VideoSink {
    /// Begin a frame of the given dimensions and format, returning the
    /// destination to fill. The sink chooses the stride.
    fn start_frame(&mut self, width: u32, height: u32, format: PixelFormat) -> &mut OutputFrame;

    /// The frame contents are complete.
    fn finish_frame(&mut self);
}
