//! Pixel formats, display rectangles, and framebuffer surface views

use bytemuck::Pod;

/// Pixel format of a destination surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 16-bit RGB565, the engine's native output format.
    #[default]
    Rgb565,
    /// 32-bit XRGB8888.
    Xrgb8888,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Xrgb8888 => 4,
        }
    }
}

/// The visible sub-rectangle of the full frame buffer for one frame.
///
/// Varies frame to frame: the visible line count changes with the
/// timing mode, and the horizontal origin with the display registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Shared view of a row-major pixel surface.
///
/// `stride` is in pixels and may exceed `width`; the padding pixels at
/// the end of each row are not part of the image.
#[derive(Clone, Copy)]
pub struct SurfaceView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
}

impl<'a> SurfaceView<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: u32, format: PixelFormat) -> Self {
        assert!(stride >= width);
        assert!(data.len() >= surface_bytes(height, stride, format));
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Sub-view with origin `(x, y)` and extent `(w, h)`.
    pub fn sub_view(&self, x: u32, y: u32, w: u32, h: u32) -> SurfaceView<'a> {
        assert!(x + w <= self.stride && y + h <= self.height);
        let offset = (y as usize * self.stride as usize + x as usize) * self.format.bytes_per_pixel();
        SurfaceView {
            data: &self.data[offset..],
            width: w,
            height: h,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Row `y` as typed pixels, `width` entries.
    pub fn row<P: Pod>(&self, y: u32) -> &'a [P] {
        let bytes = self.row_bytes(y);
        bytemuck::cast_slice(bytes)
    }

    /// Row `y` as raw bytes, `width * bytes_per_pixel` long.
    pub fn row_bytes(&self, y: u32) -> &'a [u8] {
        assert!(y < self.height);
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride as usize * bpp;
        &self.data[start..start + self.width as usize * bpp]
    }
}

/// Mutable view of a row-major pixel surface; the engine renders into one
/// of these each frame.
pub struct SurfaceMut<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
}

impl<'a> SurfaceMut<'a> {
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> Self {
        assert!(stride >= width);
        assert!(data.len() >= surface_bytes(height, stride, format));
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Reborrow as a shared view, e.g. to hand a completed frame to the
    /// compositor.
    pub fn as_view(&self) -> SurfaceView<'_> {
        SurfaceView {
            data: self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Row `y` as typed pixels, `width` entries.
    pub fn row_mut<P: Pod>(&mut self, y: u32) -> &mut [P] {
        assert!(y < self.height);
        let bpp = self.format.bytes_per_pixel();
        let start = y as usize * self.stride as usize * bpp;
        bytemuck::cast_slice_mut(&mut self.data[start..start + self.width as usize * bpp])
    }
}

fn surface_bytes(height: u32, stride: u32, format: PixelFormat) -> usize {
    height as usize * stride as usize * format.bytes_per_pixel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access() {
        let mut data = vec![0u8; 4 * 2 * 2];
        let mut surface = SurfaceMut::new(&mut data, 4, 2, 4, PixelFormat::Rgb565);
        surface.row_mut::<u16>(1).copy_from_slice(&[1, 2, 3, 4]);

        let view = surface.as_view();
        assert_eq!(view.row::<u16>(0), &[0, 0, 0, 0]);
        assert_eq!(view.row::<u16>(1), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_sub_view_respects_stride() {
        // 8-pixel stride, 6-pixel image
        let mut data = vec![0u8; 8 * 4 * 2];
        {
            let mut surface = SurfaceMut::new(&mut data, 8, 4, 8, PixelFormat::Rgb565);
            for y in 0..4 {
                let row = surface.row_mut::<u16>(y);
                for (x, px) in row.iter_mut().enumerate() {
                    *px = (y * 100 + x as u32) as u16;
                }
            }
        }
        let view = SurfaceView::new(&data, 8, 4, 8, PixelFormat::Rgb565);
        let sub = view.sub_view(2, 1, 3, 2);
        assert_eq!(sub.row::<u16>(0), &[102, 103, 104]);
        assert_eq!(sub.row::<u16>(1), &[202, 203, 204]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_sub_view() {
        let data = vec![0u8; 8 * 2 * 2];
        let view = SurfaceView::new(&data, 8, 2, 8, PixelFormat::Rgb565);
        let _ = view.sub_view(4, 0, 8, 2);
    }
}
