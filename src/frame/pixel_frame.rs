// Bottom-up raster owned by the codec.
//
// Row 0 is the bottom-most scanline, which is the order the opcode grammar
// walks. `from_raster` and `write_raster` are the only places where rows are
// flipped against the caller's top-down buffers.

use super::format::{self, Depth, Palette, PixelFormat};
use super::raster::{PixelWord, Raster, RasterMut};
use crate::error::{ConfigError, DecodeError};

/// A frame of `width * height` pixel values stored bottom-up.
///
/// Pixel values are always masked to the depth's significant bits, so two
/// frames compare equal exactly when their channel data is equal.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u32>,
}

impl PixelFrame {
    /// An all-zero frame (black, or palette index 0).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            format,
            pixels: vec![0; width as usize * height as usize],
        })
    }

    /// Wrap bottom-up pixel values.
    pub fn from_pixels(
        width: u32,
        height: u32,
        format: PixelFormat,
        mut pixels: Vec<u32>,
    ) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ConfigError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        let mask = format.depth().mask();
        for p in &mut pixels {
            *p &= mask;
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Copy a caller's top-down buffer into a bottom-up frame.
    pub fn from_raster<P: PixelWord>(
        raster: &Raster<'_, P>,
        format: PixelFormat,
    ) -> Result<Self, ConfigError> {
        format.check_depth(P::DEPTH)?;
        let mut frame = Self::from_raster_native(raster);
        frame.format = format;
        Ok(frame)
    }

    /// Like [`from_raster`](Self::from_raster), in the format the element
    /// type implies (8-bit buffers are palette indices).
    pub fn from_raster_native<P: PixelWord>(raster: &Raster<'_, P>) -> Self {
        let (width, height) = (raster.width(), raster.height());
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in (0..height).rev() {
            pixels.extend(raster.row(y).iter().map(|p| p.to_value()));
        }
        Self {
            width,
            height,
            format: PixelFormat::for_depth(P::DEPTH),
            pixels,
        }
    }

    /// Parse top-down rows of packed wire pixels (no padding between rows).
    pub fn from_wire_bytes(
        bytes: &[u8],
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, ConfigError> {
        check_dimensions(width, height)?;
        let bpp = format.depth().bytes_per_pixel();
        let expected = width as usize * height as usize;
        if bytes.len() != expected * bpp {
            return Err(ConfigError::PixelCount {
                width,
                height,
                expected,
                actual: bytes.len() / bpp,
            });
        }
        let depth = format.depth();
        let mut pixels = Vec::with_capacity(expected);
        for line in bytes.chunks_exact(width as usize * bpp).rev() {
            pixels.extend(line.chunks_exact(bpp).map(|px| depth.read_pixel(px)));
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// Top-down rows of packed wire pixels, the inverse of
    /// [`from_wire_bytes`](Self::from_wire_bytes).
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        let depth = self.depth();
        let mut out = Vec::with_capacity(self.pixels.len() * depth.bytes_per_pixel());
        for y in (0..self.height).rev() {
            for &v in self.row(y) {
                depth.write_pixel(&mut out, v);
            }
        }
        out
    }

    /// Copy this frame into a caller's top-down buffer.
    pub fn write_raster<P: PixelWord>(&self, out: &mut RasterMut<'_, P>) -> Result<(), DecodeError> {
        if P::DEPTH != self.depth() || out.width() != self.width || out.height() != self.height {
            return Err(DecodeError::DimensionMismatch {
                expected: self.describe(),
                actual: format!("{}x{} {:?}", out.width(), out.height(), P::DEPTH),
            });
        }
        for y in 0..self.height {
            let src = self.row(self.height - 1 - y);
            for (dst, &v) in out.row_mut(y).iter_mut().zip(src) {
                *dst = P::from_value(v);
            }
        }
        Ok(())
    }

    /// Copy this frame, expanded to 24-bit RGB, into a caller's top-down
    /// `0xRRGGBB` buffer.
    pub fn write_rgb_raster(
        &self,
        out: &mut RasterMut<'_, u32>,
        palette: &Palette,
    ) -> Result<(), DecodeError> {
        self.to_rgb(palette).write_raster(out)
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

    pub fn depth(&self) -> Depth {
        self.format.depth()
    }

    /// All pixel values, bottom row first.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Scanline `y`, counted from the bottom.
    #[inline]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let start = y as usize * self.width as usize;
        &mut self.pixels[start..start + self.width as usize]
    }

    /// Pixel at column `x` of bottom-up scanline `y`.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.row(y)[x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: u32) {
        let mask = self.depth().mask();
        self.row_mut(y)[x as usize] = value & mask;
    }

    pub fn fill(&mut self, value: u32) {
        let value = value & self.depth().mask();
        self.pixels.fill(value);
    }

    /// Whether `other` has the same width, height and format.
    pub fn same_geometry(&self, other: &PixelFrame) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /// Short geometry description for error messages.
    pub fn describe(&self) -> String {
        format!("{}x{} {:?}", self.width, self.height, self.format)
    }

    /// Expand to 24-bit RGB.
    ///
    /// Indexed frames go through `palette`, grayscale frames through the
    /// implicit ramp, RGB-555 frames through bit replication.
    pub fn to_rgb(&self, palette: &Palette) -> PixelFrame {
        let pixels = match self.format {
            PixelFormat::Rgb888 => self.pixels.clone(),
            PixelFormat::Rgb555 => self
                .pixels
                .iter()
                .map(|&v| format::rgb555_to_rgb888(v))
                .collect(),
            PixelFormat::Indexed => self.pixels.iter().map(|&v| palette.rgb(v as u8)).collect(),
            PixelFormat::Grayscale => self
                .pixels
                .iter()
                .map(|&v| (v << 16) | (v << 8) | v)
                .collect(),
        };
        PixelFrame {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgb888,
            pixels,
        }
    }

    /// Convert to another pixel format.
    ///
    /// Lossless within a depth and for 16 -> 24; narrowing from 24-bit
    /// truncates (RGB-555), takes luma (grayscale) or picks the nearest
    /// palette entry (indexed).
    pub fn convert(&self, target: PixelFormat, palette: &Palette) -> PixelFrame {
        if target == self.format {
            return self.clone();
        }
        let rgb = self.to_rgb(palette);
        let pixels = match target {
            PixelFormat::Rgb888 => rgb.pixels,
            PixelFormat::Rgb555 => rgb
                .pixels
                .iter()
                .map(|&v| format::rgb888_to_rgb555(v))
                .collect(),
            PixelFormat::Grayscale => rgb.pixels.iter().map(|&v| format::luma(v)).collect(),
            PixelFormat::Indexed => rgb
                .pixels
                .iter()
                .map(|&v| u32::from(palette.nearest(v)))
                .collect(),
        };
        PixelFrame {
            width: self.width,
            height: self.height,
            format: target,
            pixels,
        }
    }
}

impl std::fmt::Debug for PixelFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ConfigError> {
    if width == 0 || height == 0 {
        return Err(ConfigError::ZeroDimension { width, height });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_rows_are_flipped() {
        // Top-down: row 0 = [1, 2], row 1 = [3, 4].
        let buf: Vec<u32> = vec![1, 2, 3, 4];
        let raster = Raster::new(&buf, 2, 2).unwrap();
        let frame = PixelFrame::from_raster(&raster, PixelFormat::Rgb888).unwrap();
        assert_eq!(frame.row(0), &[3, 4]);
        assert_eq!(frame.row(1), &[1, 2]);

        let mut back = vec![0u32; 4];
        let mut out = RasterMut::new(&mut back, 2, 2).unwrap();
        frame.write_raster(&mut out).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn from_raster_masks_alpha() {
        let buf: Vec<u32> = vec![0xFF00_00FF, 0x80FF_FFFF];
        let raster = Raster::new(&buf, 2, 1).unwrap();
        let frame = PixelFrame::from_raster(&raster, PixelFormat::Rgb888).unwrap();
        assert_eq!(frame.pixels(), &[0x0000_00FF, 0x00FF_FFFF]);
    }

    #[test]
    fn from_raster_rejects_wrong_depth() {
        let buf = [0u16; 4];
        let raster = Raster::new(&buf, 2, 2).unwrap();
        assert!(PixelFrame::from_raster(&raster, PixelFormat::Rgb888).is_err());
        assert!(PixelFrame::from_raster(&raster, PixelFormat::Rgb555).is_ok());
    }

    #[test]
    fn write_raster_checks_geometry() {
        let frame = PixelFrame::new(2, 2, PixelFormat::Rgb555).unwrap();
        let mut buf = vec![0u16; 6];
        let mut out = RasterMut::new(&mut buf, 3, 2).unwrap();
        assert!(matches!(
            frame.write_raster(&mut out),
            Err(DecodeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            PixelFrame::new(0, 4, PixelFormat::Indexed).unwrap_err(),
            ConfigError::ZeroDimension {
                width: 0,
                height: 4
            }
        );
        assert!(matches!(
            PixelFrame::from_pixels(2, 2, PixelFormat::Indexed, vec![0; 3]),
            Err(ConfigError::PixelCount { expected: 4, .. })
        ));
    }

    #[test]
    fn rgb555_to_rgb_and_back() {
        let src = PixelFrame::from_pixels(3, 1, PixelFormat::Rgb555, vec![0x7FFF, 0x1234, 0])
            .unwrap();
        let pal = Palette::default();
        let rgb = src.to_rgb(&pal);
        assert_eq!(rgb.format(), PixelFormat::Rgb888);
        assert_eq!(rgb.get(0, 0), 0x00FF_FFFF);
        assert_eq!(rgb.convert(PixelFormat::Rgb555, &pal), src);
    }

    #[test]
    fn indexed_expansion_uses_palette() {
        let pal = Palette::from_packed(&[0x0000_0000, 0x00AB_CDEF]);
        let frame = PixelFrame::from_pixels(2, 1, PixelFormat::Indexed, vec![1, 0]).unwrap();
        assert_eq!(frame.to_rgb(&pal).pixels(), &[0x00AB_CDEF, 0]);
        assert_eq!(frame.to_rgb(&pal).convert(PixelFormat::Indexed, &pal), frame);
    }

    #[test]
    fn grayscale_narrowing() {
        let rgb = PixelFrame::from_pixels(2, 1, PixelFormat::Rgb888, vec![0x00FF_FFFF, 0])
            .unwrap();
        let gray = rgb.convert(PixelFormat::Grayscale, &Palette::default());
        assert_eq!(gray.pixels(), &[255, 0]);
        assert_eq!(gray.to_rgb(&Palette::default()), rgb);
    }

    #[test]
    fn native_format_follows_element_type() {
        let buf = [7u8; 4];
        let frame = PixelFrame::from_raster_native(&Raster::new(&buf, 2, 2).unwrap());
        assert_eq!(frame.format(), PixelFormat::Indexed);
        let buf = [0x7FFFu16; 2];
        let frame = PixelFrame::from_raster_native(&Raster::new(&buf, 1, 2).unwrap());
        assert_eq!(frame.format(), PixelFormat::Rgb555);
    }

    #[test]
    fn wire_bytes_are_top_down_little_endian() {
        // Top row 0x123456, bottom row 0x0000FF.
        let bytes = [0x56, 0x34, 0x12, 0xFF, 0x00, 0x00];
        let frame = PixelFrame::from_wire_bytes(&bytes, 1, 2, PixelFormat::Rgb888).unwrap();
        assert_eq!(frame.pixels(), &[0x0000FF, 0x123456]);
        assert_eq!(frame.to_wire_bytes(), bytes);

        assert!(matches!(
            PixelFrame::from_wire_bytes(&bytes[..5], 1, 2, PixelFormat::Rgb888),
            Err(ConfigError::PixelCount { expected: 2, .. })
        ));
    }

    #[test]
    fn set_masks_value() {
        let mut frame = PixelFrame::new(1, 1, PixelFormat::Grayscale).unwrap();
        frame.set(0, 0, 0x1FF);
        assert_eq!(frame.get(0, 0), 0xFF);
        frame.fill(0x7FF);
        assert_eq!(frame.pixels(), &[0xFF]);
    }
}
