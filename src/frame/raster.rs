// Caller-owned, top-down pixel buffers.
//
// These are the views the external pipeline hands across the codec boundary:
// a flat slice addressed by `offset + row * stride + column`, row 0 at the
// top of the image. The element type fixes the depth.

use super::format::Depth;
use crate::error::DecodeError;

/// A pixel element type that can cross the codec boundary.
pub trait PixelWord: Copy + Default + Send + Sync + 'static {
    /// Depth carried by buffers of this element type.
    const DEPTH: Depth;

    /// Significant bits of the element as a codec pixel value.
    fn to_value(self) -> u32;

    fn from_value(value: u32) -> Self;
}

impl PixelWord for u8 {
    const DEPTH: Depth = Depth::Eight;

    #[inline]
    fn to_value(self) -> u32 {
        u32::from(self)
    }

    #[inline]
    fn from_value(value: u32) -> Self {
        value as u8
    }
}

impl PixelWord for u16 {
    const DEPTH: Depth = Depth::Sixteen;

    #[inline]
    fn to_value(self) -> u32 {
        u32::from(self) & 0x7FFF
    }

    #[inline]
    fn from_value(value: u32) -> Self {
        (value & 0x7FFF) as u16
    }
}

impl PixelWord for u32 {
    const DEPTH: Depth = Depth::TwentyFour;

    /// The high byte (alpha or padding) is not channel data.
    #[inline]
    fn to_value(self) -> u32 {
        self & 0x00FF_FFFF
    }

    #[inline]
    fn from_value(value: u32) -> Self {
        value & 0x00FF_FFFF
    }
}

/// Checks that `offset`/`stride` address `height` rows of `width` pixels
/// inside a buffer of `len` elements.
fn check_layout(
    len: usize,
    width: u32,
    height: u32,
    offset: usize,
    stride: usize,
) -> Result<(), DecodeError> {
    let mismatch = || DecodeError::DimensionMismatch {
        expected: format!("{width}x{height} (offset {offset}, stride {stride})"),
        actual: format!("{len} elements"),
    };
    if width == 0 || height == 0 || stride < width as usize {
        return Err(mismatch());
    }
    let last_row_end = (height as usize - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(offset))
        .and_then(|n| n.checked_add(width as usize))
        .ok_or_else(mismatch)?;
    if last_row_end > len {
        return Err(mismatch());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Raster
// ---------------------------------------------------------------------------

/// Read-only top-down view of a caller's pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct Raster<'a, P: PixelWord> {
    pixels: &'a [P],
    width: u32,
    height: u32,
    offset: usize,
    stride: usize,
}

impl<'a, P: PixelWord> Raster<'a, P> {
    /// Tightly packed buffer: offset 0, stride `width`.
    pub fn new(pixels: &'a [P], width: u32, height: u32) -> Result<Self, DecodeError> {
        Self::with_layout(pixels, width, height, 0, width as usize)
    }

    pub fn with_layout(
        pixels: &'a [P],
        width: u32,
        height: u32,
        offset: usize,
        stride: usize,
    ) -> Result<Self, DecodeError> {
        check_layout(pixels.len(), width, height, offset, stride)?;
        Ok(Self {
            pixels,
            width,
            height,
            offset,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row `y`, counted from the top.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [P] {
        let start = self.offset + y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }
}

// ---------------------------------------------------------------------------
// RasterMut
// ---------------------------------------------------------------------------

/// Mutable top-down view of a caller's pixel buffer.
#[derive(Debug)]
pub struct RasterMut<'a, P: PixelWord> {
    pixels: &'a mut [P],
    width: u32,
    height: u32,
    offset: usize,
    stride: usize,
}

impl<'a, P: PixelWord> RasterMut<'a, P> {
    pub fn new(pixels: &'a mut [P], width: u32, height: u32) -> Result<Self, DecodeError> {
        Self::with_layout(pixels, width, height, 0, width as usize)
    }

    pub fn with_layout(
        pixels: &'a mut [P],
        width: u32,
        height: u32,
        offset: usize,
        stride: usize,
    ) -> Result<Self, DecodeError> {
        check_layout(pixels.len(), width, height, offset, stride)?;
        Ok(Self {
            pixels,
            width,
            height,
            offset,
            stride,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reborrow as a read-only view.
    pub fn as_raster(&self) -> Raster<'_, P> {
        Raster {
            pixels: &self.pixels[..],
            width: self.width,
            height: self.height,
            offset: self.offset,
            stride: self.stride,
        }
    }

    /// Row `y`, counted from the top.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [P] {
        let start = self.offset + y as usize * self.stride;
        &mut self.pixels[start..start + self.width as usize]
    }
}
