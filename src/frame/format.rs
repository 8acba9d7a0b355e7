// Pixel depths, pixel formats, palettes and the per-depth wire encoding.
//
// Wire pixels are little-endian:
//   8-bit  -> 1 byte palette index
//   16-bit -> u16 LE, 0RRRRRGGGGGBBBBB
//   24-bit -> 3 bytes, LE of 0xRRGGBB (B, G, R)

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Depth
// ---------------------------------------------------------------------------

/// Bits per pixel of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    Eight,
    Sixteen,
    TwentyFour,
}

impl Depth {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::TwentyFour => 24,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
            Self::TwentyFour => 3,
        }
    }

    /// Bits of a pixel value that carry channel data.
    pub const fn mask(self) -> u32 {
        match self {
            Self::Eight => 0xFF,
            Self::Sixteen => 0x7FFF,
            Self::TwentyFour => 0x00FF_FFFF,
        }
    }

    /// Append one pixel value in wire order.
    #[inline]
    pub fn write_pixel(self, out: &mut Vec<u8>, value: u32) {
        let value = value & self.mask();
        match self {
            Self::Eight => out.push(value as u8),
            Self::Sixteen => out.extend_from_slice(&(value as u16).to_le_bytes()),
            Self::TwentyFour => out.extend_from_slice(&value.to_le_bytes()[..3]),
        }
    }

    /// Read one pixel value from the front of `bytes`.
    ///
    /// The caller guarantees `bytes.len() >= self.bytes_per_pixel()`.
    #[inline]
    pub fn read_pixel(self, bytes: &[u8]) -> u32 {
        match self {
            Self::Eight => u32::from(bytes[0]),
            Self::Sixteen => u32::from(u16::from_le_bytes([bytes[0], bytes[1]])) & 0x7FFF,
            Self::TwentyFour => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
        }
    }
}

impl TryFrom<u32> for Depth {
    type Error = ConfigError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            24 => Ok(Self::TwentyFour),
            other => Err(ConfigError::UnsupportedDepth(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// PixelFormat
// ---------------------------------------------------------------------------

/// Interpretation of pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit index into the track palette.
    Indexed,
    /// 8-bit index into the implicit 0..255 gray ramp.
    Grayscale,
    /// 16-bit packed RGB, 5 bits per channel.
    Rgb555,
    /// 24-bit packed RGB, 8 bits per channel.
    #[default]
    Rgb888,
}

impl PixelFormat {
    pub const fn depth(self) -> Depth {
        match self {
            Self::Indexed | Self::Grayscale => Depth::Eight,
            Self::Rgb555 => Depth::Sixteen,
            Self::Rgb888 => Depth::TwentyFour,
        }
    }

    /// The format a bare depth implies (8-bit defaults to palette indices).
    pub const fn for_depth(depth: Depth) -> Self {
        match depth {
            Depth::Eight => Self::Indexed,
            Depth::Sixteen => Self::Rgb555,
            Depth::TwentyFour => Self::Rgb888,
        }
    }

    /// Check that this format can be carried at `depth`.
    pub fn check_depth(self, depth: Depth) -> Result<(), ConfigError> {
        if self.depth() == depth {
            Ok(())
        } else {
            Err(ConfigError::DepthMismatch {
                format: self,
                depth,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Channel conversion
// ---------------------------------------------------------------------------

/// Expand RGB-555 to RGB-888 by replicating the top bits of each channel.
#[inline]
pub const fn rgb555_to_rgb888(value: u32) -> u32 {
    let r = (value >> 10) & 0x1F;
    let g = (value >> 5) & 0x1F;
    let b = value & 0x1F;
    (expand5(r) << 16) | (expand5(g) << 8) | expand5(b)
}

#[inline]
const fn expand5(c: u32) -> u32 {
    (c << 3) | (c >> 2)
}

/// Truncate RGB-888 to RGB-555.
///
/// Exact inverse of [`rgb555_to_rgb888`] on its image.
#[inline]
pub const fn rgb888_to_rgb555(value: u32) -> u32 {
    let r = (value >> 19) & 0x1F;
    let g = (value >> 11) & 0x1F;
    let b = (value >> 3) & 0x1F;
    (r << 10) | (g << 5) | b
}

/// Integer luma of an RGB-888 value (weights sum to 256).
#[inline]
pub const fn luma(value: u32) -> u32 {
    let r = (value >> 16) & 0xFF;
    let g = (value >> 8) & 0xFF;
    let b = value & 0xFF;
    (r * 77 + g * 150 + b * 29) >> 8
}

#[inline]
const fn gray_rgb(level: u32) -> u32 {
    (level << 16) | (level << 8) | level
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// 256-entry color table for 8-bit frames, stored as packed `0xRRGGBB`.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    entries: [u32; 256],
}

impl Palette {
    /// Build a palette from RGB triples.
    pub fn from_rgb_triples(triples: &[[u8; 3]; 256]) -> Self {
        let mut entries = [0u32; 256];
        for (entry, &[r, g, b]) in entries.iter_mut().zip(triples.iter()) {
            *entry = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
        }
        Self { entries }
    }

    /// Build a palette from packed `0xRRGGBB` values.
    ///
    /// Missing trailing entries are black; entries past 256 are ignored.
    pub fn from_packed(colors: &[u32]) -> Self {
        let mut entries = [0u32; 256];
        for (entry, &color) in entries.iter_mut().zip(colors) {
            *entry = color & 0x00FF_FFFF;
        }
        Self { entries }
    }

    /// The implicit 0..255 gray ramp.
    pub fn grayscale() -> Self {
        let mut entries = [0u32; 256];
        for (level, entry) in entries.iter_mut().enumerate() {
            *entry = gray_rgb(level as u32);
        }
        Self { entries }
    }

    #[inline]
    pub fn rgb(&self, index: u8) -> u32 {
        self.entries[index as usize]
    }

    /// Index of the entry closest to `rgb` (squared Euclidean distance,
    /// lowest index wins ties).
    pub fn nearest(&self, rgb: u32) -> u8 {
        let channel = |v: u32, shift: u32| ((v >> shift) & 0xFF) as i32;
        let (r, g, b) = (channel(rgb, 16), channel(rgb, 8), channel(rgb, 0));
        let mut best = 0usize;
        let mut best_dist = i32::MAX;
        for (i, &entry) in self.entries.iter().enumerate() {
            let dr = channel(entry, 16) - r;
            let dg = channel(entry, 8) - g;
            let db = channel(entry, 0) - b;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best = i;
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::grayscale()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let distinct = {
            let mut seen = self.entries.to_vec();
            seen.sort_unstable();
            seen.dedup();
            seen.len()
        };
        write!(f, "Palette {{ distinct: {distinct} }}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
