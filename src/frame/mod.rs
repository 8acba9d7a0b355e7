// Frame representation and pixel-format handling.
//
// - `format`      Depth, PixelFormat, Palette, wire pixels, channel conversion
// - `pixel_frame` PixelFrame: the codec's bottom-up raster
// - `raster`      Raster/RasterMut: caller-owned top-down buffers

pub mod format;
pub mod pixel_frame;
pub mod raster;

pub use format::{Depth, Palette, PixelFormat, rgb555_to_rgb888, rgb888_to_rgb555};
pub use pixel_frame::PixelFrame;
pub use raster::{PixelWord, Raster, RasterMut};
