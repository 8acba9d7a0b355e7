// Stateless codec boundary.
//
// The operations a sample pipeline calls with its own top-down buffers, one
// monomorphisation per pixel word (u8 / u16 / u32 for 8 / 16 / 24-bit):
//   - encode a keyframe or a delta into any `Write` sink (raw opcodes)
//   - decode a raw or deflated sample in place into the caller's buffer
//
// Nothing here holds state between calls; the caller's output buffer is the
// reference frame for delta decoding. See `codec` for the stateful adapter.

use std::io::{self, Write};

use crate::compress;
use crate::error::DecodeError;
use crate::frame::{Palette, PixelFrame, PixelWord, Raster, RasterMut};
use crate::rle;

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode `pixels` as a keyframe, writing raw opcodes to `out`.
///
/// Returns the number of bytes written.
pub fn encode_key_depth<P: PixelWord, W: Write>(
    out: &mut W,
    pixels: &Raster<'_, P>,
) -> io::Result<usize> {
    let frame = PixelFrame::from_raster_native(pixels);
    let mut opcodes = Vec::new();
    rle::encode_key(&frame, &mut opcodes);
    out.write_all(&opcodes)?;
    Ok(opcodes.len())
}

/// Encode `pixels` as a delta against `previous`, writing raw opcodes to
/// `out`.
///
/// The two buffers may use different layouts but must have the same width
/// and height (`InvalidInput` otherwise). Returns the number of bytes
/// written.
pub fn encode_delta_depth<P: PixelWord, W: Write>(
    out: &mut W,
    pixels: &Raster<'_, P>,
    previous: &Raster<'_, P>,
) -> io::Result<usize> {
    if (pixels.width(), pixels.height()) != (previous.width(), previous.height()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "delta of a {}x{} frame against a {}x{} frame",
                pixels.width(),
                pixels.height(),
                previous.width(),
                previous.height()
            ),
        ));
    }
    let frame = PixelFrame::from_raster_native(pixels);
    let previous = PixelFrame::from_raster_native(previous);
    let mut opcodes = Vec::new();
    rle::encode_delta(&frame, &previous, &mut opcodes);
    out.write_all(&opcodes)?;
    Ok(opcodes.len())
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode one sample into `output`.
///
/// `input` may be deflated or raw opcodes. For a delta, the current contents
/// of `output` are the previous frame. `output` is written only when the
/// whole sample decodes.
pub fn decode_depth<P: PixelWord>(
    input: &[u8],
    output: &mut RasterMut<'_, P>,
    is_keyframe: bool,
) -> Result<(), DecodeError> {
    let frame = decode_frame(input, output, is_keyframe)?;
    frame.write_raster(output)
}

/// Decode one 8-bit or 16-bit sample and render it as `0xRRGGBB`.
///
/// `reference` holds the frame at its native depth and is updated like
/// [`decode_depth`]'s output; `rgb_out` receives the expansion (8-bit
/// indices through `palette`, RGB-555 through bit replication).
pub fn decode_depth_rgb<P: PixelWord>(
    input: &[u8],
    reference: &mut RasterMut<'_, P>,
    rgb_out: &mut RasterMut<'_, u32>,
    palette: &Palette,
    is_keyframe: bool,
) -> Result<(), DecodeError> {
    if (rgb_out.width(), rgb_out.height()) != (reference.width(), reference.height()) {
        return Err(DecodeError::DimensionMismatch {
            expected: format!("{}x{}", reference.width(), reference.height()),
            actual: format!("{}x{} RGB buffer", rgb_out.width(), rgb_out.height()),
        });
    }
    let frame = decode_frame(input, reference, is_keyframe)?;
    frame.write_raster(reference)?;
    frame.write_rgb_raster(rgb_out, palette)
}

fn decode_frame<P: PixelWord>(
    input: &[u8],
    output: &RasterMut<'_, P>,
    is_keyframe: bool,
) -> Result<PixelFrame, DecodeError> {
    let (width, height) = (output.width(), output.height());
    let payload = compress::unwrap(input, rle::max_stream_len(width, height, P::DEPTH))?;
    let previous = PixelFrame::from_raster_native(&output.as_raster());
    if is_keyframe {
        rle::decode_key(payload.bytes(), width, height, previous.format())
    } else {
        rle::decode_delta(payload.bytes(), previous)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Compression;

    fn key_roundtrip<P: PixelWord + PartialEq + std::fmt::Debug>(pixels: &[P], width: u32) {
        let height = pixels.len() as u32 / width;
        let raster = Raster::new(pixels, width, height).unwrap();
        let mut opcodes = Vec::new();
        let n = encode_key_depth(&mut opcodes, &raster).unwrap();
        assert_eq!(n, opcodes.len());

        let mut out = vec![P::default(); pixels.len()];
        decode_depth(&opcodes, &mut RasterMut::new(&mut out, width, height).unwrap(), true)
            .unwrap();
        assert_eq!(out, pixels);
    }

    #[test]
    fn keyframe_roundtrip_each_word() {
        key_roundtrip(&[1u8, 1, 1, 2, 3, 3, 9, 9, 9, 9, 0, 0], 4);
        key_roundtrip(&[0x7FFFu16, 0x7FFF, 0x0421, 0, 0, 0x1F], 3);
        key_roundtrip(&[0xFF0000u32, 0xFF0000, 0x00FF00, 0x0000FF], 2);
    }

    #[test]
    fn alpha_byte_is_not_channel_data() {
        let pixels = [0xFF12_3456u32, 0x0012_3456];
        let raster = Raster::new(&pixels, 2, 1).unwrap();
        let mut opcodes = Vec::new();
        encode_key_depth(&mut opcodes, &raster).unwrap();
        assert_eq!(opcodes, [2, 0x56, 0x34, 0x12, 0, 0, 0, 1]);
    }

    #[test]
    fn black_frame_vector() {
        let pixels = [0u32; 8 * 5];
        let raster = Raster::new(&pixels, 8, 5).unwrap();
        let mut key = Vec::new();
        encode_key_depth(&mut key, &raster).unwrap();
        assert_eq!(key.len(), 5 * 6 + 2);
        assert_eq!(&key[..6], &[8, 0, 0, 0, 0, 0]);

        let mut delta = Vec::new();
        assert_eq!(encode_delta_depth(&mut delta, &raster, &raster).unwrap(), 2);
        assert_eq!(delta, [0, 1]);
    }

    #[test]
    fn delta_updates_buffer_in_place() {
        // Top-down 4x3; line 2 bottom-up is row 0 top-down.
        let previous = [0u16; 12];
        let mut current = previous;
        current[1] = 0x7C00;
        current[2] = 0x7C00;
        let mut delta = Vec::new();
        encode_delta_depth(
            &mut delta,
            &Raster::new(&current, 4, 3).unwrap(),
            &Raster::new(&previous, 4, 3).unwrap(),
        )
        .unwrap();
        assert_eq!(delta, [0, 2, 1, 2, 2, 0x00, 0x7C, 0, 0, 0, 1]);

        let mut buf = previous;
        decode_depth(&delta, &mut RasterMut::new(&mut buf, 4, 3).unwrap(), false).unwrap();
        assert_eq!(buf, current);
    }

    #[test]
    fn strided_buffers() {
        // 2x2 image inside a 3-wide buffer starting at offset 1.
        let pixels = [0xEEu8, 1, 2, 0xEE, 3, 4, 0xEE];
        let raster = Raster::with_layout(&pixels, 2, 2, 1, 3).unwrap();
        let mut opcodes = Vec::new();
        encode_key_depth(&mut opcodes, &raster).unwrap();

        let mut out = [0xAAu8; 8];
        decode_depth(
            &opcodes,
            &mut RasterMut::with_layout(&mut out, 2, 2, 2, 4).unwrap(),
            true,
        )
        .unwrap();
        assert_eq!(out, [0xAA, 0xAA, 1, 2, 0xAA, 0xAA, 3, 4]);
    }

    #[test]
    fn delta_geometry_mismatch_is_invalid_input() {
        let a = [0u8; 4];
        let b = [0u8; 6];
        let err = encode_delta_depth(
            &mut Vec::new(),
            &Raster::new(&a, 2, 2).unwrap(),
            &Raster::new(&b, 2, 3).unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn deflated_input_is_accepted() {
        let pixels: Vec<u32> = (0..64 * 16).map(|i| (i % 64) / 4 * 0x030201).collect();
        let raster = Raster::new(&pixels, 64, 16).unwrap();
        let mut opcodes = Vec::new();
        encode_key_depth(&mut opcodes, &raster).unwrap();
        let payload = compress::wrap(&opcodes, &Compression::default()).unwrap();
        assert!(payload.is_deflated());

        let mut out = vec![0u32; pixels.len()];
        decode_depth(payload.bytes(), &mut RasterMut::new(&mut out, 64, 16).unwrap(), true)
            .unwrap();
        assert_eq!(out, pixels);
    }

    #[test]
    fn failed_decode_leaves_buffer_untouched() {
        let mut out = [5u8; 4];
        // Ends after one line of a two-line keyframe.
        let err = decode_depth(
            &[2, 9, 0, 0, 0, 1],
            &mut RasterMut::new(&mut out, 2, 2).unwrap(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { line: 1, height: 2 }));
        assert_eq!(out, [5; 4]);
    }

    #[test]
    fn rgb_expansion_of_16_bit() {
        let pixels = [0x7FFFu16, 0x0000, 0x7C00, 0x001F];
        let mut opcodes = Vec::new();
        encode_key_depth(&mut opcodes, &Raster::new(&pixels, 2, 2).unwrap()).unwrap();

        let mut native = [0u16; 4];
        let mut rgb = [0u32; 4];
        decode_depth_rgb(
            &opcodes,
            &mut RasterMut::new(&mut native, 2, 2).unwrap(),
            &mut RasterMut::new(&mut rgb, 2, 2).unwrap(),
            &Palette::default(),
            true,
        )
        .unwrap();
        assert_eq!(native, pixels);
        assert_eq!(rgb, [0xFFFFFF, 0x000000, 0xFF0000, 0x0000FF]);
    }

    #[test]
    fn rgb_expansion_of_8_bit_uses_palette() {
        let palette = Palette::from_packed(&[0x000000, 0xABCDEF]);
        let pixels = [1u8, 0];
        let mut opcodes = Vec::new();
        encode_key_depth(&mut opcodes, &Raster::new(&pixels, 2, 1).unwrap()).unwrap();

        let mut native = [0u8; 2];
        let mut rgb = [0u32; 2];
        decode_depth_rgb(
            &opcodes,
            &mut RasterMut::new(&mut native, 2, 1).unwrap(),
            &mut RasterMut::new(&mut rgb, 2, 1).unwrap(),
            &palette,
            true,
        )
        .unwrap();
        assert_eq!(rgb, [0xABCDEF, 0]);

        let mut small = [0u32; 1];
        assert!(matches!(
            decode_depth_rgb(
                &opcodes,
                &mut RasterMut::new(&mut native, 2, 1).unwrap(),
                &mut RasterMut::new(&mut small, 1, 1).unwrap(),
                &palette,
                true,
            ),
            Err(DecodeError::DimensionMismatch { .. })
        ));
    }
}
