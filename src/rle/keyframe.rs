// Keyframe codec: a whole frame as runs, one line at a time.

use super::decoder::{self, FrameKind};
use super::writer::OpWriter;
use crate::error::DecodeError;
use crate::frame::{PixelFormat, PixelFrame};

/// Encode `frame` without a reference, appending opcodes to `out`.
///
/// Every scanline, bottom first, becomes maximal runs closed by
/// end-of-line; the frame is closed by end-of-bitmap.
pub fn encode_key(frame: &PixelFrame, out: &mut Vec<u8>) {
    let mut w = OpWriter::new(out, frame.depth());
    for y in 0..frame.height() {
        w.runs(frame.row(y));
        w.end_of_line();
    }
    w.end_of_bitmap();
}

/// Decode a keyframe into a new frame.
pub fn decode_key(
    opcodes: &[u8],
    width: u32,
    height: u32,
    format: PixelFormat,
) -> Result<PixelFrame, DecodeError> {
    let mut frame =
        PixelFrame::new(width, height, format).map_err(|e| DecodeError::DimensionMismatch {
            expected: "non-zero frame dimensions".into(),
            actual: e.to_string(),
        })?;
    decoder::apply(opcodes, &mut frame, FrameKind::Key)?;
    Ok(frame)
}

/// Decode a keyframe over an existing frame, reusing its allocation.
///
/// The frame is cleared first, so nothing of its previous content survives.
pub fn decode_key_into(opcodes: &[u8], frame: &mut PixelFrame) -> Result<(), DecodeError> {
    frame.fill(0);
    decoder::apply(opcodes, frame, FrameKind::Key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, format: PixelFormat, pixels: &[u32]) -> PixelFrame {
        PixelFrame::from_pixels(width, height, format, pixels.to_vec()).unwrap()
    }

    #[test]
    fn black_24bit_frame_vector() {
        let f = PixelFrame::new(8, 5, PixelFormat::Rgb888).unwrap();
        let mut out = Vec::new();
        encode_key(&f, &mut out);

        let mut expected = Vec::new();
        for _ in 0..5 {
            expected.extend_from_slice(&[8, 0, 0, 0, 0, 0]);
        }
        expected.extend_from_slice(&[0, 1]);
        assert_eq!(out, expected);
    }

    #[test]
    fn lines_are_encoded_bottom_first() {
        let f = frame(2, 2, PixelFormat::Grayscale, &[1, 1, 2, 3]);
        let mut out = Vec::new();
        encode_key(&f, &mut out);
        assert_eq!(out, [2, 1, 0, 0, 1, 2, 1, 3, 0, 0, 0, 1]);
    }

    #[test]
    fn roundtrip_each_depth() {
        let cases = [
            (PixelFormat::Indexed, vec![0, 0, 255, 7, 7, 7, 1, 2, 3]),
            (PixelFormat::Rgb555, vec![0x7FFF, 0, 0, 0x1234, 0x1234, 1, 2, 2, 2]),
            (
                PixelFormat::Rgb888,
                vec![0xFFFFFF, 0xFFFFFF, 0, 0x123456, 1, 1, 1, 1, 0xABCDEF],
            ),
        ];
        for (format, pixels) in cases {
            let f = frame(3, 3, format, &pixels);
            let mut out = Vec::new();
            encode_key(&f, &mut out);
            let back = decode_key(&out, 3, 3, format).unwrap();
            assert_eq!(back, f, "{format:?}");
        }
    }

    #[test]
    fn decode_into_clears_previous_content() {
        let f = frame(2, 1, PixelFormat::Grayscale, &[4, 5]);
        let mut out = Vec::new();
        encode_key(&f, &mut out);

        let mut target = frame(2, 1, PixelFormat::Grayscale, &[9, 9]);
        decode_key_into(&out, &mut target).unwrap();
        assert_eq!(target, f);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            decode_key(&[0, 1], 0, 1, PixelFormat::Rgb888),
            Err(DecodeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn truncated_keyframe_rejected() {
        let f = PixelFrame::new(4, 4, PixelFormat::Rgb555).unwrap();
        let mut out = Vec::new();
        encode_key(&f, &mut out);
        // Keep two lines, then end the bitmap.
        let cut = 2 * (1 + 2 + 2);
        let mut short = out[..cut].to_vec();
        short.extend_from_slice(&[0, 1]);
        assert!(matches!(
            decode_key(&short, 4, 4, PixelFormat::Rgb555),
            Err(DecodeError::Truncated { line: 2, height: 4 })
        ));
    }
}
