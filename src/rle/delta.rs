// Delta codec: only the pixels that changed since the previous frame.
//
// Encoding walks lines bottom-up. Unchanged lines emit nothing; the first
// change on a line is reached with one skip whose `dy` counts the lines
// elided since the cursor's line and whose `dx` counts the unchanged leading
// pixels. After end-of-line the cursor sits at column 0 of the next line,
// so adjacent changed lines need no skip at all.

use super::decoder::{self, FrameKind};
use super::writer::OpWriter;
use crate::error::DecodeError;
use crate::frame::PixelFrame;

/// Unchanged spans inside a line at least this long are skipped rather than
/// re-emitted (a skip record costs four bytes).
const MIN_INNER_SKIP: usize = 4;

/// Encode `frame` relative to `previous`, appending opcodes to `out`.
///
/// A frame identical to `previous` encodes to end-of-bitmap alone.
///
/// # Panics
///
/// If the two frames differ in width, height or format.
pub fn encode_delta(frame: &PixelFrame, previous: &PixelFrame, out: &mut Vec<u8>) {
    assert!(
        frame.same_geometry(previous),
        "delta encode of {} against {}",
        frame.describe(),
        previous.describe()
    );
    let mut w = OpWriter::new(out, frame.depth());
    let mut cursor_line = 0u32;

    for y in 0..frame.height() {
        let cur = frame.row(y);
        let prev = previous.row(y);
        let Some(first) = cur.iter().zip(prev).position(|(a, b)| a != b) else {
            continue;
        };
        let end = cur.len()
            - cur
                .iter()
                .rev()
                .zip(prev.iter().rev())
                .take_while(|(a, b)| a == b)
                .count();

        w.skip(first as u32, y - cursor_line);
        encode_changed_span(&mut w, cur, prev, first, end);
        w.end_of_line();
        cursor_line = y + 1;
    }

    w.end_of_bitmap();
}

/// Emit `cur[start..end]`, skipping long unchanged stretches.
///
/// `cur[start]` and `cur[end - 1]` both differ from `prev`.
fn encode_changed_span(w: &mut OpWriter<'_>, cur: &[u32], prev: &[u32], start: usize, end: usize) {
    let mut x = start;
    while x < end {
        let gap = next_long_gap(cur, prev, x, end);
        w.runs(&cur[x..gap]);
        if gap == end {
            break;
        }
        let unchanged = cur[gap..end]
            .iter()
            .zip(&prev[gap..end])
            .take_while(|(a, b)| a == b)
            .count();
        w.skip(unchanged as u32, 0);
        x = gap + unchanged;
    }
}

/// Start of the first unchanged stretch of at least `MIN_INNER_SKIP` pixels
/// in `[from, end)`, or `end` if there is none.
fn next_long_gap(cur: &[u32], prev: &[u32], from: usize, end: usize) -> usize {
    let mut i = from;
    while i < end {
        if cur[i] != prev[i] {
            i += 1;
            continue;
        }
        let gap_start = i;
        while i < end && cur[i] == prev[i] {
            i += 1;
        }
        if i - gap_start >= MIN_INNER_SKIP {
            return gap_start;
        }
    }
    end
}

/// Decode a delta frame by mutating `previous`, which is moved in and
/// handed back as the result.
///
/// Pixels no record touches keep their value from `previous`.
pub fn decode_delta(opcodes: &[u8], mut previous: PixelFrame) -> Result<PixelFrame, DecodeError> {
    decoder::apply(opcodes, &mut previous, FrameKind::Delta)?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;

    fn encode(frame: &PixelFrame, previous: &PixelFrame) -> Vec<u8> {
        let mut out = Vec::new();
        encode_delta(frame, previous, &mut out);
        out
    }

    fn black(width: u32, height: u32) -> PixelFrame {
        PixelFrame::new(width, height, PixelFormat::Rgb888).unwrap()
    }

    #[test]
    fn identical_frame_is_end_of_bitmap_only() {
        let f = black(8, 5);
        assert_eq!(encode(&f, &f), [0, 1]);
    }

    #[test]
    fn white_run_vector() {
        let prev = black(8, 5);
        let mut cur = prev.clone();
        for x in 1..7 {
            cur.set(x, 2, 0xFFFFFF);
        }
        assert_eq!(
            encode(&cur, &prev),
            [0, 2, 1, 2, 6, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1]
        );
        assert_eq!(decode_delta(&encode(&cur, &prev), prev).unwrap(), cur);
    }

    #[test]
    fn adjacent_lines_need_no_skip() {
        let prev = black(4, 4);
        let mut cur = prev.clone();
        cur.set(0, 1, 1);
        cur.set(0, 2, 2);
        let out = encode(&cur, &prev);
        assert_eq!(
            out,
            [0, 2, 0, 1, 1, 1, 0, 0, 0, 0, 1, 2, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn separated_lines_skip_the_gap() {
        let prev = black(4, 6);
        let mut cur = prev.clone();
        cur.set(2, 0, 5);
        cur.set(3, 4, 6);
        let out = encode(&cur, &prev);
        assert_eq!(
            out,
            [
                0, 2, 2, 0, 1, 5, 0, 0, 0, 0, // line 0
                0, 2, 3, 3, 1, 6, 0, 0, 0, 0, // line 4
                0, 1,
            ]
        );
        assert_eq!(decode_delta(&out, prev).unwrap(), cur);
    }

    #[test]
    fn short_inner_gap_is_reemitted() {
        let prev = PixelFrame::new(8, 1, PixelFormat::Grayscale).unwrap();
        let mut cur = prev.clone();
        cur.set(0, 0, 9);
        cur.set(3, 0, 9);
        let out = encode(&cur, &prev);
        // 9, 0, 0, 9 as runs; the two unchanged zeros are written back.
        assert_eq!(out, [1, 9, 2, 0, 1, 9, 0, 0, 0, 1]);
    }

    #[test]
    fn long_inner_gap_is_skipped() {
        let prev = PixelFrame::new(10, 1, PixelFormat::Grayscale).unwrap();
        let mut cur = prev.clone();
        cur.set(0, 0, 9);
        cur.set(6, 0, 8);
        let out = encode(&cur, &prev);
        assert_eq!(out, [1, 9, 0, 2, 5, 0, 1, 8, 0, 0, 0, 1]);
        assert_eq!(decode_delta(&out, prev).unwrap(), cur);
    }

    #[test]
    fn long_vertical_gap_is_split() {
        let prev = PixelFrame::new(2, 300, PixelFormat::Grayscale).unwrap();
        let mut cur = prev.clone();
        cur.set(1, 299, 4);
        let out = encode(&cur, &prev);
        assert_eq!(&out[..8], &[0, 2, 1, 255, 0, 2, 0, 44]);
        assert_eq!(decode_delta(&out, prev).unwrap(), cur);
    }

    #[test]
    fn untouched_pixels_keep_previous_values() {
        let prev = PixelFrame::from_pixels(3, 1, PixelFormat::Rgb555, vec![1, 2, 3]).unwrap();
        let out = [0, 2, 1, 0, 1, 0x55, 0x00, 0, 0, 0, 1];
        let got = decode_delta(&out, prev).unwrap();
        assert_eq!(got.pixels(), &[1, 0x55, 3]);
    }

    #[test]
    #[should_panic(expected = "delta encode")]
    fn geometry_mismatch_panics() {
        encode(&black(2, 2), &black(2, 3));
    }
}
