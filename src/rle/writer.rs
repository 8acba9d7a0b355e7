// Opcode stream writer.
//
// Appends records to a caller-provided buffer so the same allocation can be
// reused across frames. Counts and offsets larger than one record can carry
// are split into several records.

use super::opcode::{END_OF_BITMAP, END_OF_LINE, ESCAPE, MAX_RUN, MAX_SKIP, MIN_LITERAL, SKIP};
use crate::frame::Depth;

/// Appends opcode records for one depth to a byte buffer.
pub struct OpWriter<'a> {
    out: &'a mut Vec<u8>,
    depth: Depth,
}

impl<'a> OpWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>, depth: Depth) -> Self {
        Self { out, depth }
    }

    /// Repeat `pixel` `count` times, split into records of at most 255.
    pub fn run(&mut self, mut count: u32, pixel: u32) {
        while count > 0 {
            let n = count.min(MAX_RUN);
            self.out.push(n as u8);
            self.depth.write_pixel(self.out, pixel);
            count -= n;
        }
    }

    /// Emit runs for a span of pixel values, coalescing equal neighbours.
    pub fn runs(&mut self, pixels: &[u32]) {
        let mut i = 0;
        while i < pixels.len() {
            let value = pixels[i];
            let len = pixels[i..].iter().take_while(|&&p| p == value).count();
            self.run(len as u32, value);
            i += len;
        }
    }

    /// Emit explicit pixels in absolute mode.
    ///
    /// Spans shorter than three pixels cannot be expressed as a literal and
    /// fall back to runs; longer spans are split at 255 pixels.
    pub fn literal(&mut self, pixels: &[u32]) {
        for chunk in pixels.chunks(MAX_RUN as usize) {
            if chunk.len() < MIN_LITERAL as usize {
                self.runs(chunk);
                continue;
            }
            self.out.push(ESCAPE);
            self.out.push(chunk.len() as u8);
            for &p in chunk {
                self.depth.write_pixel(self.out, p);
            }
            if (chunk.len() * self.depth.bytes_per_pixel()) % 2 == 1 {
                self.out.push(0);
            }
        }
    }

    pub fn end_of_line(&mut self) {
        self.out.extend_from_slice(&[ESCAPE, END_OF_LINE]);
    }

    pub fn end_of_bitmap(&mut self) {
        self.out.extend_from_slice(&[ESCAPE, END_OF_BITMAP]);
    }

    /// Advance the cursor by `dx` columns and `dy` lines.
    ///
    /// Nothing is written when both are zero.
    pub fn skip(&mut self, mut dx: u32, mut dy: u32) {
        while dx > 0 || dy > 0 {
            let h = dx.min(MAX_SKIP);
            let v = dy.min(MAX_SKIP);
            self.out.extend_from_slice(&[ESCAPE, SKIP, h as u8, v as u8]);
            dx -= h;
            dy -= v;
        }
    }
}
