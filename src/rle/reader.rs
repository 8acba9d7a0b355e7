// Forward-only opcode stream reader.
//
// Yields one `Op` per record. The reader never seeks backward and stops for
// good after end-of-bitmap or the first error; trailing bytes after
// end-of-bitmap are never looked at.

use super::opcode::{END_OF_BITMAP, END_OF_LINE, ESCAPE, Op, SKIP};
use crate::error::DecodeError;
use crate::frame::Depth;

pub struct OpReader<'a> {
    data: &'a [u8],
    pos: usize,
    depth: Depth,
    done: bool,
}

impl<'a> OpReader<'a> {
    pub fn new(data: &'a [u8], depth: Depth) -> Self {
        Self {
            data,
            pos: 0,
            depth,
            done: false,
        }
    }

    /// Byte offset of the next record.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEof {
                offset: self.data.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_op(&mut self) -> Result<Option<Op<'a>>, DecodeError> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let bpp = self.depth.bytes_per_pixel();
        let lead = self.take(1)?[0];
        if lead != ESCAPE {
            let pixel = self.depth.read_pixel(self.take(bpp)?);
            return Ok(Some(Op::Run { count: lead, pixel }));
        }

        let op = match self.take(1)?[0] {
            END_OF_LINE => Op::EndOfLine,
            END_OF_BITMAP => Op::EndOfBitmap,
            SKIP => {
                let d = self.take(2)?;
                Op::Skip { dx: d[0], dy: d[1] }
            }
            count => {
                let len = count as usize * bpp;
                let data = self.take(len)?;
                if len % 2 == 1 {
                    self.take(1)?;
                }
                Op::Literal { count, data }
            }
        };
        Ok(Some(op))
    }
}

impl<'a> Iterator for OpReader<'a> {
    type Item = Result<Op<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_op() {
            Ok(Some(op)) => {
                if op == Op::EndOfBitmap {
                    self.done = true;
                }
                Some(Ok(op))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Stream statistics
// ---------------------------------------------------------------------------

/// Record counts of one opcode stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpStats {
    pub runs: u64,
    pub literals: u64,
    pub skips: u64,
    pub lines: u64,
    pub pixels_written: u64,
    /// Bytes up to and including end-of-bitmap.
    pub stream_len: usize,
    pub terminated: bool,
}

impl OpStats {
    /// Walk a whole stream, failing on the first malformed record.
    pub fn collect(data: &[u8], depth: Depth) -> Result<Self, DecodeError> {
        let mut stats = Self::default();
        let mut reader = OpReader::new(data, depth);
        for op in reader.by_ref() {
            let op = op?;
            stats.pixels_written += u64::from(op.pixel_count());
            match op {
                Op::Run { .. } => stats.runs += 1,
                Op::Literal { .. } => stats.literals += 1,
                Op::Skip { .. } => stats.skips += 1,
                Op::EndOfLine => stats.lines += 1,
                Op::EndOfBitmap => stats.terminated = true,
            }
        }
        stats.stream_len = reader.position();
        Ok(stats)
    }
}
