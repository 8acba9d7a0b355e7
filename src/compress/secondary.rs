// Pluggable byte-stream compressors for opcode payloads.
//
// The on-disk format only knows zlib, so that is the one real backend.
// `NoCompression` keeps every payload raw, and custom backends can be
// plugged in through the trait (decoding still only probes for zlib).

use std::io;
use std::sync::Arc;

use crate::error::DecodeError;

/// Payloads shorter than this are never worth the zlib framing overhead.
const MIN_COMPRESS_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// CompressBackend trait
// ---------------------------------------------------------------------------

/// A lossless compressor applied to a whole opcode stream.
///
/// # Implementing a custom backend
///
/// ```no_run
/// use screencodec::compress::secondary::CompressBackend;
/// use screencodec::error::DecodeError;
///
/// struct Identity;
///
/// impl CompressBackend for Identity {
///     fn name(&self) -> &'static str { "identity" }
///     fn compress(&self, data: &[u8]) -> std::io::Result<Vec<u8>> {
///         Ok(data.to_vec())
///     }
///     fn decompress(&self, data: &[u8], _limit: usize) -> Result<Vec<u8>, DecodeError> {
///         Ok(data.to_vec())
///     }
/// }
/// ```
pub trait CompressBackend: Send + Sync {
    /// Short name used in logs and CLI stats.
    fn name(&self) -> &'static str;

    /// Compress an opcode stream.
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;

    /// Decompress at most `limit` bytes; more output is an error.
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError>;

    /// Whether a stream is worth compressing. Default: skip if < 32 bytes.
    fn should_compress(&self, data: &[u8]) -> bool {
        data.len() >= MIN_COMPRESS_SIZE
    }
}

// ---------------------------------------------------------------------------
// Zlib backend
// ---------------------------------------------------------------------------

/// Zlib (deflate + zlib header + Adler-32) compressor.
#[derive(Debug, Clone, Copy)]
pub struct ZlibBackend {
    level: flate2::Compression,
}

impl ZlibBackend {
    /// Create a Zlib backend with the given compression level (0-9).
    pub fn new(level: u32) -> Self {
        Self {
            level: flate2::Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibBackend {
    fn default() -> Self {
        Self::new(6)
    }
}

impl CompressBackend for ZlibBackend {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        use flate2::write::ZlibEncoder;
        use io::Write;

        let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
        use flate2::{Decompress, FlushDecompress, Status};

        let mut inflater = Decompress::new(true);
        let mut output = Vec::with_capacity(limit.min(data.len().saturating_mul(8) + 64) + 1);
        loop {
            let consumed = inflater.total_in() as usize;
            let status = inflater
                .decompress_vec(&data[consumed..], &mut output, FlushDecompress::Finish)
                .map_err(|e| DecodeError::Compression(format!("zlib decompression failed: {e}")))?;
            if output.len() > limit {
                return Err(DecodeError::PayloadTooLarge { limit });
            }
            match status {
                Status::StreamEnd => return Ok(output),
                _ if output.len() == output.capacity() => {
                    let grow = output.len().min(limit - output.len()).max(64);
                    output.reserve(grow);
                }
                _ => {
                    return Err(DecodeError::Compression(
                        "zlib stream ends before its final block".into(),
                    ));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// No-compression backend
// ---------------------------------------------------------------------------

/// Passthrough "compressor": every payload stays raw.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl CompressBackend for NoCompression {
    fn name(&self) -> &'static str {
        "none"
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8], _limit: usize) -> Result<Vec<u8>, DecodeError> {
        Ok(data.to_vec())
    }

    fn should_compress(&self, _data: &[u8]) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// The compression applied to encoded opcode streams.
#[derive(Clone)]
pub enum Compression {
    /// Emit opcode streams raw.
    None,
    /// Zlib at the given level (0-9).
    Zlib { level: u32 },
    /// A custom backend provided by the caller.
    Custom(Arc<dyn CompressBackend>),
}

impl Default for Compression {
    fn default() -> Self {
        Self::Zlib { level: 6 }
    }
}

impl std::fmt::Debug for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Zlib { level } => write!(f, "Zlib {{ level: {level} }}"),
            Self::Custom(b) => write!(f, "Custom({})", b.name()),
        }
    }
}

impl Compression {
    /// Return the backend implementation, or `None` for no compression.
    pub fn backend(&self) -> Option<Box<dyn CompressBackend>> {
        match self {
            Self::None => None,
            Self::Zlib { level } => Some(Box::new(ZlibBackend::new(*level))),
            Self::Custom(b) => Some(Box::new(ArcBackend(b.clone()))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Wrapper to make `Arc<dyn CompressBackend>` implement `CompressBackend`.
struct ArcBackend(Arc<dyn CompressBackend>);

impl CompressBackend for ArcBackend {
    fn name(&self) -> &'static str {
        self.0.name()
    }
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.0.compress(data)
    }
    fn decompress(&self, data: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
        self.0.decompress(data, limit)
    }
    fn should_compress(&self, data: &[u8]) -> bool {
        self.0.should_compress(data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
