// Compressed-or-raw payload handling.
//
// Samples carry no flag saying whether their opcode stream was deflated.
// Decoding resolves this by trying the two readings in order: a zlib stream
// first, then the bytes themselves as raw opcodes.

use std::borrow::Cow;
use std::io;

use super::secondary::{CompressBackend, Compression, ZlibBackend};
use crate::error::DecodeError;

/// The two forms a sample payload can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Compressed bytes (encode side) or the inflated opcodes (decode side).
    Deflated(Vec<u8>),
    /// Opcodes carried verbatim.
    Raw(Cow<'a, [u8]>),
}

impl Payload<'_> {
    pub fn is_deflated(&self) -> bool {
        matches!(self, Self::Deflated(_))
    }

    /// The bytes this payload holds.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Deflated(v) => v,
            Self::Raw(b) => b,
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            Self::Deflated(v) => v,
            Self::Raw(b) => b.into_owned(),
        }
    }
}

/// Compress an opcode stream for storage.
///
/// The stream stays raw when compression is disabled, when it is too short
/// for the backend to bother (the two-byte no-change delta, for one) or when
/// compressing does not make it smaller.
pub fn wrap<'a>(opcodes: &'a [u8], compression: &Compression) -> io::Result<Payload<'a>> {
    let Some(backend) = compression.backend() else {
        return Ok(Payload::Raw(Cow::Borrowed(opcodes)));
    };
    if !backend.should_compress(opcodes) {
        return Ok(Payload::Raw(Cow::Borrowed(opcodes)));
    }
    let compressed = backend.compress(opcodes)?;
    if compressed.len() < opcodes.len() {
        Ok(Payload::Deflated(compressed))
    } else {
        Ok(Payload::Raw(Cow::Borrowed(opcodes)))
    }
}

/// Resolve a stored sample into its opcode stream.
///
/// `limit` caps the inflated size (see [`crate::rle::max_stream_len`]).
pub fn unwrap(bytes: &[u8], limit: usize) -> Result<Payload<'_>, DecodeError> {
    match try_inflate(bytes, limit)? {
        Some(opcodes) => Ok(Payload::Deflated(opcodes)),
        None => Ok(Payload::Raw(Cow::Borrowed(bytes))),
    }
}

/// First reading: the bytes are a zlib stream.
///
/// Returns `Ok(None)` when the bytes are not a complete zlib stream,
/// including streams whose header happens to look like one but do not
/// inflate: raw opcodes can start with a valid zlib header pair. An
/// inflated stream larger than `limit` is an error.
pub fn try_inflate(bytes: &[u8], limit: usize) -> Result<Option<Vec<u8>>, DecodeError> {
    if !looks_like_zlib(bytes) {
        return Ok(None);
    }
    match ZlibBackend::default().decompress(bytes, limit) {
        Ok(opcodes) => Ok(Some(opcodes)),
        Err(DecodeError::Compression(msg)) => {
            log::trace!("zlib probe failed, reading payload as raw opcodes: {msg}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// RFC 1950 header check: deflate method, window <= 32K, no preset
/// dictionary, valid FCHECK.
fn looks_like_zlib(bytes: &[u8]) -> bool {
    let [cmf, flg, ..] = *bytes else {
        return false;
    };
    let fcheck = (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0;
    cmf & 0x0F == 8 && cmf >> 4 <= 7 && flg & 0x20 == 0 && fcheck
}
