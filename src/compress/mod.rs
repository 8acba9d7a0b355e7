// Optional deflate layer around opcode streams.
//
// - `secondary` Pluggable compressors (zlib, none, custom)
// - `wrapper`   Payload wrapping on encode, zlib-then-raw probing on decode

pub mod secondary;
pub mod wrapper;

pub use secondary::{CompressBackend, Compression, NoCompression, ZlibBackend};
pub use wrapper::{Payload, try_inflate, unwrap, wrap};
