// Run-length opcode stream: grammar, reader/writer and the two frame codecs.
//
// # Modules
//
// - `opcode`   Record constants and the `Op` type
// - `writer`   OpWriter: appends records (splitting long runs/skips)
// - `reader`   OpReader: forward-only record iterator, OpStats
// - `decoder`  Cursor machine shared by keyframe and delta decoding
// - `keyframe` Whole-frame encode/decode
// - `delta`    Previous-frame-relative encode/decode

pub mod decoder;
pub mod delta;
pub mod keyframe;
pub mod opcode;
pub mod reader;
pub mod writer;

pub use decoder::FrameKind;
pub use delta::{decode_delta, encode_delta};
pub use keyframe::{decode_key, decode_key_into, encode_key};
pub use opcode::{Op, max_stream_len};
pub use reader::{OpReader, OpStats};
pub use writer::OpWriter;
