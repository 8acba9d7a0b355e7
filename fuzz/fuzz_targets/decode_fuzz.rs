#![no_main]
use libfuzzer_sys::fuzz_target;
use screencodec::codec::{Codec, CodecConfig, FrameFlags};
use screencodec::frame::{PixelFormat, PixelFrame};
use screencodec::rle::{self, OpStats};

const FORMATS: [PixelFormat; 3] = [
    PixelFormat::Grayscale,
    PixelFormat::Rgb555,
    PixelFormat::Rgb888,
];

fuzz_target!(|data: &[u8]| {
    // First three bytes pick the geometry and depth; the rest is the sample.
    // Decoding must never panic, only return errors.
    if data.len() < 3 {
        return;
    }
    let width = u32::from(data[0] % 64) + 1;
    let height = u32::from(data[1] % 64) + 1;
    let format = FORMATS[usize::from(data[2]) % FORMATS.len()];
    let sample = &data[3..];

    let _ = OpStats::collect(sample, format.depth());
    let _ = rle::decode_key(sample, width, height, format);
    if let Ok(previous) = PixelFrame::new(width, height, format) {
        let _ = rle::decode_delta(sample, previous);
    }

    // Through the adapter, including the zlib probe.
    let mut codec = Codec::new();
    if codec
        .configure(CodecConfig::new(width, height, format))
        .is_err()
    {
        return;
    }
    let _ = codec.decode(sample, FrameFlags::KEYFRAME);
    let _ = codec.decode(sample, FrameFlags::empty());
});
