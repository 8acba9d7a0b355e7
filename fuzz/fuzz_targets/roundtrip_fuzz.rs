#![no_main]
use libfuzzer_sys::fuzz_target;
use screencodec::codec::{Codec, CodecConfig};
use screencodec::compress::Compression;
use screencodec::frame::{PixelFormat, PixelFrame};

const FORMATS: [PixelFormat; 3] = [
    PixelFormat::Grayscale,
    PixelFormat::Rgb555,
    PixelFormat::Rgb888,
];

fn frame_from(bytes: &[u8], width: u32, height: u32, format: PixelFormat) -> PixelFrame {
    let len = (width * height) as usize;
    let bpp = format.depth().bytes_per_pixel();
    let pixels = (0..len)
        .map(|i| {
            let mut value = [0u8; 4];
            for (k, slot) in value.iter_mut().take(bpp).enumerate() {
                *slot = bytes.get(i * bpp + k).copied().unwrap_or(0);
            }
            u32::from_le_bytes(value)
        })
        .collect();
    PixelFrame::from_pixels(width, height, format, pixels).unwrap()
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // Control bytes: geometry, depth, and whether to deflate.
    let width = u32::from(data[0] % 48) + 1;
    let height = u32::from(data[1] % 48) + 1;
    let format = FORMATS[usize::from(data[2] & 0x0F) % FORMATS.len()];
    let compression = if data[2] & 0x80 != 0 {
        Compression::Zlib {
            level: u32::from(data[3] % 10),
        }
    } else {
        Compression::None
    };
    let payload = &data[4..];

    // Two frames from the payload halves; the second is a delta on the first.
    let split = payload.len() / 2;
    let first = frame_from(&payload[..split], width, height, format);
    let second = frame_from(&payload[split..], width, height, format);

    let config = CodecConfig {
        keyframe_interval: 0,
        compression,
        ..CodecConfig::new(width, height, format)
    };
    let mut enc = Codec::new();
    enc.configure(config.clone()).unwrap();
    let mut dec = Codec::new();
    dec.configure(config).unwrap();

    for frame in [&first, &second, &second] {
        let sample = enc.encode(frame).unwrap();
        let decoded = dec.decode(&sample.data, sample.flags).unwrap();
        assert_eq!(decoded, frame);
    }
});
