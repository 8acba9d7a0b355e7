use screencodec::compress::{self, Compression};
use screencodec::frame::{PixelFormat, PixelFrame};
use screencodec::rle;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A 64x16 RGB555 frame: blue background with a red bar.
    let (width, height) = (64, 16);
    let mut previous = PixelFrame::new(width, height, PixelFormat::Rgb555)?;
    previous.fill(0x001F);
    for x in 8..40 {
        previous.set(x, 5, 0x7C00);
    }

    let mut key = Vec::new();
    rle::encode_key(&previous, &mut key);
    let payload = compress::wrap(&key, &Compression::default())?;

    // Move the bar one line down.
    let mut frame = previous.clone();
    for x in 8..40 {
        frame.set(x, 5, 0x001F);
        frame.set(x, 6, 0x7C00);
    }
    let mut delta = Vec::new();
    rle::encode_delta(&frame, &previous, &mut delta);

    let limit = rle::max_stream_len(width, height, frame.depth());
    let opcodes = compress::unwrap(payload.bytes(), limit)?;
    let restored = rle::decode_key(opcodes.bytes(), width, height, PixelFormat::Rgb555)?;
    assert_eq!(restored, previous);
    let restored = rle::decode_delta(&delta, restored)?;
    assert_eq!(restored, frame);

    println!(
        "keyframe {} opcode bytes -> {} payload bytes ({}), delta {} bytes",
        key.len(),
        payload.bytes().len(),
        if payload.is_deflated() { "deflated" } else { "raw" },
        delta.len()
    );
    Ok(())
}
