use screencodec::codec::{Codec, CodecConfig};
use screencodec::frame::{Palette, PixelFormat, Raster, RasterMut};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (160u32, 100u32);
    let config = CodecConfig {
        keyframe_interval: 10,
        palette: Some(Palette::grayscale()),
        ..CodecConfig::new(width, height, PixelFormat::Indexed)
    };

    let mut encoder = Codec::new();
    encoder.configure(config.clone())?;
    let mut decoder = Codec::new();
    decoder.configure(config)?;

    // Top-down 8-bit capture buffer with a cursor sweeping across it.
    let mut capture = vec![0x20u8; (width * height) as usize];
    let mut rgb = vec![0u32; capture.len()];
    let mut total = 0usize;

    for i in 0..25u32 {
        let (cx, cy) = (i * 6 % width, i * 4 % height);
        for y in cy..(cy + 8).min(height) {
            for x in cx..(cx + 4).min(width) {
                capture[(y * width + x) as usize] = 0xFF;
            }
        }

        let sample = encoder.encode_raster(&Raster::new(&capture, width, height)?)?;
        total += sample.data.len();
        decoder.decode_rgb(
            &sample.data,
            sample.flags,
            &mut RasterMut::new(&mut rgb, width, height)?,
        )?;
        println!(
            "frame {i:2}: {:5} bytes {}",
            sample.data.len(),
            if sample.is_keyframe() { "key" } else { "delta" }
        );
    }

    let raw = capture.len() * 25;
    println!("{total} bytes coded for {raw} bytes captured");
    Ok(())
}
