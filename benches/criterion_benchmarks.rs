use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screencodec::codec::{Codec, CodecConfig};
use screencodec::compress::{self, Compression};
use screencodec::frame::{PixelFormat, PixelFrame};
use screencodec::rle;
use std::fs;
use std::path::Path;

const SIZES: [(u32, u32); 3] = [(320, 200), (800, 600), (1280, 720)];

const FORMATS: [PixelFormat; 3] = [
    PixelFormat::Grayscale,
    PixelFormat::Rgb555,
    PixelFormat::Rgb888,
];

/// Desktop-like frame: long flat spans drawn from a small palette of colors.
fn gen_screen(width: u32, height: u32, format: PixelFormat, seed: u64) -> PixelFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let mask = format.depth().mask();
    let mut current = 0u32;
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for _ in 0..width * height {
        if rng.random_bool(1.0 / 24.0) {
            current = rng.random_range(0..16u32) * 0x0011_1111;
        }
        pixels.push(current & mask);
    }
    PixelFrame::from_pixels(width, height, format, pixels).unwrap()
}

/// Paint `windows` rectangles, roughly what a cursor blink or a redrawn
/// widget changes between two captures.
fn mutate(frame: &PixelFrame, windows: u32, seed: u64) -> PixelFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = frame.clone();
    let mask = frame.depth().mask();
    for _ in 0..windows {
        let x0 = rng.random_range(0..frame.width());
        let y0 = rng.random_range(0..frame.height());
        let value = rng.random::<u32>() & mask;
        for y in y0..(y0 + 24).min(frame.height()) {
            for x in x0..(x0 + 64).min(frame.width()) {
                out.set(x, y, value);
            }
        }
    }
    out
}

fn label(width: u32, height: u32, format: PixelFormat) -> String {
    format!("{width}x{height}/{}bpp", format.depth().bits())
}

fn frame_bytes(frame: &PixelFrame) -> u64 {
    (frame.pixels().len() * frame.depth().bytes_per_pixel()) as u64
}

fn write_ratio_snapshot() {
    let mut csv = String::from("frame,kind,level,raw_bytes,coded_bytes,ratio\n");
    for (w, h) in SIZES {
        for format in FORMATS {
            let frame = gen_screen(w, h, format, 123);
            let next = mutate(&frame, 8, 124);
            let mut key = Vec::new();
            rle::encode_key(&frame, &mut key);
            let mut delta = Vec::new();
            rle::encode_delta(&next, &frame, &mut delta);
            for (kind, opcodes) in [("key", &key), ("delta", &delta)] {
                for level in [0u32, 1, 6, 9] {
                    let payload = compress::wrap(opcodes, &Compression::Zlib { level }).unwrap();
                    let raw = frame_bytes(&frame);
                    csv.push_str(&format!(
                        "{},{kind},{level},{raw},{},{}\n",
                        label(w, h, format),
                        payload.bytes().len(),
                        payload.bytes().len() as f64 / raw as f64
                    ));
                }
            }
        }
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_keyframe_encode(c: &mut Criterion) {
    let mut g = c.benchmark_group("keyframe_encode");
    for (w, h) in SIZES {
        for format in FORMATS {
            let frame = gen_screen(w, h, format, 1);
            let mut out = Vec::with_capacity(rle::max_stream_len(w, h, frame.depth()));
            g.throughput(Throughput::Bytes(frame_bytes(&frame)));
            g.bench_with_input(
                BenchmarkId::from_parameter(label(w, h, format)),
                &frame,
                |b, frame| {
                    b.iter(|| {
                        out.clear();
                        rle::encode_key(black_box(frame), &mut out);
                        black_box(out.len());
                    });
                },
            );
        }
    }
    g.finish();
}

fn bench_delta_encode(c: &mut Criterion) {
    let mut g = c.benchmark_group("delta_encode");
    for (w, h) in SIZES {
        for format in FORMATS {
            let previous = gen_screen(w, h, format, 2);
            let frame = mutate(&previous, 8, 3);
            let mut out = Vec::new();
            g.throughput(Throughput::Bytes(frame_bytes(&frame)));
            g.bench_function(BenchmarkId::from_parameter(label(w, h, format)), |b| {
                b.iter(|| {
                    out.clear();
                    rle::encode_delta(black_box(&frame), black_box(&previous), &mut out);
                    black_box(out.len());
                });
            });
        }
    }
    g.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut g = c.benchmark_group("decode");
    for (w, h) in SIZES {
        let format = PixelFormat::Rgb888;
        let previous = gen_screen(w, h, format, 4);
        let frame = mutate(&previous, 8, 5);
        let mut key = Vec::new();
        rle::encode_key(&frame, &mut key);
        let mut delta = Vec::new();
        rle::encode_delta(&frame, &previous, &mut delta);

        g.throughput(Throughput::Bytes(frame_bytes(&frame)));
        g.bench_function(BenchmarkId::new("key", label(w, h, format)), |b| {
            b.iter(|| {
                let out = rle::decode_key(black_box(&key), w, h, format).unwrap();
                black_box(out);
            });
        });
        g.bench_function(BenchmarkId::new("delta", label(w, h, format)), |b| {
            b.iter(|| {
                let out = rle::decode_delta(black_box(&delta), previous.clone()).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_wrap_vs_level(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("wrap_vs_level");
    let frame = gen_screen(1280, 720, PixelFormat::Rgb888, 6);
    let mut opcodes = Vec::new();
    rle::encode_key(&frame, &mut opcodes);
    g.throughput(Throughput::Bytes(opcodes.len() as u64));
    for level in 0u32..=9 {
        let mode = Compression::Zlib { level };
        g.bench_with_input(BenchmarkId::from_parameter(level), &mode, |b, mode| {
            b.iter(|| {
                let payload = compress::wrap(black_box(&opcodes), mode).unwrap();
                black_box(payload.bytes().len());
            });
        });
    }
    g.finish();
}

fn bench_unwrap(c: &mut Criterion) {
    let mut g = c.benchmark_group("unwrap");
    let frame = gen_screen(1280, 720, PixelFormat::Rgb888, 7);
    let mut opcodes = Vec::new();
    rle::encode_key(&frame, &mut opcodes);
    let limit = rle::max_stream_len(1280, 720, frame.depth());
    let deflated = compress::wrap(&opcodes, &Compression::default()).unwrap();
    g.throughput(Throughput::Bytes(opcodes.len() as u64));

    g.bench_function("deflated", |b| {
        b.iter(|| {
            let out = compress::unwrap(black_box(deflated.bytes()), limit).unwrap();
            black_box(out.bytes().len());
        });
    });
    // Raw payloads still pay for the zlib header probe.
    g.bench_function("raw_probe", |b| {
        b.iter(|| {
            let out = compress::unwrap(black_box(&opcodes), limit).unwrap();
            black_box(out.bytes().len());
        });
    });
    g.finish();
}

fn bench_screen_session(c: &mut Criterion) {
    let mut g = c.benchmark_group("screen_session");
    let scenarios = [
        ("static_desktop", 0u32),
        ("typing", 2),
        ("window_drag", 40),
    ];
    let (w, h) = (1280, 720);
    for (name, windows) in scenarios {
        let base = gen_screen(w, h, PixelFormat::Rgb888, 8);
        let frames: Vec<_> = (0..10u64)
            .scan(base, |frame, i| {
                *frame = mutate(frame, windows, 100 + i);
                Some(frame.clone())
            })
            .collect();
        let config = CodecConfig {
            keyframe_interval: 0,
            ..CodecConfig::new(w, h, PixelFormat::Rgb888)
        };
        g.throughput(Throughput::Bytes(
            frames.iter().map(frame_bytes).sum::<u64>(),
        ));
        g.bench_function(name, |b| {
            b.iter(|| {
                let mut enc = Codec::new();
                enc.configure(config.clone()).unwrap();
                let mut dec = Codec::new();
                dec.configure(config.clone()).unwrap();
                for frame in &frames {
                    let sample = enc.encode(frame).unwrap();
                    black_box(dec.decode(&sample.data, sample.flags).unwrap());
                }
            });
        });
    }
    g.finish();
}

criterion_group!(
    benches,
    bench_keyframe_encode,
    bench_delta_encode,
    bench_decode,
    bench_wrap_vs_level,
    bench_unwrap,
    bench_screen_session
);
criterion_main!(benches);
