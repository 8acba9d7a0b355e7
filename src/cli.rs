// Command-line front end.
//
// Encodes and decodes single raw frames to and from samples, and dumps the
// opcode records of a sample. Frame files carry no header, so geometry is
// always given on the command line.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::compress::{self, Compression};
use crate::frame::{Depth, Palette, PixelFormat};
use crate::io::{self, FrameGeometry};
use crate::rle::{self, OpReader, OpStats};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DEFAULT_LEVEL: u32 = 6;
const DEFAULT_MAX_SIZE: u64 = 64 << 20; // 64 MiB

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

fn parse_depth(s: &str) -> Result<Depth, String> {
    let bits: u32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid depth '{s}': {e}"))?;
    Depth::try_from(bits).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Screen-capture run-length codec.
#[derive(Parser, Debug)]
#[command(
    name = "screencodec",
    version,
    about = "Screen-capture delta/run-length frame encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a raw frame into a sample.
    Encode(EncodeArgs),
    /// Decode a sample into a raw frame.
    Decode(DecodeArgs),
    /// List the opcode records of a sample.
    Dump(DumpArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Indexed,
    Grayscale,
    Rgb555,
    Rgb888,
}

impl From<FormatArg> for PixelFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Indexed => Self::Indexed,
            FormatArg::Grayscale => Self::Grayscale,
            FormatArg::Rgb555 => Self::Rgb555,
            FormatArg::Rgb888 => Self::Rgb888,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CompressionArg {
    None,
    Zlib,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Frame width in pixels.
    #[arg(long, short = 'W', value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Frame height in pixels.
    #[arg(long, short = 'H', value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Bits per pixel (8, 16 or 24); implies the pixel format.
    #[arg(long, short = 'd', value_parser = parse_depth, conflicts_with = "format")]
    depth: Option<Depth>,

    /// Pixel format (default: rgb888).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
}

impl FrameArgs {
    fn geometry(&self) -> FrameGeometry {
        let format = match (self.format, self.depth) {
            (Some(format), _) => format.into(),
            (None, Some(depth)) => PixelFormat::for_depth(depth),
            (None, None) => PixelFormat::default(),
        };
        FrameGeometry::new(self.width, self.height, format)
    }
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// Previous raw frame; encodes a delta against it instead of a keyframe.
    #[arg(long, short = 'p', value_hint = ValueHint::FilePath)]
    previous: Option<PathBuf>,

    /// Stream compression.
    #[arg(long, value_enum, default_value_t = CompressionArg::Zlib)]
    compression: CompressionArg,

    /// Zlib compression level (0-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(0..=9), default_value_t = DEFAULT_LEVEL)]
    level: u32,

    /// Raw input frame.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output sample.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// Previous raw frame; decodes the sample as a delta applied to it.
    #[arg(long, short = 'p', value_hint = ValueHint::FilePath)]
    previous: Option<PathBuf>,

    /// Expand the output to 24-bit RGB.
    #[arg(long)]
    rgb: bool,

    /// Palette file (256 RGB triples) for --rgb on indexed frames.
    #[arg(long, value_hint = ValueHint::FilePath, requires = "rgb")]
    palette: Option<PathBuf>,

    /// Input sample.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Raw output frame.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct DumpArgs {
    /// Bits per pixel of the stream (8, 16 or 24).
    #[arg(long, short = 'd', value_parser = parse_depth, default_value = "24")]
    depth: Depth,

    /// Largest inflated stream to accept (supports K/M/G suffix).
    #[arg(long = "max-size", value_parser = parse_byte_size, default_value_t = DEFAULT_MAX_SIZE)]
    max_size: u64,

    /// Input sample.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Dump,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    geometry: Option<FrameGeometry>,
    depth: Depth,
    compression: Compression,
    rgb: bool,
    max_size: u64,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    previous_file: Option<PathBuf>,
    palette_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        geometry: None,
        depth: Depth::TwentyFour,
        compression: Compression::default(),
        rgb: false,
        max_size: DEFAULT_MAX_SIZE,
        input_file: None,
        output_file: None,
        previous_file: None,
        palette_file: None,
    };

    match cli.command {
        Cmd::Encode(args) => {
            let geometry = args.frame.geometry();
            opts.command = Command::Encode;
            opts.depth = geometry.format.depth();
            opts.geometry = Some(geometry);
            opts.compression = match args.compression {
                CompressionArg::None => Compression::None,
                CompressionArg::Zlib => Compression::Zlib { level: args.level },
            };
            opts.previous_file = args.previous;
            opts.input_file = Some(args.input);
            opts.output_file = Some(args.output);
        }
        Cmd::Decode(args) => {
            let geometry = args.frame.geometry();
            opts.command = Command::Decode;
            opts.depth = geometry.format.depth();
            opts.geometry = Some(geometry);
            opts.rgb = args.rgb;
            opts.previous_file = args.previous;
            opts.palette_file = args.palette;
            opts.input_file = Some(args.input);
            opts.output_file = Some(args.output);
        }
        Cmd::Dump(args) => {
            opts.command = Command::Dump;
            opts.depth = args.depth;
            opts.max_size = args.max_size;
            opts.input_file = Some(args.input);
        }
        Cmd::Config => {}
    }
    opts
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("screencodec version {version} (Rust)");
    eprintln!("DEPTHS=8,16,24");
    eprintln!("FORMATS=indexed,grayscale,rgb555,rgb888");
    eprintln!("COMPRESSION=zlib");
    eprintln!("DEFAULT_LEVEL={DEFAULT_LEVEL}");
    eprintln!("DEFAULT_MAX_SIZE={DEFAULT_MAX_SIZE}");
    eprintln!("MAX_RUN={}", rle::opcode::MAX_RUN);
    eprintln!("MAX_SKIP={}", rle::opcode::MAX_SKIP);
    eprintln!("sizeof(usize)={}", std::mem::size_of::<usize>());
    0
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Returns false (after reporting) if `path` exists and -f was not given.
fn check_output(opts: &Options, path: &Path) -> bool {
    if path.exists() && !opts.force {
        eprintln!(
            "screencodec: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return false;
    }
    true
}

fn required<'a>(path: &'a Option<PathBuf>, what: &str) -> Option<&'a Path> {
    let path = path.as_deref();
    if path.is_none() {
        eprintln!("screencodec: missing {what}");
    }
    path
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let (Some(input), Some(output), Some(geometry)) = (
        required(&opts.input_file, "input file"),
        required(&opts.output_file, "output file"),
        opts.geometry,
    ) else {
        return 1;
    };
    if !check_output(opts, output) {
        return 1;
    }

    let stats = match io::encode_file(
        input,
        opts.previous_file.as_deref(),
        output,
        geometry,
        &opts.compression,
    ) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("screencodec: encode error: {e}");
            return 1;
        }
    };

    let kind = if stats.keyframe { "key" } else { "delta" };
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "screencodec: encoder: {kind} frame, frame size: {}, opcodes: {}, output size: {}{}",
            stats.frame_size,
            stats.opcode_size,
            stats.output_size,
            if stats.deflated { " (deflated)" } else { "" }
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "encode",
            "kind": kind,
            "width": geometry.width,
            "height": geometry.height,
            "depth": geometry.format.depth().bits(),
            "frame_size": stats.frame_size,
            "opcode_size": stats.opcode_size,
            "output_size": stats.output_size,
            "deflated": stats.deflated,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Decode command
// ---------------------------------------------------------------------------

fn cmd_decode(opts: &Options) -> i32 {
    let (Some(input), Some(output), Some(geometry)) = (
        required(&opts.input_file, "input file"),
        required(&opts.output_file, "output file"),
        opts.geometry,
    ) else {
        return 1;
    };
    // Decoding a delta in place over its previous frame is allowed.
    if opts.previous_file.as_deref() != Some(output) && !check_output(opts, output) {
        return 1;
    }

    let palette = match (&opts.palette_file, opts.rgb) {
        (Some(path), _) => match io::read_palette(path) {
            Ok(palette) => Some(palette),
            Err(e) => {
                eprintln!("screencodec: palette file: {}: {e}", path.display());
                return 1;
            }
        },
        (None, true) => {
            if geometry.format == PixelFormat::Indexed {
                log::warn!("no palette given, expanding indices as a gray ramp");
            }
            Some(Palette::default())
        }
        (None, false) => None,
    };

    let stats = match io::decode_file(
        input,
        opts.previous_file.as_deref(),
        output,
        geometry,
        palette.as_ref(),
    ) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("screencodec: decode error: {e}");
            return 1;
        }
    };

    let kind = if stats.keyframe { "key" } else { "delta" };
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "screencodec: decoder: {kind} frame, input size: {}, opcodes: {}, output size: {}",
            stats.input_size, stats.opcode_size, stats.output_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "decode",
            "kind": kind,
            "input_size": stats.input_size,
            "opcode_size": stats.opcode_size,
            "output_size": stats.output_size,
            "deflated": stats.deflated,
            "rgb": opts.rgb,
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Dump command
// ---------------------------------------------------------------------------

fn cmd_dump(opts: &Options) -> i32 {
    let Some(input) = required(&opts.input_file, "input file") else {
        return 1;
    };
    let sample = match std::fs::read(input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("screencodec: input file: {}: {e}", input.display());
            return 1;
        }
    };
    let limit = usize::try_from(opts.max_size).unwrap_or(usize::MAX);
    let payload = match compress::unwrap(&sample, limit) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("screencodec: {e}");
            return 1;
        }
    };
    let opcodes = payload.bytes();

    if !opts.quiet {
        println!(
            "sample: {} bytes, {}, {} opcode bytes, {}-bit",
            sample.len(),
            if payload.is_deflated() { "deflated" } else { "raw" },
            opcodes.len(),
            opts.depth.bits()
        );
        let mut reader = OpReader::new(opcodes, opts.depth);
        loop {
            let offset = reader.position();
            match reader.next() {
                Some(Ok(op)) => println!("{offset:08}  {op}"),
                Some(Err(_)) | None => break,
            }
        }
    }

    let stats = match OpStats::collect(opcodes, opts.depth) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("screencodec: {e}");
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "screencodec: runs: {}, literals: {}, skips: {}, lines: {}, pixels: {}",
            stats.runs, stats.literals, stats.skips, stats.lines, stats.pixels_written
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": "dump",
            "sample_size": sample.len(),
            "deflated": payload.is_deflated(),
            "stream_len": stats.stream_len,
            "runs": stats.runs,
            "literals": stats.literals,
            "skips": stats.skips,
            "lines": stats.lines,
            "pixels_written": stats.pixels_written,
            "terminated": stats.terminated,
        });
        eprintln!("{json:#}");
    }

    if !stats.terminated {
        eprintln!("screencodec: stream has no end-of-bitmap record");
        return 1;
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let default_filter = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let opts = resolve_options(cli);
    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Dump => cmd_dump(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
