use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tracemark::pipeline::image_files::{extract_image_file, mark_image_file};
use tracemark::pipeline::video_files::{
    ShardDir, assemble_video_files, decode_video_file, encode_video_file, split_video_file,
};
use tracemark::{
    Alphabet, BlockTextRenderer, CachedRenderer, DEFAULT_PATTERN_CHARS, DecodeOpts, EncodeParams,
    TextRenderer, VelloTextRenderer,
};

#[derive(Parser, Debug)]
#[command(name = "tracemark", version, about = "Per-copy watermarks for images and videos")]
struct Cli {
    /// Show debug information.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide random glyph patterns in an image, one per copy.
    ImageEncode(ImageEncodeArgs),
    /// Recover the hidden pattern of a marked image.
    ImageDecode(ImageDecodeArgs),
    /// Embed per-copy ciphers into an MP4 (requires `ffmpeg` on PATH).
    Encode(EncodeArgs),
    /// Crop the embedded characters back out of an MP4.
    Decode(DecodeArgs),
    /// Cut an MP4 into fixed-size shards.
    Split(SplitArgs),
    /// Join encoded shards and merge their manifests.
    Assemble(AssembleArgs),
}

#[derive(Args, Debug)]
struct Seeded {
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// TrueType/OpenType font. Without one, glyphs are drawn as solid blocks.
    #[arg(short, long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ImageEncodeArgs {
    /// Cover image.
    #[arg(short, long)]
    img: PathBuf,

    /// Output directory.
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Glyphs per secret pattern.
    #[arg(short, long, default_value_t = DEFAULT_PATTERN_CHARS)]
    words: usize,

    /// Number of copies.
    #[arg(short, long, default_value_t = 1)]
    copy: usize,

    #[command(flatten)]
    seeded: Seeded,
}

#[derive(Parser, Debug)]
struct ImageDecodeArgs {
    /// Marked image.
    #[arg(short, long)]
    img: PathBuf,

    /// Output directory; the pattern is written to `extract.png`.
    #[arg(short, long, default_value = ".")]
    path: PathBuf,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input MP4.
    input: PathBuf,

    /// Cipher length (payload frames).
    #[arg(short, long, default_value_t = 10)]
    length: usize,

    /// Locations per payload frame.
    #[arg(short = 'k', long, default_value_t = 1)]
    locations: usize,

    /// Alphabet: digits, en, jp, symbol, or custom:<chars>.
    #[arg(short = 'y', long, default_value = "en")]
    symbol: Alphabet,

    /// Font size in pixels.
    #[arg(short, long, default_value_t = 12)]
    size: u32,

    /// Glyph opacity.
    #[arg(long, default_value_t = 120)]
    alpha: u8,

    /// Number of copies.
    #[arg(short, long, default_value_t = 1)]
    copy: usize,

    /// Output directory.
    #[arg(short, long, default_value = "./output/")]
    output: PathBuf,

    #[command(flatten)]
    seeded: Seeded,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input MP4.
    input: PathBuf,

    /// Manifest produced by `encode` or `assemble`.
    #[arg(short, long)]
    conf: PathBuf,

    /// Index of the input's first frame in the original video.
    #[arg(short, long, default_value_t = 0)]
    start: u64,

    /// Output PNG.
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Convert to greyscale.
    #[arg(long)]
    greyscale: bool,
}

#[derive(Parser, Debug)]
struct SplitArgs {
    /// Input MP4.
    input: PathBuf,

    /// Frames per shard.
    #[arg(short = 'n', long, default_value_t = 100)]
    shard: u64,

    /// Output directory.
    #[arg(short, long, default_value = "./output/")]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct AssembleArgs {
    /// Encoded shard directories, in order.
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output MP4.
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Output manifest.
    #[arg(short, long, default_value = "output.json")]
    conf: PathBuf,

    /// Copy index per shard, comma separated (default: 0 for every shard).
    #[arg(short = 'i', value_delimiter = ',')]
    copies: Vec<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    match cli.cmd {
        Command::ImageEncode(args) => cmd_image_encode(args),
        Command::ImageDecode(args) => cmd_image_decode(args),
        Command::Encode(args) => cmd_encode(args),
        Command::Decode(args) => cmd_decode(args),
        Command::Split(args) => cmd_split(args),
        Command::Assemble(args) => cmd_assemble(args),
    }
}

fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

impl Seeded {
    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn renderer(&self) -> anyhow::Result<Box<dyn TextRenderer>> {
        match &self.font {
            Some(path) => {
                let r = VelloTextRenderer::from_path(path)
                    .with_context(|| format!("load font '{}'", path.display()))?;
                Ok(Box::new(CachedRenderer::new(r)))
            }
            None => {
                tracing::warn!("no font given, drawing glyphs as blocks");
                Ok(Box::new(BlockTextRenderer))
            }
        }
    }
}

fn cmd_image_encode(args: ImageEncodeArgs) -> anyhow::Result<()> {
    let mut renderer = args.seeded.renderer()?;
    let files = mark_image_file(
        &args.img,
        &args.path,
        args.copy,
        args.words,
        renderer.as_mut(),
        &mut args.seeded.rng(),
    )?;
    for f in files {
        eprintln!("wrote {} ({})", f.marked.display(), f.secret.display());
    }
    Ok(())
}

fn cmd_image_decode(args: ImageDecodeArgs) -> anyhow::Result<()> {
    let out = args.path.join("extract.png");
    extract_image_file(&args.img, &out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let params = EncodeParams {
        strength: args.length,
        duplicates: args.locations,
        copies: args.copy,
        font_size: args.size,
        alpha: args.alpha,
        alphabet: args.symbol,
    };
    let mut renderer = args.seeded.renderer()?;
    let out = encode_video_file(
        &args.input,
        &args.output,
        &params,
        renderer.as_mut(),
        &mut args.seeded.rng(),
    )?;
    eprintln!(
        "wrote {} copies to {} ({} problems)",
        out.manifest.ciphers.len(),
        args.output.display(),
        out.problems.len()
    );
    Ok(())
}

fn cmd_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let opts = DecodeOpts {
        frame_start: args.start,
        greyscale: args.greyscale,
    };
    let out = decode_video_file(&args.input, &args.conf, &args.output, &opts)?;
    eprintln!(
        "wrote {} ({} problems)",
        args.output.display(),
        out.problems.len()
    );
    Ok(())
}

fn cmd_split(args: SplitArgs) -> anyhow::Result<()> {
    let out = split_video_file(&args.input, &args.output, args.shard)?;
    eprintln!(
        "wrote {} shards to {} ({} problems)",
        out.shards.len(),
        args.output.display(),
        out.problems.len()
    );
    Ok(())
}

fn cmd_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    if !args.copies.is_empty() && args.copies.len() != args.input.len() {
        anyhow::bail!(
            "-i lists {} copy indices for {} shards",
            args.copies.len(),
            args.input.len()
        );
    }
    let shards: Vec<ShardDir> = args
        .input
        .iter()
        .enumerate()
        .map(|(k, dir)| ShardDir {
            dir: dir.clone(),
            copy: args.copies.get(k).copied().unwrap_or(0),
        })
        .collect();
    let out = assemble_video_files(&shards, &args.output, &args.conf)?;
    eprintln!(
        "wrote {} and {} ({} problems)",
        args.output.display(),
        args.conf.display(),
        out.problems.len()
    );
    Ok(())
}
