use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use ero_core::{
    encode_to_vec, read_table, write_table, EroHeader, HeaderLayout, LayoutMode, Reader,
    TextEncoding, Writer,
};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ero",
    about = "Convert between CODE;TEXTE tables and the legacy ERO binary format",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Detect from the bytes at offset 16
    Auto,
    /// 16-byte header: signature + opaque tail
    Minimal,
    /// 52-byte header: signature zone + reserved buffer zone
    Extended,
}

impl std::fmt::Display for LayoutArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutArg::Auto => write!(f, "auto"),
            LayoutArg::Minimal => write!(f, "minimal"),
            LayoutArg::Extended => write!(f, "extended"),
        }
    }
}

impl From<LayoutArg> for LayoutMode {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutMode::Auto,
            LayoutArg::Minimal => LayoutMode::Fixed(HeaderLayout::Minimal),
            LayoutArg::Extended => LayoutMode::Fixed(HeaderLayout::Extended),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a CODE;TEXTE table into an ERO binary
    Encode {
        /// Source table file
        input: PathBuf,
        /// Destination ERO file
        output: PathBuf,
        /// Copy the header verbatim from an existing ERO file
        #[arg(long)]
        header_from: Option<PathBuf>,
        /// Header layout (for the default header, or for reading the reference file)
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Auto)]
        layout: LayoutArg,
    },
    /// Decode an ERO binary back into a CODE;TEXTE table
    Decode {
        /// Source ERO file
        input: PathBuf,
        /// Destination table file
        output: PathBuf,
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Auto)]
        layout: LayoutArg,
    },
    /// Print header bytes and block statistics
    Inspect {
        /// ERO file to inspect
        file: PathBuf,
        /// Print each decoded record and each skipped block
        #[arg(long)]
        records: bool,
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Auto)]
        layout: LayoutArg,
    },
    /// Round-trip check: decode, re-encode with the same header, byte-compare
    Verify {
        /// ERO file to verify
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = LayoutArg::Auto)]
        layout: LayoutArg,
    },
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_encode(
    input: PathBuf,
    output: PathBuf,
    header_from: Option<PathBuf>,
    layout: LayoutArg,
) -> anyhow::Result<()> {
    let (summary, encoding) = read_table(&input)
        .with_context(|| format!("reading table {:?}", input))?;
    if encoding == TextEncoding::Windows1252 {
        tracing::warn!("table {:?} was read under the WINDOWS-1252 fallback", input);
    }

    let header = match &header_from {
        Some(reference) => EroHeader::from_file(reference, layout.into())
            .with_context(|| format!("reading header from {:?}", reference))?,
        // Without a reference file, new files get the current (extended)
        // generation unless the minimal layout is asked for explicitly.
        None => EroHeader::default_for(match layout {
            LayoutArg::Minimal => HeaderLayout::Minimal,
            LayoutArg::Auto | LayoutArg::Extended => HeaderLayout::Extended,
        }),
    };

    let mut writer = Writer::create(&output, &header)
        .with_context(|| format!("creating output file {:?}", output))?;
    for record in &summary.records {
        writer.write_record(record)?;
    }
    let truncated = writer.truncated();
    let blocks = writer.finish()?;

    eprintln!("  layout      : {} ({} bytes)", header.layout(), header.size());
    eprintln!(
        "  header      : {}",
        if header_from.is_some() { "copied from reference" } else { "default" }
    );
    eprintln!("  records     : {}", blocks);
    eprintln!("  skipped     : {} line(s)", summary.skipped.len());
    eprintln!("  truncated   : {} payload(s)", truncated);
    Ok(())
}

fn run_decode(input: PathBuf, output: PathBuf, layout: LayoutArg) -> anyhow::Result<()> {
    let reader = Reader::open(&input, layout.into())
        .with_context(|| format!("opening ERO file {:?}", input))?;
    if reader.trailing_bytes() > 0 {
        tracing::warn!(
            bytes = reader.trailing_bytes(),
            "trailing incomplete block discarded"
        );
    }

    let summary = reader.decode();
    write_table(&output, &summary.records)
        .with_context(|| format!("writing table {:?}", output))?;

    eprintln!("  layout      : {} ({} bytes)", reader.header().layout(), reader.header().size());
    eprintln!("  blocks      : {}", reader.block_count());
    eprintln!("  records     : {}", summary.records.len());
    eprintln!("  skipped     : {} block(s)", summary.skipped.len());
    Ok(())
}

fn run_inspect(file: PathBuf, records: bool, layout: LayoutArg) -> anyhow::Result<()> {
    let reader = Reader::open(&file, layout.into())
        .with_context(|| format!("opening ERO file {:?}", file))?;
    let header = reader.header();
    let summary = reader.decode();

    println!("=== ERO file: {:?} ===", file);
    println!();
    println!("  layout         : {} ({} bytes)", header.layout(), header.size());
    println!("  blocks         : {}", reader.block_count());
    println!("  records        : {}", summary.records.len());
    println!("  skipped        : {}", summary.skipped.len());
    if reader.trailing_bytes() > 0 {
        println!(
            "  trailing       : {} byte(s) of incomplete block, ignored",
            reader.trailing_bytes()
        );
    }
    if header.contains_bom() {
        println!();
        println!("  WARNING: UTF-8 BOM bytes (EF BB BF) present inside the header zone");
    }

    println!();
    println!("  header bytes:");
    hex_dump(header.as_bytes());

    if records {
        println!();
        for record in &summary.records {
            println!("  {};{}", record.code, record.text);
        }
        for (idx, reason) in &summary.skipped {
            println!("  [block {:>4} skipped: {}]", idx, reason.describe());
        }
    }

    Ok(())
}

fn run_verify(file: PathBuf, layout: LayoutArg) -> anyhow::Result<()> {
    let reader = Reader::open(&file, layout.into())
        .with_context(|| format!("opening ERO file {:?}", file))?;
    let summary = reader.decode();
    let reencoded = encode_to_vec(reader.header(), &summary.records);
    let original = fs::read(&file)?;

    if original == reencoded {
        println!(
            "OK: {:?} round-trips byte-exact ({} records, {} bytes)",
            file,
            summary.records.len(),
            original.len()
        );
        return Ok(());
    }

    let limit = original.len().min(reencoded.len());
    let offset = (0..limit)
        .find(|&i| original[i] != reencoded[i])
        .unwrap_or(limit);
    anyhow::bail!(
        "round-trip mismatch at byte offset {} (original {} bytes, re-encoded {} bytes; \
         {} block(s) skipped during decode, {} trailing byte(s))",
        offset,
        original.len(),
        reencoded.len(),
        summary.skipped.len(),
        reader.trailing_bytes()
    )
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn hex_dump(bytes: &[u8]) {
    for (i, chunk) in bytes.chunks(16).enumerate() {
        print!("  {:04x}  ", i * 16);
        for b in chunk {
            print!("{:02x} ", b);
        }
        for _ in chunk.len()..16 {
            print!("   ");
        }
        print!("  |");
        for b in chunk {
            if b.is_ascii_graphic() || *b == b' ' {
                print!("{}", *b as char);
            } else {
                print!(".");
            }
        }
        println!("|");
    }
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Encode {
            input,
            output,
            header_from,
            layout,
        } => run_encode(input, output, header_from, layout),
        Commands::Decode {
            input,
            output,
            layout,
        } => run_decode(input, output, layout),
        Commands::Inspect {
            file,
            records,
            layout,
        } => run_inspect(file, records, layout),
        Commands::Verify { file, layout } => run_verify(file, layout),
    }
}
