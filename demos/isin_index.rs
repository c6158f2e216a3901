use clap::{Parser, Subcommand, ValueEnum};
use perfmap::{
    FixedKeys, FoldHasher, PerfMap, PerfMapBuilder, PerfMapHasher, PerfMapKeys, SdbmHasher,
};
use std::io::{Error, ErrorKind, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Info(args) => match args.build.family {
            Family::Fold => run_info(&args, FoldHasher::with_seed(args.build.seed)),
            Family::Sdbm => run_info(&args, SdbmHasher),
        },
        Command::Verify(args) => match args.build.family {
            Family::Fold => run_verify(&args, FoldHasher::with_seed(args.build.seed)),
            Family::Sdbm => run_verify(&args, SdbmHasher),
        },
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "perfmap utility for indexing fixed-width key files",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a table from a key file and print its layout summary
    Info(InfoArgs),
    /// Build a table and round-trip every key through it
    Verify(VerifyArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Path to the line-delimited key file, one fixed-width key per line
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Byte length of every key in the file
    #[arg(short, long, default_value_t = 12)]
    record_len: usize,

    /// Hash family to build and probe with
    #[arg(long, value_enum, default_value = "fold")]
    family: Family,

    /// Base seed for the foldhash family
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    /// foldhash, the default family
    Fold,
    /// the multiplicative sdbm family
    Sdbm,
}

#[derive(clap::Args)]
struct InfoArgs {
    #[command(flatten)]
    build: BuildArgs,

    /// Optional keys to resolve against the table
    #[arg(short, long)]
    key: Vec<String>,
}

#[derive(clap::Args)]
struct VerifyArgs {
    #[command(flatten)]
    build: BuildArgs,
}

fn build_table<H: PerfMapHasher>(
    args: &BuildArgs,
    builder: &PerfMapBuilder<H>,
) -> Result<(FixedKeys, PerfMap)> {
    let keys = FixedKeys::from_path(&args.input, args.record_len)?;
    let table = builder
        .build(&keys)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("table build failed: {e}")))?;
    Ok((keys, table))
}

fn run_info<H: PerfMapHasher>(args: &InfoArgs, hasher: H) -> Result<()> {
    let builder = PerfMapBuilder::with_hasher(hasher);
    let (keys, table) = build_table(&args.build, &builder)?;

    let json = serde_json::to_string_pretty(table.info())
        .map_err(|e| Error::other(format!("Failed to format JSON: {e}")))?;
    println!("{json}");

    for probe in &args.key {
        match resolve(&table, &keys, builder.hasher(), probe.as_bytes()) {
            Some(index) => println!("{probe}: index {index}"),
            None => println!("{probe}: not in key set"),
        }
    }
    Ok(())
}

fn run_verify<H: PerfMapHasher>(args: &VerifyArgs, hasher: H) -> Result<()> {
    let builder = PerfMapBuilder::with_hasher(hasher);
    let (keys, table) = build_table(&args.build, &builder)?;

    let mut mismatches = 0usize;
    for i in 0..keys.len() {
        let index = table.lookup(keys.key(i), builder.hasher()) as usize;
        if keys.key(index) != keys.key(i) {
            eprintln!("mismatch: key {i} resolved to index {index}");
            mismatches += 1;
        }
    }
    println!("{} keys verified, {} mismatches", keys.len(), mismatches);
    if mismatches > 0 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{mismatches} keys failed to round-trip"),
        ));
    }
    Ok(())
}

/// Lookup plus the mandatory membership check: the table maps absent probes
/// to arbitrary in-range indices, so only a key comparison confirms a hit.
fn resolve<H: PerfMapHasher>(
    table: &PerfMap,
    keys: &FixedKeys,
    hasher: &H,
    probe: &[u8],
) -> Option<u32> {
    if table.is_empty() || probe.len() != keys.record_len() {
        return None;
    }
    let index = table.lookup(probe, hasher);
    (keys.key(index as usize) == probe).then_some(index)
}
