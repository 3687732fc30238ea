use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use beamterm::codec::DEFAULT_MAX_DEPTH;
use beamterm::{encode, Decoder, DecoderConfig, Error, Result};
use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "beamterm-cli")]
#[command(about = "Decode and re-encode Erlang External Term Format data")]
struct Cli {
    /// Log decoding details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a term in Erlang syntax.
    Decode(InputArgs),
    /// Print the canonical encoding of a term as hex.
    Reencode(InputArgs),
}

/// Where the term bytes come from. Stdin is read when neither source is given.
#[derive(Args, Debug)]
struct InputArgs {
    /// Term bytes as hex. Whitespace is ignored.
    #[arg(long, conflicts_with = "file")]
    hex: Option<String>,

    /// File holding the raw term bytes.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Deepest nesting accepted.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    hex::decode(&compact).map_err(|e| Error::InvalidInput(format!("bad hex input: {}", e)))
}

fn read_input(args: &InputArgs) -> Result<Vec<u8>> {
    if let Some(text) = &args.hex {
        return parse_hex(text);
    }
    if let Some(path) = &args.file {
        debug!(path = %path.display(), "reading term file");
        return Ok(fs::read(path)?);
    }
    let mut data = Vec::new();
    io::stdin().read_to_end(&mut data)?;
    Ok(data)
}

/// Runs one command and returns the text to print.
fn run(command: &Command) -> Result<String> {
    let (args, reencode) = match command {
        Command::Decode(args) => (args, false),
        Command::Reencode(args) => (args, true),
    };
    let data = read_input(args)?;
    info!(bytes = data.len(), max_depth = args.max_depth, "decoding term");

    let decoder = Decoder::new(DecoderConfig::new().with_max_depth(args.max_depth));
    let value = decoder.decode(Bytes::from(data))?;
    if reencode {
        Ok(hex::encode(encode(&value)?))
    } else {
        Ok(value.to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = run(&cli.command)?;
    println!("{}", output);
    Ok(())
}
