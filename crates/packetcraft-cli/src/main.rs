//! Decodes BITS transmissions and prints their version sum and value.
//!
//! Usage:
//!   packetcraft input.txt
//!   echo D2FE28 | packetcraft --tree
//!   packetcraft --json --max-depth 64 input.txt
//!
//! Every non-empty input line is decoded as its own transmission.

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use packetcraft::{
    Decoded, Decoder, DecoderConfig, checked_evaluate, evaluate, parser::DEFAULT_MAX_DEPTH,
    serde::DecodedDef,
};
use tracing::{Level, debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode and evaluate BITS transmissions")]
struct Args {
    /// File with one hex transmission per line; stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Print each decoded transmission as a JSON object.
    #[arg(long)]
    json: bool,

    /// Also print the expression tree.
    #[arg(long)]
    tree: bool,

    /// Deepest packet nesting to accept.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read transmission from {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read transmission from stdin")?;
            Ok(text)
        }
    }
}

fn render(decoded: &Decoded, json: bool, tree: bool) -> Result<String> {
    if json {
        return serde_json::to_string(&DecodedDef::from(decoded))
            .context("Failed to serialize decoded transmission");
    }

    let value = match checked_evaluate(&decoded.root) {
        Some(value) => value,
        None => {
            warn!("evaluation overflowed 128 bits, reporting the wrapped value");
            evaluate(&decoded.root)
        }
    };

    let mut out = format!("version sum: {}\nvalue: {}", decoded.version_sum, value);
    if tree {
        out.push_str(&format!("\ntree: {}", decoded.root));
    }

    Ok(out)
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(log_level(args.verbose))
        .with_writer(io::stderr)
        .init();

    let text = read_input(args.input.as_deref())?;

    let mut config = DecoderConfig::new();
    config.set_max_depth(args.max_depth);
    let decoder = Decoder::new(config);

    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();
    info!(transmissions = lines.len(), "read input");

    for (index, line) in lines {
        let decoded = decoder
            .decode_hex(line)
            .with_context(|| format!("Failed to decode transmission on line {}", index + 1))?;
        debug!(
            line = index + 1,
            bits_consumed = decoded.bits_consumed,
            padding_bits = decoded.padding_bits,
            packets = decoded.root.packet_count(),
            "decoded"
        );

        println!("{}", render(&decoded, args.json, args.tree)?);
    }

    Ok(())
}
