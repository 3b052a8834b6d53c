// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Weft developer CLI.
//!
//! Thin driver over `weft-core`: create a brain file, feed it training
//! lines, ask for continuations, inspect counters, or sit in a REPL. The
//! CLI is a consumer of the engine's public operations, nothing more.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use weft_core::{Brain, BrainError};

#[derive(Parser)]
#[command(name = "weft", version, about = "Byte-level associative graph engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty brain file.
    Create {
        /// Path of the brain file to create.
        path: PathBuf,
        /// Pin the RNG seed for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train the brain on each line of a corpus file.
    Train {
        /// Path of an existing brain file.
        path: PathBuf,
        /// Text file; every line is ingested as one completed sequence.
        corpus: PathBuf,
        /// How many passes to make over the corpus.
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Prime the brain with a prefix and print the generated continuation.
    Gen {
        /// Path of an existing brain file.
        path: PathBuf,
        /// Prefix bytes used to activate the wave.
        prefix: String,
        /// Upper bound on emitted bytes.
        #[arg(long, default_value_t = weft_core::constants::GENERATE_DEFAULT_MAX)]
        max_bytes: usize,
    },
    /// Print graph counters for a brain file.
    Stats {
        /// Path of an existing brain file.
        path: PathBuf,
    },
    /// Interactive loop: each stdin line is trained, then continued.
    Repl {
        /// Path of an existing brain file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Command::Create { path, seed } => create(path, seed),
        Command::Train {
            path,
            corpus,
            repeat,
        } => train(&path, &corpus, repeat),
        Command::Gen {
            path,
            prefix,
            max_bytes,
        } => gen(&path, &prefix, max_bytes),
        Command::Stats { path } => stats(&path),
        Command::Repl { path } => repl(&path),
    }
}

fn create(path: PathBuf, seed: Option<u64>) -> Result<()> {
    let brain = match seed {
        Some(seed) => Brain::create_seeded(&path, seed),
        None => Brain::create(&path),
    }
    .with_context(|| format!("creating brain at {}", path.display()))?;
    println!("created {}", brain.path().display());
    Ok(())
}

fn train(path: &Path, corpus: &Path, repeat: u32) -> Result<()> {
    let mut brain =
        Brain::load(path).with_context(|| format!("loading brain at {}", path.display()))?;
    let text = fs::read_to_string(corpus)
        .with_context(|| format!("reading corpus at {}", corpus.display()))?;
    let mut sequences = 0u64;
    for _ in 0..repeat {
        for line in text.lines().filter(|l| !l.is_empty()) {
            brain.ingest(line.as_bytes(), true)?;
            sequences += 1;
        }
    }
    brain.save()?;
    let after = brain.stats();
    println!(
        "trained {sequences} sequences: {} nodes, {} edges",
        after.node_count, after.edge_count
    );
    Ok(())
}

fn gen(path: &Path, prefix: &str, max_bytes: usize) -> Result<()> {
    let mut brain =
        Brain::load(path).with_context(|| format!("loading brain at {}", path.display()))?;
    // An independent generation: do not continue whatever wave the last
    // session left behind.
    brain.reset_wave();
    brain.ingest(prefix.as_bytes(), false)?;
    let out = brain.generate(max_bytes)?;
    brain.save()?;
    println!("{}", String::from_utf8_lossy(&out));
    Ok(())
}

fn stats(path: &Path) -> Result<()> {
    let brain =
        Brain::load(path).with_context(|| format!("loading brain at {}", path.display()))?;
    let stats = brain.stats();
    let mut table = Table::new();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec!["nodes".to_string(), stats.node_count.to_string()]);
    table.add_row(vec!["edges".to_string(), stats.edge_count.to_string()]);
    table.add_row(vec![
        "activations".to_string(),
        stats.activations_total.to_string(),
    ]);
    println!("{table}");
    Ok(())
}

fn repl(path: &Path) -> Result<()> {
    let mut brain =
        Brain::load(path).with_context(|| format!("loading brain at {}", path.display()))?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "weft> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        // Train the line as a completed sequence, then re-ingest it as an
        // open prefix to activate the wave for generation.
        brain.ingest(line.as_bytes(), true)?;
        brain.ingest(line.as_bytes(), false)?;
        match brain.generate(weft_core::constants::GENERATE_DEFAULT_MAX) {
            Ok(out) => println!("{}", String::from_utf8_lossy(&out)),
            Err(BrainError::Empty) => println!("(no context)"),
            Err(err) => return Err(err.into()),
        }
    }
    brain.save()?;
    Ok(())
}
