//! # Butterfly-profile CLI
//!
//! Command-line interface for the butterfly-profile library.
//! Encodes OpenStreetMap ways, given as JSON lines, into packed edge values.

use anyhow::{Context, Result};
use butterfly_profile::{ProfileOptions, ProfileRegistry};
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

mod cli;

/// Command-line interface for butterfly-profile
#[derive(Parser)]
#[command(name = "butterfly-profile")]
#[command(about = "Rule-composed routing profiles for OpenStreetMap ways")]
#[command(long_about = "Encodes OpenStreetMap ways into packed edge values:
  butterfly-profile encode ways.jsonl out.jsonl     # Encode with the default profile
  butterfly-profile encode - -o speed_bits=5        # Read stdin, write stdout
  butterfly-profile layout --profile reiten         # Show the bit layout
  butterfly-profile profiles                        # List registered profiles

Input lines look like {\"id\": 42, \"tags\": {\"highway\": \"bridleway\"}}")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode JSON-lines ways into edge values
    Encode {
        /// Input file path, or "-" for stdin
        input: String,

        /// Output file path, or "-" for stdout
        #[arg(default_value = "-")]
        output: String,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,

        /// Ways encoded per parallel batch
        #[arg(long, default_value_t = 65536)]
        batch_size: usize,
    },
    /// Print the edge bit layout of a profile as JSON
    Layout {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// List registered profile names
    Profiles,
}

#[derive(clap::Args)]
struct ProfileArgs {
    /// Profile name
    #[arg(short, long, default_value = "reiten")]
    profile: String,

    /// Profile option as key=value (speed_bits, speed_factor, turn_costs,
    /// speed_two_directions, block_private, block_fords)
    #[arg(short = 'o', long = "option", value_parser = cli::parse_option)]
    options: Vec<(String, String)>,
}

impl ProfileArgs {
    fn registry(&self) -> Result<ProfileRegistry> {
        let properties: HashMap<String, String> = self.options.iter().cloned().collect();
        let options = ProfileOptions::from_properties(&properties)?;
        debug!("profile options: {options:?}");
        Ok(ProfileRegistry::with_builtin(&options)?)
    }
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-profile v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    match cli.command {
        Command::Encode {
            input,
            output,
            profile,
            threads,
            batch_size,
        } => encode(&input, &output, &profile, threads, batch_size),
        Command::Layout { profile } => {
            let registry = profile.registry()?;
            let description = registry.get(&profile.profile)?.describe();
            println!("{}", serde_json::to_string_pretty(&description)?);
            Ok(())
        }
        Command::Profiles => {
            let registry = ProfileRegistry::with_builtin(&ProfileOptions::default())?;
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn open_input(input: &str) -> Result<Box<dyn BufRead>> {
    if input == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(input).with_context(|| format!("Failed to open {input}"))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn open_output(output: &str) -> Result<Box<dyn Write>> {
    if output == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(output).with_context(|| format!("Failed to create {output}"))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn encode(
    input: &str,
    output: &str,
    args: &ProfileArgs,
    threads: Option<usize>,
    batch_size: usize,
) -> Result<()> {
    if batch_size == 0 {
        anyhow::bail!("--batch-size must be at least 1");
    }

    let registry = args.registry()?;
    let profile = registry.get(&args.profile)?;

    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker pool")?;
    debug!("encoding with {threads} threads, batches of {batch_size}");

    let reader = open_input(input)?;
    let mut writer = open_output(output)?;
    let progress = (output != "-")
        .then(|| cli::ProgressManager::new(&format!("🐎 Encoding with profile '{}'", profile.name())));

    let mut stats = cli::EncodeStats::default();
    let mut batch = Vec::with_capacity(batch_size);

    let mut flush = |batch: &mut Vec<cli::WayRecord>, writer: &mut Box<dyn Write>| -> Result<()> {
        let records = pool.install(|| cli::encode_batch(&profile, batch))?;
        for record in &records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
        stats.record(&records);
        if let Some(progress) = &progress {
            progress.advance(records.len() as u64);
        }
        batch.clear();
        Ok(())
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {input}"))?;
        if line.trim().is_empty() {
            continue;
        }
        batch.push(cli::parse_line(&line, index + 1)?);
        if batch.len() >= batch_size {
            flush(&mut batch, &mut writer)?;
        }
    }
    if !batch.is_empty() {
        flush(&mut batch, &mut writer)?;
    }
    writer.flush()?;

    if let Some(progress) = &progress {
        progress.finish("✅ Encoding completed!");
    }
    info!(
        "encoded {} ways with profile '{}' ({} blocked)",
        stats.ways,
        profile.name(),
        stats.blocked
    );

    Ok(())
}
