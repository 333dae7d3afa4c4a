//! ChainLogs CLI — decode EVM event logs from the command line.
//!
//! # Commands
//! ```text
//! chainlogs decode    --logs <logs.json> --abi <abi.json>... [--abi-dir <dir>] [--signatures <file>]
//! chainlogs register  --abi <abi.json>...
//! chainlogs signature <Name(type,...)> | --abi <abi.json>
//! chainlogs encode    --abi <abi.json> --event <Name> --args '["0x..", "1000"]'
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod abi_dir;
mod cmd_decode;
mod config;

use chainlogs_core::AbiEventDef;
use chainlogs_registry::{parse_abi_json, parse_event_item, SignatureRegistry};

#[derive(Parser)]
#[command(
    name = "chainlogs",
    about = "EVM event log decoder — ChainLogs CLI",
    long_about = "
ChainLogs CLI: decode raw EVM event logs with contract ABIs, falling back to
learned signatures when no ABI is available. Built on alloy-rs.

ENVIRONMENT VARIABLES:
  RUST_LOG    Overrides the configured log filter
",
    version
)]
struct Cli {
    /// YAML config file (scheduler, cache, log sections)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a JSON file of raw logs, grouped by transaction
    Decode {
        /// JSON array of logs: {address, topics, data, transactionHash, logIndex, blockNumber?}
        #[arg(long)]
        logs: PathBuf,
        /// ABI JSON files to register before decoding
        #[arg(long, num_args = 1..)]
        abi: Vec<PathBuf>,
        /// Directory of per-contract `<address>.json` ABIs, fetched for every log address
        #[arg(long)]
        abi_dir: Option<PathBuf>,
        /// Text file of canonical signatures, one per line, for heuristic decoding
        #[arg(long)]
        signatures: Option<PathBuf>,
        /// Worker threads (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Logs per chunk (overrides config)
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register ABI files and report added events, skipped items and collisions
    Register {
        #[arg(long, num_args = 1.., required = true)]
        abi: Vec<PathBuf>,
    },

    /// Print canonical signatures and their topic hashes
    Signature {
        /// Canonical signature text, e.g. "Transfer(address,address,uint256)"
        text: Option<String>,
        /// Print every event signature in this ABI file instead
        #[arg(long, conflicts_with = "text")]
        abi: Option<PathBuf>,
    },

    /// Encode a synthetic log for one event of an ABI
    Encode {
        #[arg(long)]
        abi: PathBuf,
        /// Event name
        #[arg(long)]
        event: String,
        /// JSON array of argument strings in declaration order
        #[arg(long)]
        args: String,
        /// Emitting contract address
        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        address: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::ChainlogsConfig::load(cli.config.as_deref())?;
    chainlogs_observability::init_tracing(&config.log);

    match cli.command {
        Commands::Decode { logs, abi, abi_dir, signatures, concurrency, chunk_size, json } => {
            let mut scheduler = config.scheduler.clone();
            if let Some(n) = concurrency {
                scheduler.concurrency = n;
            }
            if let Some(n) = chunk_size {
                scheduler.chunk_size = n;
            }
            let args = cmd_decode::DecodeArgs {
                logs: &logs,
                abi: &abi,
                abi_dir: abi_dir.as_deref(),
                signatures: signatures.as_deref(),
                scheduler,
                cache: config.cache.clone(),
                json,
            };
            cmd_decode::run(args).await
        }

        Commands::Register { abi } => cmd_register(&abi),

        Commands::Signature { text, abi } => match (text, abi) {
            (Some(text), None) => cmd_signature_text(&text),
            (None, Some(abi)) => cmd_signature_abi(&abi),
            _ => bail!("pass either a signature or --abi <file>"),
        },

        Commands::Encode { abi, event, args, address } => cmd_encode(&abi, &event, &args, &address),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

/// Register every ABI file into `registry`, printing a line per file.
pub(crate) fn load_abi_files(registry: &SignatureRegistry, files: &[PathBuf]) -> Result<()> {
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading ABI '{}'", path.display()))?;
        let items =
            parse_abi_json(&text).with_context(|| format!("parsing ABI '{}'", path.display()))?;
        let report = registry.register(&items);
        eprintln!(
            "{}: {} events added, {} items skipped, {} collisions",
            path.display(),
            report.added.len(),
            report.skipped.len(),
            report.collisions.len()
        );
    }
    Ok(())
}

fn cmd_register(files: &[PathBuf]) -> Result<()> {
    let registry = SignatureRegistry::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading ABI '{}'", path.display()))?;
        let items =
            parse_abi_json(&text).with_context(|| format!("parsing ABI '{}'", path.display()))?;
        let report = registry.register(&items);

        println!("{}", path.display());
        for hash in &report.added {
            if let Some(event) = registry.lookup(hash) {
                println!("  + {}  {}", hash, event.signature);
            }
        }
        for err in &report.skipped {
            println!("  ! {err}");
        }
        for c in &report.collisions {
            println!(
                "  ~ {} {:?}: kept {}, ignored {}",
                c.hash,
                c.kind,
                c.kept,
                c.ignored.canonical_signature()
            );
        }
    }
    println!();
    println!("{} event signatures registered", registry.len());
    Ok(())
}

fn cmd_signature_text(text: &str) -> Result<()> {
    let (name, types) = chainlogs_evm::parse_signature(text)
        .ok_or_else(|| anyhow!("'{text}' is not of the form Name(type,...)"))?;
    let canonical = format!("{name}({})", types.join(","));
    println!("{}  {}", chainlogs_evm::keccak256_signature(&canonical), canonical);
    Ok(())
}

fn cmd_signature_abi(path: &Path) -> Result<()> {
    for def in read_event_defs(path)? {
        println!(
            "{}  {}",
            chainlogs_evm::event_signature_hash(&def),
            def.canonical_signature()
        );
    }
    Ok(())
}

fn cmd_encode(abi: &Path, event: &str, args: &str, address: &str) -> Result<()> {
    let def = read_event_defs(abi)?
        .into_iter()
        .find(|d| d.name == event)
        .ok_or_else(|| anyhow!("event '{event}' not found in '{}'", abi.display()))?;

    let args: Vec<String> =
        serde_json::from_str(args).context("--args must be a JSON array of strings")?;
    if args.len() != def.inputs.len() {
        bail!(
            "{} takes {} arguments, got {}",
            def.canonical_signature(),
            def.inputs.len(),
            args.len()
        );
    }

    let values = def
        .inputs
        .iter()
        .zip(&args)
        .map(|(param, arg)| {
            let ty = chainlogs_evm::abi_type::resolve(&param.ty)?;
            ty.coerce_str(arg)
                .map_err(|e| anyhow!("argument '{}' ({}): {e}", param.name, param.ty))
        })
        .collect::<Result<Vec<_>>>()?;

    let address = address.parse().context("invalid --address")?;
    let log =
        chainlogs_evm::encode_log(&def, &values)?.into_raw_log(address, Default::default(), 0);
    println!("{}", serde_json::to_string_pretty(&log)?);
    Ok(())
}

fn read_event_defs(path: &Path) -> Result<Vec<AbiEventDef>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading ABI '{}'", path.display()))?;
    let items = parse_abi_json(&text)?;
    let mut defs = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match parse_event_item(index, item) {
            Ok(Some(def)) => defs.push(def),
            Ok(None) => {}
            Err(e) => eprintln!("skipping: {e}"),
        }
    }
    Ok(defs)
}
