use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;
use vitalchain_ledger::{Block, LedgerReader, Validator, Verdict};
use vitalchain_server::{ServerConfig, VitalChainServer};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Verify(args) => cmd_verify(args, &cli.format),
        Command::Config(args) => cmd_config(args, &cli.format),
    }
}

/// File config (or defaults) with the `--bind` override applied.
fn resolve_config(source: &ConfigSource) -> anyhow::Result<ServerConfig> {
    let mut config = match &source.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &source.bind {
        config.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.source)?;
    let server = VitalChainServer::new(config)?;
    let genesis = server
        .ledger()
        .head()
        .context("ledger has no genesis block")?;

    println!(
        "{} VitalChain node on {}",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold()
    );
    println!("  Genesis: {}", genesis.digest().short_hex().cyan());
    if let Some(note) = &server.config().genesis_note {
        println!("  Note: {note}");
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Either the `GET /api/chain` body or a bare array of blocks.
#[derive(Deserialize)]
#[serde(untagged)]
enum ChainExport {
    Wrapped { chain: Vec<Block> },
    Bare(Vec<Block>),
}

fn load_chain(path: &Path) -> anyhow::Result<Vec<Block>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let export: ChainExport = serde_json::from_str(&text)
        .with_context(|| format!("parsing chain export {}", path.display()))?;
    Ok(match export {
        ChainExport::Wrapped { chain } => chain,
        ChainExport::Bare(chain) => chain,
    })
}

fn cmd_verify(args: VerifyArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let blocks = load_chain(&args.file)?;
    let verdict = Validator::verify_blocks(&blocks);

    match (format, verdict) {
        (OutputFormat::Json, Verdict::Valid) => {
            println!("{}", json!({ "valid": true, "length": blocks.len() }));
        }
        (OutputFormat::Json, Verdict::Invalid { position, fault }) => {
            let report = json!({
                "valid": false,
                "length": blocks.len(),
                "position": position,
                "fault": fault,
            });
            println!("{report}");
        }
        (OutputFormat::Text, Verdict::Valid) => {
            println!("{} Chain integrity verified", "✓".green().bold());
            println!("  Blocks: {}", blocks.len().to_string().bold());
            if let Some(head) = blocks.last() {
                println!("  Head: #{} {}", head.position(), head.digest().short_hex().cyan());
            }
        }
        (OutputFormat::Text, Verdict::Invalid { position, fault }) => {
            println!("{} Chain integrity violated", "✗".red().bold());
            println!("  Position: {}", position.to_string().yellow());
            println!("  Fault: {}", fault.to_string().red());
        }
    }

    verdict.into_result()?;
    Ok(())
}

fn cmd_config(args: ConfigArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = resolve_config(&args.source)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
