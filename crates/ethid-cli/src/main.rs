//! ethid CLI — mutate and resolve registry-anchored DIDs.
//!
//! Subcommands: resolve, set-attribute, add-delegate, revoke-delegate,
//! provision.

mod commands;
mod context;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// ethid — Ethereum-anchored DIDs with gas-sponsored mutations.
#[derive(Parser, Debug)]
#[command(name = "ethid", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, default_value = "ethid.toml")]
    config: std::path::PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a DID to its document.
    Resolve(commands::resolve::ResolveArgs),
    /// Assert an attribute on the signing identity (gasless).
    SetAttribute(commands::attribute::SetAttributeArgs),
    /// Grant a delegate (gasless).
    AddDelegate(commands::delegate::AddDelegateArgs),
    /// Revoke a delegate (gasless).
    RevokeDelegate(commands::delegate::RevokeDelegateArgs),
    /// Attach the VC service descriptors and return the resolved document.
    Provision(commands::provision::ProvisionArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let ctx = context::CliContext::load(&cli.config)?;

    match &cli.command {
        Commands::Resolve(args) => commands::resolve::run(&ctx, args).await,
        Commands::SetAttribute(args) => commands::attribute::run(&ctx, args).await,
        Commands::AddDelegate(args) => commands::delegate::run_add(&ctx, args).await,
        Commands::RevokeDelegate(args) => commands::delegate::run_revoke(&ctx, args).await,
        Commands::Provision(args) => commands::provision::run(&ctx, args).await,
    }
}
