//! `ethid add-delegate` / `ethid revoke-delegate` — Delegate management.

use std::str::FromStr;

use alloy::primitives::Address;
use clap::Args;

use ethid_core::{DelegateType, IdentityMutation};
use ethid_registry::encode;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct AddDelegateArgs {
    /// Delegate type: sigAuth or veriKey.
    pub delegate_type: String,

    /// Delegate address.
    pub delegate: String,

    /// Validity in seconds; defaults to the configured default.
    #[arg(short, long)]
    pub validity: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RevokeDelegateArgs {
    /// Delegate type: sigAuth or veriKey.
    pub delegate_type: String,

    /// Delegate address.
    pub delegate: String,
}

pub async fn run_add(ctx: &CliContext, args: &AddDelegateArgs) -> anyhow::Result<()> {
    let mutation = IdentityMutation::AddDelegate {
        delegate_type: DelegateType::parse(&args.delegate_type),
        delegate: parse_address(&args.delegate)?,
        validity_secs: args.validity.unwrap_or(ctx.config.default_validity_secs),
    };
    submit(ctx, mutation).await
}

pub async fn run_revoke(ctx: &CliContext, args: &RevokeDelegateArgs) -> anyhow::Result<()> {
    let mutation = IdentityMutation::RevokeDelegate {
        delegate_type: DelegateType::parse(&args.delegate_type),
        delegate: parse_address(&args.delegate)?,
    };
    submit(ctx, mutation).await
}

async fn submit(ctx: &CliContext, mutation: IdentityMutation) -> anyhow::Result<()> {
    let key = ctx.signing_key()?;
    let identity = key.address();

    mutation.validate()?;
    let call_data = encode(identity, &mutation);
    let receipt = ctx.orchestrator()?.submit(identity, &key, call_data).await?;

    println!("{} confirmed for {}", mutation.kind(), identity);
    println!("  Transaction: {}", receipt.transaction_hash);
    println!("  Block:       {}", receipt.block_number);
    Ok(())
}

fn parse_address(s: &str) -> anyhow::Result<Address> {
    Address::from_str(s).map_err(|e| anyhow::anyhow!("invalid delegate address '{}': {}", s, e))
}
