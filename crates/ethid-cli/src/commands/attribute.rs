//! `ethid set-attribute` — Assert an attribute via the gasless pipeline.

use clap::Args;

use ethid_core::IdentityMutation;
use ethid_registry::encode;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct SetAttributeArgs {
    /// Attribute key (e.g. "did/svc/MessagingService"). Keys longer than
    /// 32 bytes are truncated by the registry format.
    pub key: String,

    /// Attribute value (service descriptors are UTF-8 JSON).
    pub value: String,

    /// Validity in seconds; defaults to the configured default.
    #[arg(short, long)]
    pub validity: Option<u64>,
}

pub async fn run(ctx: &CliContext, args: &SetAttributeArgs) -> anyhow::Result<()> {
    let key = ctx.signing_key()?;
    let identity = key.address();

    let mutation = IdentityMutation::SetAttribute {
        key: args.key.clone(),
        value: args.value.clone(),
        validity_secs: args.validity.unwrap_or(ctx.config.default_validity_secs),
    };
    mutation.validate()?;

    let call_data = encode(identity, &mutation);
    let receipt = ctx.orchestrator()?.submit(identity, &key, call_data).await?;

    println!("Attribute set for {}", identity);
    println!("  Transaction: {}", receipt.transaction_hash);
    println!("  Block:       {}", receipt.block_number);
    println!("  Gas used:    {}", receipt.gas_used);
    Ok(())
}
