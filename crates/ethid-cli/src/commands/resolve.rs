//! `ethid resolve` — Resolve a DID to its document.

use clap::Args;

use ethid_resolver::DidResolver;

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// The DID to resolve, or a bare identity address on the configured
    /// chain.
    pub did: String,
}

pub async fn run(ctx: &CliContext, args: &ResolveArgs) -> anyhow::Result<()> {
    // A bare address is promoted to a DID on the configured chain.
    let did = if args.did.starts_with("did:") {
        args.did.clone()
    } else {
        format!("did:ethr:{}:{}", ctx.config.chain.name, args.did)
    };

    let resolver = ctx.resolver()?;
    let result = resolver.resolve(&did).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(message) = &result.did_resolution_metadata.error_message {
        anyhow::bail!("resolution failed: {}", message);
    }
    Ok(())
}
