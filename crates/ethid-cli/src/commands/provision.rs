//! `ethid provision` — Attach the VC service descriptors to an identity.

use anyhow::Context as _;
use clap::Args;

use ethid_provision::{InMemoryWalletStore, ProvisionState, VcProvisioner};

use crate::context::CliContext;

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Wallet reference; the signing key comes from ETHID_SIGNING_KEY.
    #[arg(default_value = "default")]
    pub wallet: String,
}

pub async fn run(ctx: &CliContext, args: &ProvisionArgs) -> anyhow::Result<()> {
    let key_hex =
        std::env::var("ETHID_SIGNING_KEY").context("ETHID_SIGNING_KEY is not set")?;
    let mut wallets = InMemoryWalletStore::new();
    wallets.insert(&args.wallet, key_hex);

    let provisioner = VcProvisioner::new(
        ctx.orchestrator()?,
        ctx.resolver()?,
        ctx.config.clone(),
    );
    let result = provisioner
        .provision_for_credentials(&wallets, &args.wallet)
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.state != ProvisionState::Completed {
        anyhow::bail!(
            "provisioning stopped at {}; re-run to resume from the failed step",
            result.state
        );
    }
    Ok(())
}
