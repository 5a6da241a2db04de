//! Counterfactual smart-account derivation.

use alloy::primitives::{address, keccak256, Address, B256};

/// Default account factory used for counterfactual derivation (kernel
/// meta-factory).
pub const DEFAULT_ACCOUNT_FACTORY: Address =
    address!("0xd703aaE79538628d27099B8c4f621bE4CCd142d5");

/// Counterfactual smart account bound to a signing key.
///
/// Derivation is CREATE2 over the owner address, so the same key yields the
/// same account address on every call. Resolvers cross-check computed against
/// stored addresses on recovery, which makes this determinism load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartAccount {
    pub owner: Address,
    pub address: Address,
}

impl SmartAccount {
    /// Derive the account for `owner` deployed through `factory`.
    pub fn derive(owner: Address, factory: Address) -> Self {
        let salt = B256::from(owner.into_word());
        let init_code_hash = keccak256([factory.as_slice(), owner.as_slice()].concat());
        let address = factory.create2(salt, init_code_hash);
        Self { owner, address }
    }
}
