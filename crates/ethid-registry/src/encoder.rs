//! Pure ABI encoding of identity mutations into registry calls.

use alloy::primitives::{Address, Bytes, FixedBytes, U256};
use alloy::sol_types::SolCall;

use ethid_core::mutation::IdentityMutation;

use crate::abi::EthereumDIDRegistry::{addDelegateCall, revokeDelegateCall, setAttributeCall};

/// Pack a human-readable key into the registry's fixed-width name field.
///
/// UTF-8 bytes, right-padded with zeros. Keys longer than 32 bytes are
/// silently truncated — the registry format mandates the width, so callers
/// own keeping keys short.
pub fn to_bytes32(s: &str) -> FixedBytes<32> {
    let mut out = [0u8; 32];
    let bytes = s.as_bytes();
    let n = bytes.len().min(32);
    out[..n].copy_from_slice(&bytes[..n]);
    FixedBytes(out)
}

/// Decode a fixed-width name field back into a string, trailing NULs trimmed.
pub fn bytes32_to_string(b: &[u8; 32]) -> String {
    let end = b.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&b[..end]).into_owned()
}

/// Encode an identity mutation into call data for the registry contract.
///
/// Pure and deterministic: the same mutation always yields identical bytes.
/// Attribute values travel as the raw UTF-8 bytes of the input string;
/// `validity_secs` is passed verbatim (a zero is legal at this layer but
/// meaningless — validation happens upstream).
pub fn encode(identity: Address, mutation: &IdentityMutation) -> Bytes {
    match mutation {
        IdentityMutation::SetAttribute {
            key,
            value,
            validity_secs,
        } => setAttributeCall {
            identity,
            name: to_bytes32(key),
            value: value.as_bytes().to_vec().into(),
            validity: U256::from(*validity_secs),
        }
        .abi_encode()
        .into(),
        IdentityMutation::AddDelegate {
            delegate_type,
            delegate,
            validity_secs,
        } => addDelegateCall {
            identity,
            delegateType: to_bytes32(delegate_type.as_str()),
            delegate: *delegate,
            validity: U256::from(*validity_secs),
        }
        .abi_encode()
        .into(),
        IdentityMutation::RevokeDelegate {
            delegate_type,
            delegate,
        } => revokeDelegateCall {
            identity,
            delegateType: to_bytes32(delegate_type.as_str()),
            delegate: *delegate,
        }
        .abi_encode()
        .into(),
    }
}
