use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use zeroize::Zeroize;

use crate::error::CoreError;

/// Scoped signing-key capability.
///
/// Wraps the raw secp256k1 key bytes. Not `Clone`, zeroized on drop, and
/// redacted in debug output. Callers hand it to the orchestrator for the
/// duration of a single submission; nothing retains it past the call and it
/// must never be logged or echoed back.
pub struct SigningKeySecret {
    bytes: [u8; 32],
}

impl SigningKeySecret {
    /// Wrap raw key bytes, validating they form a usable secp256k1 key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CoreError> {
        PrivateKeySigner::from_bytes(&bytes.into())
            .map_err(|e| CoreError::InvalidKey(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// Parse a hex-encoded key, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut decoded = hex::decode(stripped)
            .map_err(|e| CoreError::InvalidKey(format!("invalid hex: {}", e)))?;
        if decoded.len() != 32 {
            let len = decoded.len();
            decoded.zeroize();
            return Err(CoreError::InvalidKey(format!(
                "key must be 32 bytes, got {}",
                len
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        let out = Self::from_bytes(bytes);
        bytes.zeroize();
        out
    }

    /// The EOA address controlled by this key.
    pub fn address(&self) -> Address {
        self.signer().address()
    }

    /// Construct the signer. Valid for the duration of one call.
    pub fn signer(&self) -> PrivateKeySigner {
        // Key bytes were validated at construction.
        PrivateKeySigner::from_bytes(&self.bytes.into())
            .expect("key validated at construction")
    }
}

impl Drop for SigningKeySecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SigningKeySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeySecret(redacted)")
    }
}
