use std::fmt;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default attribute-key prefix for service descriptors.
pub const SERVICE_KEY_PREFIX: &str = "did/svc/";
/// Default attribute-key prefix for published public keys.
pub const PUBLIC_KEY_PREFIX: &str = "did/pub/";

/// Delegate types understood by the registry.
///
/// `sigAuth` delegates gain an authentication reference in the resolved
/// document, `veriKey` delegates an assertion reference. Anything else is
/// recorded on chain but ignored at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelegateType {
    SigAuth,
    VeriKey,
    Other(String),
}

impl DelegateType {
    /// The on-chain string form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SigAuth => "sigAuth",
            Self::VeriKey => "veriKey",
            Self::Other(s) => s,
        }
    }

    /// Parse the on-chain string form.
    pub fn parse(s: &str) -> Self {
        match s {
            "sigAuth" => Self::SigAuth,
            "veriKey" => Self::VeriKey,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DelegateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mutation of an identity's registry entry.
///
/// Revocation carries no validity on purpose: it takes effect immediately
/// rather than opening a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityMutation {
    /// Assert an attribute (service descriptor or published key) for
    /// `validity_secs` seconds from inclusion.
    SetAttribute {
        key: String,
        value: String,
        validity_secs: u64,
    },
    /// Grant a delegate for `validity_secs` seconds from inclusion.
    AddDelegate {
        delegate_type: DelegateType,
        delegate: Address,
        validity_secs: u64,
    },
    /// Revoke a delegate immediately.
    RevokeDelegate {
        delegate_type: DelegateType,
        delegate: Address,
    },
}

impl IdentityMutation {
    /// Check the mutation is well-formed before encoding.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::SetAttribute {
                key,
                value,
                validity_secs,
            } => {
                if key.is_empty() {
                    return Err(CoreError::MissingField("key".into()));
                }
                if value.is_empty() {
                    return Err(CoreError::MissingField("value".into()));
                }
                if *validity_secs < 1 {
                    return Err(CoreError::Validation(
                        "validity must be at least 1 second".into(),
                    ));
                }
            }
            Self::AddDelegate { validity_secs, .. } => {
                if *validity_secs < 1 {
                    return Err(CoreError::Validation(
                        "validity must be at least 1 second".into(),
                    ));
                }
            }
            Self::RevokeDelegate { .. } => {}
        }
        Ok(())
    }

    /// Registry operation name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetAttribute { .. } => "setAttribute",
            Self::AddDelegate { .. } => "addDelegate",
            Self::RevokeDelegate { .. } => "revokeDelegate",
        }
    }
}

/// Parsed form of a `did/pub/<type>/<purpose>/<encoding>` attribute key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeySpec {
    pub key_type: String,
    pub purpose: String,
    pub encoding: String,
}

/// Extract the service name from a `did/svc/<name>` key.
pub fn service_name_of<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}

/// Parse a `did/pub/<type>/<purpose>/<encoding>` key.
pub fn public_key_spec_of(key: &str, prefix: &str) -> Option<PublicKeySpec> {
    let rest = key.strip_prefix(prefix)?;
    let mut segments = rest.split('/');
    let key_type = segments.next()?;
    let purpose = segments.next()?;
    let encoding = segments.next()?;
    if key_type.is_empty() || purpose.is_empty() || encoding.is_empty() || segments.next().is_some()
    {
        return None;
    }
    Some(PublicKeySpec {
        key_type: key_type.to_string(),
        purpose: purpose.to_string(),
        encoding: encoding.to_string(),
    })
}
