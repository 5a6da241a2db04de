use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Network assumed when a DID omits the network segment.
pub const DEFAULT_NETWORK: &str = "mainnet";

/// Decentralized identifier for the `ethr` method.
///
/// Format: `did:ethr:<network>:<address>`. A three-segment DID
/// (`did:ethr:<address>`) is valid and resolves against [`DEFAULT_NETWORK`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EthrDid {
    network: String,
    address: Address,
}

impl EthrDid {
    /// Create a DID for an identity address on the given network.
    pub fn new(network: impl Into<String>, address: Address) -> Self {
        Self {
            network: network.into(),
            address,
        }
    }

    /// Parse a DID string.
    ///
    /// Fewer than 3 colon-delimited segments is malformed input; a method
    /// other than `ethr` is well-formed but unsupported. The two cases map to
    /// distinct errors because resolvers report them under different codes.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() < 3 || parts[0] != "did" {
            return Err(CoreError::InvalidDid(format!(
                "expected did:ethr:[<network>:]<address>, got: {}",
                s
            )));
        }
        if parts[1] != "ethr" {
            return Err(CoreError::MethodNotSupported(parts[1].to_string()));
        }
        let (network, addr_str) = match parts.len() {
            3 => (DEFAULT_NETWORK.to_string(), parts[2]),
            4 => (parts[2].to_string(), parts[3]),
            _ => {
                return Err(CoreError::InvalidDid(format!(
                    "too many segments in DID: {}",
                    s
                )))
            }
        };
        let address = Address::from_str(addr_str)
            .map_err(|e| CoreError::InvalidDid(format!("bad identity address '{}': {}", addr_str, e)))?;
        Ok(Self { network, address })
    }

    /// The on-chain identity address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The network segment.
    pub fn network(&self) -> &str {
        &self.network
    }
}

impl fmt::Display for EthrDid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:ethr:{}:{}", self.network, self.address)
    }
}

impl FromStr for EthrDid {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EthrDid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EthrDid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
