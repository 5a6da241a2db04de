//! ethid Core
//!
//! Shared types for the ethid stack:
//! - did:ethr identifiers and parsing
//! - Identity mutations (attribute set, delegate add/revoke)
//! - Validity windows and the stack's validity constants
//! - The scoped signing-key capability
//! - Configuration with fail-fast validation

pub mod config;
pub mod did;
pub mod error;
pub mod mutation;
pub mod secret;
pub mod validity;

pub use config::{ChainConfig, EthidConfig, VcServiceConfig};
pub use did::EthrDid;
pub use error::CoreError;
pub use mutation::{DelegateType, IdentityMutation, PublicKeySpec};
pub use secret::SigningKeySecret;
pub use validity::ValidityWindow;
