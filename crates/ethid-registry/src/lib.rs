//! ethid Registry Layer
//!
//! Talks ERC-1056:
//! - `sol!`-generated bindings for the registry contract
//! - Pure ABI encoding of identity mutations into registry calls
//! - Decoded change events and the per-identity history walk
//! - An RPC-backed event source behind a mockable trait

pub mod abi;
pub mod client;
pub mod encoder;
pub mod error;
pub mod events;

pub use client::{collect_history, RegistryEventSource, RpcEventSource};
pub use encoder::{bytes32_to_string, encode, to_bytes32};
pub use error::RegistryError;
pub use events::{RegistryEvent, RegistryEventPayload};
