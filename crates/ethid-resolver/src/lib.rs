//! ethid Resolver Layer
//!
//! Reconstructs DID documents by replaying registry change history:
//! - Pure event fold (latest-wins supersession, validity filtering)
//! - W3C document model
//! - Universal-Resolver metadata envelope (errors as data)

pub mod aggregate;
pub mod document;
pub mod error;
pub mod metadata;
pub mod resolver;

pub use aggregate::{active_entries, DocumentBuilder};
pub use document::{DidDocument, KeyMaterial, Service, VerificationMethod};
pub use error::ResolutionError;
pub use metadata::{ErrorCode, ResolutionMetadata, ResolutionResult, DID_CONTENT_TYPE};
pub use resolver::{DidResolver, RegistryResolver, Resolved};
