//! ethid Provisioning Layer
//!
//! The VC-provisioning saga: attach credential-repository,
//! revocation-service, and universal-resolver descriptors to an identity as
//! three independently committed gasless mutations, resumable after partial
//! failure. Also home of the wallet-store collaborator boundary.

pub mod error;
pub mod saga;
pub mod wallet;
pub mod workflow;

pub use error::ProvisionError;
pub use saga::{ProvisionEvent, ProvisionState, ProvisionStateMachine, ProvisionStep};
pub use wallet::{InMemoryWalletStore, SigningIdentity, WalletStore};
pub use workflow::{StepOutcome, VcProvisioner, VcProvisioningResult};
