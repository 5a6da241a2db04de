//! ethid Gasless Layer
//!
//! Turns registry calls into confirmed on-chain transactions without the
//! identity holding funds:
//! - Deterministic smart-account derivation from the signing key
//! - User-operation lifecycle (built → sponsored → submitted → included)
//! - Paymaster and bundler collaborator boundaries with JSON-RPC clients
//! - The orchestrator's poll-with-timeout inclusion wait
//! - Retry classification and backoff

pub mod account;
pub mod bundler;
pub mod error;
pub mod orchestrator;
pub mod paymaster;
pub(crate) mod rpc;
pub mod retry;
pub mod user_op;

pub use account::{SmartAccount, DEFAULT_ACCOUNT_FACTORY};
pub use bundler::{Bundler, RpcBundler, SubmitOutcome};
pub use error::TxError;
pub use orchestrator::GaslessOrchestrator;
pub use paymaster::{EntryPointVersion, Paymaster, RpcPaymaster, SponsorshipData};
pub use retry::{retry_with_policy, RetryPolicy};
pub use user_op::{TxReceipt, UserOpHash, UserOpPhase, UserOperation};
