use thiserror::Error;

/// Registry-layer errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// RPC connection or node error.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// A log could not be decoded into a change event.
    #[error("event decode error: {0}")]
    Decode(String),

    #[error("invalid registry address: {0}")]
    InvalidAddress(String),

    #[error("invalid rpc endpoint: {0}")]
    InvalidEndpoint(String),
}

impl RegistryError {
    /// Whether the failure is a transport hiccup worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}
