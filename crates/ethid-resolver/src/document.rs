//! W3C DID document model. Documents are derived from chain state on every
//! resolution and never stored.

use serde::{Deserialize, Serialize};

/// JSON-LD context for resolved documents.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Method type for keys identified by an Ethereum account.
pub const TYPE_SECP256K1_RECOVERY: &str = "EcdsaSecp256k1RecoveryMethod2020";

/// Key material, named per its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterial {
    #[serde(rename_all = "camelCase")]
    BlockchainAccountId { blockchain_account_id: String },
    #[serde(rename_all = "camelCase")]
    PublicKeyHex { public_key_hex: String },
    #[serde(rename_all = "camelCase")]
    PublicKeyBase64 { public_key_base64: String },
    #[serde(rename_all = "camelCase")]
    PublicKeyBase58 { public_key_base58: String },
}

/// A verification method in a resolved document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    #[serde(flatten)]
    pub key: KeyMaterial,
}

/// A service endpoint attached to a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub service_endpoint: String,
}

/// A resolved DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub authentication: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assertion_method: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub service: Vec<Service>,
}

impl DidDocument {
    /// Empty document for a subject, context set, everything else to be
    /// filled by the builder.
    pub fn new(id: String) -> Self {
        Self {
            context: vec![DID_CONTEXT.to_string()],
            id,
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            service: Vec::new(),
        }
    }

    /// Find a service entry by its type.
    pub fn service_of_type(&self, service_type: &str) -> Option<&Service> {
        self.service.iter().find(|s| s.service_type == service_type)
    }
}
