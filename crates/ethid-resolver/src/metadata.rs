//! Universal-Resolver response envelope: errors are data at this boundary.

use serde::{Deserialize, Serialize};

use crate::document::DidDocument;

/// Media type reported for successfully resolved documents.
pub const DID_CONTENT_TYPE: &str = "application/did+ld+json";

/// Error codes the Universal-Resolver convention recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    InvalidDid,
    MethodNotSupported,
    NotFound,
    InternalError,
}

/// Metadata returned alongside (or instead of) a resolved document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
}

/// Outcome of a resolution. Failures ride in the metadata rather than being
/// raised, so API layers can pass the envelope through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub did_document: Option<DidDocument>,
    pub did_resolution_metadata: ResolutionMetadata,
    pub did_document_metadata: serde_json::Value,
}

impl ResolutionResult {
    pub fn success(
        document: DidDocument,
        document_metadata: serde_json::Value,
        duration_ms: u64,
    ) -> Self {
        Self {
            did_document: Some(document),
            did_resolution_metadata: ResolutionMetadata {
                content_type: Some(DID_CONTENT_TYPE.to_string()),
                error: None,
                error_message: None,
                duration_ms,
            },
            did_document_metadata: document_metadata,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            did_document: None,
            did_resolution_metadata: ResolutionMetadata {
                content_type: None,
                error: Some(code),
                error_message: Some(message.into()),
                duration_ms,
            },
            did_document_metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.did_resolution_metadata.error.is_some()
    }
}
