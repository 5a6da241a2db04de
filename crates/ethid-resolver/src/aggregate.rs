//! The event fold: registry history in, active document entries out.
//!
//! Resolution is a pure fold over the identity's change log. For each
//! distinct key the latest event supersedes all earlier ones (never merged),
//! then anything outside its validity window is dropped. A revocation is
//! just a superseding event whose window is already closed.

use std::collections::HashMap;

use alloy::primitives::Address;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use ethid_core::mutation::{public_key_spec_of, service_name_of, DelegateType};
use ethid_core::EthrDid;
use ethid_registry::{bytes32_to_string, RegistryEvent, RegistryEventPayload};

use crate::document::{DidDocument, KeyMaterial, Service, VerificationMethod, TYPE_SECP256K1_RECOVERY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SupersessionKey {
    Attribute { name: [u8; 32] },
    Delegate { delegate_type: [u8; 32], delegate: Address },
}

fn supersession_key(event: &RegistryEvent) -> SupersessionKey {
    match &event.payload {
        RegistryEventPayload::AttributeChanged { name, .. } => {
            SupersessionKey::Attribute { name: *name }
        }
        RegistryEventPayload::DelegateChanged {
            delegate_type,
            delegate,
        } => SupersessionKey::Delegate {
            delegate_type: *delegate_type,
            delegate: *delegate,
        },
    }
}

/// Reduce a history (oldest-first) to its active entries at `now`.
///
/// Latest block wins per key; among survivors only open validity windows
/// remain. Survivors come back in block order.
pub fn active_entries(events: &[RegistryEvent], now: u64) -> Vec<&RegistryEvent> {
    let mut latest: HashMap<SupersessionKey, &RegistryEvent> = HashMap::new();
    for event in events {
        let key = supersession_key(event);
        match latest.get(&key) {
            Some(existing) if existing.block_number > event.block_number => {}
            _ => {
                latest.insert(key, event);
            }
        }
    }

    let mut survivors: Vec<&RegistryEvent> = latest
        .into_values()
        .filter(|e| now < e.valid_to)
        .collect();
    survivors.sort_by_key(|e| e.block_number);
    survivors
}

/// Assembles a DID document from active registry entries.
///
/// The implicit controller verification method is synthesized from the
/// identity itself, independent of chain events; an identity with no history
/// still resolves to a valid minimal document.
pub struct DocumentBuilder {
    did: String,
    chain_id: u64,
    service_prefix: String,
    public_key_prefix: String,
    document: DidDocument,
    delegate_count: usize,
}

impl DocumentBuilder {
    pub fn new(did: &EthrDid, chain_id: u64, service_prefix: &str, public_key_prefix: &str) -> Self {
        let subject = did.to_string();
        let mut document = DidDocument::new(subject.clone());

        let controller_id = format!("{}#controller", subject);
        document.verification_method.push(VerificationMethod {
            id: controller_id.clone(),
            method_type: TYPE_SECP256K1_RECOVERY.to_string(),
            controller: subject.clone(),
            key: KeyMaterial::BlockchainAccountId {
                blockchain_account_id: format!("eip155:{}:{}", chain_id, did.address()),
            },
        });
        document.authentication.push(controller_id.clone());
        document.assertion_method.push(controller_id);

        Self {
            did: subject,
            chain_id,
            service_prefix: service_prefix.to_string(),
            public_key_prefix: public_key_prefix.to_string(),
            document,
            delegate_count: 0,
        }
    }

    /// Fold one active entry into the document.
    pub fn apply(&mut self, event: &RegistryEvent) {
        match &event.payload {
            RegistryEventPayload::AttributeChanged { name, value } => {
                self.apply_attribute(&bytes32_to_string(name), value);
            }
            RegistryEventPayload::DelegateChanged {
                delegate_type,
                delegate,
            } => {
                self.apply_delegate(&bytes32_to_string(delegate_type), *delegate);
            }
        }
    }

    pub fn build(self) -> DidDocument {
        self.document
    }

    fn apply_attribute(&mut self, name: &str, value: &[u8]) {
        if let Some(service_name) = service_name_of(name, &self.service_prefix) {
            self.push_service(service_name, value);
        } else if let Some(spec) = public_key_spec_of(name, &self.public_key_prefix) {
            self.push_public_key(&spec.key_type, &spec.purpose, &spec.encoding, value);
        } else {
            tracing::trace!(attribute = name, "ignoring attribute with unknown prefix");
        }
    }

    /// Service descriptor values are the UTF-8 JSON
    /// `{"type": ..., "serviceEndpoint": ...}`; a value that is not JSON is
    /// treated as a bare endpoint.
    fn push_service(&mut self, service_name: &str, value: &[u8]) {
        let raw = String::from_utf8_lossy(value);
        let (service_type, endpoint) = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(descriptor) => {
                let service_type = descriptor
                    .get("type")
                    .and_then(|v| v.as_str())
                    .unwrap_or(service_name)
                    .to_string();
                let endpoint = descriptor
                    .get("serviceEndpoint")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&raw)
                    .to_string();
                (service_type, endpoint)
            }
            Err(_) => (service_name.to_string(), raw.into_owned()),
        };

        self.document.service.push(Service {
            id: format!("{}#{}", self.did, service_name),
            service_type,
            service_endpoint: endpoint,
        });
    }

    fn push_public_key(&mut self, key_type: &str, purpose: &str, encoding: &str, value: &[u8]) {
        let text = String::from_utf8_lossy(value);
        let material = match decode_key_material(encoding, text.trim()) {
            Some(material) => material,
            None => {
                tracing::trace!(
                    encoding = encoding,
                    "dropping public-key attribute with undecodable material"
                );
                return;
            }
        };

        let id = format!("{}#delegate-{}", self.did, self.delegate_count);
        self.delegate_count += 1;
        self.document.verification_method.push(VerificationMethod {
            id: id.clone(),
            method_type: method_type_for(key_type),
            controller: self.did.clone(),
            key: material,
        });

        match purpose {
            "sigAuth" => self.document.authentication.push(id),
            "veriKey" => self.document.assertion_method.push(id),
            // enc and friends publish the key without a relationship.
            _ => {}
        }
    }

    fn apply_delegate(&mut self, delegate_type: &str, delegate: Address) {
        let purpose = DelegateType::parse(delegate_type);
        if matches!(purpose, DelegateType::Other(_)) {
            tracing::trace!(delegate_type = delegate_type, "ignoring unknown delegate type");
            return;
        }

        let id = format!("{}#delegate-{}", self.did, self.delegate_count);
        self.delegate_count += 1;
        self.document.verification_method.push(VerificationMethod {
            id: id.clone(),
            method_type: TYPE_SECP256K1_RECOVERY.to_string(),
            controller: self.did.clone(),
            key: KeyMaterial::BlockchainAccountId {
                blockchain_account_id: format!("eip155:{}:{}", self.chain_id, delegate),
            },
        });

        match purpose {
            DelegateType::SigAuth => self.document.authentication.push(id),
            DelegateType::VeriKey => self.document.assertion_method.push(id),
            DelegateType::Other(_) => {}
        }
    }
}

fn method_type_for(key_type: &str) -> String {
    match key_type {
        "Secp256k1" => "EcdsaSecp256k1VerificationKey2019".to_string(),
        "Ed25519" => "Ed25519VerificationKey2020".to_string(),
        "X25519" => "X25519KeyAgreementKey2019".to_string(),
        "RSA" => "RsaVerificationKey2018".to_string(),
        other => format!("{}VerificationKey", other),
    }
}

fn decode_key_material(encoding: &str, text: &str) -> Option<KeyMaterial> {
    match encoding {
        "hex" => {
            let stripped = text.strip_prefix("0x").unwrap_or(text);
            hex::decode(stripped).ok()?;
            Some(KeyMaterial::PublicKeyHex {
                public_key_hex: stripped.to_string(),
            })
        }
        "base64" => {
            BASE64.decode(text).ok()?;
            Some(KeyMaterial::PublicKeyBase64 {
                public_key_base64: text.to_string(),
            })
        }
        "base58" => {
            bs58::decode(text).into_vec().ok()?;
            Some(KeyMaterial::PublicKeyBase58 {
                public_key_base58: text.to_string(),
            })
        }
        _ => None,
    }
}
