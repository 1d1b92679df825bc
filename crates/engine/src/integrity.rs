// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signature checks that gate every build.
//!
//! A train is trusted when `hashSigned` is an RSA-PSS signature over the
//! SHA-512 digest in `hash`, made with the owning user's RSA key. PSS uses
//! SHA-512 for both the digest and MGF1; the salt is either the maximum the
//! key allows or the digest length.
//!
//! When a service key is configured, the envelope must also carry an Ed25519
//! `metadata.signature` over the canonical JSON of its `data`.

use std::path::Path;

use ed25519_dalek::{Signature, VerifyingKey};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPublicKey};
use serde_json::Value;
use sha2::{Digest, Sha256, Sha512};
use tb_adapters::SecretsError;
use tb_wire::Envelope;
use thiserror::Error;

/// Metadata key carrying the service-level envelope signature.
pub const SERVICE_SIGNATURE_KEY: &str = "signature";

/// Byte length of a train hash (SHA-512).
pub const TRAIN_HASH_LEN: usize = 64;

const PEM_BEGIN: &str = "-----BEGIN";

/// Errors from integrity verification
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("request has no userId to verify against")]
    MissingUser,
    #[error("no public key registered for user {0}")]
    UnknownUser(String),
    #[error("looking up user keys: {0}")]
    KeyLookup(SecretsError),
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("{field} is not valid hex")]
    InvalidHex { field: &'static str },
    #[error("hash is {0} bytes, want 64")]
    HashLength(usize),
    #[error("signature is malformed")]
    MalformedSignature,
    #[error("signature does not match the train hash")]
    HashMismatch,
    #[error("message is missing the service signature")]
    MissingServiceSignature,
    #[error("service signature does not match the message data")]
    ServiceMismatch,
    #[error("reading service key {path}: {detail}")]
    ServiceKeyFile { path: String, detail: String },
}

/// Parse a user's RSA public key.
///
/// Vault holds the key hex-encoded. The decoded bytes are a PEM or DER
/// document, either SPKI or PKCS#1. Undecoded PEM text is accepted as well.
pub fn parse_user_key(value: &str) -> Result<RsaPublicKey, IntegrityError> {
    let value = value.trim();
    let bytes = if value.starts_with(PEM_BEGIN) {
        value.as_bytes().to_vec()
    } else {
        hex::decode(value).map_err(|_| IntegrityError::InvalidHex { field: "public key" })?
    };

    let parsed = if bytes.starts_with(PEM_BEGIN.as_bytes()) {
        let pem = std::str::from_utf8(&bytes)
            .map_err(|e| IntegrityError::InvalidPublicKey(e.to_string()))?;
        RsaPublicKey::from_public_key_pem(pem).or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
    } else {
        RsaPublicKey::from_public_key_der(&bytes).or_else(|_| RsaPublicKey::from_pkcs1_der(&bytes))
    };
    parsed.map_err(|e| IntegrityError::InvalidPublicKey(e.to_string()))
}

/// Check that `hash_signed` is the user's RSA-PSS signature over `hash`.
///
/// `hash` is already a SHA-512 digest, so it is verified as a prehash.
pub fn verify_train_signature(
    public_key: &str,
    hash_hex: &str,
    hash_signed_hex: &str,
) -> Result<(), IntegrityError> {
    let key = parse_user_key(public_key)?;
    let digest =
        hex::decode(hash_hex.trim()).map_err(|_| IntegrityError::InvalidHex { field: "hash" })?;
    if digest.len() != TRAIN_HASH_LEN {
        return Err(IntegrityError::HashLength(digest.len()));
    }
    let signature = hex::decode(hash_signed_hex.trim())
        .map_err(|_| IntegrityError::InvalidHex { field: "hashSigned" })?;
    if signature.len() != key.size() {
        return Err(IntegrityError::MalformedSignature);
    }

    let max_salt = key.size().saturating_sub(TRAIN_HASH_LEN + 2);
    let verified = [max_salt, TRAIN_HASH_LEN]
        .into_iter()
        .any(|salt| key.verify(Pss::new_with_salt::<Sha512>(salt), &digest, &signature).is_ok());
    if verified {
        Ok(())
    } else {
        Err(IntegrityError::HashMismatch)
    }
}

/// Parse a hex-encoded 32-byte Ed25519 public key.
pub fn parse_service_key(public_key_hex: &str) -> Result<VerifyingKey, IntegrityError> {
    let bytes = hex::decode(public_key_hex.trim())
        .map_err(|_| IntegrityError::InvalidHex { field: "public key" })?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        IntegrityError::InvalidPublicKey(format!("{} bytes, want 32", b.len()))
    })?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| IntegrityError::InvalidPublicKey(e.to_string()))
}

/// Verify an Ed25519 `signature_hex` over the bytes `message` with `key`.
fn verify_ed25519(
    key: &VerifyingKey,
    message: &[u8],
    signature_hex: &str,
    field: &'static str,
) -> Result<bool, IntegrityError> {
    let sig_bytes =
        hex::decode(signature_hex.trim()).map_err(|_| IntegrityError::InvalidHex { field })?;
    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| IntegrityError::MalformedSignature)?;
    Ok(key.verify_strict(message, &signature).is_ok())
}

/// Short hex fingerprint of a public key, for logs.
pub fn fingerprint(key: &VerifyingKey) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// Service-level key that must have signed every inbound message's data.
#[derive(Debug, Clone)]
pub struct ServiceKey {
    key: VerifyingKey,
}

impl ServiceKey {
    pub fn from_hex(public_key_hex: &str) -> Result<Self, IntegrityError> {
        Ok(Self { key: parse_service_key(public_key_hex)? })
    }

    /// Load a hex-encoded key from a file.
    pub fn load(path: &Path) -> Result<Self, IntegrityError> {
        let contents = std::fs::read_to_string(path).map_err(|e| IntegrityError::ServiceKeyFile {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        Self::from_hex(&contents)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(&self.key)
    }

    /// Check `metadata.signature` against the canonical JSON of `data`.
    pub fn verify_envelope(&self, envelope: &Envelope) -> Result<(), IntegrityError> {
        let signature = envelope
            .metadata
            .get(SERVICE_SIGNATURE_KEY)
            .and_then(Value::as_str)
            .ok_or(IntegrityError::MissingServiceSignature)?;
        if verify_ed25519(&self.key, &canonical_data(envelope), signature, "metadata.signature")? {
            Ok(())
        } else {
            Err(IntegrityError::ServiceMismatch)
        }
    }
}

/// Compact JSON of `data` with keys in sorted order.
pub fn canonical_data(envelope: &Envelope) -> Vec<u8> {
    // serde_json's default map is ordered by key
    serde_json::to_vec(&envelope.data).unwrap_or_default()
}

#[cfg(test)]
#[path = "integrity_tests.rs"]
mod tests;
