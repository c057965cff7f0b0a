// crates/merge-core/src/core/hashing.rs
// ============================================================================
// Module: Content Fingerprinting
// Description: Canonical JSON + SHA-256 fingerprints for object version content.
// Purpose: Provide a deterministic, fast inequality check over comparison views.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! A content fingerprint is a hash over the canonicalized content payload: the
//! formatted scripted-code string (if any) concatenated with a stable JSON
//! encoding of the structured fields and properties. A fingerprint mismatch is
//! authoritative for "different"; a match is authoritative for "identical"
//! (spec §3, "Content fingerprint").

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

/// Errors raised while computing a content fingerprint.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// Canonical JSON serialization failed.
    #[error("failed to canonicalize content for fingerprinting: {0}")]
    Canonicalization(String),
}

/// A deterministic fingerprint over a canonicalized content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ContentFingerprint {
    /// Lowercase hex-encoded SHA-256 digest.
    pub value: String,
}

impl ContentFingerprint {
    /// Computes a fingerprint over the scripted-code string (if any) and a
    /// serializable structured payload.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::Canonicalization`] when the structured
    /// payload cannot be serialized to canonical JSON.
    pub fn compute<T: Serialize + ?Sized>(
        code: Option<&str>,
        structured: &T,
    ) -> Result<Self, FingerprintError> {
        let mut bytes = serde_jcs::to_vec(structured)
            .map_err(|err| FingerprintError::Canonicalization(err.to_string()))?;
        if let Some(code) = code {
            bytes.extend_from_slice(b"\0sail\0");
            bytes.extend_from_slice(code.as_bytes());
        }
        Ok(Self::of_bytes(&bytes))
    }

    /// Hashes raw bytes directly, used by the `Unknown` object type whose
    /// comparison view is its raw XML bytes.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        Self { value: hex_encode(&digest) }
    }
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
