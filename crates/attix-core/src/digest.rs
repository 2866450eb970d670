//! # Digest: Content Fingerprints and Map Keys
//!
//! `Digest` is the fixed-width (32-byte) SHA-256 output used for three
//! things: artifact fingerprints extracted from attestations, map keys, and
//! Merkle tree node/leaf hashes. There is exactly one designated hash
//! algorithm; digests advertised under any other algorithm name are ignored
//! by the attestation parser.
//!
//! ## Serde
//!
//! Serializes as a lowercase 64-character hex string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::error::CryptoError;

/// Width of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// The algorithm name honored when reading attestation hash objects.
pub const SECURE_ALGORITHM: &str = "sha256";

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest(pub [u8; DIGEST_LEN]);

impl Digest {
    /// Create a digest from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::DigestError(format!(
                "digest must be {DIGEST_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// SHA-256 of arbitrary bytes.
    pub fn sha256(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&hash);
        Self(out)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != DIGEST_LEN * 2 {
            return Err(CryptoError::DigestError(format!(
                "digest hex must be {} chars, got {}",
                DIGEST_LEN * 2,
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| CryptoError::DigestError(format!("invalid hex: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl std::fmt::Debug for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Digest({})", &self.to_hex()[..16])
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Vec<u8>` fields carried as lowercase hex strings.
///
/// Use with `#[serde(with = "attix_core::digest::hex_bytes")]`.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as hex.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    /// Deserialize bytes from hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim()).map_err(serde::de::Error::custom)
    }
}
