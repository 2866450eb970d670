//! # Error Types: Structured Error Hierarchy
//!
//! Errors shared across the attix workspace. All use `thiserror`.
//!
//! ## Design
//!
//! - `ParseError` is recoverable: the indexer logs it and treats the entry
//!   as processed with zero keys.
//! - `CryptoError::SignatureInvalid` is never recoverable inside a cycle.
//!   An unauthenticated watermark must not be acted upon.
//! - `ProofError` is a hard error for the caller and is never retried.

use thiserror::Error;

/// Top-level error type for attix core operations.
#[derive(Error, Debug)]
pub enum AttixError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Cryptographic failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Inclusion proof verification failure.
    #[error("proof error: {0}")]
    Proof(#[from] ProofError),

    /// Attestation parsing failure.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Authenticated state was decoded but is internally inconsistent.
    #[error("integrity error: {0}")]
    Integrity(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The signed map root does not verify against the map's public key.
    #[error("map root signature invalid for revision {revision}: {reason}")]
    SignatureInvalid {
        /// The revision the unverified root claimed.
        revision: u64,
        /// Verifier detail.
        reason: String,
    },

    /// A raw Ed25519 verification or signature decode failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest parsing failed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// Signed payload could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Inclusion proof verification failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The recomputed root does not match the claimed root, or the audit
    /// path has the wrong length for the tree shape.
    #[error("inclusion proof mismatch for leaf {leaf_index} in tree of size {tree_size}: {reason}")]
    Mismatch {
        /// Leaf index the proof was for.
        leaf_index: i64,
        /// Tree size the proof was checked against.
        tree_size: i64,
        /// What went wrong.
        reason: String,
    },

    /// The leaf index or tree size is out of range.
    #[error("invalid proof parameters: leaf_index={leaf_index}, tree_size={tree_size}")]
    InvalidIndex {
        /// Leaf index supplied.
        leaf_index: i64,
        /// Tree size supplied.
        tree_size: i64,
    },
}

/// The payload is not a recognized attestation structure.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The payload is JSON but not an in-toto link (or a metablock wrapping one).
    #[error("not an in-toto link: {0}")]
    NotALink(String),
}

/// Error decoding the watermark embedded in map metadata.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// Metadata is present but not a watermark document.
    #[error("map metadata is not a valid watermark: {0}")]
    Malformed(String),

    /// Watermark index below the initial value.
    #[error("watermark index {0} is below the initial value -1")]
    OutOfRange(i64),
}
