//! # attix-core: Foundational Types for attix
//!
//! attix keeps a key-addressable index (a versioned, signed map) in sync
//! with an append-only log of software-supply-chain attestations. This crate
//! defines the types every other crate shares.
//!
//! ## Key Design Principles
//!
//! 1. **One digest type.** `Digest` is the 32-byte SHA-256 output used for
//!    artifact fingerprints, map keys, and Merkle hashes.
//!
//! 2. **`CanonicalBytes` for anything signed.** Signed map roots and the
//!    watermark metadata go through JCS canonicalization, so signer and
//!    verifier agree byte-for-byte.
//!
//! 3. **The watermark lives in the map.** `Watermark` is encoded into the
//!    metadata of each signed map revision; there is no local state.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `attix-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod attestation;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod log;
pub mod map;

// Re-export primary types for ergonomic imports.
pub use attestation::extract_keys;
pub use canonical::CanonicalBytes;
pub use digest::{Digest, DIGEST_LEN, SECURE_ALGORITHM};
pub use error::{
    AttixError, CanonicalizationError, CryptoError, ParseError, ProofError, WatermarkError,
};
pub use log::{InclusionProof, LogEntry, LogRoot};
pub use map::{
    decode_log_index, encode_log_index, map_root_signing_bytes, MapEntry, MapRevision,
    SignedMapRoot, Watermark,
};
