//! # attix-crypto: Cryptographic Primitives
//!
//! - **Ed25519** keys and signatures for map-root authentication.
//! - **Merkle** leaf/node hashing, tree construction, and inclusion proof
//!   verification for the log.
//! - **Root** authentication of signed map revisions, and the signing side
//!   used by map service implementations.
//!
//! ## Crate Policy
//!
//! - Depends only on `attix-core` internally.
//! - No mocking of cryptographic operations in tests.

pub mod ed25519;
pub mod merkle;
pub mod root;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use merkle::{inclusion_proof, leaf_hash, merkle_root, node_hash, verify_inclusion};
pub use root::MapRootSigner;
