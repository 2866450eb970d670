//! # Signed Map Root Authentication
//!
//! The map service signs each revision's `{map_id, revision, root_hash,
//! metadata}`. The indexer's watermark lives in that metadata, so a root
//! must be authenticated before anything in it is read.
//!
//! ## Security Invariant
//!
//! [`verify`] is the only constructor of a [`MapRevision`] from wire data.
//! A root that fails verification is never decoded.

use attix_core::{map_root_signing_bytes, CryptoError, Digest, MapRevision, SignedMapRoot};

use crate::ed25519::{self, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Authenticate a signed map root against the map's public key.
pub fn verify(
    signed: &SignedMapRoot,
    map_public_key: &Ed25519PublicKey,
) -> Result<MapRevision, CryptoError> {
    let invalid = |reason: String| CryptoError::SignatureInvalid {
        revision: signed.revision,
        reason,
    };

    let signature =
        Ed25519Signature::from_slice(&signed.signature).map_err(|e| invalid(e.to_string()))?;
    let message = signed.signing_bytes()?;
    ed25519::verify(&message, &signature, map_public_key).map_err(|e| invalid(e.to_string()))?;

    Ok(MapRevision {
        revision: signed.revision,
        root_hash: signed.root_hash,
        metadata: signed.metadata.clone(),
    })
}

/// Signs map roots on behalf of a map service.
#[derive(Debug)]
pub struct MapRootSigner {
    map_id: i64,
    key: Ed25519KeyPair,
}

impl MapRootSigner {
    /// Create a signer for `map_id`.
    pub fn new(map_id: i64, key: Ed25519KeyPair) -> Self {
        Self { map_id, key }
    }

    /// The map this signer produces roots for.
    pub fn map_id(&self) -> i64 {
        self.map_id
    }

    /// The public key readers verify against.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.key.public_key()
    }

    /// Produce the signed wire form of a revision.
    pub fn sign(
        &self,
        revision: u64,
        root_hash: Digest,
        metadata: Vec<u8>,
    ) -> Result<SignedMapRoot, CryptoError> {
        let message = map_root_signing_bytes(self.map_id, revision, &root_hash, &metadata)?;
        let signature = self.key.sign(&message);
        Ok(SignedMapRoot {
            map_id: self.map_id,
            revision,
            root_hash,
            metadata,
            signature: signature.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attix_core::Watermark;

    fn signer() -> MapRootSigner {
        MapRootSigner::new(7, Ed25519KeyPair::from_seed(&[1u8; 32]))
    }

    fn signed(s: &MapRootSigner) -> SignedMapRoot {
        s.sign(3, Digest::sha256(b"root"), Watermark::at(2).encode().unwrap())
            .unwrap()
    }

    #[test]
    fn test_valid_root_decodes_watermark() {
        let s = signer();
        let rev = verify(&signed(&s), &s.public_key()).unwrap();
        assert_eq!(rev.revision, 3);
        assert_eq!(rev.watermark().unwrap(), Watermark::at(2));
    }

    #[test]
    fn test_forged_metadata_rejected() {
        let s = signer();
        let mut root = signed(&s);
        root.metadata = Watermark::at(99).encode().unwrap();
        let err = verify(&root, &s.public_key()).unwrap_err();
        assert!(matches!(err, CryptoError::SignatureInvalid { revision: 3, .. }));
    }

    #[test]
    fn test_other_key_rejected() {
        let s = signer();
        let other = MapRootSigner::new(7, Ed25519KeyPair::from_seed(&[2u8; 32]));
        assert!(verify(&signed(&s), &other.public_key()).is_err());
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let s = signer();
        let mut root = signed(&s);
        root.signature.truncate(10);
        assert!(matches!(
            verify(&root, &s.public_key()),
            Err(CryptoError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn test_map_id_is_bound() {
        let s = signer();
        let mut root = signed(&s);
        root.map_id = 8;
        assert!(verify(&root, &s.public_key()).is_err());
    }
}
