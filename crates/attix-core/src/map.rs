//! # Map Records and the Watermark
//!
//! The versioned map stores `digest → log index` entries. Each revision is
//! signed by the map service and carries opaque metadata; attix uses that
//! metadata to hold the [`Watermark`], the only synchronization state in the
//! system.
//!
//! ## Encodings
//!
//! - Map values: the log index as ASCII decimal (`b"17"`).
//! - Metadata: JCS-canonical JSON `{"last_processed_log_index": n}`. Empty
//!   metadata is the fresh-map state and decodes to the initial watermark
//!   (`-1`), so the first index processed is `0`.
//! - Signed message: JCS-canonical JSON of `{map_id, revision, root_hash,
//!   metadata}` with byte fields as lowercase hex.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{hex_bytes, Digest};
use crate::error::{AttixError, CanonicalizationError, WatermarkError};

/// A single key/value leaf of the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Fixed-width content digest.
    pub key: Digest,
    /// Encoded log index (see [`encode_log_index`]).
    #[serde(with = "hex_bytes")]
    pub value: Vec<u8>,
}

impl MapEntry {
    /// Build the entry that points `key` at log position `index`.
    pub fn for_log_index(key: Digest, index: i64) -> Self {
        Self {
            key,
            value: encode_log_index(index),
        }
    }

    /// Decode the log index this entry points at.
    pub fn log_index(&self) -> Result<i64, AttixError> {
        decode_log_index(&self.value)
    }
}

/// An authenticated snapshot of map state.
///
/// Only produced by the root authenticator after a signature check; holding
/// one means the fields were signed by the map's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRevision {
    /// Monotonic revision number.
    pub revision: u64,
    /// Root hash of the map at this revision.
    pub root_hash: Digest,
    /// Opaque metadata committed with the revision.
    #[serde(with = "hex_bytes")]
    pub metadata: Vec<u8>,
}

impl MapRevision {
    /// Decode the watermark carried in this revision's metadata.
    pub fn watermark(&self) -> Result<Watermark, WatermarkError> {
        Watermark::decode(&self.metadata)
    }
}

/// The wire form of a map revision as returned by the map service.
///
/// Untrusted until verified. Never read `metadata` from this type directly;
/// authenticate it into a [`MapRevision`] first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedMapRoot {
    /// Identifier of the map tree.
    pub map_id: i64,
    /// Claimed revision.
    pub revision: u64,
    /// Claimed root hash.
    pub root_hash: Digest,
    /// Claimed metadata.
    #[serde(with = "hex_bytes")]
    pub metadata: Vec<u8>,
    /// Ed25519 signature over [`SignedMapRoot::signing_bytes`].
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Serialize)]
struct MapRootMessage<'a> {
    map_id: i64,
    revision: u64,
    root_hash: &'a Digest,
    metadata: String,
}

/// Canonical message bytes signed for a map root.
pub fn map_root_signing_bytes(
    map_id: i64,
    revision: u64,
    root_hash: &Digest,
    metadata: &[u8],
) -> Result<CanonicalBytes, CanonicalizationError> {
    CanonicalBytes::new(&MapRootMessage {
        map_id,
        revision,
        root_hash,
        metadata: hex::encode(metadata),
    })
}

impl SignedMapRoot {
    /// Canonical message bytes the signature must cover.
    pub fn signing_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        map_root_signing_bytes(self.map_id, self.revision, &self.root_hash, &self.metadata)
    }
}

/// The last log index whose derived map effects have been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Watermark {
    /// Last processed log index; `-1` before anything was processed.
    pub last_processed_log_index: i64,
}

impl Watermark {
    /// The fresh-map watermark.
    pub const INITIAL: Watermark = Watermark {
        last_processed_log_index: -1,
    };

    /// Watermark recording that `index` has been folded into the map.
    pub fn at(index: i64) -> Self {
        Self {
            last_processed_log_index: index,
        }
    }

    /// The next log index to process.
    pub fn next_index(&self) -> i64 {
        self.last_processed_log_index + 1
    }

    /// Whether every leaf of a log with `log_size` sequenced entries is processed.
    pub fn is_caught_up(&self, log_size: i64) -> bool {
        self.last_processed_log_index.saturating_add(1) >= log_size
    }

    /// Encode as canonical metadata bytes.
    pub fn encode(&self) -> Result<Vec<u8>, CanonicalizationError> {
        Ok(CanonicalBytes::new(self)?.into_vec())
    }

    /// Decode from revision metadata. Empty metadata is [`Watermark::INITIAL`].
    pub fn decode(metadata: &[u8]) -> Result<Self, WatermarkError> {
        if metadata.is_empty() {
            return Ok(Self::INITIAL);
        }
        let wm: Watermark = serde_json::from_slice(metadata)
            .map_err(|e| WatermarkError::Malformed(e.to_string()))?;
        if wm.last_processed_log_index < -1 {
            return Err(WatermarkError::OutOfRange(wm.last_processed_log_index));
        }
        Ok(wm)
    }
}

/// Encode a log index as a map value.
pub fn encode_log_index(index: i64) -> Vec<u8> {
    index.to_string().into_bytes()
}

/// Decode a map value back to a log index.
pub fn decode_log_index(value: &[u8]) -> Result<i64, AttixError> {
    let s = std::str::from_utf8(value)
        .map_err(|e| AttixError::Integrity(format!("map value is not UTF-8: {e}")))?;
    let index: i64 = s
        .parse()
        .map_err(|e| AttixError::Integrity(format!("map value {s:?} is not a log index: {e}")))?;
    if index < 0 {
        return Err(AttixError::Integrity(format!("negative log index {index} in map value")));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metadata_is_initial_watermark() {
        let wm = Watermark::decode(&[]).unwrap();
        assert_eq!(wm, Watermark::INITIAL);
        assert_eq!(wm.next_index(), 0);
    }

    #[test]
    fn test_watermark_encoding_is_canonical() {
        let bytes = Watermark::at(12).encode().unwrap();
        assert_eq!(bytes, br#"{"last_processed_log_index":12}"#);
        assert_eq!(Watermark::decode(&bytes).unwrap(), Watermark::at(12));
    }

    #[test]
    fn test_malformed_metadata_rejected() {
        assert!(matches!(
            Watermark::decode(b"not json"),
            Err(WatermarkError::Malformed(_))
        ));
        assert!(matches!(
            Watermark::decode(br#"{"LastLeaf":3}"#),
            Err(WatermarkError::Malformed(_))
        ));
    }

    #[test]
    fn test_watermark_below_initial_rejected() {
        let bytes = br#"{"last_processed_log_index":-2}"#;
        assert!(matches!(
            Watermark::decode(bytes),
            Err(WatermarkError::OutOfRange(-2))
        ));
    }

    #[test]
    fn test_caught_up_boundaries() {
        assert!(Watermark::INITIAL.is_caught_up(0));
        assert!(!Watermark::INITIAL.is_caught_up(1));
        assert!(Watermark::at(4).is_caught_up(5));
        assert!(!Watermark::at(4).is_caught_up(6));
    }

    #[test]
    fn test_caught_up_at_extreme_sizes() {
        assert!(Watermark::INITIAL.is_caught_up(i64::MIN));
        assert!(!Watermark::INITIAL.is_caught_up(i64::MAX));
        assert!(Watermark::at(i64::MAX).is_caught_up(i64::MAX));
    }

    #[test]
    fn test_log_index_value_encoding() {
        assert_eq!(encode_log_index(17), b"17");
        assert_eq!(decode_log_index(b"17").unwrap(), 17);
        assert!(decode_log_index(b"-3").is_err());
        assert!(decode_log_index(b"seventeen").is_err());
        assert!(decode_log_index(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_map_entry_for_log_index() {
        let key = Digest::sha256(b"artifact");
        let entry = MapEntry::for_log_index(key, 9);
        assert_eq!(entry.log_index().unwrap(), 9);
    }

    #[test]
    fn test_signing_bytes_cover_every_field() {
        let root = SignedMapRoot {
            map_id: 1,
            revision: 2,
            root_hash: Digest::sha256(b"root"),
            metadata: Watermark::at(1).encode().unwrap(),
            signature: vec![],
        };
        let base = root.signing_bytes().unwrap();

        let mut other = root.clone();
        other.revision = 3;
        assert_ne!(other.signing_bytes().unwrap(), base);

        let mut other = root.clone();
        other.metadata = Watermark::at(2).encode().unwrap();
        assert_ne!(other.signing_bytes().unwrap(), base);

        let mut other = root.clone();
        other.map_id = 9;
        assert_ne!(other.signing_bytes().unwrap(), base);

        let mut other = root;
        other.signature = vec![1, 2, 3];
        assert_eq!(other.signing_bytes().unwrap(), base);
    }
}
