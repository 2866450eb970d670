//! Robustness tests for the attestation parser.
//!
//! The parser sits directly on untrusted log payloads, so it must never
//! panic and must never let one bad artifact hide the others.

use attix_core::{extract_keys, Digest, ParseError};
use proptest::prelude::*;

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = extract_keys(&payload);
    }

    #[test]
    fn arbitrary_json_strings_never_panic(s in "\\PC{0,256}") {
        let _ = extract_keys(s.as_bytes());
    }

    #[test]
    fn every_well_formed_product_is_extracted(
        names in proptest::collection::btree_set("[a-z]{1,8}", 1..12),
        poison in any::<bool>(),
    ) {
        let mut products = serde_json::Map::new();
        let mut expected = std::collections::BTreeSet::new();
        for name in &names {
            let d = Digest::sha256(name.as_bytes());
            expected.insert(d);
            products.insert(name.clone(), serde_json::json!({"sha256": d.to_hex()}));
        }
        if poison {
            products.insert("ZZZ-poison".into(), serde_json::json!({"sha256": "xyz"}));
        }
        let payload = serde_json::json!({"_type": "link", "products": products});
        let keys = extract_keys(payload.to_string().as_bytes()).unwrap();
        prop_assert_eq!(keys, expected);
    }
}

#[test]
fn uppercase_hex_digest_is_accepted() {
    let d = Digest::sha256(b"upper");
    let payload = serde_json::json!({
        "products": {"u": {"sha256": d.to_hex().to_uppercase()}}
    });
    let keys = extract_keys(payload.to_string().as_bytes()).unwrap();
    assert!(keys.contains(&d));
}

#[test]
fn signed_field_that_is_not_an_object_is_rejected() {
    let payload = br#"{"signed":"eyJfdHlwZSI6ImxpbmsifQ==","signatures":[]}"#;
    assert!(matches!(extract_keys(payload), Err(ParseError::NotALink(_))));
}

#[test]
fn empty_payload_is_invalid_json() {
    assert!(matches!(extract_keys(b""), Err(ParseError::InvalidJson(_))));
}
