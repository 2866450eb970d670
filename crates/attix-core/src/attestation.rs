//! # Attestation Parser
//!
//! Extracts candidate index keys from a raw attestation payload.
//!
//! Recognized structures are an in-toto link document, or a signed metablock
//! carrying one under `"signed"`:
//!
//! ```json
//! {"signed": {"_type": "link", "products": {"app.tar": {"sha256": "…", "sha512": "…"}}},
//!  "signatures": [ … ]}
//! ```
//!
//! Only the `sha256` entry of each product's hash object is honored. A
//! product with a malformed `sha256` value is skipped on its own; it never
//! fails the whole payload.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::digest::{Digest, SECURE_ALGORITHM};
use crate::error::ParseError;

const LINK_TYPE: &str = "link";

/// Extract the set of artifact digests advertised by an attestation.
///
/// # Errors
///
/// Returns [`ParseError`] if the payload is not JSON, or is JSON but not an
/// in-toto link. Callers treat this as "zero keys", not as a failure of the
/// log entry.
pub fn extract_keys(payload: &[u8]) -> Result<BTreeSet<Digest>, ParseError> {
    let doc: Value = serde_json::from_slice(payload)?;
    let link = unwrap_link(&doc)?;

    let products = match link.get("products") {
        None | Some(Value::Null) => return Ok(BTreeSet::new()),
        Some(Value::Object(products)) => products,
        Some(_) => {
            return Err(ParseError::NotALink(
                "\"products\" must be an object".to_string(),
            ))
        }
    };

    let mut keys = BTreeSet::new();
    for (name, hashes) in products {
        if let Some(digest) = product_digest(name, hashes) {
            keys.insert(digest);
        }
    }
    Ok(keys)
}

/// Return the link body, descending into a metablock's `signed` field.
fn unwrap_link(doc: &Value) -> Result<&Map<String, Value>, ParseError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| ParseError::NotALink("payload is not a JSON object".to_string()))?;

    let body = match obj.get("signed") {
        Some(Value::Object(inner)) => inner,
        Some(_) => {
            return Err(ParseError::NotALink(
                "\"signed\" must be an object".to_string(),
            ))
        }
        None => obj,
    };

    match body.get("_type") {
        None => Ok(body),
        Some(Value::String(t)) if t == LINK_TYPE => Ok(body),
        Some(other) => Err(ParseError::NotALink(format!("unexpected _type {other}"))),
    }
}

fn product_digest(name: &str, hashes: &Value) -> Option<Digest> {
    let Some(hashes) = hashes.as_object() else {
        tracing::debug!(product = name, "product has no hash object, skipping");
        return None;
    };
    let raw = hashes.get(SECURE_ALGORITHM)?;
    let Some(hex) = raw.as_str() else {
        tracing::warn!(product = name, "sha256 value is not a string, skipping");
        return None;
    };
    match Digest::from_hex(hex) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!(product = name, value = hex, error = %e, "not a valid sha256, skipping");
            None
        }
    }
}
