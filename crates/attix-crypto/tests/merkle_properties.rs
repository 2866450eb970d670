//! Property tests for Merkle inclusion proofs.
//!
//! For any tree of N leaves, every index in [0, N) must verify, and flipping
//! any single bit of the leaf value or any audit path entry must fail.

use attix_core::{Digest, InclusionProof, ProofError};
use attix_crypto::merkle::{inclusion_proof, leaf_hash, merkle_root, verify_inclusion};
use proptest::prelude::*;

fn tree(values: &[Vec<u8>]) -> (Vec<Digest>, Digest) {
    let leaves: Vec<Digest> = values.iter().map(|v| leaf_hash(v)).collect();
    let root = merkle_root(&leaves);
    (leaves, root)
}

fn proof(leaves: &[Digest], index: usize) -> InclusionProof {
    InclusionProof {
        leaf_index: index as i64,
        tree_size: leaves.len() as i64,
        audit_path: inclusion_proof(leaves, index).unwrap(),
    }
}

fn values_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..40), 1..70)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_index_verifies(values in values_strategy()) {
        let (leaves, root) = tree(&values);
        let n = values.len() as i64;
        for (i, v) in values.iter().enumerate() {
            prop_assert!(verify_inclusion(v, &proof(&leaves, i), n, &root).is_ok());
        }
    }

    #[test]
    fn flipped_value_bit_fails(values in values_strategy(), pick in any::<prop::sample::Index>(), bit in 0usize..8) {
        let (leaves, root) = tree(&values);
        let i = pick.index(values.len());
        let mut tampered = values[i].clone();
        tampered[0] ^= 1 << bit;
        let result = verify_inclusion(&tampered, &proof(&leaves, i), values.len() as i64, &root);
        let is_mismatch = matches!(result, Err(ProofError::Mismatch { .. }));
        prop_assert!(is_mismatch);
    }

    #[test]
    fn flipped_path_bit_fails(
        values in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..40), 2..70),
        pick in any::<prop::sample::Index>(),
        entry in any::<prop::sample::Index>(),
        byte in 0usize..32,
        bit in 0usize..8,
    ) {
        let (leaves, root) = tree(&values);
        let i = pick.index(values.len());
        let mut p = proof(&leaves, i);
        prop_assume!(!p.audit_path.is_empty());
        let e = entry.index(p.audit_path.len());
        p.audit_path[e].0[byte] ^= 1 << bit;
        let result = verify_inclusion(&values[i], &p, values.len() as i64, &root);
        prop_assert!(result.is_err());
    }

    #[test]
    fn proof_for_wrong_index_fails(values in values_strategy(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
        let (leaves, root) = tree(&values);
        let i = a.index(values.len());
        let j = b.index(values.len());
        prop_assume!(i != j && values[i] != values[j]);
        let result = verify_inclusion(&values[i], &proof(&leaves, j), values.len() as i64, &root);
        prop_assert!(result.is_err());
    }
}

#[test]
fn one_leaf_log_has_empty_path_and_root_equals_leaf_hash() {
    let (leaves, root) = tree(&[b"solo".to_vec()]);
    assert_eq!(root, leaf_hash(b"solo"));
    let p = proof(&leaves, 0);
    assert!(p.audit_path.is_empty());
    verify_inclusion(b"solo", &p, 1, &root).unwrap();
}
