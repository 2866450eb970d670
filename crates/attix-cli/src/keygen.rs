//! # Keygen Subcommand
//!
//! Generates an Ed25519 key for signing map roots, or re-derives the public
//! key from an existing seed. The seed is printed once; store it as a secret.

use anyhow::Context;
use attix_crypto::Ed25519KeyPair;
use clap::Args;

/// Arguments for `attix keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Derive the public key from this hex seed instead of generating one.
    #[arg(long)]
    pub from_seed: Option<String>,
}

/// Lines printed for a key pair.
pub fn render(key: &Ed25519KeyPair, include_seed: bool) -> Vec<String> {
    let mut lines = Vec::with_capacity(2);
    if include_seed {
        lines.push(format!("seed: {}", key.seed_hex().as_str()));
    }
    lines.push(format!("public_key: {}", key.public_key().to_hex()));
    lines
}

pub fn run_keygen(args: &KeygenArgs) -> anyhow::Result<u8> {
    let (key, include_seed) = match &args.from_seed {
        Some(seed) => (
            Ed25519KeyPair::from_seed_hex(seed).context("parsing --from-seed")?,
            false,
        ),
        None => (Ed25519KeyPair::generate(), true),
    };
    for line in render(&key, include_seed) {
        println!("{line}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_key_prints_only_public_half() {
        let key = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let lines = render(&key, false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("public_key: "));
        assert_eq!(lines[0].len(), "public_key: ".len() + 64);
    }

    #[test]
    fn generated_key_round_trips_through_its_seed() {
        let key = Ed25519KeyPair::generate();
        let lines = render(&key, true);
        let seed = lines[0].strip_prefix("seed: ").unwrap();
        let again = Ed25519KeyPair::from_seed_hex(seed).unwrap();
        assert_eq!(again.public_key(), key.public_key());
    }
}
