//! Passport Disclose Script Library
//!
//! This library wires the disclosure core to the outside world:
//!
//! - TOML verifier configuration
//! - Root registry lookups over JSON-RPC
//! - Groth16 verification through snarkjs
//! - A file-backed nullifier set
//! - The `passport-disclose` command line

use std::path::Path;

use anyhow::Context;
use ark_bn254::Fr;
use ark_ff::PrimeField;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod commands;
pub mod config;
pub mod nullifiers;
pub mod registry;
pub mod snarkjs;

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Write a value as pretty JSON, creating parent directories
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}

/// Generate a random holder secret
///
/// # Returns
/// * A uniformly random field element
pub fn random_secret() -> Fr {
    Fr::from_be_bytes_mod_order(&rand::random::<[u8; 32]>())
}
