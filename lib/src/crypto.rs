//! Field and hashing utilities
//!
//! This module provides the field-element helpers used throughout the disclosure
//! system: circom-compatible Poseidon hashing over BN254, and conversions between
//! field elements, big integers and their canonical decimal text form.

use ark_bn254::Fr;
use ark_ff::PrimeField;
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;

use crate::error::DiscloseError;

/// Largest number of inputs the circom Poseidon parameters support
pub const MAX_POSEIDON_INPUTS: usize = 12;

/// Compute Poseidon hash of two field elements
///
/// This is the node hash of the commitment tree and the nullifier hash.
///
/// # Arguments
/// * `left` - Left input field element
/// * `right` - Right input field element
///
/// # Returns
/// * Poseidon hash as a field element
pub fn poseidon_hash(left: Fr, right: Fr) -> Result<Fr, DiscloseError> {
    poseidon_hash_many(&[left, right])
}

/// Compute Poseidon hash of up to twelve field elements
///
/// The arity of the hash is the number of inputs, so `poseidon_hash_many(&[a, b])`
/// equals `poseidon_hash(a, b)` and differs from any three-input hash.
///
/// # Arguments
/// * `inputs` - Between one and [`MAX_POSEIDON_INPUTS`] field elements
///
/// # Returns
/// * Poseidon hash as a field element
pub fn poseidon_hash_many(inputs: &[Fr]) -> Result<Fr, DiscloseError> {
    let mut poseidon = Poseidon::<Fr>::new_circom(inputs.len())?;
    Ok(poseidon.hash(inputs)?)
}

/// The BN254 scalar field modulus as a big integer
pub fn field_modulus() -> BigUint {
    BigUint::from(Fr::MODULUS)
}

/// Parse an unsigned integer written in decimal or `0x`/`0X`-prefixed hex
///
/// # Arguments
/// * `value` - Text form of the integer
///
/// # Returns
/// * The integer, with no upper bound applied
pub fn parse_uint(value: &str) -> Result<BigUint, DiscloseError> {
    let trimmed = value.trim();
    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() {
            return Err(DiscloseError::InvalidFieldElement("empty hex value".into()));
        }
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        let bytes = hex::decode(padded)
            .map_err(|e| DiscloseError::InvalidFieldElement(format!("bad hex value: {e}")))?;
        return Ok(BigUint::from_bytes_be(&bytes));
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DiscloseError::InvalidFieldElement(
            "expected a decimal or 0x-prefixed hex integer".into(),
        ));
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| {
        DiscloseError::InvalidFieldElement("expected a decimal integer".into())
    })
}

/// Parse a field element from its decimal or `0x`-hex text form
///
/// Values at or above the field modulus are rejected rather than reduced, so a
/// value always has exactly one text form.
///
/// # Arguments
/// * `value` - Text form of the element
///
/// # Returns
/// * The field element
pub fn parse_field(value: &str) -> Result<Fr, DiscloseError> {
    let parsed = parse_uint(value)?;
    if parsed >= field_modulus() {
        return Err(DiscloseError::InvalidFieldElement(
            "value exceeds the field modulus".into(),
        ));
    }
    Ok(Fr::from(parsed))
}

/// Parse a list of field elements, failing on the first bad entry
pub fn parse_fields<S: AsRef<str>>(values: &[S]) -> Result<Vec<Fr>, DiscloseError> {
    values.iter().map(|v| parse_field(v.as_ref())).collect()
}

/// Canonical decimal text form of a field element, as proof-system witnesses expect
pub fn field_to_decimal(value: &Fr) -> String {
    BigUint::from(*value).to_str_radix(10)
}

/// Reduce an arbitrary big integer into the field
pub fn reduce_to_field(value: &BigUint) -> Fr {
    Fr::from(value.clone())
}

/// Serde adapter storing a field element as its decimal string
pub mod field_serde {
    use ark_bn254::Fr;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Fr, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::field_to_decimal(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fr, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_field(&text).map_err(serde::de::Error::custom)
    }
}
