//! Groth16 proof artifacts and their Solidity calldata form.

use alloy_primitives::U256;
use alloy_sol_types::SolType;
use ark_bn254::Fr;
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};

use crate::constants::NUM_PUBLIC_SIGNALS;
use crate::error::DiscloseError;
use crate::DiscloseProofCalldata;

/// Proof as snarkjs writes it to `proof.json`. Points are projective, each
/// coordinate a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default = "default_curve")]
    pub curve: String,
}

fn default_protocol() -> String {
    "groth16".to_string()
}

fn default_curve() -> String {
    "bn128".to_string()
}

/// Verification key artifact, opaque to everything but the proof backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationKey(serde_json::Value);

impl VerificationKey {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Convert a field element into a Solidity `uint256`.
pub fn field_to_u256(value: &Fr) -> U256 {
    U256::from_limbs(value.into_bigint().0)
}

fn parse_u256(value: &str) -> Result<U256, DiscloseError> {
    value
        .trim()
        .parse::<U256>()
        .map_err(|e| DiscloseError::MalformedProof(format!("bad coordinate: {e}")))
}

fn coordinate<'a>(values: &'a [String], index: usize, name: &str) -> Result<&'a str, DiscloseError> {
    values
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| DiscloseError::MalformedProof(format!("{name} has no coordinate {index}")))
}

impl Groth16Proof {
    /// Arrange the proof and signals the way Solidity Groth16 verifiers take them.
    ///
    /// The G2 point's coordinates are swapped within each pair.
    pub fn to_calldata(&self, signals: &[Fr]) -> Result<DiscloseProofCalldata, DiscloseError> {
        if signals.len() != NUM_PUBLIC_SIGNALS {
            return Err(DiscloseError::MalformedSignals {
                expected: NUM_PUBLIC_SIGNALS,
                actual: signals.len(),
            });
        }

        let g1 = |point: &[String], name: &str| -> Result<[U256; 2], DiscloseError> {
            Ok([
                parse_u256(coordinate(point, 0, name)?)?,
                parse_u256(coordinate(point, 1, name)?)?,
            ])
        };
        let mut b = [[U256::ZERO; 2]; 2];
        for (i, row) in b.iter_mut().enumerate() {
            let pair = self
                .pi_b
                .get(i)
                .ok_or_else(|| DiscloseError::MalformedProof(format!("pi_b has no pair {i}")))?;
            *row = [
                parse_u256(coordinate(pair, 1, "pi_b")?)?,
                parse_u256(coordinate(pair, 0, "pi_b")?)?,
            ];
        }

        let mut pub_signals = [U256::ZERO; NUM_PUBLIC_SIGNALS];
        for (slot, signal) in pub_signals.iter_mut().zip(signals) {
            *slot = field_to_u256(signal);
        }

        Ok(DiscloseProofCalldata {
            a: g1(&self.pi_a, "pi_a")?,
            b,
            c: g1(&self.pi_c, "pi_c")?,
            pubSignals: pub_signals,
        })
    }

    /// ABI-encoded `(uint256[2], uint256[2][2], uint256[2], uint256[9])` tuple.
    pub fn abi_encode_calldata(&self, signals: &[Fr]) -> Result<Vec<u8>, DiscloseError> {
        let calldata = self.to_calldata(signals)?;
        Ok(DiscloseProofCalldata::abi_encode(&calldata))
    }
}
