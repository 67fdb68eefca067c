//! # Mock Proof Backend
//!
//! A deterministic, transparent stand-in for the disclose circuit and its
//! Groth16 verifier, for development and testing. The prover evaluates the
//! disclosure relation directly on the witness and emits the public signals
//! the circuit would. Its "proof" is a Poseidon digest of those signals and
//! provides no zero-knowledge guarantees.

use ark_bn254::Fr;
use async_trait::async_trait;

use crate::constants::{BITMAP_LENGTH, DG1_HEADER, MRZ_LENGTH, NUM_PUBLIC_SIGNALS, REVEALED_DATA_LENGTH};
use crate::crypto::{field_to_decimal, parse_field, poseidon_hash, poseidon_hash_many};
use crate::date::CurrentDate;
use crate::error::{CapabilityError, DiscloseError};
use crate::inputs::{commitment, WitnessInput};
use crate::merkle_proof::MerkleProof;
use crate::passport::pack_bytes;
use crate::proof::{Groth16Proof, VerificationKey};
use crate::traits::ProofVerifier;

/// Evaluates the disclose relation off-circuit.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProver;

/// Accepts exactly the proofs [`MockProver`] produces.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofVerifier;

fn single(values: &[String], name: &'static str) -> Result<Fr, DiscloseError> {
    match values {
        [value] => parse_field(value),
        _ => Err(DiscloseError::UnsatisfiedWitness(name)),
    }
}

fn small_numbers<const N: usize>(
    values: &[String],
    name: &'static str,
) -> Result<[u8; N], DiscloseError> {
    let parsed = values
        .iter()
        .map(|v| v.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| DiscloseError::UnsatisfiedWitness(name))?;
    parsed
        .try_into()
        .map_err(|_| DiscloseError::UnsatisfiedWitness(name))
}

fn proof_digest(signals: &[Fr]) -> Result<Fr, DiscloseError> {
    poseidon_hash_many(signals)
}

impl MockProver {
    pub fn new() -> Self {
        Self
    }

    /// Produce a proof stub and the public signals for `witness`.
    ///
    /// Fails with `UnsatisfiedWitness` wherever the real circuit would have no
    /// satisfying assignment.
    pub fn prove(&self, witness: &WitnessInput) -> Result<(Groth16Proof, Vec<Fr>), DiscloseError> {
        let secret = single(&witness.secret, "secret")?;
        let attestation_id = single(&witness.attestation_id, "attestation_id")?;
        let pubkey_leaf = single(&witness.pubkey_leaf, "pubkey_leaf")?;
        let merkle_root = single(&witness.merkle_root, "merkle_root")?;
        let scope = single(&witness.scope, "scope")?;
        let user_identifier = single(&witness.user_identifier, "user_identifier")?;

        let mrz: [u8; REVEALED_DATA_LENGTH] = small_numbers(&witness.mrz, "mrz")?;
        if mrz[..DG1_HEADER.len()] != DG1_HEADER {
            return Err(DiscloseError::UnsatisfiedWitness("mrz"));
        }
        let leaf = commitment(secret, attestation_id, pubkey_leaf, &pack_bytes(&mrz))?;

        let tree_depth = witness
            .merkletree_size
            .first()
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or(DiscloseError::UnsatisfiedWitness("merkletree_size"))?;
        let path = MerkleProof {
            siblings: witness
                .siblings
                .iter()
                .map(|s| parse_field(s))
                .collect::<Result<_, _>>()?,
            path_bits: witness
                .path
                .iter()
                .map(|b| b.parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| DiscloseError::UnsatisfiedWitness("path"))?,
            tree_depth,
        };
        if tree_depth > path.siblings.len() || path.compute_root(leaf)? != merkle_root {
            return Err(DiscloseError::UnsatisfiedWitness("merkle path"));
        }

        let date_digits: [u8; 6] = small_numbers(&witness.current_date, "current_date")?;
        let today = CurrentDate::from_digits(date_digits)
            .ok_or(DiscloseError::UnsatisfiedWitness("current_date"))?;
        let majority: [u8; 2] = small_numbers(&witness.majority, "majority")?;
        let bitmap: [u8; BITMAP_LENGTH] = small_numbers(&witness.bitmap, "bitmap")?;
        if bitmap.iter().any(|flag| *flag > 1) {
            return Err(DiscloseError::UnsatisfiedWitness("bitmap"));
        }

        let mrz_body = &mrz[DG1_HEADER.len()..];
        let mut revealed = [0u8; BITMAP_LENGTH];
        for (i, byte) in mrz_body.iter().enumerate() {
            revealed[i] = byte * bitmap[i];
        }
        if is_older_than(mrz_body, today, majority)? {
            revealed[MRZ_LENGTH] = majority[0] * bitmap[MRZ_LENGTH];
            revealed[MRZ_LENGTH + 1] = majority[1] * bitmap[MRZ_LENGTH + 1];
        }
        let revealed_data = pack_bytes(&revealed);

        let signals = vec![
            poseidon_hash(secret, scope)?,
            revealed_data[0],
            revealed_data[1],
            revealed_data[2],
            attestation_id,
            merkle_root,
            scope,
            today.to_field(),
            user_identifier,
        ];
        let digest = field_to_decimal(&proof_digest(&signals)?);
        let proof = Groth16Proof {
            pi_a: vec![digest, "0".into(), "1".into()],
            pi_b: vec![
                vec!["0".into(), "0".into()],
                vec!["0".into(), "0".into()],
                vec!["1".into(), "0".into()],
            ],
            pi_c: vec!["0".into(), "0".into(), "1".into()],
            protocol: "groth16".into(),
            curve: "bn128".into(),
        };
        Ok((proof, signals))
    }
}

/// Whether the holder born on the MRZ's date of birth has reached `majority`.
fn is_older_than(
    mrz_body: &[u8],
    today: CurrentDate,
    majority: [u8; 2],
) -> Result<bool, DiscloseError> {
    let birth = mrz_body
        .get(57..63)
        .filter(|digits| digits.iter().all(u8::is_ascii_digit))
        .ok_or(DiscloseError::UnsatisfiedWitness("date of birth"))?;
    let mut digits = [0u8; 6];
    for (digit, ascii) in digits.iter_mut().zip(birth) {
        *digit = ascii - b'0';
    }
    if !majority.iter().all(u8::is_ascii_digit) {
        return Err(DiscloseError::UnsatisfiedWitness("majority"));
    }
    let threshold = u32::from(majority[0] - b'0') * 10 + u32::from(majority[1] - b'0');
    Ok(today.years_since(digits) >= threshold)
}

#[async_trait]
impl ProofVerifier for MockProofVerifier {
    async fn verify(
        &self,
        _key: &VerificationKey,
        public_signals: &[Fr],
        proof: &Groth16Proof,
    ) -> Result<bool, CapabilityError> {
        if public_signals.len() != NUM_PUBLIC_SIGNALS {
            return Err(CapabilityError::Malformed(format!(
                "expected {NUM_PUBLIC_SIGNALS} public signals, got {}",
                public_signals.len()
            )));
        }
        let claimed = proof
            .pi_a
            .first()
            .ok_or_else(|| CapabilityError::Malformed("proof has no pi_a".into()))
            .and_then(|v| parse_field(v).map_err(|e| CapabilityError::Malformed(e.to_string())))?;
        let expected =
            proof_digest(public_signals).map_err(|e| CapabilityError::Backend(e.to_string()))?;
        Ok(claimed == expected)
    }
}
