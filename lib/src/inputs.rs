//! Disclose Circuit Inputs
//!
//! This module assembles the witness the disclose circuit is proven over. Every
//! value is written as a decimal string, the form snarkjs witness generators
//! read.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{BITMAP_LENGTH, COMMITMENT_TREE_DEPTH, PACKED_ELEMENTS};
use crate::crypto::{field_to_decimal, poseidon_hash_many};
use crate::date::CurrentDate;
use crate::error::DiscloseError;
use crate::merkle_proof::{prove_membership, CommitmentTree};
use crate::passport::{format_mrz, pack_bytes, PassportData};
use crate::pubkey_leaf::{encode_leaf, SigningKeyDescriptor};

/// Holder-chosen values that go into a disclose proof
#[derive(Debug, Clone)]
pub struct DiscloseRequest {
    /// Secret the commitment was registered with
    pub secret: Fr,
    /// Document type the commitment was registered under
    pub attestation_id: Fr,
    /// Two-digit age threshold, such as `"18"`
    pub majority: String,
    /// One `"0"`/`"1"` flag per revealable byte
    pub bitmap: Vec<String>,
    pub scope: Fr,
    pub user_identifier: Fr,
}

/// Witness for the disclose circuit, keyed by circuit signal name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessInput {
    pub secret: Vec<String>,
    pub attestation_id: Vec<String>,
    pub pubkey_leaf: Vec<String>,
    pub mrz: Vec<String>,
    pub merkle_root: Vec<String>,
    pub merkletree_size: Vec<String>,
    pub path: Vec<String>,
    pub siblings: Vec<String>,
    pub bitmap: Vec<String>,
    pub scope: Vec<String>,
    pub current_date: Vec<String>,
    pub majority: Vec<String>,
    pub user_identifier: Vec<String>,
}

/// Compute a registration commitment
///
/// # Arguments
/// * `secret` - Holder secret
/// * `attestation_id` - Document type
/// * `pubkey_leaf` - Leaf of the key that signed the document
/// * `mrz_packed` - Formatted MRZ packed into field elements
///
/// # Returns
/// * The six-input Poseidon hash of the above
pub fn commitment(
    secret: Fr,
    attestation_id: Fr,
    pubkey_leaf: Fr,
    mrz_packed: &[Fr; PACKED_ELEMENTS],
) -> Result<Fr, DiscloseError> {
    poseidon_hash_many(&[
        secret,
        attestation_id,
        pubkey_leaf,
        mrz_packed[0],
        mrz_packed[1],
        mrz_packed[2],
    ])
}

/// Commitment a holder registers for `passport`
pub fn passport_commitment(
    secret: Fr,
    attestation_id: Fr,
    passport: &PassportData,
) -> Result<Fr, DiscloseError> {
    let pubkey_leaf = encode_leaf(&SigningKeyDescriptor::from_passport(passport)?)?;
    let mrz_packed = pack_bytes(&format_mrz(&passport.mrz)?);
    commitment(secret, attestation_id, pubkey_leaf, &mrz_packed)
}

fn validate_bitmap(bitmap: &[String]) -> Result<(), DiscloseError> {
    if bitmap.len() != BITMAP_LENGTH {
        return Err(DiscloseError::InvalidBitmap(format!(
            "expected {BITMAP_LENGTH} flags, got {}",
            bitmap.len()
        )));
    }
    if let Some(position) = bitmap.iter().position(|flag| flag != "0" && flag != "1") {
        return Err(DiscloseError::InvalidBitmap(format!(
            "flag {position} is not 0 or 1"
        )));
    }
    Ok(())
}

/// Parse a two-digit majority into its ASCII codes
pub fn parse_majority(majority: &str) -> Result<[u8; 2], DiscloseError> {
    match majority.as_bytes() {
        [tens, units] if tens.is_ascii_digit() && units.is_ascii_digit() => Ok([*tens, *units]),
        _ => Err(DiscloseError::InvalidMajority(
            "expected exactly two ASCII digits".into(),
        )),
    }
}

/// Build disclose inputs dated today
pub fn build_disclose_inputs(
    request: &DiscloseRequest,
    passport: &PassportData,
    tree: &CommitmentTree,
) -> Result<WitnessInput, DiscloseError> {
    build_disclose_inputs_at(request, passport, tree, CurrentDate::today())
}

/// Build disclose inputs for an explicit date
///
/// The holder's commitment must already be in `tree`.
pub fn build_disclose_inputs_at(
    request: &DiscloseRequest,
    passport: &PassportData,
    tree: &CommitmentTree,
    today: CurrentDate,
) -> Result<WitnessInput, DiscloseError> {
    validate_bitmap(&request.bitmap)?;
    let majority = parse_majority(&request.majority)?;

    let key = SigningKeyDescriptor::from_passport(passport)?;
    let pubkey_leaf = encode_leaf(&key)?;
    let formatted_mrz = format_mrz(&passport.mrz)?;
    let mrz_packed = pack_bytes(&formatted_mrz);
    let leaf = commitment(
        request.secret,
        request.attestation_id,
        pubkey_leaf,
        &mrz_packed,
    )?;

    let proof = prove_membership(tree, &leaf, COMMITMENT_TREE_DEPTH)?;
    let root = tree.root().ok_or(DiscloseError::EmptyTree)?;
    debug!(
        algorithm = ?key.algorithm(),
        tree_size = tree.size(),
        path_length = proof.tree_depth,
        "Built disclose inputs"
    );

    let decimals = |values: &[Fr]| values.iter().map(field_to_decimal).collect::<Vec<_>>();
    Ok(WitnessInput {
        secret: vec![field_to_decimal(&request.secret)],
        attestation_id: vec![field_to_decimal(&request.attestation_id)],
        pubkey_leaf: vec![field_to_decimal(&pubkey_leaf)],
        mrz: formatted_mrz.iter().map(|b| b.to_string()).collect(),
        merkle_root: vec![field_to_decimal(&root)],
        merkletree_size: vec![proof.tree_depth.to_string()],
        path: proof.path_bits.iter().map(|b| b.to_string()).collect(),
        siblings: decimals(&proof.siblings),
        bitmap: request.bitmap.clone(),
        scope: vec![field_to_decimal(&request.scope)],
        current_date: today.to_decimal_strings(),
        majority: majority.iter().map(|b| b.to_string()).collect(),
        user_identifier: vec![field_to_decimal(&request.user_identifier)],
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::PASSPORT_ATTESTATION_ID;
    use crate::crypto::parse_field;
    use crate::passport::tests::SAMPLE_MRZ;
    use crate::passport::PublicKeyData;
    use crate::pubkey_leaf::tests::sample_modulus;
    use chrono::NaiveDate;

    pub(crate) fn sample_passport() -> PassportData {
        PassportData {
            mrz: SAMPLE_MRZ.to_string(),
            signature_algorithm: "sha256WithRSAEncryption".into(),
            pub_key: PublicKeyData {
                modulus: Some(sample_modulus().to_str_radix(10)),
                exponent: Some("65537".into()),
                ..Default::default()
            },
        }
    }

    pub(crate) fn sample_request() -> DiscloseRequest {
        DiscloseRequest {
            secret: Fr::from(0u64),
            attestation_id: parse_field(PASSPORT_ATTESTATION_ID).unwrap(),
            majority: "18".into(),
            bitmap: vec!["1".to_string(); BITMAP_LENGTH],
            scope: Fr::from(1u64),
            user_identifier: Fr::from(0u64),
        }
    }

    fn today() -> CurrentDate {
        CurrentDate::from_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
    }

    fn registered_tree(request: &DiscloseRequest) -> CommitmentTree {
        let leaf =
            passport_commitment(request.secret, request.attestation_id, &sample_passport())
                .unwrap();
        CommitmentTree::from_leaves([Fr::from(11u64), leaf, Fr::from(33u64)]).unwrap()
    }

    #[test]
    fn test_inputs_shape() {
        let request = sample_request();
        let tree = registered_tree(&request);
        let inputs =
            build_disclose_inputs_at(&request, &sample_passport(), &tree, today()).unwrap();

        assert_eq!(inputs.mrz.len(), 93);
        assert_eq!(inputs.mrz[0], "97");
        assert_eq!(inputs.path.len(), COMMITMENT_TREE_DEPTH);
        assert_eq!(inputs.siblings.len(), COMMITMENT_TREE_DEPTH);
        assert_eq!(inputs.bitmap.len(), BITMAP_LENGTH);
        assert_eq!(inputs.current_date, vec!["2", "6", "1", "0", "1", "7"]);
        assert_eq!(inputs.majority, vec!["49", "56"]);
        assert_eq!(inputs.attestation_id, vec![PASSPORT_ATTESTATION_ID]);
        assert_eq!(inputs.merkletree_size, vec!["2"]);
        assert_eq!(inputs.merkle_root, vec![field_to_decimal(&tree.root().unwrap())]);
    }

    #[test]
    fn test_inputs_serialise_with_circuit_keys() {
        let request = sample_request();
        let tree = registered_tree(&request);
        let inputs =
            build_disclose_inputs_at(&request, &sample_passport(), &tree, today()).unwrap();
        let json = serde_json::to_value(&inputs).unwrap();
        for key in [
            "secret",
            "attestation_id",
            "pubkey_leaf",
            "mrz",
            "merkle_root",
            "merkletree_size",
            "path",
            "siblings",
            "bitmap",
            "scope",
            "current_date",
            "majority",
            "user_identifier",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_unregistered_commitment() {
        let request = sample_request();
        let tree = CommitmentTree::from_leaves([Fr::from(11u64)]).unwrap();
        let err =
            build_disclose_inputs_at(&request, &sample_passport(), &tree, today()).unwrap_err();
        assert!(matches!(err, DiscloseError::LeafNotFound));
    }

    #[test]
    fn test_empty_registry_is_leaf_not_found() {
        let err = build_disclose_inputs_at(
            &sample_request(),
            &sample_passport(),
            &CommitmentTree::new(),
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, DiscloseError::LeafNotFound));
    }

    #[test]
    fn test_bitmap_validation() {
        let mut request = sample_request();
        let tree = registered_tree(&request);

        request.bitmap.pop();
        let err =
            build_disclose_inputs_at(&request, &sample_passport(), &tree, today()).unwrap_err();
        assert!(matches!(err, DiscloseError::InvalidBitmap(_)));

        request.bitmap.push("2".into());
        let err =
            build_disclose_inputs_at(&request, &sample_passport(), &tree, today()).unwrap_err();
        assert!(matches!(err, DiscloseError::InvalidBitmap(_)));
    }

    #[test]
    fn test_parse_majority() {
        assert_eq!(parse_majority("18").unwrap(), [b'1', b'8']);
        assert!(parse_majority("8").is_err());
        assert!(parse_majority("1a").is_err());
        assert!(parse_majority("180").is_err());
    }

    #[test]
    fn test_commitment_binds_secret() {
        let passport = sample_passport();
        let attestation = parse_field(PASSPORT_ATTESTATION_ID).unwrap();
        let a = passport_commitment(Fr::from(1u64), attestation, &passport).unwrap();
        let b = passport_commitment(Fr::from(2u64), attestation, &passport).unwrap();
        assert_ne!(a, b);
    }
}
