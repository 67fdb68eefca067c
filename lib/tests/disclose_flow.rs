//! End-to-end disclosure: register a commitment, build inputs, prove with the
//! mock backend, verify.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ark_bn254::Fr;
use async_trait::async_trait;
use chrono::NaiveDate;
use num_bigint::BigUint;
use passport_disclose_lib::constants::PASSPORT_ATTESTATION_ID;
use passport_disclose_lib::crypto::{field_to_decimal, parse_field};
use passport_disclose_lib::inputs::passport_commitment;
use passport_disclose_lib::mock::{MockProofVerifier, MockProver};
use passport_disclose_lib::passport::PublicKeyData;
use passport_disclose_lib::{
    build_disclose_inputs_at, Attribute, CapabilityError, CommitmentTree, CurrentDate,
    DiscloseRequest, DisclosureVerifier, Groth16Proof, PassportData, RejectReason, RootRegistry,
    VerificationKey, VerificationPolicy, VerificationStage,
};

const FRENCH_MRZ: &str =
    "P<FRADUPONT<<ALPHONSE<HUGUES<ALBERT<<<<<<<<<24HB818324FRA0402111M3111115<<<<<<<<<<<<<<02";
const GERMAN_MRZ: &str =
    "P<FRADUPONT<<ALPHONSE<HUGUES<ALBERT<<<<<<<<<24HB818324DEU0402111M3111115<<<<<<<<<<<<<<02";

/// Registry that knows a fixed set of roots and counts lookups.
struct KnownRoots {
    roots: Vec<Fr>,
    lookups: AtomicUsize,
}

impl KnownRoots {
    fn new(roots: Vec<Fr>) -> Arc<Self> {
        Arc::new(Self {
            roots,
            lookups: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RootRegistry for KnownRoots {
    async fn is_root_registered(&self, root: Fr) -> Result<bool, CapabilityError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roots.contains(&root))
    }
}

fn today() -> CurrentDate {
    CurrentDate::from_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
}

fn passport(mrz: &str) -> PassportData {
    let modulus = (BigUint::from(1u8) << 2047u32) + BigUint::from(0x1234_5678_9abc_def1u64);
    PassportData {
        mrz: mrz.to_string(),
        signature_algorithm: "sha256WithRSAEncryption".into(),
        pub_key: PublicKeyData {
            modulus: Some(modulus.to_str_radix(10)),
            exponent: Some("65537".into()),
            ..Default::default()
        },
    }
}

fn request() -> DiscloseRequest {
    DiscloseRequest {
        secret: Fr::from(0u64),
        attestation_id: parse_field(PASSPORT_ATTESTATION_ID).unwrap(),
        majority: "18".into(),
        bitmap: vec!["1".to_string(); 90],
        scope: Fr::from(1u64),
        user_identifier: Fr::from(0u64),
    }
}

/// Register `passport` among some unrelated commitments and prove a disclosure.
fn prove(passport: &PassportData) -> (CommitmentTree, Groth16Proof, Vec<Fr>) {
    let request = request();
    let leaf = passport_commitment(request.secret, request.attestation_id, passport).unwrap();
    let tree = CommitmentTree::from_leaves([Fr::from(101u64), Fr::from(202u64), leaf, Fr::from(303u64)])
        .unwrap();
    let witness = build_disclose_inputs_at(&request, passport, &tree, today()).unwrap();
    let (proof, signals) = MockProver::new().prove(&witness).unwrap();
    (tree, proof, signals)
}

fn verifier(registry: Arc<KnownRoots>) -> DisclosureVerifier {
    let policy = VerificationPolicy::new(
        "1",
        PASSPORT_ATTESTATION_ID,
        &[("older_than", "18"), ("nationality", "France")],
    )
    .unwrap();
    DisclosureVerifier::new(
        policy,
        VerificationKey::new(serde_json::json!({ "protocol": "groth16", "nPublic": 9 })),
        registry,
        Arc::new(MockProofVerifier),
    )
}

#[tokio::test]
async fn french_adult_is_accepted() {
    let (tree, proof, signals) = prove(&passport(FRENCH_MRZ));
    let verifier = verifier(KnownRoots::new(vec![tree.root().unwrap()]));

    let accepted = verifier.verify_at(&signals, &proof, today()).await.unwrap();
    assert_eq!(accepted.attribute(Attribute::Nationality), "FRA");
    assert_eq!(accepted.attribute(Attribute::OlderThan), "18");
    assert_eq!(accepted.user_identifier(), Fr::from(0u64));
}

#[tokio::test]
async fn german_nationality_is_rejected_by_name() {
    let (tree, proof, signals) = prove(&passport(GERMAN_MRZ));
    let verifier = verifier(KnownRoots::new(vec![tree.root().unwrap()]));

    let rejection = verifier.verify_at(&signals, &proof, today()).await.unwrap_err();
    assert_eq!(
        rejection.reason,
        RejectReason::AttributeMismatch(Attribute::Nationality)
    );
    assert_eq!(rejection.stage, VerificationStage::DateChecked);
}

#[tokio::test]
async fn other_scope_is_rejected_before_any_lookup() {
    let (tree, proof, mut signals) = prove(&passport(FRENCH_MRZ));
    let registry = KnownRoots::new(vec![tree.root().unwrap()]);
    let verifier = verifier(registry.clone());

    signals[6] = Fr::from(2u64);
    let rejection = verifier.verify_at(&signals, &proof, today()).await.unwrap_err();
    assert_eq!(rejection.reason, RejectReason::ScopeMismatch);
    assert_eq!(registry.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_root_is_rejected() {
    let (_, proof, signals) = prove(&passport(FRENCH_MRZ));
    let verifier = verifier(KnownRoots::new(vec![Fr::from(1u64)]));

    let rejection = verifier.verify_at(&signals, &proof, today()).await.unwrap_err();
    assert_eq!(rejection.reason, RejectReason::UnregisteredRoot);
}

#[tokio::test]
async fn proof_from_yesterday_is_stale() {
    let (tree, proof, signals) = prove(&passport(FRENCH_MRZ));
    let verifier = verifier(KnownRoots::new(vec![tree.root().unwrap()]));

    let tomorrow = CurrentDate::from_date(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    let rejection = verifier.verify_at(&signals, &proof, tomorrow).await.unwrap_err();
    assert_eq!(rejection.reason, RejectReason::StaleOrInvalidDate);
}

#[tokio::test]
async fn tampered_signal_fails_proof_check() {
    let (tree, proof, mut signals) = prove(&passport(FRENCH_MRZ));
    let verifier = verifier(KnownRoots::new(vec![tree.root().unwrap()]));

    signals[8] = Fr::from(42u64);
    let rejection = verifier.verify_at(&signals, &proof, today()).await.unwrap_err();
    assert_eq!(rejection.reason, RejectReason::InvalidProof);
}

#[tokio::test]
async fn replayed_proof_is_rejected() {
    let (tree, proof, signals) = prove(&passport(FRENCH_MRZ));
    let verifier = verifier(KnownRoots::new(vec![tree.root().unwrap()]));

    verifier.verify_at(&signals, &proof, today()).await.unwrap();
    let rejection = verifier.verify_at(&signals, &proof, today()).await.unwrap_err();
    assert_eq!(rejection.reason, RejectReason::NullifierReused);
}

#[test]
fn witness_serialises_as_decimal_strings() {
    let passport = passport(FRENCH_MRZ);
    let request = request();
    let leaf = passport_commitment(request.secret, request.attestation_id, &passport).unwrap();
    let tree = CommitmentTree::from_leaves([leaf]).unwrap();
    let witness = build_disclose_inputs_at(&request, &passport, &tree, today()).unwrap();

    let json = serde_json::to_value(&witness).unwrap();
    assert_eq!(json["merkle_root"][0], field_to_decimal(&leaf));
    assert_eq!(json["merkletree_size"][0], "0");
    assert_eq!(json["mrz"].as_array().unwrap().len(), 93);
    assert_eq!(json["path"].as_array().unwrap().len(), 16);
}
