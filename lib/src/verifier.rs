//! Disclosure Verification
//!
//! This module walks a presented proof through the checks a verifier runs
//! before accepting it. The checks run in a fixed order and the first failure
//! ends the walk:
//!
//! 1. Decode the public signals
//! 2. Compare the scope with the policy's scope
//! 3. Ask the root registry whether the merkle root is registered
//! 4. Compare the attestation id with the policy's attestation id
//! 5. Compare the proof's date with today's date
//! 6. Match every attribute requirement against the revealed data
//! 7. Verify the proof with the proof backend
//! 8. Spend the nullifier in the proof's scope
//!
//! Logs name the stage and, for attribute failures, the attribute. Revealed
//! values are never logged.

use std::fmt;
use std::sync::Arc;

use ark_bn254::Fr;
use tracing::{debug, info, warn};

use crate::attributes::Attribute;
use crate::date::CurrentDate;
use crate::disclosure::{extract_attribute, match_all};
use crate::error::RejectReason;
use crate::nullifier::InMemoryNullifierStore;
use crate::policy::VerificationPolicy;
use crate::proof::{Groth16Proof, VerificationKey};
use crate::signals::DecodedSignals;
use crate::traits::{NullifierStore, ProofVerifier, RootRegistry};

/// Last check a disclosure passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStage {
    Start,
    ScopeChecked,
    RootChecked,
    AttestationChecked,
    DateChecked,
    AttributesChecked,
    ProofChecked,
    Accepted,
}

impl fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationStage::Start => "start",
            VerificationStage::ScopeChecked => "scope checked",
            VerificationStage::RootChecked => "root checked",
            VerificationStage::AttestationChecked => "attestation checked",
            VerificationStage::DateChecked => "date checked",
            VerificationStage::AttributesChecked => "attributes checked",
            VerificationStage::ProofChecked => "proof checked",
            VerificationStage::Accepted => "accepted",
        };
        f.write_str(name)
    }
}

/// A rejected disclosure: the stage it had reached and why it went no further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("disclosure rejected after {stage}: {reason}")]
pub struct Rejection {
    pub stage: VerificationStage,
    pub reason: RejectReason,
}

/// An accepted disclosure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDisclosure {
    pub signals: DecodedSignals,
}

impl VerifiedDisclosure {
    pub fn nullifier(&self) -> Fr {
        self.signals.nullifier
    }

    pub fn user_identifier(&self) -> Fr {
        self.signals.user_identifier
    }

    /// Revealed value of an attribute. Undisclosed bytes read as NUL characters.
    pub fn attribute(&self, attribute: Attribute) -> String {
        extract_attribute(&self.signals.revealed_bytes(), attribute)
    }
}

/// Verifier for one policy and one verification key.
pub struct DisclosureVerifier {
    policy: VerificationPolicy,
    verification_key: VerificationKey,
    registry: Arc<dyn RootRegistry>,
    proof_verifier: Arc<dyn ProofVerifier>,
    nullifiers: Arc<dyn NullifierStore>,
}

impl DisclosureVerifier {
    /// Build a verifier that remembers spent nullifiers in memory.
    pub fn new(
        policy: VerificationPolicy,
        verification_key: VerificationKey,
        registry: Arc<dyn RootRegistry>,
        proof_verifier: Arc<dyn ProofVerifier>,
    ) -> Self {
        Self {
            policy,
            verification_key,
            registry,
            proof_verifier,
            nullifiers: Arc::new(InMemoryNullifierStore::new()),
        }
    }

    /// Replace the nullifier set, for example with a durable one.
    pub fn with_nullifier_store(mut self, nullifiers: Arc<dyn NullifierStore>) -> Self {
        self.nullifiers = nullifiers;
        self
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Verify a disclosure against today's date.
    pub async fn verify(
        &self,
        public_signals: &[Fr],
        proof: &Groth16Proof,
    ) -> Result<VerifiedDisclosure, Rejection> {
        self.verify_at(public_signals, proof, CurrentDate::today())
            .await
    }

    /// Verify a disclosure against an explicit date.
    pub async fn verify_at(
        &self,
        public_signals: &[Fr],
        proof: &Groth16Proof,
        today: CurrentDate,
    ) -> Result<VerifiedDisclosure, Rejection> {
        let mut stage = VerificationStage::Start;
        let reject = |stage: VerificationStage, reason: RejectReason| {
            warn!(%stage, %reason, "Disclosure rejected");
            Rejection { stage, reason }
        };

        let signals = DecodedSignals::decode(public_signals)
            .map_err(|_| reject(stage, RejectReason::MalformedSignals))?;

        if signals.scope != self.policy.scope {
            return Err(reject(stage, RejectReason::ScopeMismatch));
        }
        stage = VerificationStage::ScopeChecked;
        debug!(%stage, "Check passed");

        match self.registry.is_root_registered(signals.merkle_root).await {
            Ok(true) => {}
            Ok(false) => return Err(reject(stage, RejectReason::UnregisteredRoot)),
            Err(e) => {
                warn!(error = %e, "Root registry lookup failed");
                return Err(reject(stage, RejectReason::UnregisteredRoot));
            }
        }
        stage = VerificationStage::RootChecked;
        debug!(%stage, "Check passed");

        if signals.attestation_id != self.policy.attestation_id {
            return Err(reject(stage, RejectReason::AttestationMismatch));
        }
        stage = VerificationStage::AttestationChecked;
        debug!(%stage, "Check passed");

        if signals.current_date != today.to_field() {
            return Err(reject(stage, RejectReason::StaleOrInvalidDate));
        }
        stage = VerificationStage::DateChecked;
        debug!(%stage, "Check passed");

        match_all(&signals, &self.policy.requirements).map_err(|reason| reject(stage, reason))?;
        stage = VerificationStage::AttributesChecked;
        debug!(%stage, requirements = self.policy.requirements.len(), "Check passed");

        match self
            .proof_verifier
            .verify(&self.verification_key, public_signals, proof)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(reject(stage, RejectReason::InvalidProof)),
            Err(e) => {
                warn!(error = %e, "Proof backend failed");
                return Err(reject(stage, RejectReason::ProofVerificationError));
            }
        }
        stage = VerificationStage::ProofChecked;
        debug!(%stage, "Check passed");

        match self
            .nullifiers
            .check_and_insert(signals.scope, signals.nullifier)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(reject(stage, RejectReason::NullifierReused)),
            Err(e) => {
                warn!(error = %e, "Nullifier store failed");
                return Err(reject(stage, RejectReason::NullifierStoreUnavailable));
            }
        }

        info!(stage = %VerificationStage::Accepted, "Disclosure accepted");
        Ok(VerifiedDisclosure { signals })
    }
}
