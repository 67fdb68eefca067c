//! External capabilities the verifier depends on.
//!
//! Each is an injected trait object so the verification flow can run against
//! a chain registry and a SNARK backend in production and against fakes in
//! tests.

use ark_bn254::Fr;
use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::proof::{Groth16Proof, VerificationKey};

/// Registry of commitment-tree roots, usually a contract on chain.
#[async_trait]
pub trait RootRegistry: Send + Sync {
    /// Whether `root` is a root the registry has recorded.
    async fn is_root_registered(&self, root: Fr) -> Result<bool, CapabilityError>;
}

/// Cryptographic verification of a disclose proof.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// `Ok(false)` for a well-formed proof that does not verify, `Err` when the
    /// key or proof cannot be processed.
    async fn verify(
        &self,
        key: &VerificationKey,
        public_signals: &[Fr],
        proof: &Groth16Proof,
    ) -> Result<bool, CapabilityError>;
}

/// Durable set of nullifiers already spent, keyed by scope.
#[async_trait]
pub trait NullifierStore: Send + Sync {
    /// Record `(scope, nullifier)`, returning `false` if it was already present.
    ///
    /// The check and the insert must be atomic with respect to other callers.
    async fn check_and_insert(&self, scope: Fr, nullifier: Fr) -> Result<bool, CapabilityError>;
}
