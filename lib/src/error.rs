//! Error types shared by input generation and verification.

use light_poseidon::PoseidonError;

use crate::attributes::Attribute;

/// Errors raised while building circuit inputs or decoding circuit outputs.
#[derive(Debug, thiserror::Error)]
pub enum DiscloseError {
    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),

    #[error("invalid MRZ: expected {expected} ASCII characters, got {actual}")]
    InvalidMrz { expected: usize, actual: usize },

    #[error("invalid disclosure bitmap: {0}")]
    InvalidBitmap(String),

    #[error("invalid majority: {0}")]
    InvalidMajority(String),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("public key is missing field `{0}`")]
    MissingKeyField(&'static str),

    #[error("RSA modulus of {bits} bits does not fit the leaf encoding")]
    ModulusTooLarge { bits: u64 },

    #[error("commitment was not found in the tree")]
    LeafNotFound,

    #[error("commitment tree is empty")]
    EmptyTree,

    #[error("tree depth {actual} exceeds the circuit depth {max}")]
    TreeTooDeep { actual: usize, max: usize },

    #[error("malformed public signals: expected {expected} elements, got {actual}")]
    MalformedSignals { expected: usize, actual: usize },

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("witness does not satisfy the disclosure relation: {0}")]
    UnsatisfiedWitness(&'static str),

    #[error("poseidon error: {0}")]
    Poseidon(#[from] PoseidonError),
}

/// Fatal errors in a verification policy, surfaced at construction time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("attribute {0} is not recognized")]
    UnknownAttribute(String),

    #[error("invalid {name}: {source}")]
    InvalidFieldElement {
        name: &'static str,
        #[source]
        source: DiscloseError,
    },
}

/// Why a presented disclosure was rejected.
///
/// Messages carry the failing check and at most an attribute name, never a
/// revealed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("malformed public signals")]
    MalformedSignals,

    #[error("scope does not match the configured scope")]
    ScopeMismatch,

    #[error("merkle root is not registered")]
    UnregisteredRoot,

    #[error("attestation id does not match the configured attestation id")]
    AttestationMismatch,

    #[error("current date is stale or invalid")]
    StaleOrInvalidDate,

    #[error("attribute {0} does not match the requirement")]
    AttributeMismatch(Attribute),

    #[error("proof is invalid")]
    InvalidProof,

    #[error("proof verification failed")]
    ProofVerificationError,

    #[error("nullifier was already used in this scope")]
    NullifierReused,

    #[error("nullifier store is unavailable")]
    NullifierStoreUnavailable,
}

/// Failures reported by an external capability (registry, proof backend, nullifier set).
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("backend error: {0}")]
    Backend(String),
}
