use alloy_sol_types::sol;

pub mod attributes;
pub mod constants;
pub mod countries;
pub mod crypto;
pub mod date;
pub mod disclosure;
pub mod error;
pub mod inputs;
pub mod merkle_proof;
#[cfg(feature = "mock")]
pub mod mock;
pub mod nullifier;
pub mod passport;
pub mod policy;
pub mod proof;
pub mod pubkey_leaf;
pub mod signals;
pub mod traits;
pub mod verifier;

sol! {
    /// A disclose proof and its public signals, laid out for a Solidity Groth16 verifier.
    struct DiscloseProofCalldata {
        uint256[2] a;
        uint256[2][2] b;
        uint256[2] c;
        uint256[9] pubSignals;
    }
}

// Re-export the main types for convenience
pub use attributes::Attribute;
pub use date::CurrentDate;
pub use disclosure::Requirement;
pub use error::{CapabilityError, ConfigurationError, DiscloseError, RejectReason};
pub use inputs::{build_disclose_inputs, build_disclose_inputs_at, DiscloseRequest, WitnessInput};
pub use merkle_proof::{prove_membership, CommitmentTree, MerkleProof};
pub use passport::PassportData;
pub use policy::VerificationPolicy;
pub use proof::{Groth16Proof, VerificationKey};
pub use pubkey_leaf::{encode_leaf, SigningKeyDescriptor};
pub use signals::DecodedSignals;
pub use traits::{NullifierStore, ProofVerifier, RootRegistry};
pub use verifier::{DisclosureVerifier, Rejection, VerificationStage, VerifiedDisclosure};
