//! What a verifier demands of a disclosure.

use ark_bn254::Fr;

use crate::crypto::parse_field;
use crate::disclosure::Requirement;
use crate::error::ConfigurationError;

/// Scope, document type and attribute requirements, validated up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationPolicy {
    pub scope: Fr,
    pub attestation_id: Fr,
    pub requirements: Vec<Requirement>,
}

impl VerificationPolicy {
    /// Build a policy from its text form.
    ///
    /// `scope` and `attestation_id` are decimal or `0x` hex field elements.
    /// Each requirement is an `(attribute, expected value)` pair; an unknown
    /// attribute name fails here rather than at verification time.
    pub fn new<A, V>(
        scope: &str,
        attestation_id: &str,
        requirements: &[(A, V)],
    ) -> Result<Self, ConfigurationError>
    where
        A: AsRef<str>,
        V: AsRef<str>,
    {
        let scope = parse_field(scope).map_err(|source| ConfigurationError::InvalidFieldElement {
            name: "scope",
            source,
        })?;
        let attestation_id = parse_field(attestation_id).map_err(|source| {
            ConfigurationError::InvalidFieldElement {
                name: "attestation id",
                source,
            }
        })?;
        let requirements = requirements
            .iter()
            .map(|(attribute, value)| Requirement::new(attribute.as_ref(), value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            scope,
            attestation_id,
            requirements,
        })
    }
}
