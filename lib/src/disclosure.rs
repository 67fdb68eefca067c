//! Matching revealed attributes against a verifier's requirements.

use tracing::debug;

use crate::attributes::Attribute;
use crate::countries::country_name;
use crate::error::{ConfigurationError, RejectReason};
use crate::signals::DecodedSignals;

/// An attribute the holder must have revealed, and the value it must hold.
///
/// Country-coded attributes are compared by country name, for example
/// `("nationality", "France")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub attribute: Attribute,
    pub expected: String,
}

impl Requirement {
    pub fn new(attribute: &str, expected: impl Into<String>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            attribute: attribute.parse()?,
            expected: expected.into(),
        })
    }
}

/// Read an attribute's bytes out of the revealed data as characters.
///
/// Undisclosed bytes are zero and come back as NUL characters.
pub fn extract_attribute(revealed: &[u8], attribute: Attribute) -> String {
    revealed
        .get(attribute.byte_range())
        .unwrap_or_default()
        .iter()
        .map(|b| char::from(*b))
        .collect()
}

fn satisfies(revealed: &[u8], requirement: &Requirement) -> bool {
    let value = extract_attribute(revealed, requirement.attribute);
    if requirement.attribute.is_country_coded() {
        country_name(&value).is_some_and(|name| name == requirement.expected)
    } else {
        value == requirement.expected
    }
}

/// Check every requirement in order, stopping at the first that fails.
pub fn match_all(
    decoded: &DecodedSignals,
    requirements: &[Requirement],
) -> Result<(), RejectReason> {
    let revealed = decoded.revealed_bytes();
    for requirement in requirements {
        if !satisfies(&revealed, requirement) {
            debug!(attribute = %requirement.attribute, "Requirement not met");
            return Err(RejectReason::AttributeMismatch(requirement.attribute));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REVEALED_DATA_LENGTH;
    use crate::passport::pack_bytes;
    use ark_bn254::Fr;

    fn revealed(windows: &[(usize, &str)]) -> Vec<u8> {
        let mut bytes = vec![0u8; REVEALED_DATA_LENGTH];
        for (start, value) in windows {
            bytes[*start..*start + value.len()].copy_from_slice(value.as_bytes());
        }
        bytes
    }

    fn decoded(bytes: &[u8]) -> DecodedSignals {
        DecodedSignals {
            nullifier: Fr::from(0u64),
            revealed_data: pack_bytes(bytes),
            attestation_id: Fr::from(0u64),
            merkle_root: Fr::from(0u64),
            scope: Fr::from(0u64),
            current_date: Fr::from(0u64),
            user_identifier: Fr::from(0u64),
        }
    }

    #[test]
    fn test_requirement_rejects_unknown_attribute() {
        assert!(Requirement::new("nationality", "France").is_ok());
        assert!(matches!(
            Requirement::new("blood_type", "O"),
            Err(ConfigurationError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn test_extract_attribute() {
        let bytes = revealed(&[(54, "FRA"), (88, "18")]);
        assert_eq!(extract_attribute(&bytes, Attribute::Nationality), "FRA");
        assert_eq!(extract_attribute(&bytes, Attribute::OlderThan), "18");
        assert_eq!(extract_attribute(&bytes, Attribute::Gender), "\0");
        assert_eq!(extract_attribute(&[], Attribute::Gender), "");
    }

    #[test]
    fn test_country_resolves_to_name() {
        let signals = decoded(&revealed(&[(54, "FRA")]));
        let ok = [Requirement::new("nationality", "France").unwrap()];
        assert_eq!(match_all(&signals, &ok), Ok(()));

        let wrong = [Requirement::new("nationality", "FRA").unwrap()];
        assert_eq!(
            match_all(&signals, &wrong),
            Err(RejectReason::AttributeMismatch(Attribute::Nationality))
        );
    }

    #[test]
    fn test_unknown_country_never_matches() {
        let signals = decoded(&revealed(&[(2, "ZZZ")]));
        for expected in ["ZZZ", "", "France"] {
            let requirement = [Requirement::new("issuing_state", expected).unwrap()];
            assert_eq!(
                match_all(&signals, &requirement),
                Err(RejectReason::AttributeMismatch(Attribute::IssuingState))
            );
        }
    }

    #[test]
    fn test_first_failure_is_reported() {
        let signals = decoded(&revealed(&[(54, "DEU"), (88, "18")]));
        let requirements = [
            Requirement::new("older_than", "21").unwrap(),
            Requirement::new("nationality", "France").unwrap(),
        ];
        assert_eq!(
            match_all(&signals, &requirements),
            Err(RejectReason::AttributeMismatch(Attribute::OlderThan))
        );
    }

    #[test]
    fn test_single_byte_change_fails_only_its_requirement() {
        let base = revealed(&[(54, "FRA"), (64, "M"), (88, "18")]);
        let requirements = [
            Requirement::new("nationality", "France").unwrap(),
            Requirement::new("gender", "M").unwrap(),
            Requirement::new("older_than", "18").unwrap(),
        ];
        assert_eq!(match_all(&decoded(&base), &requirements), Ok(()));

        for (i, requirement) in requirements.iter().enumerate() {
            let mut changed = base.clone();
            changed[*requirement.attribute.byte_range().start()] ^= 0x01;
            let signals = decoded(&changed);
            for (j, other) in requirements.iter().enumerate() {
                let outcome = match_all(&signals, std::slice::from_ref(other));
                assert_eq!(outcome.is_ok(), i != j);
            }
        }
    }

    #[test]
    fn test_no_requirements() {
        assert_eq!(match_all(&decoded(&[]), &[]), Ok(()));
    }
}
