//! Byte layout of the revealed data.
//!
//! Positions index the 88 MRZ characters followed by the two majority digits,
//! and are inclusive on both ends. They are fixed per circuit version.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ConfigurationError;

/// A disclosable passport attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    IssuingState,
    Name,
    PassportNumber,
    Nationality,
    DateOfBirth,
    Gender,
    ExpiryDate,
    OlderThan,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::IssuingState,
        Attribute::Name,
        Attribute::PassportNumber,
        Attribute::Nationality,
        Attribute::DateOfBirth,
        Attribute::Gender,
        Attribute::ExpiryDate,
        Attribute::OlderThan,
    ];

    /// Name used in verification policies.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::IssuingState => "issuing_state",
            Attribute::Name => "name",
            Attribute::PassportNumber => "passport_number",
            Attribute::Nationality => "nationality",
            Attribute::DateOfBirth => "date_of_birth",
            Attribute::Gender => "gender",
            Attribute::ExpiryDate => "expiry_date",
            Attribute::OlderThan => "older_than",
        }
    }

    /// Inclusive byte range inside the revealed data.
    pub fn byte_range(self) -> RangeInclusive<usize> {
        match self {
            Attribute::IssuingState => 2..=4,
            Attribute::Name => 5..=43,
            Attribute::PassportNumber => 44..=52,
            Attribute::Nationality => 54..=56,
            Attribute::DateOfBirth => 57..=62,
            Attribute::Gender => 64..=64,
            Attribute::ExpiryDate => 65..=70,
            Attribute::OlderThan => 88..=89,
        }
    }

    /// Whether the revealed bytes are a three-letter country code.
    pub fn is_country_coded(self) -> bool {
        matches!(self, Attribute::IssuingState | Attribute::Nationality)
    }
}

impl FromStr for Attribute {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Attribute::ALL
            .into_iter()
            .find(|attribute| attribute.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownAttribute(s.to_string()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
