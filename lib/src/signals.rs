//! Public-signal layout of the disclose circuit.

use ark_bn254::Fr;

use crate::constants::{NUM_PUBLIC_SIGNALS, PACKED_ELEMENTS};
use crate::crypto::parse_field;
use crate::error::DiscloseError;
use crate::passport::unpack_bytes;

/// Public signals by name, in circuit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedSignals {
    pub nullifier: Fr,
    pub revealed_data: [Fr; PACKED_ELEMENTS],
    pub attestation_id: Fr,
    pub merkle_root: Fr,
    pub scope: Fr,
    pub current_date: Fr,
    pub user_identifier: Fr,
}

impl DecodedSignals {
    /// Split a signal vector into named fields. Elements past the ninth are ignored.
    pub fn decode(signals: &[Fr]) -> Result<Self, DiscloseError> {
        if signals.len() < NUM_PUBLIC_SIGNALS {
            return Err(DiscloseError::MalformedSignals {
                expected: NUM_PUBLIC_SIGNALS,
                actual: signals.len(),
            });
        }
        Ok(Self {
            nullifier: signals[0],
            revealed_data: [signals[1], signals[2], signals[3]],
            attestation_id: signals[4],
            merkle_root: signals[5],
            scope: signals[6],
            current_date: signals[7],
            user_identifier: signals[8],
        })
    }

    /// Decode the string array snarkjs writes to `public.json`.
    pub fn from_strings<S: AsRef<str>>(signals: &[S]) -> Result<Self, DiscloseError> {
        let parsed = signals
            .iter()
            .take(NUM_PUBLIC_SIGNALS)
            .map(|s| parse_field(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if parsed.len() < NUM_PUBLIC_SIGNALS {
            return Err(DiscloseError::MalformedSignals {
                expected: NUM_PUBLIC_SIGNALS,
                actual: signals.len(),
            });
        }
        Self::decode(&parsed)
    }

    pub fn to_vec(&self) -> Vec<Fr> {
        vec![
            self.nullifier,
            self.revealed_data[0],
            self.revealed_data[1],
            self.revealed_data[2],
            self.attestation_id,
            self.merkle_root,
            self.scope,
            self.current_date,
            self.user_identifier,
        ]
    }

    /// The revealed bytes, unpacked from the three packed elements.
    pub fn revealed_bytes(&self) -> Vec<u8> {
        unpack_bytes(&self.revealed_data)
    }
}
