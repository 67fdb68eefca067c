//! Passport document data and the byte packing the circuits expect.

use ark_bn254::Fr;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::constants::{BYTES_PER_PACKED_ELEMENT, DG1_HEADER, MRZ_LENGTH, PACKED_ELEMENTS};
use crate::error::DiscloseError;

/// Document data as read from the passport chip.
///
/// Deserialises from the camelCase JSON shape produced by passport readers;
/// extra fields (data group hashes, signed attributes, photo) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportData {
    pub mrz: String,
    pub signature_algorithm: String,
    pub pub_key: PublicKeyData,
}

/// Issuer public key fields, as decimal or hex strings.
///
/// RSA keys fill `modulus` and `exponent`; ECDSA keys fill the point and curve
/// parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicKeyData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent: Option<String>,
    #[serde(default, rename = "pub", skip_serializing_if = "Option::is_none")]
    pub public_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cofactor: Option<String>,
}

/// Format an MRZ as the DG1 data group: header followed by the MRZ bytes.
pub fn format_mrz(mrz: &str) -> Result<Vec<u8>, DiscloseError> {
    if !mrz.is_ascii() || mrz.len() != MRZ_LENGTH {
        return Err(DiscloseError::InvalidMrz {
            expected: MRZ_LENGTH,
            actual: mrz.chars().count(),
        });
    }
    let mut formatted = Vec::with_capacity(DG1_HEADER.len() + MRZ_LENGTH);
    formatted.extend_from_slice(&DG1_HEADER);
    formatted.extend_from_slice(mrz.as_bytes());
    Ok(formatted)
}

/// Pack bytes into three field elements, 31 little-endian bytes each.
///
/// Bytes past the packing capacity are ignored; missing bytes are zero.
pub fn pack_bytes(bytes: &[u8]) -> [Fr; PACKED_ELEMENTS] {
    let mut packed = [Fr::from(0u64); PACKED_ELEMENTS];
    for (element, chunk) in packed
        .iter_mut()
        .zip(bytes.chunks(BYTES_PER_PACKED_ELEMENT))
    {
        *element = Fr::from(BigUint::from_bytes_le(chunk));
    }
    packed
}

/// Recover the bytes carried by packed field elements.
pub fn unpack_bytes(packed: &[Fr]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(packed.len() * BYTES_PER_PACKED_ELEMENT);
    for element in packed {
        let mut chunk = BigUint::from(*element).to_bytes_le();
        chunk.resize(BYTES_PER_PACKED_ELEMENT, 0);
        bytes.extend_from_slice(&chunk);
    }
    bytes
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::REVEALED_DATA_LENGTH;

    pub(crate) const SAMPLE_MRZ: &str =
        "P<FRADUPONT<<ALPHONSE<HUGUES<ALBERT<<<<<<<<<24HB818324FRA0402111M3111115<<<<<<<<<<<<<<02";

    #[test]
    fn test_sample_mrz_layout() {
        assert_eq!(SAMPLE_MRZ.len(), MRZ_LENGTH);
        assert_eq!(&SAMPLE_MRZ[2..=4], "FRA");
        assert_eq!(&SAMPLE_MRZ[54..=56], "FRA");
        assert_eq!(&SAMPLE_MRZ[57..=62], "040211");
    }

    #[test]
    fn test_format_mrz_prefixes_dg1_header() {
        let formatted = format_mrz(SAMPLE_MRZ).unwrap();
        assert_eq!(formatted.len(), 93);
        assert_eq!(&formatted[..5], &[97, 91, 95, 31, 88]);
        assert_eq!(formatted[5], b'P');
        assert_eq!(formatted[92], b'2');
    }

    #[test]
    fn test_format_mrz_rejects_bad_length() {
        let err = format_mrz("P<FRA").unwrap_err();
        assert!(matches!(
            err,
            DiscloseError::InvalidMrz { expected: 88, actual: 5 }
        ));
    }

    #[test]
    fn test_pack_bytes_little_endian() {
        let packed = pack_bytes(&[1, 2]);
        assert_eq!(packed[0], Fr::from(0x0201u64));
        assert_eq!(packed[1], Fr::from(0u64));
        assert_eq!(packed[2], Fr::from(0u64));
    }

    #[test]
    fn test_pack_bytes_spills_into_next_element() {
        let mut bytes = vec![0u8; 32];
        bytes[31] = 7;
        let packed = pack_bytes(&bytes);
        assert_eq!(packed[0], Fr::from(0u64));
        assert_eq!(packed[1], Fr::from(7u64));
    }

    #[test]
    fn test_unpack_recovers_formatted_mrz() {
        let formatted = format_mrz(SAMPLE_MRZ).unwrap();
        let unpacked = unpack_bytes(&pack_bytes(&formatted));
        assert_eq!(unpacked.len(), REVEALED_DATA_LENGTH);
        assert_eq!(unpacked, formatted);
    }

    #[test]
    fn test_passport_json_shape() {
        let json = serde_json::json!({
            "mrz": SAMPLE_MRZ,
            "signatureAlgorithm": "sha256WithRSAEncryption",
            "pubKey": { "modulus": "0xc0ffee", "exponent": "65537" },
            "dataGroupHashes": [1, 2, 3]
        });
        let passport: PassportData = serde_json::from_value(json).unwrap();
        assert_eq!(passport.signature_algorithm, "sha256WithRSAEncryption");
        assert_eq!(passport.pub_key.exponent.as_deref(), Some("65537"));
        assert!(passport.pub_key.public_point.is_none());
    }
}
