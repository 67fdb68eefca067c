//! Issuer public-key leaves
//!
//! A signing key is hashed into a single field element so it can sit in the
//! registered key tree. The encoding must match the registration side bit for
//! bit, and the numeric algorithm tags are baked into deployed circuits.

use ark_bn254::Fr;
use num_bigint::BigUint;

use crate::constants::{RSA_LIMB_BITS, RSA_LIMB_COUNT};
use crate::crypto::{parse_uint, poseidon_hash_many, reduce_to_field};
use crate::error::DiscloseError;
use crate::passport::PassportData;

/// RSA-family signature algorithms, with the public exponent folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaAlgorithm {
    Sha256WithRsa65537,
    Sha256WithRsa3,
    Sha1WithRsa65537,
    RsassaPss65537,
    RsassaPss3,
    Sha512WithRsa65537,
}

/// ECDSA-family signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaAlgorithm {
    WithSha384,
    WithSha1,
    WithSha256,
    WithSha512,
}

/// A classified signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    Rsa(RsaAlgorithm),
    Ecdsa(EcdsaAlgorithm),
}

impl RsaAlgorithm {
    pub fn tag(self) -> u64 {
        match self {
            RsaAlgorithm::Sha256WithRsa65537 => 1,
            RsaAlgorithm::Sha256WithRsa3 => 2,
            RsaAlgorithm::Sha1WithRsa65537 => 3,
            RsaAlgorithm::RsassaPss65537 => 4,
            RsaAlgorithm::RsassaPss3 => 5,
            RsaAlgorithm::Sha512WithRsa65537 => 10,
        }
    }

    /// Name in `{algorithm}_{exponent}` form.
    pub fn name(self) -> &'static str {
        match self {
            RsaAlgorithm::Sha256WithRsa65537 => "sha256WithRSAEncryption_65537",
            RsaAlgorithm::Sha256WithRsa3 => "sha256WithRSAEncryption_3",
            RsaAlgorithm::Sha1WithRsa65537 => "sha1WithRSAEncryption_65537",
            RsaAlgorithm::RsassaPss65537 => "rsassaPss_65537",
            RsaAlgorithm::RsassaPss3 => "rsassaPss_3",
            RsaAlgorithm::Sha512WithRsa65537 => "sha512WithRSAEncryption_65537",
        }
    }
}

impl EcdsaAlgorithm {
    pub fn tag(self) -> u64 {
        match self {
            EcdsaAlgorithm::WithSha384 => 6,
            EcdsaAlgorithm::WithSha1 => 7,
            EcdsaAlgorithm::WithSha256 => 8,
            EcdsaAlgorithm::WithSha512 => 9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EcdsaAlgorithm::WithSha384 => "ecdsa_with_SHA384",
            EcdsaAlgorithm::WithSha1 => "ecdsa_with_SHA1",
            EcdsaAlgorithm::WithSha256 => "ecdsa_with_SHA256",
            EcdsaAlgorithm::WithSha512 => "ecdsa_with_SHA512",
        }
    }
}

const RSA_ALGORITHMS: [RsaAlgorithm; 6] = [
    RsaAlgorithm::Sha256WithRsa65537,
    RsaAlgorithm::Sha256WithRsa3,
    RsaAlgorithm::Sha1WithRsa65537,
    RsaAlgorithm::RsassaPss65537,
    RsaAlgorithm::RsassaPss3,
    RsaAlgorithm::Sha512WithRsa65537,
];

const ECDSA_ALGORITHMS: [EcdsaAlgorithm; 4] = [
    EcdsaAlgorithm::WithSha384,
    EcdsaAlgorithm::WithSha1,
    EcdsaAlgorithm::WithSha256,
    EcdsaAlgorithm::WithSha512,
];

impl SignatureAlgorithm {
    /// Classify an algorithm name as read from the document.
    ///
    /// RSA names only classify together with their public exponent, since
    /// `sha256WithRSAEncryption` with exponent 3 and 65537 carry distinct tags.
    pub fn classify(name: &str, exponent: Option<&str>) -> Result<Self, DiscloseError> {
        if let Some(ecdsa) = ECDSA_ALGORITHMS.into_iter().find(|a| a.name() == name) {
            return Ok(SignatureAlgorithm::Ecdsa(ecdsa));
        }

        let formatted = match exponent {
            Some(exponent) => format!("{name}_{}", parse_uint(exponent)?),
            None => name.to_string(),
        };
        RSA_ALGORITHMS
            .into_iter()
            .find(|a| a.name() == formatted)
            .map(SignatureAlgorithm::Rsa)
            .ok_or(DiscloseError::UnsupportedAlgorithm(formatted))
    }

    pub fn tag(self) -> u64 {
        match self {
            SignatureAlgorithm::Rsa(a) => a.tag(),
            SignatureAlgorithm::Ecdsa(a) => a.tag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub algorithm: RsaAlgorithm,
    pub modulus: BigUint,
    pub exponent: BigUint,
}

/// Short Weierstrass curve parameters. Points are carried in their single
/// integer encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParameters {
    pub prime: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub generator: BigUint,
    pub order: BigUint,
    pub cofactor: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaPublicKey {
    pub algorithm: EcdsaAlgorithm,
    pub public_point: BigUint,
    pub curve: CurveParameters,
}

/// An issuer signing key, split by algorithm family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningKeyDescriptor {
    RsaLike(RsaPublicKey),
    EcdsaLike(EcdsaPublicKey),
}

fn required(value: &Option<String>, field: &'static str) -> Result<BigUint, DiscloseError> {
    let text = value.as_deref().ok_or(DiscloseError::MissingKeyField(field))?;
    parse_uint(text)
}

impl SigningKeyDescriptor {
    /// Build the descriptor for the key that signed a document.
    pub fn from_passport(passport: &PassportData) -> Result<Self, DiscloseError> {
        let key = &passport.pub_key;
        let algorithm =
            SignatureAlgorithm::classify(&passport.signature_algorithm, key.exponent.as_deref())?;

        Ok(match algorithm {
            SignatureAlgorithm::Rsa(algorithm) => SigningKeyDescriptor::RsaLike(RsaPublicKey {
                algorithm,
                modulus: required(&key.modulus, "modulus")?,
                exponent: required(&key.exponent, "exponent")?,
            }),
            SignatureAlgorithm::Ecdsa(algorithm) => {
                SigningKeyDescriptor::EcdsaLike(EcdsaPublicKey {
                    algorithm,
                    public_point: required(&key.public_point, "pub")?,
                    curve: CurveParameters {
                        prime: required(&key.prime, "prime")?,
                        a: required(&key.a, "a")?,
                        b: required(&key.b, "b")?,
                        generator: required(&key.generator, "generator")?,
                        order: required(&key.order, "order")?,
                        cofactor: required(&key.cofactor, "cofactor")?,
                    },
                })
            }
        })
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            SigningKeyDescriptor::RsaLike(key) => SignatureAlgorithm::Rsa(key.algorithm),
            SigningKeyDescriptor::EcdsaLike(key) => SignatureAlgorithm::Ecdsa(key.algorithm),
        }
    }
}

/// Split an integer into `count` little-endian limbs of `bits` bits each.
pub fn split_limbs(value: &BigUint, bits: u64, count: usize) -> Result<Vec<Fr>, DiscloseError> {
    if value.bits() > bits * count as u64 {
        return Err(DiscloseError::ModulusTooLarge { bits: value.bits() });
    }
    let mask = (BigUint::from(1u8) << bits) - BigUint::from(1u8);
    Ok((0..count)
        .map(|i| reduce_to_field(&((value >> (bits * i as u64)) & &mask)))
        .collect())
}

/// Hash a signing key into its public-key tree leaf.
///
/// RSA keys hash `(tag, limb0..limb10)` with the 12-input Poseidon, the modulus
/// split into 192-bit limbs to stay under the hash arity. ECDSA keys hash
/// `(tag, point, p, a, b, G, n, h)` with the 8-input Poseidon.
pub fn encode_leaf(key: &SigningKeyDescriptor) -> Result<Fr, DiscloseError> {
    match key {
        SigningKeyDescriptor::RsaLike(rsa) => {
            let mut inputs = Vec::with_capacity(RSA_LIMB_COUNT + 1);
            inputs.push(Fr::from(rsa.algorithm.tag()));
            inputs.extend(split_limbs(&rsa.modulus, RSA_LIMB_BITS, RSA_LIMB_COUNT)?);
            poseidon_hash_many(&inputs)
        }
        SigningKeyDescriptor::EcdsaLike(ecdsa) => {
            let curve = &ecdsa.curve;
            let inputs = [
                Fr::from(ecdsa.algorithm.tag()),
                reduce_to_field(&ecdsa.public_point),
                reduce_to_field(&curve.prime),
                reduce_to_field(&curve.a),
                reduce_to_field(&curve.b),
                reduce_to_field(&curve.generator),
                reduce_to_field(&curve.order),
                reduce_to_field(&curve.cofactor),
            ];
            poseidon_hash_many(&inputs)
        }
    }
}
