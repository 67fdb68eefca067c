//! Circuit-version constants. Changing any of these breaks compatibility with
//! deployed circuits and registries.

/// Depth of the issuer public-key tree.
pub const PUBKEY_TREE_DEPTH: usize = 16;

/// Depth of the commitment tree the disclose circuit proves membership in.
pub const COMMITMENT_TREE_DEPTH: usize = 16;

/// Attestation id of the passport document type.
pub const PASSPORT_ATTESTATION_ID: &str =
    "8518753152044246090169372947057357973469996808638122125210848696986717482788";

pub const DEFAULT_RPC_URL: &str = "https://mainnet.optimism.io";

/// Register contract exposing `checkRoot(uint256)`.
pub const REGISTER_CONTRACT_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Characters in a TD3 (passport) machine readable zone.
pub const MRZ_LENGTH: usize = 88;

/// DG1 header prepended to the MRZ: DG1 tag, total length, MRZ info tag (two bytes), MRZ length.
pub const DG1_HEADER: [u8; 5] = [97, 91, 95, 31, 88];

/// Bytes carried by each packed field element.
pub const BYTES_PER_PACKED_ELEMENT: usize = 31;

/// Field elements used to pack the formatted MRZ and the revealed data.
pub const PACKED_ELEMENTS: usize = 3;

/// Bytes recoverable from the packed revealed data.
pub const REVEALED_DATA_LENGTH: usize = BYTES_PER_PACKED_ELEMENT * PACKED_ELEMENTS;

/// One disclosure flag per MRZ character plus two for the majority digits.
pub const BITMAP_LENGTH: usize = MRZ_LENGTH + 2;

/// Width in bits of each RSA modulus limb.
pub const RSA_LIMB_BITS: u64 = 192;

/// Number of RSA modulus limbs hashed into a public-key leaf.
pub const RSA_LIMB_COUNT: usize = 11;

/// Length of the disclose circuit's public-signal vector.
pub const NUM_PUBLIC_SIGNALS: usize = 9;
