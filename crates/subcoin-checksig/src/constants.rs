use num_bigint::BigUint;
use num_traits::Num;
use std::sync::LazyLock;

/// Size of a SEC1 compressed public key.
pub const COMPRESSED_PUBKEY_SIZE: usize = 33;

/// Size of a SEC1 uncompressed public key.
pub const UNCOMPRESSED_PUBKEY_SIZE: usize = 65;

/// Minimum size of a DER signature including the trailing sighash byte.
pub const MIN_SIGNATURE_SIZE: usize = 9;

/// Maximum size of a DER signature including the trailing sighash byte.
pub const MAX_SIGNATURE_SIZE: usize = 73;

/// Maximum number of public keys per multisig.
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

/// Maximum number of non-push operations per script.
pub const MAX_OPS_PER_SCRIPT: usize = 201;

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Order of the secp256k1 group.
pub static CURVE_ORDER: LazyLock<BigUint> = LazyLock::new(|| {
    const N: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
    BigUint::from_str_radix(N, 16).expect("Static value must be valid")
});

/// `CURVE_ORDER / 2`, the largest S value accepted under `LOW_S`.
pub static HALF_ORDER: LazyLock<BigUint> = LazyLock::new(|| CURVE_ORDER.clone() >> 1usize);
