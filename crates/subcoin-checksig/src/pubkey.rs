//! SEC1 public key encodings.

use crate::constants::{COMPRESSED_PUBKEY_SIZE, UNCOMPRESSED_PUBKEY_SIZE};
use crate::{Error, VerifyFlags};
use bitcoin::secp256k1;
use bitcoin::secp256k1::PublicKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublicKeyError {
    #[error("public key is not strictly encoded")]
    NonStrictEncoding,
    #[error("invalid public key: {0}")]
    Secp256k1(secp256k1::Error),
}

/// Whether `v` is a compressed (0x02/0x03 + 32 bytes) or uncompressed (0x04 + 64 bytes) key.
pub fn is_public_key(v: &[u8]) -> bool {
    match v.len() {
        COMPRESSED_PUBKEY_SIZE if v[0] == 0x02 || v[0] == 0x03 => true,
        UNCOMPRESSED_PUBKEY_SIZE if v[0] == 0x04 => true,
        _ => false,
    }
}

pub fn is_compressed_pubkey(pubkey: &[u8]) -> bool {
    pubkey.len() == COMPRESSED_PUBKEY_SIZE && matches!(pubkey[0], 0x02 | 0x03)
}

// Checks whether or not the passed public key adheres to
// the strict encoding requirements if enabled.
pub fn check_pubkey_encoding(pubkey: &[u8], flags: &VerifyFlags) -> Result<(), Error> {
    if flags.verify_strictenc() && !is_public_key(pubkey) {
        return Err(Error::PubkeyType);
    }

    if flags.verify_witness_pubkeytype() && !is_compressed_pubkey(pubkey) {
        return Err(Error::WitnessPubkeyType);
    }

    Ok(())
}

/// Decodes a SEC1 public key into a curve point.
///
/// Without `strict`, every encoding libsecp256k1 understands is accepted, including the
/// hybrid (0x06/0x07) form.
pub fn decode_public_key(blob: &[u8], strict: bool) -> Result<PublicKey, PublicKeyError> {
    if strict && !is_public_key(blob) {
        return Err(PublicKeyError::NonStrictEncoding);
    }

    PublicKey::from_slice(blob).map_err(PublicKeyError::Secp256k1)
}
