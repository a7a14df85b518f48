//! ECDSA verification and public key recovery over secp256k1.

use crate::der::SignaturePair;
use bitcoin::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use bitcoin::secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use std::sync::LazyLock;

pub static SECP: LazyLock<Secp256k1<VerifyOnly>> = LazyLock::new(Secp256k1::verification_only);

/// Verifies `pair` over `msg` against `pubkey`.
///
/// libsecp256k1 only accepts low S signatures, the pair is normalized first since high S
/// signatures are consensus valid unless `LOW_S` is active.
pub fn verify(pubkey: &PublicKey, msg: &Message, pair: &SignaturePair) -> bool {
    let mut signature = *pair.as_signature();
    signature.normalize_s();
    SECP.verify_ecdsa(msg, &signature, pubkey).is_ok()
}

/// Returns the public keys for which `pair` is a valid signature over `msg`.
///
/// Each of the four recovery ids yields at most one key, so at most four keys are returned.
pub fn possible_public_keys(msg: &Message, pair: &SignaturePair) -> Vec<PublicKey> {
    let mut signature = *pair.as_signature();
    signature.normalize_s();
    let compact = signature.serialize_compact();

    (0..4)
        .filter_map(|id| {
            let recid = RecoveryId::from_i32(id).ok()?;
            let recoverable = RecoverableSignature::from_compact(&compact, recid).ok()?;
            SECP.recover_ecdsa(msg, &recoverable).ok()
        })
        .fold(Vec::with_capacity(4), |mut keys, key| {
            if !keys.contains(&key) {
                keys.push(key);
            }
            keys
        })
}
