//! Decoding and validation of signature blobs popped from the stack.

use crate::constants::HALF_ORDER;
use crate::der::{DerDecodeError, DerMode, SignaturePair, check_signature_encoding, decode_der};
use crate::pubkey::PublicKeyError;
use crate::sighash::{HashType, check_defined_hashtype};
use crate::{Error, VerifyFlags};

/// Result of decoding a blob whose encoding no active flag rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Valid(T),
    /// The blob can not take part in a signature check, the check evaluates to `false`.
    Invalid(InvalidEncoding),
}

/// Reason a blob evaluates to `false` without aborting the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidEncoding {
    #[error("empty signature")]
    EmptySignature,
    #[error(transparent)]
    Der(#[from] DerDecodeError),
    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),
}

/// Rejects signatures whose S value is above half the curve order.
pub fn check_low_s(pair: &SignaturePair) -> Result<(), Error> {
    // Verify the S value is <= half the order of the curve.  This check is done
    // because when it is higher, the complement modulo the order can be used
    // instead which is a shorter encoding by 1 byte.  Further, without
    // enforcing this, it is possible to replace a signature in a valid
    // transaction with the complement while still being a valid signature that
    // verifies.  This would result in changing the transaction hash and thus is
    // a source of malleability.
    if pair.s() > *HALF_ORDER {
        return Err(Error::SigHighS);
    }

    Ok(())
}

/// Decodes a signature blob into its (r, s) pair and hash type.
///
/// The checks run in a fixed order, each one only if its flag is active: strict DER
/// (`STRICTENC`, `DERSIG` or `LOW_S`), defined hash type (`STRICTENC`), then low S (`LOW_S`)
/// on the decoded pair. The pair itself is always decoded with the lax DER parser.
pub fn parse_signature_blob(
    sig: &[u8],
    flags: &VerifyFlags,
) -> Result<Outcome<(SignaturePair, HashType)>, Error> {
    let Some((&hash_type, der)) = sig.split_last() else {
        return Ok(Outcome::Invalid(InvalidEncoding::EmptySignature));
    };

    if flags.verify_der_encoding() {
        check_signature_encoding(sig)?;
    }

    if flags.verify_strictenc() {
        check_defined_hashtype(sig)?;
    }

    let pair = match decode_der(der, DerMode::Lax) {
        Ok(pair) => pair,
        Err(err) => return Ok(Outcome::Invalid(err.into())),
    };

    if flags.verify_low_s() {
        check_low_s(&pair)?;
    }

    Ok(Outcome::Valid((pair, HashType::from_u8(hash_type))))
}
