//! DER encoded ECDSA signatures.
//!
//! [`check_signature_encoding`] enforces the strict encoding of BIP66 on a signature blob,
//! [`decode_der`] turns the DER bytes into a [`SignaturePair`].

use crate::constants::{MAX_SIGNATURE_SIZE, MIN_SIGNATURE_SIZE};
use bitcoin::secp256k1;
use bitcoin::secp256k1::ecdsa::Signature;
use num_bigint::BigUint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureEncodingError {
    #[error("DER encoded signature is too short")]
    TooShort,
    #[error("DER encoded signature is too long")]
    TooLong,
    #[error("signature does not have the expected ASN.1 sequence ID")]
    InvalidSequenceId,
    #[error("signature length does not cover the entire signature")]
    InvalidDataLength,
    #[error("R length exceeds signature size")]
    InvalidLengthR,
    #[error("R and S lengths do not match the signature size")]
    InvalidLengthRS,
    #[error("R integer marker")]
    InvalidIntegerIdR,
    #[error("R length is zero")]
    ZeroLengthR,
    #[error("R is negative")]
    NegativeR,
    #[error("R value has too much padding")]
    TooMuchPaddingR,
    #[error("S integer marker")]
    InvalidIntegerIdS,
    #[error("S length is zero")]
    ZeroLengthS,
    #[error("S is negative")]
    NegativeS,
    #[error("S value has too much padding")]
    TooMuchPaddingS,
}

// here is how to encode signatures correctly in DER format.
// 0x30 [total-length] 0x02 [R-length] [R] 0x02 [S-length] [S] [sighash-type]
//
// https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki#der-encoding
/// Checks the strict DER encoding of `sig`, which includes the trailing sighash byte.
pub fn check_signature_encoding(sig: &[u8]) -> Result<(), SignatureEncodingError> {
    check_outer_structure(sig)?;
    check_integers(sig)
}

fn check_outer_structure(sig: &[u8]) -> Result<(), SignatureEncodingError> {
    if sig.len() < MIN_SIGNATURE_SIZE {
        return Err(SignatureEncodingError::TooShort);
    }

    if sig.len() > MAX_SIGNATURE_SIZE {
        return Err(SignatureEncodingError::TooLong);
    }

    // A signature is of type 0x30 (compound)
    if sig[0] != 0x30 {
        return Err(SignatureEncodingError::InvalidSequenceId);
    }

    // Make sure the length covers the entire signature
    if sig[1] as usize != sig.len() - 3 {
        return Err(SignatureEncodingError::InvalidDataLength);
    }

    // Make sure the length of the S element is still inside the signature
    let len_r = sig[3] as usize;
    if 5 + len_r >= sig.len() {
        return Err(SignatureEncodingError::InvalidLengthR);
    }

    Ok(())
}

// Requires `check_outer_structure` to have passed, every index below is in bounds then.
fn check_integers(sig: &[u8]) -> Result<(), SignatureEncodingError> {
    let len_r = sig[3] as usize;
    let len_s = sig[5 + len_r] as usize;

    // Verify that the length of the signature matches the sum of the length of the elements
    if len_r + len_s + 7 != sig.len() {
        return Err(SignatureEncodingError::InvalidLengthRS);
    }

    // Check whether the R element is an integer
    if sig[2] != 0x02 {
        return Err(SignatureEncodingError::InvalidIntegerIdR);
    }

    // Zero-length integers are not allowed for R
    if len_r == 0 {
        return Err(SignatureEncodingError::ZeroLengthR);
    }

    // Negative numbers are not allowed for R
    if sig[4] & 0x80 != 0 {
        return Err(SignatureEncodingError::NegativeR);
    }

    // Null bytes at the start of R are not allowed, unless R would otherwise be interpreted as a negative number
    if len_r > 1 && sig[4] == 0x00 && sig[5] & 0x80 == 0 {
        return Err(SignatureEncodingError::TooMuchPaddingR);
    }

    // Check whether the S element is an integer
    if sig[len_r + 4] != 0x02 {
        return Err(SignatureEncodingError::InvalidIntegerIdS);
    }

    // Zero-length integers are not allowed for S
    if len_s == 0 {
        return Err(SignatureEncodingError::ZeroLengthS);
    }

    // Negative numbers are not allowed for S
    if sig[len_r + 6] & 0x80 != 0 {
        return Err(SignatureEncodingError::NegativeS);
    }

    // Null bytes at the start of S are not allowed, unless S would otherwise be interpreted as a negative number
    if len_s > 1 && sig[len_r + 6] == 0x00 && sig[len_r + 7] & 0x80 == 0 {
        return Err(SignatureEncodingError::TooMuchPaddingS);
    }

    Ok(())
}

/// Parsing rules used by [`decode_der`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerMode {
    /// Strict DER as specified by X.690.
    Strict,
    /// The permissive parser compatible with OpenSSL's historical behaviour, which accepts
    /// excess padding, arbitrary length descriptors and out of range integers (which decode
    /// to an unverifiable zero signature). Signatures in the chain history depend on it.
    Lax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DerDecodeError {
    #[error("malformed DER signature: {0}")]
    Malformed(secp256k1::Error),
    #[error("integer does not fit in 32 bytes")]
    IntegerTooLarge,
}

/// Decodes DER bytes, without the sighash byte, into a [`SignaturePair`].
pub fn decode_der(der: &[u8], mode: DerMode) -> Result<SignaturePair, DerDecodeError> {
    let signature = match mode {
        DerMode::Strict => Signature::from_der(der),
        DerMode::Lax => Signature::from_der_lax(der),
    };

    signature.map(SignaturePair).map_err(DerDecodeError::Malformed)
}

/// The (r, s) integer pair of an ECDSA signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignaturePair(Signature);

impl SignaturePair {
    /// Builds a pair from its integers, both must be below the curve order.
    pub fn from_integers(r: &BigUint, s: &BigUint) -> Result<Self, DerDecodeError> {
        let mut compact = [0u8; 64];
        for (offset, value) in [(0, r), (32, s)] {
            let bytes = value.to_bytes_be();
            if bytes.len() > 32 {
                return Err(DerDecodeError::IntegerTooLarge);
            }
            compact[offset + 32 - bytes.len()..offset + 32].copy_from_slice(&bytes);
        }

        Signature::from_compact(&compact)
            .map(Self)
            .map_err(DerDecodeError::Malformed)
    }

    pub fn r(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.serialize_compact()[..32])
    }

    pub fn s(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.serialize_compact()[32..])
    }

    /// Strict DER serialization of the pair.
    pub fn to_der(&self) -> Vec<u8> {
        self.0.serialize_der().to_vec()
    }

    pub fn as_signature(&self) -> &Signature {
        &self.0
    }
}

impl From<Signature> for SignaturePair {
    fn from(signature: Signature) -> Self {
        Self(signature)
    }
}
