//! Signature hash type carried in the last byte of a signature blob.

use crate::Error;
use crate::constants::{SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_SINGLE};
use std::fmt;

/// Raw sighash byte of a signature.
///
/// Any byte value is representable since signatures with undefined hash types are valid
/// unless `STRICTENC` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashType(u8);

impl HashType {
    pub const fn from_u8(byte: u8) -> Self {
        Self(byte)
    }

    /// Hash type of a signature blob, `None` for an empty blob.
    pub fn from_signature(sig: &[u8]) -> Option<Self> {
        sig.last().copied().map(Self)
    }

    pub const fn to_u8(self) -> u8 {
        self.0
    }

    /// The `nHashType` value committed to by legacy and segwit v0 signing digests.
    pub const fn to_u32(self) -> u32 {
        self.0 as u32
    }

    /// Hash type with the `ANYONECANPAY` modifier stripped.
    pub const fn base_type(self) -> u8 {
        self.0 & !SIGHASH_ANYONECANPAY
    }

    pub const fn anyone_can_pay(self) -> bool {
        self.0 & SIGHASH_ANYONECANPAY != 0
    }

    /// Whether the base type is one of `ALL`, `NONE` or `SINGLE`.
    pub const fn is_defined(self) -> bool {
        let base_type = self.base_type();
        base_type >= SIGHASH_ALL && base_type <= SIGHASH_SINGLE
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Checks that the signature blob ends with a defined hash type.
pub fn check_defined_hashtype(sig: &[u8]) -> Result<(), Error> {
    match HashType::from_signature(sig) {
        Some(hash_type) if hash_type.is_defined() => Ok(()),
        _ => Err(Error::SigHashType),
    }
}
