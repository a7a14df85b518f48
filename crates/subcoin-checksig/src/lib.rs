//! Signature checking opcodes of the Bitcoin script interpreter.
//!
//! This crate implements `OP_CHECKSIG`, `OP_CHECKSIGVERIFY`, `OP_CHECKMULTISIG` and
//! `OP_CHECKMULTISIGVERIFY` on top of an operand [`Stack`], following the validation rules
//! of Bitcoin Core's `EvalScript`: strict DER (BIP66), low-S (BIP146), defined hash types,
//! public key encoding and the order preserving multisig matching.
//!
//! Malformed encodings that no active flag forbids evaluate to `false` and leave script
//! execution going, whereas violations of an active flag abort with an [`Error`].
//!
//! The signing digest is supplied by the host through [`SignatureChecker`],
//! [`TransactionSignatureChecker`] implements it for a transaction input.

pub mod constants;
pub mod der;
pub mod ecdsa;
mod error;
pub mod interpreter;
mod num;
pub mod pubkey;
pub mod sighash;
pub mod signature;
mod signature_checker;
mod stack;


use bitflags::bitflags;

pub use self::error::Error;
pub use self::interpreter::{
    CheckSigOp, MultiSigOp, SignatureMatches, eval_checkmultisig, eval_checksig,
    eval_signature_opcode, handle_checkmultisig, handle_checksig, match_signatures,
};
pub use self::num::{NumError, ScriptNum};
pub use self::signature_checker::{
    SignatureChecker, SignatureError, TransactionSignatureChecker, find_and_delete,
};
pub use self::stack::{Stack, StackError, cast_to_bool};

bitflags! {
    /// Script verification flags relevant to signature checking.
    ///
    /// The bit positions match `SCRIPT_VERIFY_*` in Bitcoin Core so that flag words can be
    /// exchanged with other implementations via [`VerifyFlags::from_bits_truncate`].
    ///
    /// https://github.com/bitcoin/bitcoin/blob/6f9db1ebcab4064065ccd787161bf2b87e03cc1f/src/script/interpreter.h#L45
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VerifyFlags: u32 {
        /// Passing a non-strict-DER signature or one with undefined hashtype to a checksig
        /// operation causes script failure. Evaluating a pubkey that is not (0x04 + 64 bytes)
        /// or (0x02 or 0x03 + 32 bytes) by checksig causes script failure.
        const STRICTENC = 1 << 1;
        /// Passing a non-strict-DER signature to a checksig operation causes script failure (BIP62 rule 1).
        const DERSIG = 1 << 2;
        /// Passing a non-strict-DER signature or one with S > order/2 to a checksig operation
        /// causes script failure (BIP62 rule 5).
        const LOW_S = 1 << 3;
        /// Verify dummy stack item consumed by CHECKMULTISIG is of zero-length (BIP62 rule 7).
        const NULLDUMMY = 1 << 4;
        /// Signature(s) must be empty vector if a CHECK(MULTI)SIG operation failed.
        const NULLFAIL = 1 << 14;
        /// Public keys in segregated witness scripts must be compressed.
        const WITNESS_PUBKEYTYPE = 1 << 15;

        /// All the signature checking rules enforced by relay policy.
        const STANDARD = Self::STRICTENC.bits()
            | Self::DERSIG.bits()
            | Self::LOW_S.bits()
            | Self::NULLDUMMY.bits()
            | Self::NULLFAIL.bits()
            | Self::WITNESS_PUBKEYTYPE.bits();
    }
}

impl VerifyFlags {
    /// Whether the signature must pass the strict DER encoding check.
    pub fn verify_der_encoding(&self) -> bool {
        self.intersects(Self::STRICTENC | Self::DERSIG | Self::LOW_S)
    }

    pub fn verify_strictenc(&self) -> bool {
        self.intersects(Self::STRICTENC)
    }

    pub fn verify_low_s(&self) -> bool {
        self.intersects(Self::LOW_S)
    }

    pub fn verify_nulldummy(&self) -> bool {
        self.intersects(Self::NULLDUMMY)
    }

    pub fn verify_nullfail(&self) -> bool {
        self.intersects(Self::NULLFAIL)
    }

    pub fn verify_witness_pubkeytype(&self) -> bool {
        self.intersects(Self::WITNESS_PUBKEYTYPE)
    }
}

/// Signature hashing scheme of the script being executed.
///
/// https://github.com/bitcoin/bitcoin/blob/6f9db1ebcab4064065ccd787161bf2b87e03cc1f/src/script/interpreter.h#L190
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigVersion {
    /// Bare scripts and BIP16 P2SH-wrapped redeemscripts
    Base,
    /// Witness v0 (P2WPKH and P2WSH); see BIP 141
    WitnessV0,
}
