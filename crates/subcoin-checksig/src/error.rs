use crate::constants::{MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG};
use crate::der::SignatureEncodingError;
use crate::signature_checker::SignatureError;
use crate::stack::StackError;
use bitcoin::opcodes::Opcode;

/// Errors aborting the evaluation of the enclosing script.
///
/// Signatures or keys that are merely malformed do not end up here when no flag forbids
/// them, the opcode pushes `false` instead.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("non-canonical DER signature: {0}")]
    SigDer(#[from] SignatureEncodingError),
    #[error("signature violates low-S requirement")]
    SigHighS,
    #[error("signature hash type is not defined")]
    SigHashType,
    #[error("public key is neither compressed nor uncompressed")]
    PubkeyType,
    #[error("public key in witness script is not compressed")]
    WitnessPubkeyType,
    // Signatures are not empty on failed checksig or checkmultisig operations.
    #[error("signatures are not empty on failed checksig/checkmultisig operations")]
    NullFail,
    #[error("multisig dummy argument has length {0} instead of 0")]
    SigNullDummy(usize),
    #[error("invalid number of pubkeys {0}, expected in the range of [0, {MAX_PUBKEYS_PER_MULTISIG}]")]
    PubkeyCount(i64),
    #[error("invalid number of signatures {count}, expected in the range of [0, {keys}]")]
    SigCount { count: i64, keys: usize },
    #[error("exceeds max operations ({MAX_OPS_PER_SCRIPT}) per script")]
    OpCount,
    #[error("{0} failed")]
    Verify(Opcode),
    #[error("{0} is not a signature checking opcode")]
    UnsupportedOpcode(Opcode),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}
