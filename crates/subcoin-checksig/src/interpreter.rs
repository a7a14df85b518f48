mod multisig;
mod sig;

use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::{Error, VerifyFlags};
use bitcoin::opcodes::Opcode;
use bitcoin::opcodes::all::{OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY, OP_CHECKSIG, OP_CHECKSIGVERIFY};

pub use self::multisig::{
    MultiSigOp, SignatureMatches, eval_checkmultisig, handle_checkmultisig, match_signatures,
};
pub use self::sig::{CheckSigOp, eval_checksig, handle_checksig};

/// Executes one of the signature checking opcodes on `stack`.
///
/// `op_count` is the number of non-push operations executed so far in the enclosing script,
/// the multisig opcodes add their key count to it.
pub fn eval_signature_opcode(
    opcode: Opcode,
    stack: &mut Stack,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
    op_count: &mut usize,
) -> Result<(), Error> {
    match opcode {
        OP_CHECKSIG => handle_checksig(stack, flags, checker, CheckSigOp::CheckSig),
        OP_CHECKSIGVERIFY => handle_checksig(stack, flags, checker, CheckSigOp::CheckSigVerify),
        OP_CHECKMULTISIG => {
            handle_checkmultisig(stack, flags, checker, MultiSigOp::CheckMultiSig, op_count)
        }
        OP_CHECKMULTISIGVERIFY => handle_checkmultisig(
            stack,
            flags,
            checker,
            MultiSigOp::CheckMultiSigVerify,
            op_count,
        ),
        _ => Err(Error::UnsupportedOpcode(opcode)),
    }
}
