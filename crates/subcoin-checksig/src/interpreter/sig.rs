use crate::ecdsa;
use crate::pubkey::{check_pubkey_encoding, decode_public_key};
use crate::signature::{InvalidEncoding, Outcome, parse_signature_blob};
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::{Error, VerifyFlags};
use bitcoin::opcodes::all::OP_CHECKSIGVERIFY;

const LOG_TARGET: &str = "checksig";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSigOp {
    CheckSig,
    CheckSigVerify,
}

/// Handles the OP_CHECKSIG and OP_CHECKSIGVERIFY opcodes.
pub fn handle_checksig(
    stack: &mut Stack,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
    checksig_op: CheckSigOp,
) -> Result<(), Error> {
    let success = eval_checksig(stack, flags, checker)?;

    stack.push_bool(success);

    if checksig_op == CheckSigOp::CheckSigVerify && !stack.pop_bool()? {
        return Err(Error::Verify(OP_CHECKSIGVERIFY));
    }

    Ok(())
}

/// Pops a public key and a signature, returns whether the signature is valid for the key.
///
/// Returns an error instead of `false` when an active flag is violated, including `NULLFAIL`
/// for a non-empty signature that fails verification. A signature or key that can not be
/// decoded always yields `false`.
pub fn eval_checksig(
    stack: &mut Stack,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<bool, Error> {
    // [sig pubkey] -> bool
    let pubkey = stack.pop()?;
    let sig = stack.pop()?;

    check_pubkey_encoding(&pubkey, flags)?;

    let success = match verify_signature(&sig, &pubkey, flags, checker)? {
        Outcome::Valid(success) => success,
        Outcome::Invalid(reason) => {
            tracing::debug!(
                target: LOG_TARGET,
                "Signature {} can not be checked against {}: {reason}",
                hex::encode(&sig),
                hex::encode(&pubkey),
            );
            return Ok(false);
        }
    };

    if !success && flags.verify_nullfail() && !sig.is_empty() {
        tracing::debug!(target: LOG_TARGET, "Failed signature {} is not empty", hex::encode(&sig));
        return Err(Error::NullFail);
    }

    Ok(success)
}

fn verify_signature(
    sig: &[u8],
    pubkey: &[u8],
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<Outcome<bool>, Error> {
    let (pair, hash_type) = match parse_signature_blob(sig, flags)? {
        Outcome::Valid(parsed) => parsed,
        Outcome::Invalid(reason) => return Ok(Outcome::Invalid(reason)),
    };

    let pubkey = match decode_public_key(pubkey, flags.verify_strictenc()) {
        Ok(pubkey) => pubkey,
        Err(err) => return Ok(Outcome::Invalid(InvalidEncoding::PublicKey(err))),
    };

    let msg = checker.signature_hash(hash_type, &[sig.to_vec()])?;

    Ok(Outcome::Valid(ecdsa::verify(&pubkey, &msg, &pair)))
}
