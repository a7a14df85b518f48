use crate::constants::{MAX_OPS_PER_SCRIPT, MAX_PUBKEYS_PER_MULTISIG};
use crate::ecdsa;
use crate::pubkey::{check_pubkey_encoding, decode_public_key};
use crate::sighash::HashType;
use crate::signature::{Outcome, parse_signature_blob};
use crate::signature_checker::SignatureChecker;
use crate::stack::Stack;
use crate::{Error, VerifyFlags};
use bitcoin::opcodes::all::OP_CHECKMULTISIGVERIFY;
use bitcoin::secp256k1::{Message, PublicKey};

const LOG_TARGET: &str = "checkmultisig";

/// One slot per defined hash type.
const DIGEST_CACHE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiSigOp {
    CheckMultiSig,
    CheckMultiSigVerify,
}

/// Public key index matched by each signature, in signature order.
///
/// Matching stops at the first signature without a key, which is recorded as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureMatches(Vec<Option<usize>>);

impl SignatureMatches {
    pub fn indices(&self) -> &[Option<usize>] {
        &self.0
    }

    /// Whether each of `sigs_count` signatures matched a key, with keys used in order.
    pub fn is_satisfied(&self, sigs_count: usize) -> bool {
        self.0.len() == sigs_count
            && self.0.iter().all(Option::is_some)
            && self.0.windows(2).all(|pair| pair[0] < pair[1])
    }
}

/// Digests computed during a single multisig evaluation, keyed by hash type.
struct DigestCache {
    slots: [Option<(HashType, Message)>; DIGEST_CACHE_SIZE],
}

impl DigestCache {
    fn new() -> Self {
        Self {
            slots: [None; DIGEST_CACHE_SIZE],
        }
    }

    fn signature_hash(
        &mut self,
        hash_type: HashType,
        sigs: &[Vec<u8>],
        checker: &mut impl SignatureChecker,
    ) -> Result<Message, Error> {
        if let Some((_, msg)) = self.slots.iter().flatten().find(|(ty, _)| *ty == hash_type) {
            return Ok(*msg);
        }

        let msg = checker.signature_hash(hash_type, sigs)?;

        // Non-standard hash types may exhaust the slots, the digest is just not cached then.
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some((hash_type, msg));
        }

        Ok(msg)
    }
}

/// Handles the OP_CHECKMULTISIG and OP_CHECKMULTISIGVERIFY opcodes.
///
/// This opcode validates a multi-signature script against the provided public keys and signatures.
pub fn handle_checkmultisig(
    stack: &mut Stack,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
    multisig_op: MultiSigOp,
    op_count: &mut usize,
) -> Result<(), Error> {
    let success = eval_checkmultisig(stack, flags, checker, op_count)?;

    match multisig_op {
        MultiSigOp::CheckMultiSig => {
            stack.push_bool(success);
        }
        MultiSigOp::CheckMultiSigVerify if !success => {
            return Err(Error::Verify(OP_CHECKMULTISIGVERIFY));
        }
        _ => {}
    }

    Ok(())
}

/// Pops the multisig operands and returns whether the signatures are satisfied by the keys.
pub fn eval_checkmultisig(
    stack: &mut Stack,
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
    op_count: &mut usize,
) -> Result<bool, Error> {
    // ([sig ...] num_of_signatures [pubkey ...] num_of_pubkeys -- bool)

    let keys_count = stack.pop_num()?.value();
    if !(0..=MAX_PUBKEYS_PER_MULTISIG).contains(&keys_count) {
        return Err(Error::PubkeyCount(keys_count));
    }

    let keys_count = keys_count as usize;

    *op_count += keys_count;

    if *op_count > MAX_OPS_PER_SCRIPT {
        return Err(Error::OpCount);
    }

    let keys = (0..keys_count)
        .map(|_| stack.pop())
        .collect::<Result<Vec<_>, _>>()?;

    let sigs_count = stack.pop_num()?.value();
    if sigs_count < 0 || sigs_count as usize > keys_count {
        return Err(Error::SigCount {
            count: sigs_count,
            keys: keys_count,
        });
    }

    let sigs = (0..sigs_count)
        .map(|_| stack.pop())
        .collect::<Result<Vec<_>, _>>()?;

    // A bug in the original Satoshi client implementation means one more
    // stack value than should be used must be popped.  Unfortunately, this
    // buggy behavior is now part of the consensus and a hard fork would be
    // required to fix it.
    let dummy = stack.pop()?;

    // Since the dummy argument is otherwise not checked, it could be any
    // value which unfortunately provides a source of malleability.  Thus,
    // there is a script flag to force an error when the value is NOT 0.
    if flags.verify_nulldummy() && !dummy.is_empty() {
        return Err(Error::SigNullDummy(dummy.len()));
    }

    let matches = match_signatures(&sigs, &keys, flags, checker)?;
    let success = matches.is_satisfied(sigs.len());

    tracing::debug!(
        target: LOG_TARGET,
        "{sigs_count}-of-{keys_count} multisig matched keys {:?}, success: {success}",
        matches.indices(),
    );

    if !success && flags.verify_nullfail() && sigs.iter().any(|sig| !sig.is_empty()) {
        tracing::debug!(target: LOG_TARGET, "Failed multisig has non-empty signatures");
        return Err(Error::NullFail);
    }

    Ok(success)
}

/// Matches each signature to a public key, keeping the relative order of both lists.
///
/// Keys are consumed greedily, a key skipped by one signature can not be used by the
/// following ones. Matching stops as soon as a signature finds no key or the remaining keys
/// are too few for the remaining signatures.
pub fn match_signatures(
    sigs: &[Vec<u8>],
    keys: &[Vec<u8>],
    flags: &VerifyFlags,
    checker: &mut impl SignatureChecker,
) -> Result<SignatureMatches, Error> {
    let mut digests = DigestCache::new();
    let mut matches = Vec::with_capacity(sigs.len());
    let mut next_key = 0;

    for (sig_index, sig) in sigs.iter().enumerate() {
        let sigs_left = sigs.len() - sig_index;

        if sigs_left > keys.len() - next_key {
            break;
        }

        let (pair, hash_type) = match parse_signature_blob(sig, flags)? {
            Outcome::Valid(parsed) => parsed,
            Outcome::Invalid(reason) => {
                tracing::debug!(
                    target: LOG_TARGET,
                    "Signature #{sig_index} {} is invalid: {reason}",
                    hex::encode(sig),
                );
                matches.push(None);
                break;
            }
        };

        let msg = digests.signature_hash(hash_type, sigs, checker)?;
        let candidates = ecdsa::possible_public_keys(&msg, &pair);

        match find_public_key(keys, next_key, sigs_left - 1, &candidates, flags)? {
            Some(key_index) => {
                matches.push(Some(key_index));
                next_key = key_index + 1;
            }
            None => {
                matches.push(None);
                break;
            }
        }
    }

    Ok(SignatureMatches(matches))
}

// Scans `keys[start..]` for one of `candidates`, leaving at least `sigs_after` keys unscanned
// for the signatures after the current one.
fn find_public_key(
    keys: &[Vec<u8>],
    start: usize,
    sigs_after: usize,
    candidates: &[PublicKey],
    flags: &VerifyFlags,
) -> Result<Option<usize>, Error> {
    let mut index = start;

    while keys.len() - index > sigs_after {
        let key = &keys[index];

        check_pubkey_encoding(key, flags)?;

        if let Ok(pubkey) = decode_public_key(key, flags.verify_strictenc()) {
            if candidates.contains(&pubkey) {
                return Ok(Some(index));
            }
        }

        index += 1;
    }

    Ok(None)
}
