use super::*;
use crate::constants::{SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE};
use crate::{
    Error, MultiSigOp, StackError, VerifyFlags, eval_checkmultisig, eval_signature_opcode,
    handle_checkmultisig, match_signatures,
};
use bitcoin::opcodes::all::{OP_ADD, OP_CHECKMULTISIG, OP_CHECKMULTISIGVERIFY};

fn run_checkmultisig(stack: &mut Stack, flags: VerifyFlags) -> Result<bool, Error> {
    eval_checkmultisig(stack, &flags, &mut FixedDigest::default(), &mut 0)
}

fn keys(seeds: &[u8]) -> (Vec<SecretKey>, Vec<Vec<u8>>) {
    let secret_keys = seeds.iter().map(|seed| secret_key(*seed)).collect::<Vec<_>>();
    let public_keys = secret_keys.iter().map(compressed).collect();
    (secret_keys, public_keys)
}

#[test]
fn test_ordered_signatures() {
    let (sks, pubkeys) = keys(&[1, 2, 3]);
    let sigs = vec![sign(&sks[0], SIGHASH_ALL), sign(&sks[2], SIGHASH_ALL)];

    let matches = match_signatures(
        &sigs,
        &pubkeys,
        &VerifyFlags::STANDARD,
        &mut FixedDigest::default(),
    )
    .unwrap();
    assert_eq!(matches.indices(), &[Some(0), Some(2)]);
    assert!(matches.is_satisfied(sigs.len()));

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STANDARD), Ok(true));
    assert!(stack.is_empty());
}

#[test]
fn test_out_of_order_signatures() {
    let (sks, pubkeys) = keys(&[1, 2, 3]);
    let sigs = vec![sign(&sks[2], SIGHASH_ALL), sign(&sks[0], SIGHASH_ALL)];

    // The key of the first signature leaves no room for the second one.
    let matches =
        match_signatures(&sigs, &pubkeys, &VerifyFlags::empty(), &mut FixedDigest::default())
            .unwrap();
    assert_eq!(matches.indices(), &[None]);
    assert!(!matches.is_satisfied(sigs.len()));

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::empty()), Ok(false));
}

#[test]
fn test_foreign_key() {
    let (_, pubkeys) = keys(&[1, 2]);
    let sigs = vec![sign(&secret_key(9), SIGHASH_ALL)];

    let matches =
        match_signatures(&sigs, &pubkeys, &VerifyFlags::empty(), &mut FixedDigest::default())
            .unwrap();
    assert_eq!(matches.indices(), &[None]);

    let mut stack = multisig_stack(Vec::new(), sigs.clone(), pubkeys.clone());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STRICTENC), Ok(false));

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::NULLFAIL), Err(Error::NullFail));
}

#[test]
fn test_one_of_two() {
    let (sks, pubkeys) = keys(&[1, 2]);
    let sigs = vec![sign(&sks[1], SIGHASH_ALL)];

    let matches =
        match_signatures(&sigs, &pubkeys, &VerifyFlags::STANDARD, &mut FixedDigest::default())
            .unwrap();
    assert_eq!(matches.indices(), &[Some(1)]);

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    let mut op_count = 0;
    eval_signature_opcode(
        OP_CHECKMULTISIG,
        &mut stack,
        &VerifyFlags::STANDARD,
        &mut FixedDigest::default(),
        &mut op_count,
    )
    .unwrap();
    assert_eq!(stack.len(), 1);
    assert!(stack.pop_bool().unwrap());
    assert_eq!(op_count, 2);
}

#[test]
fn test_uncompressed_keys() {
    let sks = [secret_key(4), secret_key(5)];
    let pubkeys = sks.iter().map(uncompressed).collect::<Vec<_>>();
    let sigs = vec![sign(&sks[0], SIGHASH_ALL), sign(&sks[1], SIGHASH_ALL)];

    let mut stack = multisig_stack(Vec::new(), sigs.clone(), pubkeys.clone());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STRICTENC), Ok(true));

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(
        run_checkmultisig(&mut stack, VerifyFlags::WITNESS_PUBKEYTYPE),
        Err(Error::WitnessPubkeyType)
    );
}

#[test]
fn test_nullfail() {
    let (_, pubkeys) = keys(&[1]);
    let garbage = vec![0x30, 0x01, 0x01];

    let mut stack = multisig_stack(Vec::new(), vec![garbage.clone()], pubkeys.clone());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::empty()), Ok(false));

    let mut stack = multisig_stack(Vec::new(), vec![garbage], pubkeys.clone());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::NULLFAIL), Err(Error::NullFail));

    let mut stack = multisig_stack(Vec::new(), vec![Vec::new()], pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::NULLFAIL), Ok(false));
}

#[test]
fn test_nullfail_with_one_empty_signature() {
    let (sks, pubkeys) = keys(&[1, 2]);
    let sigs = vec![sign(&sks[0], SIGHASH_ALL), Vec::new()];

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::NULLFAIL), Err(Error::NullFail));
}

#[test]
fn test_unscanned_keys_are_not_checked() {
    let (sks, mut pubkeys) = keys(&[1, 2]);
    pubkeys[1] = vec![0x05; 33];
    let sigs = vec![sign(&sks[0], SIGHASH_ALL)];

    let mut stack = multisig_stack(Vec::new(), sigs.clone(), pubkeys.clone());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STRICTENC), Ok(true));

    // Once reached, the malformed key aborts the script.
    pubkeys.swap(0, 1);
    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STRICTENC), Err(Error::PubkeyType));
}

#[test]
fn test_signatures_after_failure_are_not_parsed() {
    let (_, pubkeys) = keys(&[1, 2]);
    // The second signature has an undefined hash type.
    let sigs = vec![sign(&secret_key(9), SIGHASH_ALL), sign(&secret_key(1), 0x04)];

    let mut stack = multisig_stack(Vec::new(), sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STRICTENC), Ok(false));
}

#[test]
fn test_digest_cache() {
    let (sks, pubkeys) = keys(&[1, 2, 3]);

    let sigs = sks.iter().map(|sk| sign(sk, SIGHASH_ALL)).collect::<Vec<_>>();
    let mut checker = FixedDigest::default();
    let matches = match_signatures(&sigs, &pubkeys, &VerifyFlags::STANDARD, &mut checker).unwrap();
    assert!(matches.is_satisfied(3));
    assert_eq!(
        checker.requests,
        vec![(HashType::from_u8(SIGHASH_ALL), sigs.clone())]
    );

    let sigs = vec![
        sign(&sks[0], SIGHASH_ALL),
        sign(&sks[1], SIGHASH_NONE | SIGHASH_ANYONECANPAY),
        sign(&sks[2], SIGHASH_ALL),
    ];
    let mut checker = FixedDigest::default();
    let matches = match_signatures(&sigs, &pubkeys, &VerifyFlags::STANDARD, &mut checker).unwrap();
    assert!(matches.is_satisfied(3));
    let hash_types = checker.requests.iter().map(|(hash_type, _)| hash_type.to_u8()).collect::<Vec<_>>();
    assert_eq!(hash_types, vec![SIGHASH_ALL, SIGHASH_NONE | SIGHASH_ANYONECANPAY]);
}

#[test]
fn test_digest_cache_overflow() {
    // Undefined hash types exhaust the cache without STRICTENC.
    let hash_types = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x16, 0x10];
    let seeds = (1..=hash_types.len() as u8).collect::<Vec<_>>();
    let (sks, pubkeys) = keys(&seeds);
    let sigs = sks
        .iter()
        .zip(hash_types)
        .map(|(sk, hash_type)| sign(sk, hash_type))
        .collect::<Vec<_>>();

    let mut checker = FixedDigest::default();
    let matches = match_signatures(&sigs, &pubkeys, &VerifyFlags::DERSIG, &mut checker).unwrap();
    assert!(matches.is_satisfied(sigs.len()));

    // 0x16 did not fit in the cache and is computed twice, 0x10 is cached.
    let requested = checker
        .requests
        .iter()
        .map(|(hash_type, _)| hash_type.to_u8())
        .collect::<Vec<_>>();
    assert_eq!(requested, vec![0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x16]);
}

#[test]
fn test_zero_of_zero() {
    let mut stack = multisig_stack(Vec::new(), Vec::new(), Vec::new());
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::STANDARD), Ok(true));
    assert!(stack.is_empty());
}

#[test]
fn test_invalid_counts() {
    let (sks, pubkeys) = keys(&[1]);

    let mut stack = Stack::default();
    stack.push(Vec::new()).push_num(0).push_num(21);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::empty()), Err(Error::PubkeyCount(21)));

    let mut stack = Stack::default();
    stack.push_num(-1);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::empty()), Err(Error::PubkeyCount(-1)));

    let mut stack = multisig_stack(
        Vec::new(),
        vec![sign(&sks[0], SIGHASH_ALL), sign(&sks[0], SIGHASH_ALL)],
        pubkeys.clone(),
    );
    assert_eq!(
        run_checkmultisig(&mut stack, VerifyFlags::empty()),
        Err(Error::SigCount { count: 2, keys: 1 })
    );

    let mut stack = Stack::default();
    stack.push(Vec::new()).push_num(-1).push(pubkeys[0].clone()).push_num(1);
    assert_eq!(
        run_checkmultisig(&mut stack, VerifyFlags::empty()),
        Err(Error::SigCount { count: -1, keys: 1 })
    );

    // Missing dummy
    let mut stack = Stack::default();
    stack.push_num(0).push_num(0);
    assert_eq!(
        run_checkmultisig(&mut stack, VerifyFlags::empty()),
        Err(Error::Stack(StackError::InvalidOperation))
    );
}

#[test]
fn test_nulldummy() {
    let (sks, pubkeys) = keys(&[1]);
    let sigs = vec![sign(&sks[0], SIGHASH_ALL)];

    let mut stack = multisig_stack(vec![0x00], sigs.clone(), pubkeys.clone());
    assert_eq!(
        run_checkmultisig(&mut stack, VerifyFlags::NULLDUMMY),
        Err(Error::SigNullDummy(1))
    );

    let mut stack = multisig_stack(vec![0x00], sigs, pubkeys);
    assert_eq!(run_checkmultisig(&mut stack, VerifyFlags::empty()), Ok(true));
}

#[test]
fn test_op_count() {
    let (_, pubkeys) = keys(&[1, 2]);
    let mut checker = FixedDigest::default();

    let mut stack = multisig_stack(Vec::new(), Vec::new(), pubkeys.clone());
    let mut op_count = 199;
    assert_eq!(
        eval_checkmultisig(&mut stack, &VerifyFlags::empty(), &mut checker, &mut op_count),
        Ok(true)
    );
    assert_eq!(op_count, 201);

    let mut stack = multisig_stack(Vec::new(), Vec::new(), pubkeys);
    let mut op_count = 200;
    assert_eq!(
        eval_checkmultisig(&mut stack, &VerifyFlags::empty(), &mut checker, &mut op_count),
        Err(Error::OpCount)
    );
}

#[test]
fn test_checkmultisig_verify() {
    let (sks, pubkeys) = keys(&[1, 2]);
    let flags = VerifyFlags::STANDARD;

    let mut stack = multisig_stack(Vec::new(), vec![sign(&sks[0], SIGHASH_ALL)], pubkeys.clone());
    handle_checkmultisig(
        &mut stack,
        &flags,
        &mut FixedDigest::default(),
        MultiSigOp::CheckMultiSigVerify,
        &mut 0,
    )
    .unwrap();
    assert!(stack.is_empty());

    let mut stack = multisig_stack(Vec::new(), vec![Vec::new()], pubkeys);
    assert_eq!(
        handle_checkmultisig(
            &mut stack,
            &flags,
            &mut FixedDigest::default(),
            MultiSigOp::CheckMultiSigVerify,
            &mut 0,
        ),
        Err(Error::Verify(OP_CHECKMULTISIGVERIFY))
    );
}

#[test]
fn test_unsupported_opcode() {
    let mut stack = Stack::default();
    assert_eq!(
        eval_signature_opcode(
            OP_ADD,
            &mut stack,
            &VerifyFlags::STANDARD,
            &mut FixedDigest::default(),
            &mut 0,
        ),
        Err(Error::UnsupportedOpcode(OP_ADD))
    );
}
