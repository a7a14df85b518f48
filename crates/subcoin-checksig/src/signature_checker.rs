use crate::SigVersion;
use crate::sighash::HashType;
use bitcoin::hashes::Hash;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::secp256k1::Message;
use bitcoin::sighash::SighashCache;
use bitcoin::transaction::InputsIndexError;
use bitcoin::{Amount, EcdsaSighashType, ScriptBuf, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("failed to compute signature hash: {0}")]
    InputIndex(#[from] InputsIndexError),
    #[error("signature of {0} bytes can not be pushed onto a script")]
    PushBytes(usize),
}

/// Provides the digest a signature commits to.
pub trait SignatureChecker {
    /// Returns the message signed with `hash_type`.
    ///
    /// `signatures` are all the signature blobs consumed by the current opcode, legacy
    /// digests exclude them from the script code.
    fn signature_hash(
        &mut self,
        hash_type: HashType,
        signatures: &[Vec<u8>],
    ) -> Result<Message, SignatureError>;
}

/// Computes signature hashes for an input of a transaction.
pub struct TransactionSignatureChecker<'a> {
    cache: SighashCache<&'a Transaction>,
    input_index: usize,
    input_amount: Amount,
    script_code: ScriptBuf,
    sig_version: SigVersion,
}

impl<'a> TransactionSignatureChecker<'a> {
    /// Constructs a new instance of [`TransactionSignatureChecker`].
    ///
    /// `script_code` is the script being executed, `input_amount` is only committed to by
    /// [`SigVersion::WitnessV0`] digests.
    pub fn new(
        tx: &'a Transaction,
        input_index: usize,
        input_amount: Amount,
        script_code: ScriptBuf,
        sig_version: SigVersion,
    ) -> Self {
        Self {
            cache: SighashCache::new(tx),
            input_index,
            input_amount,
            script_code,
            sig_version,
        }
    }
}

impl SignatureChecker for TransactionSignatureChecker<'_> {
    fn signature_hash(
        &mut self,
        hash_type: HashType,
        signatures: &[Vec<u8>],
    ) -> Result<Message, SignatureError> {
        let digest = match self.sig_version {
            SigVersion::Base => {
                // Drop the signatures in pre-segwit scripts but not segwit scripts.
                let mut script_code = self.script_code.to_bytes();
                for sig in signatures {
                    let push_buf = PushBytesBuf::try_from(sig.clone())
                        .map_err(|_| SignatureError::PushBytes(sig.len()))?;
                    let pattern = Builder::new().push_slice(push_buf).into_script();
                    find_and_delete(&mut script_code, pattern.as_bytes());
                }

                self.cache
                    .legacy_signature_hash(
                        self.input_index,
                        &ScriptBuf::from_bytes(script_code),
                        hash_type.to_u32(),
                    )?
                    .to_byte_array()
            }
            SigVersion::WitnessV0 => self
                .cache
                .p2wsh_signature_hash(
                    self.input_index,
                    &self.script_code,
                    self.input_amount,
                    // Undefined hash types are mapped to a defined one here, so the digest
                    // does not commit to the raw byte as Bitcoin Core's does.
                    EcdsaSighashType::from_consensus(hash_type.to_u32()),
                )?
                .to_byte_array(),
        };

        Ok(Message::from_digest(digest))
    }
}

/// Removes every occurrence of `pattern` starting at an opcode boundary of `script`.
///
/// Returns the number of occurrences removed, `script` is left untouched if there is none.
pub fn find_and_delete(script: &mut Vec<u8>, pattern: &[u8]) -> usize {
    if pattern.is_empty() {
        return 0;
    }

    let mut found = 0;
    let mut result = Vec::with_capacity(script.len());
    let mut pc = 0;
    let mut kept_from = 0;

    loop {
        result.extend_from_slice(&script[kept_from..pc]);

        while script[pc..].starts_with(pattern) {
            pc += pattern.len();
            found += 1;
        }

        kept_from = pc;

        match op_len(&script[pc..]) {
            Some(len) => pc += len,
            None => break,
        }
    }

    if found > 0 {
        result.extend_from_slice(&script[kept_from..]);
        *script = result;
    }

    found
}

/// Length of the operation at the start of `script`, including its push data.
///
/// `None` at the end of the script or if the push data is truncated.
fn op_len(script: &[u8]) -> Option<usize> {
    let (&opcode, rest) = script.split_first()?;

    let (header_len, data_len) = match opcode {
        0x01..=0x4b => (0, opcode as usize),
        // OP_PUSHDATA1
        0x4c => (1, *rest.first()? as usize),
        // OP_PUSHDATA2
        0x4d => (2, u16::from_le_bytes(rest.get(..2)?.try_into().ok()?) as usize),
        // OP_PUSHDATA4
        0x4e => (4, u32::from_le_bytes(rest.get(..4)?.try_into().ok()?) as usize),
        _ => (0, 0),
    };

    let len = 1 + header_len + data_len;
    (len <= script.len()).then_some(len)
}
