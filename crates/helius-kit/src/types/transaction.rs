//! Legacy transaction wire format.
//!
//! Hand-rolled serialization for the legacy message layout: a three
//! byte header, a compact array of account keys (fee payer first), a
//! recent blockhash, and a compact array of compiled instructions.
//! Lengths use the compact-u16 encoding (7 bits per byte, little
//! endian, high bit as continuation).

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::SignerError;
use crate::types::{AccountMeta, Hash, Instruction, KeySigner, Pubkey, Signature};

/// Compact-u16 length prefix.
fn encode_compact_len(out: &mut Vec<u8>, mut len: usize) {
    loop {
        let mut byte = (len & 0x7f) as u8;
        len >>= 7;
        if len != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if len == 0 {
            break;
        }
    }
}

// ============================================================================
// Message
// ============================================================================

/// Signature and access counts for the account key list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Signatures the transaction must carry.
    pub num_required_signatures: u8,
    /// Trailing read-only accounts within the signing section.
    pub num_readonly_signed_accounts: u8,
    /// Trailing read-only accounts within the non-signing section.
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its accounts resolved to key-list indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled legacy message, ready to be signed and serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile instructions into a message with `payer` as fee payer.
    ///
    /// Account keys are deduplicated in first-appearance order and laid
    /// out as writable signers (payer first), read-only signers,
    /// writable non-signers, then read-only non-signers. Program ids
    /// join the key list as read-only non-signers unless an instruction
    /// grants them more.
    pub fn new(instructions: &[Instruction], payer: &Pubkey, recent_blockhash: Hash) -> Self {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::new(*payer, true)];
        for instruction in instructions {
            metas.push(AccountMeta::new_readonly(instruction.program_id, false));
            metas.extend(instruction.accounts.iter().cloned());
        }

        // Merge duplicates, OR-ing signer/writable privileges.
        let mut unique: Vec<AccountMeta> = Vec::new();
        for meta in metas {
            match unique.iter_mut().find(|m| m.pubkey == meta.pubkey) {
                Some(existing) => {
                    existing.is_signer |= meta.is_signer;
                    existing.is_writable |= meta.is_writable;
                }
                None => unique.push(meta),
            }
        }

        let writable_signers: Vec<&AccountMeta> = unique
            .iter()
            .filter(|m| m.is_signer && m.is_writable)
            .collect();
        let readonly_signers: Vec<&AccountMeta> = unique
            .iter()
            .filter(|m| m.is_signer && !m.is_writable)
            .collect();
        let writable_non_signers: Vec<&AccountMeta> = unique
            .iter()
            .filter(|m| !m.is_signer && m.is_writable)
            .collect();
        let readonly_non_signers: Vec<&AccountMeta> = unique
            .iter()
            .filter(|m| !m.is_signer && !m.is_writable)
            .collect();

        let header = MessageHeader {
            num_required_signatures: (writable_signers.len() + readonly_signers.len()) as u8,
            num_readonly_signed_accounts: readonly_signers.len() as u8,
            num_readonly_unsigned_accounts: readonly_non_signers.len() as u8,
        };

        let account_keys: Vec<Pubkey> = writable_signers
            .iter()
            .chain(&readonly_signers)
            .chain(&writable_non_signers)
            .chain(&readonly_non_signers)
            .map(|m| m.pubkey)
            .collect();

        let position = |key: &Pubkey| -> u8 {
            account_keys
                .iter()
                .position(|k| k == key)
                .expect("compiled account key is present") as u8
        };

        let instructions = instructions
            .iter()
            .map(|instruction| CompiledInstruction {
                program_id_index: position(&instruction.program_id),
                accounts: instruction
                    .accounts
                    .iter()
                    .map(|meta| position(&meta.pubkey))
                    .collect(),
                data: instruction.data.clone(),
            })
            .collect();

        Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        }
    }

    /// Position of `pubkey` within the required-signer section, if any.
    pub fn signer_position(&self, pubkey: &Pubkey) -> Option<usize> {
        self.account_keys[..self.header.num_required_signatures as usize]
            .iter()
            .position(|k| k == pubkey)
    }

    /// Serialize to the wire byte layout. These are the bytes signers
    /// sign over.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_compact_len(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_compact_len(&mut out, self.instructions.len());
        for instruction in &self.instructions {
            out.push(instruction.program_id_index);
            encode_compact_len(&mut out, instruction.accounts.len());
            out.extend_from_slice(&instruction.accounts);
            encode_compact_len(&mut out, instruction.data.len());
            out.extend_from_slice(&instruction.data);
        }

        out
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// A message plus its signatures, in account-key order.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Wrap a message with placeholder signatures.
    pub fn new_unsigned(message: Message) -> Self {
        let signatures =
            vec![Signature::default(); message.header.num_required_signatures as usize];
        Self {
            signatures,
            message,
        }
    }

    /// Sign the message with every provided signer.
    ///
    /// Each signer must correspond to an account in the required-signer
    /// section, and afterwards no required slot may remain unsigned.
    pub fn try_sign(&mut self, signers: &[&dyn KeySigner]) -> Result<(), SignerError> {
        let message_bytes = self.message.serialize();
        for signer in signers {
            let pubkey = signer.pubkey();
            let position = self
                .message
                .signer_position(&pubkey)
                .ok_or_else(|| SignerError::UnknownSigner(pubkey.to_string()))?;
            self.signatures[position] = signer.try_sign(&message_bytes)?;
        }

        if let Some(unsigned) = self
            .signatures
            .iter()
            .position(Signature::is_placeholder)
        {
            return Err(SignerError::MissingSigner(
                self.message.account_keys[unsigned].to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize to wire bytes: compact signature array then message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        encode_compact_len(&mut out, self.signatures.len());
        for signature in &self.signatures {
            out.extend_from_slice(signature.as_bytes());
        }
        out.extend_from_slice(&self.message.serialize());
        out
    }

    /// Serialize and base64-encode for JSON transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.serialize())
    }
}
