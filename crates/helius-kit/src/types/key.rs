//! Keypairs, signatures, and the signing seam.
//!
//! Key generation and message signing are external cryptographic
//! concerns consumed through the narrow [`KeySigner`] trait. The
//! bundled [`Keypair`] is the in-memory implementation, suitable for
//! scripts, bots, and tests; hardware wallets or KMS backends can
//! implement the same trait.

use std::fmt::{self, Debug, Display};

use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SignerError;
use crate::types::Pubkey;

// ============================================================================
// Signature
// ============================================================================

/// A 64-byte Ed25519 signature, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Create a signature from raw 64 bytes.
    pub const fn new_from_array(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw signature bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// True if this is the all-zero placeholder used before signing.
    pub fn is_placeholder(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let data = bs58::decode(&s)
            .into_vec()
            .map_err(serde::de::Error::custom)?;
        let bytes: [u8; 64] = data
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::custom("signature must be 64 bytes"))?;
        Ok(Self(bytes))
    }
}

// ============================================================================
// KeySigner
// ============================================================================

/// Trait for transaction signing.
///
/// A `KeySigner` knows its own address and can sign an arbitrary
/// message. Transaction builders accept `&dyn KeySigner`, so custom
/// backends plug in without touching the builders.
pub trait KeySigner: Send + Sync {
    /// The address this signer signs for.
    fn pubkey(&self) -> Pubkey;

    /// Sign a message.
    fn try_sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

// ============================================================================
// Keypair
// ============================================================================

/// An in-memory Ed25519 keypair.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Parse a keypair from a base58-encoded 64-byte secret
    /// (seed followed by public key, the common wallet export format).
    pub fn from_base58(s: &str) -> Result<Self, SignerError> {
        let data = bs58::decode(s)
            .into_vec()
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        if data.len() != 64 {
            return Err(SignerError::InvalidKey(format!(
                "expected 64 bytes, got {}",
                data.len()
            )));
        }
        let seed: [u8; 32] = data[..32].try_into().expect("checked length");
        let keypair = Self::from_seed(seed);
        if keypair.pubkey().as_bytes() != &data[32..] {
            return Err(SignerError::InvalidKey(
                "public half does not match secret half".to_string(),
            ));
        }
        Ok(keypair)
    }

    /// The verifying half of this keypair.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl KeySigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Pubkey::new_from_array(self.signing_key.verifying_key().to_bytes())
    }

    fn try_sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        let signature = self.signing_key.sign(message);
        Ok(Signature::new_from_array(signature.to_bytes()))
    }
}

impl Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}
