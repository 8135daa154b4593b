// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ed25519 Digital Signatures
//!
//! Provides signing keypair generation and signature operations using the
//! audited `ring` cryptographic library.

use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair as RingKeyPair, UnparsedPublicKey, ED25519};
use zeroize::Zeroize;

use super::error::CryptoError;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;
/// Length of an Ed25519 seed or public key in bytes.
pub const ED25519_KEY_LEN: usize = 32;

/// Ed25519 signing keypair.
///
/// Private key material is zeroed on drop.
pub struct SigningKeyPair {
    keypair: Ed25519KeyPair,
    seed: [u8; 32],
}

impl Drop for SigningKeyPair {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key", &self.public_key())
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

impl SigningKeyPair {
    /// Generates a new random Ed25519 keypair.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let seed = ring::rand::generate::<[u8; 32]>(&rng)
            .map_err(|_| CryptoError::RandomFailure)?
            .expose();

        Self::from_seed(&seed)
    }

    /// Creates a keypair from a 32-byte seed.
    ///
    /// The same seed always produces the same keypair.
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, CryptoError> {
        let keypair = Ed25519KeyPair::from_seed_unchecked(seed)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(SigningKeyPair {
            keypair,
            seed: *seed,
        })
    }

    /// Creates a keypair from a private key and its public key.
    ///
    /// Accepts either a 32-byte seed or the 64-byte `seed || public` form.
    /// The public key is checked against the one derived from the seed.
    pub fn from_private_key(private_key: &[u8], public_key: &[u8; 32]) -> Result<Self, CryptoError> {
        let seed: [u8; 32] = match private_key.len() {
            32 | 64 => private_key[..ED25519_KEY_LEN]
                .try_into()
                .map_err(|_| CryptoError::InvalidKey("malformed seed".into()))?,
            actual => {
                return Err(CryptoError::InvalidKeyLength {
                    expected: ED25519_KEY_LEN,
                    actual,
                })
            }
        };

        if private_key.len() == 64 && &private_key[ED25519_KEY_LEN..] != public_key.as_slice() {
            return Err(CryptoError::InvalidKey(
                "embedded public key does not match".into(),
            ));
        }

        let keypair = Ed25519KeyPair::from_seed_and_public_key(&seed, public_key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(SigningKeyPair { keypair, seed })
    }

    /// Returns the public key portion of this keypair.
    pub fn public_key(&self) -> PublicKey {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.keypair.public_key().as_ref());
        PublicKey { bytes }
    }

    /// Returns the 32-byte seed (for backup/restore).
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// Signs a message and returns the signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.keypair.sign(message);
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes.copy_from_slice(sig.as_ref());
        Signature { bytes }
    }
}

/// Ed25519 public key for verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Creates a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        PublicKey { bytes }
    }

    /// Returns the raw bytes of the public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verifies a signature against a message using this public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let public_key = UnparsedPublicKey::new(&ED25519, &self.bytes);
        public_key.verify(message, signature).is_ok()
    }
}

/// Ed25519 signature (64 bytes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_LEN],
}

impl Signature {
    /// Creates a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Signature { bytes }
    }

    /// Returns the raw bytes of the signature.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let kp = SigningKeyPair::generate().unwrap();
        let msg = b"test message";
        let sig = kp.sign(msg);
        assert!(kp.public_key().verify(msg, sig.as_bytes()));
        assert!(!kp.public_key().verify(b"other message", sig.as_bytes()));
    }

    #[test]
    fn test_from_private_key_accepts_both_forms() {
        let kp = SigningKeyPair::from_seed(&[3u8; 32]).unwrap();
        let public = *kp.public_key().as_bytes();

        let short = SigningKeyPair::from_private_key(&[3u8; 32], &public).unwrap();
        assert_eq!(short.public_key(), kp.public_key());

        let mut long = [3u8; 64];
        long[32..].copy_from_slice(&public);
        let long = SigningKeyPair::from_private_key(&long, &public).unwrap();
        assert_eq!(long.public_key(), kp.public_key());
    }

    #[test]
    fn test_from_private_key_rejects_mismatched_public() {
        let result = SigningKeyPair::from_private_key(&[3u8; 32], &[4u8; 32]);
        assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
    }

    #[test]
    fn test_from_private_key_rejects_bad_length() {
        let result = SigningKeyPair::from_private_key(&[3u8; 40], &[4u8; 32]);
        assert_eq!(
            result.unwrap_err(),
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 40
            }
        );
    }
}
