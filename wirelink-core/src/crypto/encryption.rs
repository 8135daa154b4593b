// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Symmetric Encryption (AES-256-GCM)
//!
//! Authenticated encryption of packet bodies.
//!
//! Ciphertext format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
//!
//! A fresh random nonce is drawn for every message, so encrypting the same
//! plaintext twice never yields the same bytes.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use super::error::CryptoError;

/// Nonce size for AES-256-GCM (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;
/// Authentication tag size.
pub const TAG_SIZE: usize = 16;

/// 256-bit symmetric encryption key.
#[derive(Clone)]
pub struct SymmetricKey {
    bytes: [u8; 32],
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't expose key bytes in debug output
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl SymmetricKey {
    /// Generates a new random symmetric key.
    pub fn generate() -> Result<Self, CryptoError> {
        let rng = SystemRandom::new();
        let key = ring::rand::generate::<[u8; 32]>(&rng)
            .map_err(|_| CryptoError::RandomFailure)?
            .expose();
        Ok(SymmetricKey { bytes: key })
    }

    /// Creates a key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SymmetricKey { bytes }
    }

    /// Returns a reference to the key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    fn aead_key(&self) -> Result<LessSafeKey, CryptoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.bytes)
            .map_err(|_| CryptoError::InvalidKey("AES-256-GCM key rejected".into()))?;
        Ok(LessSafeKey::new(unbound))
    }
}

/// Encrypts data with AES-256-GCM.
///
/// Output format: `nonce (12 bytes) || ciphertext || tag (16 bytes)`
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let rng = SystemRandom::new();

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| CryptoError::RandomFailure)?;

    let sealing_key = key.aead_key()?;

    let mut in_out = plaintext.to_vec();
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);
    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut output = Vec::with_capacity(NONCE_SIZE + in_out.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&in_out);

    Ok(output)
}

/// Decrypts AES-256-GCM data produced by [`encrypt`].
///
/// Fails without returning any plaintext when the tag does not verify.
pub fn decrypt(key: &SymmetricKey, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::CiphertextTooShort);
    }

    let (nonce_part, sealed) = data.split_at(NONCE_SIZE);
    let nonce_bytes: [u8; NONCE_SIZE] = nonce_part
        .try_into()
        .map_err(|_| CryptoError::DecryptionFailed)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let opening_key = key.aead_key()?;

    let mut buffer = sealed.to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut buffer)
        .map_err(|_| CryptoError::DecryptionFailed)?;

    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ciphertext_layout() {
        let key = SymmetricKey::from_bytes([9u8; 32]);
        let ct = encrypt(&key, b"hello").unwrap();
        assert_eq!(ct.len(), NONCE_SIZE + 5 + TAG_SIZE);
    }

    #[test]
    fn test_fresh_nonce_per_message() {
        let key = SymmetricKey::from_bytes([9u8; 32]);
        let a = encrypt(&key, b"same").unwrap();
        let b = encrypt(&key, b"same").unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = SymmetricKey::from_bytes([0xAB; 32]);
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("171"));
    }
}
