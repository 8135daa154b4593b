// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Key Material

use zeroize::Zeroize;

use super::secure_string::encode_secure_string;
use super::{BoxCrypter, Ed25519Signer};
use crate::crypto::{AgreementKeyPair, CryptoError, SigningKeyPair};

/// A raw public/private key pair.
///
/// `private_key` is 32 bytes, or 64 bytes (`seed || public`) for signing keys
/// exported by libraries that use the expanded form.
pub struct KeyPair {
    public_key: [u8; 32],
    private_key: Vec<u8>,
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl KeyPair {
    /// Wraps existing key bytes.
    pub fn from_parts(public_key: [u8; 32], private_key: Vec<u8>) -> Self {
        KeyPair {
            public_key,
            private_key,
        }
    }

    /// Generates a fresh X25519 key-agreement pair.
    pub fn generate_box() -> Self {
        let pair = AgreementKeyPair::generate();
        KeyPair::from_parts(*pair.public_key(), pair.secret_bytes().to_vec())
    }

    /// Generates a fresh Ed25519 signing pair (32-byte seed as private key).
    pub fn generate_sign() -> Result<Self, CryptoError> {
        let pair = SigningKeyPair::generate()?;
        Ok(KeyPair::from_parts(
            *pair.public_key().as_bytes(),
            pair.seed().to_vec(),
        ))
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

/// Session-scoped key material.
///
/// Created when a session starts and dropped (zeroized) when it ends; never
/// written to disk.
#[derive(Debug)]
pub struct Secrets {
    pub box_key_pair: KeyPair,
    pub sign_key_pair: KeyPair,
    pub session_id: String,
}

impl Secrets {
    /// Generates new box and signing key pairs and a random session id.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Secrets {
            box_key_pair: KeyPair::generate_box(),
            sign_key_pair: KeyPair::generate_sign()?,
            session_id: uuid::Uuid::new_v4().simple().to_string(),
        })
    }

    /// Signer that signs with our key and verifies the peer's frames.
    pub fn signer(&self, peer_sign_public: &[u8; 32]) -> Result<Ed25519Signer, CryptoError> {
        Ed25519Signer::new(&self.sign_key_pair, peer_sign_public)
    }

    /// Crypter keyed by X25519(our box secret, peer box public).
    pub fn crypter(&self, peer_box_public: &[u8; 32]) -> Result<BoxCrypter, CryptoError> {
        BoxCrypter::new(&self.box_key_pair, peer_box_public)
    }

    /// Obfuscated bundle of our two public keys for handing to the peer.
    pub fn secure_string(&self) -> Result<String, CryptoError> {
        encode_secure_string(
            self.sign_key_pair.public_key(),
            self.box_key_pair.public_key(),
        )
    }
}
