// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Message Security
//!
//! Capability traits the packet protocol uses for authenticity ([`Signer`])
//! and confidentiality ([`Crypter`]), plus their Ed25519 / X25519+AES-GCM
//! implementations and the session key material they are built from.
//!
//! # Example
//!
//! ```ignore
//! use wirelink_core::security::Secrets;
//!
//! let secrets = Secrets::generate()?;
//! let signer = secrets.signer(&server_sign_public)?;
//! let crypter = secrets.crypter(&server_box_public)?;
//! let bundle = secrets.secure_string();
//! ```

mod keys;
mod secure_string;
mod text_signing;

pub use keys::{KeyPair, Secrets};
pub use secure_string::{
    base64_decode, base64_encode, decode_secure_string, encode_secure_string, SecureKeys,
    SECURE_STRING_LEN,
};
pub use text_signing::{sign_text, stringify_params, verify_text};

use crate::crypto::{self, AgreementKeyPair, CryptoError, PublicKey, SigningKeyPair, SymmetricKey};

/// Produces and checks fixed-length signatures over whole frames.
pub trait Signer: Send + Sync {
    /// Signs `data`; the result is always `signature_len()` bytes.
    fn sign(&self, data: &[u8]) -> Vec<u8>;

    /// Returns true if `signature` is valid for `data`.
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool;

    /// Length in bytes of every signature this signer produces.
    fn signature_len(&self) -> usize;
}

/// Authenticated encryption of packet bodies.
pub trait Crypter: Send + Sync {
    /// Encrypts a plaintext body.
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Decrypts a body produced by the peer's `encrypt`.
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// Ed25519 signer: signs with our key, verifies with the peer's.
#[derive(Debug)]
pub struct Ed25519Signer {
    local: SigningKeyPair,
    peer: PublicKey,
}

impl Ed25519Signer {
    /// Builds a signer from our signing keypair and the peer's public key.
    pub fn new(local: &KeyPair, peer_public: &[u8; 32]) -> Result<Self, CryptoError> {
        let local = SigningKeyPair::from_private_key(local.private_key(), local.public_key())?;
        Ok(Self::from_parts(local, PublicKey::from_bytes(*peer_public)))
    }

    /// Builds a signer from already-parsed keys.
    pub fn from_parts(local: SigningKeyPair, peer: PublicKey) -> Self {
        Ed25519Signer { local, peer }
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.local.sign(data).as_bytes().to_vec()
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        signature.len() == crypto::SIGNATURE_LEN && self.peer.verify(data, signature)
    }

    fn signature_len(&self) -> usize {
        crypto::SIGNATURE_LEN
    }
}

/// AES-256-GCM crypter keyed by an X25519 shared secret.
#[derive(Debug, Clone)]
pub struct BoxCrypter {
    key: SymmetricKey,
}

impl BoxCrypter {
    /// Derives the shared key from our box keypair and the peer's public key.
    pub fn new(local: &KeyPair, peer_public: &[u8; 32]) -> Result<Self, CryptoError> {
        let secret: [u8; 32] = local
            .private_key()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: local.private_key().len(),
            })?;
        let agreement = AgreementKeyPair::from_bytes(secret);
        Ok(BoxCrypter {
            key: agreement.shared_key(peer_public),
        })
    }

    /// Uses an already-derived symmetric key.
    pub fn from_key(key: SymmetricKey) -> Self {
        BoxCrypter { key }
    }
}

impl Crypter for BoxCrypter {
    fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        crypto::encrypt(&self.key, data)
    }

    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        crypto::decrypt(&self.key, data)
    }
}
