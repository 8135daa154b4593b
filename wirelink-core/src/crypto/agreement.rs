// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! X25519 Key Agreement
//!
//! Derives the symmetric packet key shared by two peers from one side's
//! static secret and the other side's public key.

use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

use super::encryption::SymmetricKey;

/// X25519 keypair used for key agreement ("box" keys).
pub struct AgreementKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl std::fmt::Debug for AgreementKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgreementKeyPair")
            .field("public", self.public.as_bytes())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl AgreementKeyPair {
    /// Generates a new random X25519 keypair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);

        AgreementKeyPair { secret, public }
    }

    /// Restores a keypair from its 32 secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);

        AgreementKeyPair { secret, public }
    }

    /// Returns the public key bytes.
    pub fn public_key(&self) -> &[u8; 32] {
        self.public.as_bytes()
    }

    /// Returns the secret key bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    /// Performs Diffie-Hellman with the peer's public key.
    pub fn diffie_hellman(&self, their_public: &[u8; 32]) -> [u8; 32] {
        let their_public_key = PublicKey::from(*their_public);
        let shared = self.secret.diffie_hellman(&their_public_key);
        *shared.as_bytes()
    }

    /// Derives the AES-256-GCM key shared with the peer.
    ///
    /// The raw X25519 output is used directly as the key.
    pub fn shared_key(&self, their_public: &[u8; 32]) -> SymmetricKey {
        SymmetricKey::from_bytes(self.diffie_hellman(their_public))
    }
}
