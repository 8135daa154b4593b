// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cryptographic primitives: Ed25519 signatures, X25519 key agreement and
//! AES-256-GCM payload encryption.

pub mod agreement;
pub mod encryption;
pub mod error;
pub mod signing;

pub use agreement::AgreementKeyPair;
pub use encryption::{decrypt, encrypt, SymmetricKey, NONCE_SIZE, TAG_SIZE};
pub use error::CryptoError;
pub use signing::{PublicKey, Signature, SigningKeyPair, SIGNATURE_LEN};
