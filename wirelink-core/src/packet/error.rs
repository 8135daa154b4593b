// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Packet Error Types
//!
//! Every variant is scoped to one encode or decode call; none of them say
//! anything about the state of the connection the frame arrived on.

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::marshal::MarshalError;

/// Packet encoding and decoding errors.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Frame too short: need {required} bytes, got {actual}")]
    TooShort { required: usize, actual: usize },

    #[error("Signature verification failed")]
    SignatureMismatch,

    #[error("Payload decryption failed: {0}")]
    Decryption(CryptoError),

    #[error("Payload encryption failed: {0}")]
    Encryption(CryptoError),

    #[error("Payload marshaling failed: {0}")]
    Marshal(#[from] MarshalError),
}

impl ProtocolError {
    /// True for frames that failed authenticity or confidentiality checks
    /// and must be treated as untrusted.
    pub fn is_untrusted(&self) -> bool {
        matches!(
            self,
            ProtocolError::SignatureMismatch | ProtocolError::Decryption(_)
        )
    }
}
