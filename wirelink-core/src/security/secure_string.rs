// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Public Key Bundles
//!
//! Packs the signing and box public keys into one printable string:
//!
//! ```text
//! [0..24]  random bytes
//! [24..56] Ed25519 public key
//! [56..88] X25519 public key
//! ```
//!
//! Bytes 17.. are XOR'd with byte `i % 17` of the untouched prefix and the
//! result is base64 (URL-safe, unpadded). This only hides the keys from
//! casual inspection; it is not encryption.

use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};

use crate::crypto::CryptoError;

/// Length of the decoded bundle.
pub const SECURE_STRING_LEN: usize = 88;

const RANDOM_PREFIX_LEN: usize = 24;
const KEY_LEN: usize = 32;
const XOR_KEY_LEN: usize = 17;

const LENIENT_PADDING: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_PADDING);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_PADDING);

/// Public keys recovered from a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecureKeys {
    pub sign_key: [u8; 32],
    pub box_key: [u8; 32],
}

/// Encodes bytes as URL-safe base64 without padding.
pub fn base64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes base64 in either the URL-safe or the standard alphabet, with or
/// without padding. Mixing alphabets within one input is rejected.
pub fn base64_decode(input: &str) -> Option<Vec<u8>> {
    URL_SAFE_LENIENT
        .decode(input)
        .or_else(|_| STANDARD_LENIENT.decode(input))
        .ok()
}

/// XORs every byte past the prefix with the prefix byte at `i % 17`.
///
/// The prefix itself is copied unchanged, so applying this twice returns the
/// original buffer.
fn obfuscate(input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .enumerate()
        .map(|(i, &byte)| {
            if i < XOR_KEY_LEN {
                byte
            } else {
                byte ^ input[i % XOR_KEY_LEN]
            }
        })
        .collect()
}

/// Bundles the two public keys into an obfuscated base64 string.
pub fn encode_secure_string(sign_key: &[u8; 32], box_key: &[u8; 32]) -> Result<String, CryptoError> {
    let mut plain = [0u8; SECURE_STRING_LEN];
    SystemRandom::new()
        .fill(&mut plain[..RANDOM_PREFIX_LEN])
        .map_err(|_| CryptoError::RandomFailure)?;
    plain[RANDOM_PREFIX_LEN..RANDOM_PREFIX_LEN + KEY_LEN].copy_from_slice(sign_key);
    plain[RANDOM_PREFIX_LEN + KEY_LEN..].copy_from_slice(box_key);

    Ok(base64_encode(&obfuscate(&plain)))
}

/// Recovers the two public keys from a bundle.
///
/// Returns `None` for anything that is not a well-formed 88-byte bundle.
pub fn decode_secure_string(encoded: &str) -> Option<SecureKeys> {
    if encoded.is_empty() {
        return None;
    }
    let raw = base64_decode(encoded)?;
    if raw.len() != SECURE_STRING_LEN {
        return None;
    }

    let plain = obfuscate(&raw);
    let sign_key: [u8; 32] = plain[RANDOM_PREFIX_LEN..RANDOM_PREFIX_LEN + KEY_LEN]
        .try_into()
        .ok()?;
    let box_key: [u8; 32] = plain[RANDOM_PREFIX_LEN + KEY_LEN..].try_into().ok()?;

    Some(SecureKeys { sign_key, box_key })
}
