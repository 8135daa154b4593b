// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Detached signatures over text (e.g. signed query parameters).

use serde_json::Value;

use super::keys::KeyPair;
use super::secure_string::{base64_decode, base64_encode};
use crate::crypto::{CryptoError, PublicKey, SigningKeyPair};

/// Signs UTF-8 text and returns the base64 signature.
pub fn sign_text(key_pair: &KeyPair, data: &str) -> Result<String, CryptoError> {
    let signer = SigningKeyPair::from_private_key(key_pair.private_key(), key_pair.public_key())?;
    Ok(base64_encode(signer.sign(data.as_bytes()).as_bytes()))
}

/// Verifies a base64 signature over UTF-8 text against a base64 public key.
pub fn verify_text(data: &str, signature: &str, signer_public_key: &str) -> bool {
    let Some(signature) = base64_decode(signature) else {
        return false;
    };
    let Some(public) = base64_decode(signer_public_key) else {
        return false;
    };
    let Ok(public): Result<[u8; 32], Vec<u8>> = public.try_into() else {
        return false;
    };
    PublicKey::from_bytes(public).verify(data.as_bytes(), &signature)
}

/// Canonical `key=value&...` form of a JSON object with keys sorted.
///
/// Scalars render as their bare text; `null` renders as an empty string.
pub fn stringify_params(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|k| format!("{}={}", k, scalar_text(&map[k])))
                .collect::<Vec<_>>()
                .join("&")
        }
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
