// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for Cryptographic Primitives and Message Security
//!
//! Signatures, key agreement, payload encryption and the `Signer` / `Crypter`
//! implementations built on them.

use wirelink_core::crypto::{
    decrypt, encrypt, AgreementKeyPair, CryptoError, SigningKeyPair, SymmetricKey, NONCE_SIZE,
    TAG_SIZE,
};
use wirelink_core::security::{
    sign_text, stringify_params, verify_text, base64_encode, BoxCrypter, Crypter, Ed25519Signer,
    KeyPair, Secrets, Signer,
};

// =============================================================================
// Ed25519
// =============================================================================

/// Tests that keypair can be regenerated deterministically from seed
#[test]
fn test_keypair_from_seed_deterministic() {
    let seed = [42u8; 32];

    let keypair1 = SigningKeyPair::from_seed(&seed).unwrap();
    let keypair2 = SigningKeyPair::from_seed(&seed).unwrap();

    assert_eq!(
        keypair1.public_key().as_bytes(),
        keypair2.public_key().as_bytes(),
        "Same seed should produce identical keypair"
    );
}

#[test]
fn test_generated_keypairs_are_unique() {
    let keypair1 = SigningKeyPair::generate().unwrap();
    let keypair2 = SigningKeyPair::generate().unwrap();
    assert_ne!(keypair1.public_key(), keypair2.public_key());
}

#[test]
fn test_signature_verifies_and_rejects_other_message() {
    let keypair = SigningKeyPair::generate().unwrap();
    let signature = keypair.sign(b"frame bytes");

    assert_eq!(signature.as_bytes().len(), 64);
    assert!(keypair.public_key().verify(b"frame bytes", signature.as_bytes()));
    assert!(!keypair.public_key().verify(b"frame bytez", signature.as_bytes()));
}

#[test]
fn test_expanded_private_key_accepted() {
    let keypair = SigningKeyPair::generate().unwrap();
    let public = *keypair.public_key().as_bytes();
    let mut expanded = keypair.seed().to_vec();
    expanded.extend_from_slice(&public);

    let restored = SigningKeyPair::from_private_key(&expanded, &public).unwrap();
    assert_eq!(restored.public_key(), keypair.public_key());
}

#[test]
fn test_private_key_for_other_public_rejected() {
    let keypair = SigningKeyPair::generate().unwrap();
    let other = SigningKeyPair::generate().unwrap();

    let result = SigningKeyPair::from_private_key(keypair.seed(), other.public_key().as_bytes());
    assert!(matches!(result, Err(CryptoError::InvalidKey(_))));
}

#[test]
fn test_private_key_wrong_length_rejected() {
    let keypair = SigningKeyPair::generate().unwrap();
    let result = SigningKeyPair::from_private_key(&[0u8; 31], keypair.public_key().as_bytes());
    assert!(matches!(
        result,
        Err(CryptoError::InvalidKeyLength { actual: 31, .. })
    ));
}

// =============================================================================
// X25519 + AES-256-GCM
// =============================================================================

#[test]
fn test_both_sides_derive_same_key() {
    let alice = AgreementKeyPair::generate();
    let bob = AgreementKeyPair::generate();

    assert_eq!(
        alice.diffie_hellman(bob.public_key()),
        bob.diffie_hellman(alice.public_key())
    );
}

#[test]
fn test_encrypt_layout_and_fresh_nonce() {
    let key = SymmetricKey::generate().unwrap();
    let first = encrypt(&key, b"same").unwrap();
    let second = encrypt(&key, b"same").unwrap();

    assert_eq!(first.len(), NONCE_SIZE + 4 + TAG_SIZE);
    assert_ne!(first[..NONCE_SIZE], second[..NONCE_SIZE]);
    assert_eq!(decrypt(&key, &first).unwrap(), b"same");
}

#[test]
fn test_decrypt_with_wrong_key_fails() {
    let key = SymmetricKey::generate().unwrap();
    let other = SymmetricKey::generate().unwrap();
    let sealed = encrypt(&key, b"secret").unwrap();

    assert_eq!(decrypt(&other, &sealed), Err(CryptoError::DecryptionFailed));
}

#[test]
fn test_decrypt_short_input_fails() {
    let key = SymmetricKey::generate().unwrap();
    assert_eq!(
        decrypt(&key, &[0u8; NONCE_SIZE + TAG_SIZE - 1]),
        Err(CryptoError::CiphertextTooShort)
    );
}

#[test]
fn test_encrypt_empty_plaintext() {
    let key = SymmetricKey::generate().unwrap();
    let sealed = encrypt(&key, b"").unwrap();
    assert_eq!(sealed.len(), NONCE_SIZE + TAG_SIZE);
    assert!(decrypt(&key, &sealed).unwrap().is_empty());
}

// =============================================================================
// Signer / Crypter
// =============================================================================

#[test]
fn test_signers_verify_each_other() {
    let client = Secrets::generate().unwrap();
    let server = Secrets::generate().unwrap();

    let client_signer = client.signer(server.sign_key_pair.public_key()).unwrap();
    let server_signer = server.signer(client.sign_key_pair.public_key()).unwrap();

    let signature = client_signer.sign(b"request");
    assert_eq!(signature.len(), client_signer.signature_len());
    assert!(server_signer.verify(b"request", &signature));
    assert!(!client_signer.verify(b"request", &signature));
}

#[test]
fn test_crypters_share_key() {
    let client = Secrets::generate().unwrap();
    let server = Secrets::generate().unwrap();

    let client_crypter = client.crypter(server.box_key_pair.public_key()).unwrap();
    let server_crypter = server.crypter(client.box_key_pair.public_key()).unwrap();

    let sealed = client_crypter.encrypt(b"payload").unwrap();
    assert_eq!(server_crypter.decrypt(&sealed).unwrap(), b"payload");
}

#[test]
fn test_signer_from_expanded_key_pair() {
    let seed_pair = KeyPair::generate_sign().unwrap();
    let mut expanded = seed_pair.private_key().to_vec();
    expanded.extend_from_slice(seed_pair.public_key());
    let expanded_pair = KeyPair::from_parts(*seed_pair.public_key(), expanded);

    let peer = KeyPair::generate_sign().unwrap();
    let from_seed = Ed25519Signer::new(&seed_pair, peer.public_key()).unwrap();
    let from_expanded = Ed25519Signer::new(&expanded_pair, peer.public_key()).unwrap();

    // Ed25519 is deterministic: both encodings of the key sign identically.
    assert_eq!(from_seed.sign(b"x"), from_expanded.sign(b"x"));
}

#[test]
fn test_box_crypter_from_key() {
    let key = SymmetricKey::from_bytes([7u8; 32]);
    let crypter = BoxCrypter::from_key(key.clone());
    let sealed = crypter.encrypt(b"abc").unwrap();
    assert_eq!(decrypt(&key, &sealed).unwrap(), b"abc");
}

// =============================================================================
// Text Signing
// =============================================================================

#[test]
fn test_signed_query_parameters() {
    let signer = KeyPair::generate_sign().unwrap();
    let params = serde_json::json!({"ts": 1700000000, "account": "alice", "nonce": "x1"});
    let canonical = stringify_params(&params);
    assert_eq!(canonical, "account=alice&nonce=x1&ts=1700000000");

    let signature = sign_text(&signer, &canonical).unwrap();
    assert!(verify_text(
        &canonical,
        &signature,
        &base64_encode(signer.public_key())
    ));
    assert!(!verify_text(
        "account=mallory&nonce=x1&ts=1700000000",
        &signature,
        &base64_encode(signer.public_key())
    ));
}
