// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test Fixtures
//!
//! Matching client/server protocol pairs built from fresh session secrets.

use wirelink_core::marshal::JsonMarshaler;
use wirelink_core::packet::PacketProtocol;
use wirelink_core::security::Secrets;

/// Two ends of a session: each signs with its own key, verifies the other's,
/// and both derive the same payload key.
pub struct SessionPair {
    pub client: PacketProtocol<JsonMarshaler>,
    pub server: PacketProtocol<JsonMarshaler>,
}

pub fn session_pair() -> SessionPair {
    let client_secrets = Secrets::generate().unwrap();
    let server_secrets = Secrets::generate().unwrap();

    let client = PacketProtocol::new(JsonMarshaler)
        .with_signer(
            client_secrets
                .signer(server_secrets.sign_key_pair.public_key())
                .unwrap(),
        )
        .with_crypter(
            client_secrets
                .crypter(server_secrets.box_key_pair.public_key())
                .unwrap(),
        );
    let server = PacketProtocol::new(JsonMarshaler)
        .with_signer(
            server_secrets
                .signer(client_secrets.sign_key_pair.public_key())
                .unwrap(),
        )
        .with_crypter(
            server_secrets
                .crypter(client_secrets.box_key_pair.public_key())
                .unwrap(),
        );

    SessionPair { client, server }
}

/// Same as [`session_pair`] but signing only.
pub fn signed_pair() -> SessionPair {
    let client_secrets = Secrets::generate().unwrap();
    let server_secrets = Secrets::generate().unwrap();

    SessionPair {
        client: PacketProtocol::new(JsonMarshaler).with_signer(
            client_secrets
                .signer(server_secrets.sign_key_pair.public_key())
                .unwrap(),
        ),
        server: PacketProtocol::new(JsonMarshaler).with_signer(
            server_secrets
                .signer(client_secrets.sign_key_pair.public_key())
                .unwrap(),
        ),
    }
}
