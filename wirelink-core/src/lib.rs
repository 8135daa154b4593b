// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wirelink Core Library
//!
//! Signed, encrypted binary request/response packets carried over a
//! self-healing WebSocket connection.
//! All cryptographic operations use the audited `ring` crate.

pub mod crypto;
pub mod logging;
pub mod marshal;
pub mod network;
pub mod packet;
pub mod retry;
pub mod security;

pub use crypto::{decrypt, encrypt, CryptoError, PublicKey, Signature, SigningKeyPair, SymmetricKey};
pub use marshal::{BincodeMarshaler, JsonMarshaler, MarshalError, Marshaler};
pub use network::{
    ConfigError, Connection, ConnectionConfig, ConnectionHandle, ConnectionHandler,
    ConnectionState, DeadReason, Dialer, Frame, Hooks, MockDialer, NetworkError, PacketHandler,
    WebSocketDialer,
};
pub use packet::{
    PacketMetaData, PacketProtocol, ProtocolError, RequestPacket, ResponsePacket,
    ResponsePacketMetaData, META_LEN, RESPONSE_META_LEN,
};
pub use retry::{
    ConstantRetryStrategy, ExponentialRetryStrategy, FixedRetryStrategy, RetryError, RetryPolicy,
    RetryStrategy,
};
pub use security::{
    decode_secure_string, encode_secure_string, BoxCrypter, Crypter, Ed25519Signer, KeyPair,
    Secrets, SecureKeys, Signer,
};
