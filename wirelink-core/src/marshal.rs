// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Payload Marshaling
//!
//! Converts application values to and from the opaque byte blobs carried in a
//! packet body. Two encodings ship with the crate: JSON for interoperability
//! and bincode for compactness.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Marshaling error types.
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error("JSON marshaling failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary marshaling failed: {0}")]
    Binary(#[from] bincode::Error),
}

/// Converts values to and from payload bytes.
pub trait Marshaler {
    /// Serializes a value into payload bytes.
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError>;

    /// Deserializes payload bytes into a value.
    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, MarshalError>;
}

/// UTF-8 JSON payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonMarshaler;

impl Marshaler for JsonMarshaler {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, MarshalError> {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Compact binary payloads (bincode).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BincodeMarshaler;

impl Marshaler for BincodeMarshaler {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(bincode::serialize(value)?)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, MarshalError> {
        Ok(bincode::deserialize(data)?)
    }
}
