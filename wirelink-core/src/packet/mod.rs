// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Packet Protocol
//!
//! Binary request/response framing with optional payload encryption and
//! whole-frame signatures.
//!
//! # Wire format
//!
//! ```text
//! request:  [0] msg_type | [1..5] request_id BE | [5..9] timestamp BE | body | signature?
//! response: [0] msg_type | [1..5] request_id BE | [5..9] timestamp BE | [9] code | body | signature?
//! ```
//!
//! The header is always in the clear so frames can be routed without
//! decrypting them. The body is encrypted first, then the whole frame
//! (header + ciphertext) is signed; decoding verifies before decrypting.

mod clock;
mod error;
mod protocol;

pub use clock::{protocol_now, to_protocol_secs, to_unix_secs, PROTOCOL_EPOCH_UNIX_SECS};
pub use error::ProtocolError;
pub use protocol::PacketProtocol;

/// Length of the request header.
pub const META_LEN: usize = 9;
/// Length of the response header (request header + status code).
pub const RESPONSE_META_LEN: usize = 10;

/// Header common to every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketMetaData {
    pub msg_type: u8,
    pub request_id: u32,
    /// Seconds since the protocol epoch.
    pub timestamp: u32,
}

/// Response header: the common header plus a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResponsePacketMetaData {
    pub msg_type: u8,
    pub request_id: u32,
    pub timestamp: u32,
    pub code: u8,
}

impl ResponsePacketMetaData {
    /// Drops the status code.
    pub fn meta(&self) -> PacketMetaData {
        PacketMetaData {
            msg_type: self.msg_type,
            request_id: self.request_id,
            timestamp: self.timestamp,
        }
    }
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPacket<T> {
    pub msg_type: u8,
    pub request_id: u32,
    pub timestamp: u32,
    pub payload: Option<T>,
}

impl<T> RequestPacket<T> {
    pub fn meta(&self) -> PacketMetaData {
        PacketMetaData {
            msg_type: self.msg_type,
            request_id: self.request_id,
            timestamp: self.timestamp,
        }
    }
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePacket<T> {
    pub msg_type: u8,
    pub request_id: u32,
    pub timestamp: u32,
    pub code: u8,
    pub payload: Option<T>,
}

impl<T> ResponsePacket<T> {
    pub fn meta(&self) -> ResponsePacketMetaData {
        ResponsePacketMetaData {
            msg_type: self.msg_type,
            request_id: self.request_id,
            timestamp: self.timestamp,
            code: self.code,
        }
    }
}

fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Parses the 9-byte header. Caller guarantees `data.len() >= META_LEN`.
fn read_meta(data: &[u8]) -> PacketMetaData {
    PacketMetaData {
        msg_type: data[0],
        request_id: read_u32_be(&data[1..5]),
        timestamp: read_u32_be(&data[5..9]),
    }
}

fn write_meta(out: &mut Vec<u8>, meta: &PacketMetaData) {
    out.push(meta.msg_type);
    out.extend_from_slice(&meta.request_id.to_be_bytes());
    out.extend_from_slice(&meta.timestamp.to_be_bytes());
}
