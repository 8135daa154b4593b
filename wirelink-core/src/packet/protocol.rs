// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Packet encoder/decoder.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn, Span};

use super::clock::{protocol_now, PROTOCOL_EPOCH_UNIX_SECS};
use super::{
    read_meta, write_meta, PacketMetaData, ProtocolError, RequestPacket, ResponsePacket,
    ResponsePacketMetaData, META_LEN, RESPONSE_META_LEN,
};
use crate::marshal::Marshaler;
use crate::security::{Crypter, Signer};

/// Encodes and decodes request/response frames.
///
/// Signing and encryption are independent and both optional. A protocol
/// instance is immutable once built and can be shared across tasks.
#[derive(Clone)]
pub struct PacketProtocol<M> {
    marshaler: M,
    signer: Option<Arc<dyn Signer>>,
    crypter: Option<Arc<dyn Crypter>>,
    epoch: u64,
    span: Span,
}

impl<M: Marshaler> PacketProtocol<M> {
    /// Plain protocol: no signature, no encryption.
    pub fn new(marshaler: M) -> Self {
        PacketProtocol {
            marshaler,
            signer: None,
            crypter: None,
            epoch: PROTOCOL_EPOCH_UNIX_SECS,
            span: Span::none(),
        }
    }

    /// Appends a signature to every encoded frame and requires one on decode.
    pub fn with_signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Encrypts every non-empty body on encode and decrypts on decode.
    pub fn with_crypter(mut self, crypter: impl Crypter + 'static) -> Self {
        self.crypter = Some(Arc::new(crypter));
        self
    }

    /// Overrides the Unix time that maps to protocol timestamp 0.
    pub fn with_epoch(mut self, epoch_unix_secs: u64) -> Self {
        self.epoch = epoch_unix_secs;
        self
    }

    /// Span that decode diagnostics are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn marshaler(&self) -> &M {
        &self.marshaler
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Parses the 9-byte header without touching body or signature.
    pub fn get_meta(&self, data: &[u8]) -> Result<PacketMetaData, ProtocolError> {
        ensure_len(data, META_LEN)?;
        Ok(read_meta(data))
    }

    /// Parses the 10-byte response header without touching body or signature.
    pub fn get_response_meta(&self, data: &[u8]) -> Result<ResponsePacketMetaData, ProtocolError> {
        ensure_len(data, RESPONSE_META_LEN)?;
        let meta = read_meta(data);
        Ok(ResponsePacketMetaData {
            msg_type: meta.msg_type,
            request_id: meta.request_id,
            timestamp: meta.timestamp,
            code: data[META_LEN],
        })
    }

    /// Encodes a request stamped with the current protocol time.
    pub fn encode_req<T: Serialize + ?Sized>(
        &self,
        msg_type: u8,
        request_id: u32,
        payload: Option<&T>,
    ) -> Result<Vec<u8>, ProtocolError> {
        self.encode_req_at(msg_type, request_id, protocol_now(self.epoch), payload)
    }

    /// Encodes a request with an explicit timestamp.
    pub fn encode_req_at<T: Serialize + ?Sized>(
        &self,
        msg_type: u8,
        request_id: u32,
        timestamp: u32,
        payload: Option<&T>,
    ) -> Result<Vec<u8>, ProtocolError> {
        let meta = PacketMetaData {
            msg_type,
            request_id,
            timestamp,
        };
        let mut out = Vec::with_capacity(META_LEN);
        write_meta(&mut out, &meta);
        self.seal(out, payload)
    }

    /// Encodes a response stamped with the current protocol time.
    pub fn encode_resp<T: Serialize + ?Sized>(
        &self,
        msg_type: u8,
        request_id: u32,
        code: u8,
        payload: Option<&T>,
    ) -> Result<Vec<u8>, ProtocolError> {
        self.encode_resp_at(msg_type, request_id, protocol_now(self.epoch), code, payload)
    }

    /// Encodes a response with an explicit timestamp.
    pub fn encode_resp_at<T: Serialize + ?Sized>(
        &self,
        msg_type: u8,
        request_id: u32,
        timestamp: u32,
        code: u8,
        payload: Option<&T>,
    ) -> Result<Vec<u8>, ProtocolError> {
        let meta = PacketMetaData {
            msg_type,
            request_id,
            timestamp,
        };
        let mut out = Vec::with_capacity(RESPONSE_META_LEN);
        write_meta(&mut out, &meta);
        out.push(code);
        self.seal(out, payload)
    }

    /// Decodes a response frame.
    ///
    /// With a signer configured the trailing signature is verified before
    /// anything else; with a crypter configured the body is decrypted only
    /// after verification succeeds.
    pub fn decode_resp<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<ResponsePacket<T>, ProtocolError> {
        let result = self.get_response_meta(data).and_then(|meta| {
            let payload = self.open(data, RESPONSE_META_LEN)?;
            Ok(ResponsePacket {
                msg_type: meta.msg_type,
                request_id: meta.request_id,
                timestamp: meta.timestamp,
                code: meta.code,
                payload,
            })
        });
        self.trace_failure(&result, data.len());
        result
    }

    /// Decodes a request frame. Mirror of [`decode_resp`](Self::decode_resp)
    /// for the receiving side of `encode_req`.
    pub fn decode_req<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<RequestPacket<T>, ProtocolError> {
        let result = self.get_meta(data).and_then(|meta| {
            let payload = self.open(data, META_LEN)?;
            Ok(RequestPacket {
                msg_type: meta.msg_type,
                request_id: meta.request_id,
                timestamp: meta.timestamp,
                payload,
            })
        });
        self.trace_failure(&result, data.len());
        result
    }

    /// Appends the (possibly encrypted) body and the signature to a header.
    fn seal<T: Serialize + ?Sized>(
        &self,
        mut out: Vec<u8>,
        payload: Option<&T>,
    ) -> Result<Vec<u8>, ProtocolError> {
        if let Some(value) = payload {
            let body = self.marshaler.marshal(value)?;
            match &self.crypter {
                Some(crypter) => {
                    let sealed = crypter.encrypt(&body).map_err(ProtocolError::Encryption)?;
                    out.extend_from_slice(&sealed);
                }
                None => out.extend_from_slice(&body),
            }
        }

        if let Some(signer) = &self.signer {
            let signature = signer.sign(&out);
            out.extend_from_slice(&signature);
        }

        Ok(out)
    }

    /// Verifies, decrypts and unmarshals everything after the header.
    fn open<T: DeserializeOwned>(
        &self,
        data: &[u8],
        meta_len: usize,
    ) -> Result<Option<T>, ProtocolError> {
        let body_end = match &self.signer {
            Some(signer) => {
                let sig_len = signer.signature_len();
                ensure_len(data, meta_len + sig_len)?;
                let (signed, signature) = data.split_at(data.len() - sig_len);
                if !signer.verify(signed, signature) {
                    return Err(ProtocolError::SignatureMismatch);
                }
                signed.len()
            }
            None => data.len(),
        };

        let body = &data[meta_len..body_end];
        if body.is_empty() {
            return Ok(None);
        }

        let plain = match &self.crypter {
            Some(crypter) => crypter.decrypt(body).map_err(ProtocolError::Decryption)?,
            None => body.to_vec(),
        };
        if plain.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.marshaler.unmarshal(&plain)?))
    }

    fn trace_failure<T>(&self, result: &Result<T, ProtocolError>, frame_len: usize) {
        let Err(err) = result else {
            return;
        };
        let _guard = self.span.enter();
        if err.is_untrusted() {
            warn!(error = %err, frame_len, "Rejected untrusted frame");
        } else {
            debug!(error = %err, frame_len, "Failed to decode frame");
        }
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for PacketProtocol<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketProtocol")
            .field("marshaler", &self.marshaler)
            .field("signed", &self.signer.is_some())
            .field("encrypted", &self.crypter.is_some())
            .field("epoch", &self.epoch)
            .finish()
    }
}

fn ensure_len(data: &[u8], required: usize) -> Result<(), ProtocolError> {
    if data.len() < required {
        return Err(ProtocolError::TooShort {
            required,
            actual: data.len(),
        });
    }
    Ok(())
}
