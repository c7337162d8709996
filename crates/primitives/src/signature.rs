use alloy_primitives::Signature;
use alloy_rlp::{BufMut, Encodable, Header};

/// Trait for custom signature byte representation
pub trait SignatureAsBytes {
    /// Returns the `r || s || v` representation of the signature where `v` is the raw y parity
    /// (0 or 1) rather than the legacy `27`/`28` values.
    fn sig_as_bytes(&self) -> [u8; 65];
}

impl SignatureAsBytes for Signature {
    #[inline]
    fn sig_as_bytes(&self) -> [u8; 65] {
        let mut sig = [0u8; 65];
        sig[..32].copy_from_slice(&self.r().to_be_bytes::<32>());
        sig[32..64].copy_from_slice(&self.s().to_be_bytes::<32>());
        sig[64] = self.v() as u8;
        sig
    }
}

/// Encodes an optional signature as an RLP byte string. A missing signature is the empty string.
pub(crate) fn encode_signature(signature: Option<&Signature>, out: &mut dyn BufMut) {
    match signature {
        Some(signature) => signature.sig_as_bytes().as_slice().encode(out),
        None => [0u8; 0].as_slice().encode(out),
    }
}

/// Returns the encoded length of an optional signature.
pub(crate) fn signature_length(signature: Option<&Signature>) -> usize {
    match signature {
        Some(signature) => signature.sig_as_bytes().as_slice().length(),
        None => [0u8; 0].as_slice().length(),
    }
}

/// Decodes an optional signature written by [`encode_signature`].
pub(crate) fn decode_signature(buf: &mut &[u8]) -> alloy_rlp::Result<Option<Signature>> {
    let bytes = Header::decode_bytes(buf, false)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Signature::from_raw(bytes).map(Some).map_err(|_| alloy_rlp::Error::Custom("invalid signature"))
}

/// Writes the list header for a payload of the given length.
pub(crate) fn encode_list_header(payload_length: usize, out: &mut dyn BufMut) {
    Header { list: true, payload_length }.encode(out);
}

/// Returns the full encoded length of a list with the given payload length.
pub(crate) fn list_length(payload_length: usize) -> usize {
    payload_length + alloy_rlp::length_of_length(payload_length)
}

/// Decodes an RLP list, handing its payload to `f` and checking that `f` consumed all of it.
pub(crate) fn decode_list<T>(
    buf: &mut &[u8],
    f: impl FnOnce(&mut &[u8]) -> alloy_rlp::Result<T>,
) -> alloy_rlp::Result<T> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(alloy_rlp::Error::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(alloy_rlp::Error::InputTooShort);
    }
    let mut payload = &buf[..header.payload_length];
    let value = f(&mut payload)?;
    if !payload.is_empty() {
        return Err(alloy_rlp::Error::ListLengthMismatch {
            expected: header.payload_length,
            got: header.payload_length - payload.len(),
        });
    }
    *buf = &buf[header.payload_length..];
    Ok(value)
}

