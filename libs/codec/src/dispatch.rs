//! # Format Dispatcher
//!
//! Stored blobs may come from several generations of serializer. Decoding
//! sniffs the leading bytes to pick the format; encoding always names the
//! format explicitly. Only the binary graph format has a backend here, the
//! others are recognised so callers get [`CodecError::UnsupportedCodec`]
//! instead of a confusing stream-format error.

use crate::codec::BinaryGraphCodec;
use crate::error::{CodecError, CodecResult};
use crate::persist::Persistent;
use once_cell::sync::Lazy;
use std::fmt;

/// First two bytes of every binary graph stream ("S2")
pub const BINARY_MARKER: [u8; 2] = [0x53, 0x32];

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// Plain-binary header id: byte 0 is zero, bytes 5..9 are all ones
const PLAIN_BINARY_ID_OFFSET: usize = 5;
const PLAIN_BINARY_ID: [u8; 4] = [0xFF; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    /// Binary object-graph format
    Binary,
    Xml,
    PlainBinary,
    /// Oldest format, assumed when nothing else matches
    LegacyBinary,
}

impl CodecKind {
    pub const fn name(self) -> &'static str {
        match self {
            CodecKind::Binary => "Binary",
            CodecKind::Xml => "Xml",
            CodecKind::PlainBinary => "PlainBinary",
            CodecKind::LegacyBinary => "LegacyBinary",
        }
    }

    pub const fn is_supported(self) -> bool {
        matches!(self, CodecKind::Binary)
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identify the format of a stored blob from its leading bytes
pub fn detect(bytes: &[u8]) -> CodecKind {
    if bytes.starts_with(&BINARY_MARKER) {
        return CodecKind::Binary;
    }

    if bytes.starts_with(&UTF8_BOM)
        || bytes.starts_with(&UTF16_LE_BOM)
        || bytes.starts_with(&UTF16_BE_BOM)
        || bytes.first() == Some(&b'<')
    {
        return CodecKind::Xml;
    }

    let plain_id = bytes.get(PLAIN_BINARY_ID_OFFSET..PLAIN_BINARY_ID_OFFSET + PLAIN_BINARY_ID.len());
    if bytes.first() == Some(&0x00) && plain_id == Some(&PLAIN_BINARY_ID[..]) {
        return CodecKind::PlainBinary;
    }

    CodecKind::LegacyBinary
}

static DEFAULT_CODEC: Lazy<BinaryGraphCodec> = Lazy::new(BinaryGraphCodec::new);

/// Process-wide codec with default options and no renames
pub fn default_codec() -> &'static BinaryGraphCodec {
    &DEFAULT_CODEC
}

/// Encode with an explicitly chosen format
pub fn encode<T: Persistent>(obj: &T, kind: CodecKind) -> CodecResult<Vec<u8>> {
    encode_with(default_codec(), obj, kind)
}

pub fn encode_with<T: Persistent>(
    codec: &BinaryGraphCodec,
    obj: &T,
    kind: CodecKind,
) -> CodecResult<Vec<u8>> {
    match kind {
        CodecKind::Binary => codec.encode(obj),
        other => Err(CodecError::UnsupportedCodec { kind: other }),
    }
}

/// Decode with the format detected from the leading bytes
pub fn decode<T: Persistent>(bytes: &[u8]) -> CodecResult<T> {
    decode_with(default_codec(), bytes)
}

pub fn decode_with<T: Persistent>(codec: &BinaryGraphCodec, bytes: &[u8]) -> CodecResult<T> {
    match detect(bytes) {
        CodecKind::Binary => codec.decode(bytes),
        other => Err(CodecError::UnsupportedCodec { kind: other }),
    }
}
