//! Codec errors for binary graph encoding and decoding
//!
//! Every error is fatal for the call that raised it: no partially populated
//! object is ever returned. Variants carry enough context (byte offsets,
//! buffer sizes, property names, a hex preview of the offending bytes) to
//! diagnose a stale cache entry without re-running the decode.

use crate::dispatch::CodecKind;
use thiserror::Error;

/// Number of bytes shown in stream-format previews
const PREVIEW_LEN: usize = 16;

/// Default explanation attached to stream-format errors
pub const INCOMPATIBLE_WRITER: &str =
    "data was probably written by an incompatible version of the serializer";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    /// Stream identity could not be mapped to a known type
    #[error("Cannot resolve type '{type_name}' (assembly '{assembly}', full assembly '{assembly_full}'): {reason}")]
    TypeResolution {
        type_name: String,
        assembly: String,
        assembly_full: String,
        reason: String,
    },

    /// Collection envelope found on a type that cannot accept it
    #[error("Schema violation on '{type_name}': {reason}")]
    SchemaViolation { type_name: String, reason: String },

    /// Direct assignment and string construction both failed
    #[error("Cannot assign to property '{property}' of type {target}: direct conversion failed ({direct}); string construction failed ({fallback})")]
    ValueConversion {
        property: String,
        target: String,
        direct: String,
        fallback: String,
    },

    /// Missing, unexpected or truncated token or frame
    #[error("Stream format error at byte {offset}: {description} (buffer: {buffer_size} bytes, next bytes: [{preview}], cause: {likely_cause})")]
    StreamFormat {
        offset: usize,
        description: String,
        buffer_size: usize,
        preview: String,
        likely_cause: String,
    },

    /// Format was recognised but has no backend in this build
    #[error("Codec {kind} is recognised but not supported; only the binary graph codec can encode or decode")]
    UnsupportedCodec { kind: CodecKind },

    /// Object nesting exceeded the configured ceiling
    #[error("Object nesting depth {depth} exceeds limit {limit} (graph is too deep or cyclic)")]
    DepthLimitExceeded { depth: usize, limit: usize },

    /// Block length cannot be represented by the length/tag primitive
    #[error("Block of {len} bytes exceeds the maximum encodable length {max}")]
    BlockTooLarge { len: u64, max: u64 },
}

impl CodecError {
    pub fn type_resolution(
        type_name: impl Into<String>,
        assembly: impl Into<String>,
        assembly_full: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeResolution {
            type_name: type_name.into(),
            assembly: assembly.into(),
            assembly_full: assembly_full.into(),
            reason: reason.into(),
        }
    }

    pub fn schema_violation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Conversion failure; the property name is filled in by the caller
    /// that knows it, see [`CodecError::in_property`].
    pub fn value_conversion(
        target: impl Into<String>,
        direct: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self::ValueConversion {
            property: String::new(),
            target: target.into(),
            direct: direct.into(),
            fallback: fallback.into(),
        }
    }

    /// A value that cannot be written at all (e.g. a date outside the tick range)
    pub fn unencodable(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::value_conversion(target, reason.to_string(), "no fallback when encoding")
    }

    /// Stream format error with a hex preview of the bytes at `offset`
    pub fn stream_format(offset: usize, description: impl Into<String>, buffer: &[u8]) -> Self {
        let start = offset.min(buffer.len());
        let end = (start + PREVIEW_LEN).min(buffer.len());

        Self::StreamFormat {
            offset,
            description: description.into(),
            buffer_size: buffer.len(),
            preview: hex::encode(&buffer[start..end]),
            likely_cause: INCOMPATIBLE_WRITER.to_string(),
        }
    }

    /// Attach the property being assigned when the error did not know it
    pub fn in_property(self, name: &str) -> Self {
        match self {
            Self::ValueConversion {
                property,
                target,
                direct,
                fallback,
            } if property.is_empty() => Self::ValueConversion {
                property: name.to_string(),
                target,
                direct,
                fallback,
            },
            other => other,
        }
    }

    /// True when the bytes are stale or foreign rather than the call being wrong
    ///
    /// Callers holding cached blobs typically evict and rebuild on these.
    pub fn is_incompatible_data(&self) -> bool {
        matches!(
            self,
            Self::TypeResolution { .. }
                | Self::SchemaViolation { .. }
                | Self::ValueConversion { .. }
                | Self::StreamFormat { .. }
        )
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
