//! # Scalar Kind Registry
//!
//! The fixed set of value encodings the binary graph codec writes as a single
//! frame after a `V` marker. Fixed-width kinds use little-endian byte order;
//! `Bytes` and `String` are length-prefixed by the frame itself.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ScalarKind {
    Int32 = 1,
    Int64 = 2,
    UInt64 = 3,
    Float64 = 4,
    Bool = 5,
    /// Enum discriminant widened to i64
    Enum = 6,
    /// 100ns ticks since 0001-01-01
    DateTime = 7,
    /// Signed 100ns ticks
    TimeSpan = 8,
    /// 16 bytes, .NET GUID layout
    Guid = 9,
    Bytes = 10,
    /// UTF-8 text, also used for types rendered through their canonical string form
    String = 11,
}

impl ScalarKind {
    /// Exact frame length for fixed-width kinds
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            ScalarKind::Int32 => Some(4),
            ScalarKind::Int64
            | ScalarKind::UInt64
            | ScalarKind::Float64
            | ScalarKind::Enum
            | ScalarKind::DateTime
            | ScalarKind::TimeSpan => Some(8),
            ScalarKind::Bool => Some(1),
            ScalarKind::Guid => Some(16),
            ScalarKind::Bytes | ScalarKind::String => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Int32 => "Int32",
            ScalarKind::Int64 => "Int64",
            ScalarKind::UInt64 => "UInt64",
            ScalarKind::Float64 => "Float64",
            ScalarKind::Bool => "Bool",
            ScalarKind::Enum => "Enum",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::TimeSpan => "TimeSpan",
            ScalarKind::Guid => "Guid",
            ScalarKind::Bytes => "Bytes",
            ScalarKind::String => "String",
        }
    }

    /// Check a frame length against this kind's fixed width
    pub fn check_width(self, len: usize) -> Result<(), String> {
        match self.fixed_width() {
            Some(width) if width != len => Err(format!(
                "{} frame must be {} bytes, got {}",
                self.name(),
                width,
                len
            )),
            _ => Ok(()),
        }
    }
}
