//! Error types for identity parsing and tick conversion

use thiserror::Error;

/// Errors raised while converting between ticks and chrono values
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TicksError {
    /// Tick count lies outside 0001-01-01 ..= 9999-12-31
    #[error("Tick count {ticks} is outside the representable range [0, {max}]")]
    OutOfRange { ticks: i64, max: i64 },

    /// Value cannot be expressed as a 64-bit tick count
    #[error("Value overflows a 64-bit tick count: {value}")]
    Overflow { value: String },
}

/// Errors raised while parsing a serialized object header
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentityError {
    /// Header did not start with the object prefix
    #[error("Object header must start with '{expected}', got '{header}'")]
    MissingPrefix {
        expected: &'static str,
        header: String,
    },

    /// Header did not contain the three colon-separated identity segments
    #[error("Object header '{header}' must contain type, assembly and full assembly segments")]
    MissingSegments { header: String },

    /// Type name segment was empty
    #[error("Object header '{header}' has an empty type name")]
    EmptyTypeName { header: String },
}
