//! # objgraph Types
//!
//! Plain data definitions shared by the objgraph codec crates.
//!
//! ## What This Crate Contains
//! - [`TypeIdentity`]: the `(type, assembly short, assembly full)` triple every
//!   serialized object carries, plus version-metadata stripping for generic
//!   argument strings
//! - [`ticks`]: .NET-compatible tick conversions for `DateTime` and `TimeSpan`
//!   values (100ns units)
//! - [`ScalarKind`]: the registry of fixed-width and length-prefixed scalar
//!   encodings understood by the binary graph codec
//!
//! ## What This Crate Does NOT Contain
//! - Framing, cursors or the recursive codec (belongs in `objgraph-codec`)
//! - Settings loading (belongs in `objgraph-config`)
//!
//! ## Architecture Role
//!
//! ```text
//! objgraph-types → objgraph-codec → objgraph-config
//!       ↑               ↓                  ↓
//!  Identities      Wire Rules        Caller Settings
//!  Ticks           Encode/Decode     Rename Tables
//! ```

pub mod errors;
pub mod identity;
pub mod scalar_kind;
pub mod ticks;

pub use errors::{IdentityError, TicksError};
pub use identity::{strip_version_info, TypeIdentity, OBJECT_PREFIX};
pub use scalar_kind::ScalarKind;
pub use ticks::{
    datetime_to_ticks, ticks_to_datetime, ticks_to_timespan, timespan_to_ticks, MAX_TICKS,
    TICKS_PER_SECOND, UNIX_EPOCH_TICKS,
};
