//! # objgraph Codec - Binary Object-Graph Serialization
//!
//! ## Purpose
//!
//! Turns an in-memory object graph (nested objects, maps, lists, scalars) into
//! a compact self-describing byte stream and back, without a schema language.
//! Producer and consumer type definitions may evolve independently: stream
//! properties the reader does not know are skipped, properties the stream
//! lacks keep their default, and renamed types are mapped through an explicit
//! rename table.
//!
//! ## Architecture Role
//!
//! ```text
//! objgraph-types → [objgraph-codec] → objgraph-config
//!       ↑                ↓                  ↓
//!  Identities      Length/Tag Blocks    Rename Tables
//!  Ticks           Schema Cache         Limits
//!  ScalarKind      Graph Encode/Decode  Logging Setup
//! ```
//!
//! ## What This Crate Contains
//! - [`block`]: the 2-bit tag / variable-width length primitive
//! - [`BinaryGraphCodec`]: the recursive encoder/decoder and its options
//! - [`TypeResolver`] and [`RenameTable`]: identity matching and the registry
//!   used by [`BinaryGraphCodec::decode_any`]
//! - [`SchemaCache`]: process-wide memo of per-type property schemas
//! - [`detect`]: format sniffing for stored blobs
//! - [`define_persistent!`], [`persist_enum!`], [`persist_as_string!`]:
//!   codegen for persistable types
//!
//! ## What This Crate Does NOT Contain
//! - File or environment configuration (belongs in `objgraph-config`)
//! - The XML and plain-binary sibling formats; they are detected only
//!
//! ## Example
//!
//! ```rust
//! use objgraph_codec::{decode, define_persistent, encode, CodecKind};
//!
//! define_persistent! {
//!     pub struct Person as "Demo.Person" {
//!         persist: {
//!             name: Option<String>,
//!             tags: Vec<String>,
//!         }
//!     }
//! }
//!
//! let ann = Person { name: Some("Ann".into()), tags: vec!["a".into(), "b".into()] };
//! let bytes = encode(&ann, CodecKind::Binary)?;
//! assert_eq!(decode::<Person>(&bytes)?, ann);
//! # Ok::<(), objgraph_codec::CodecError>(())
//! ```

pub mod block;
pub mod codec;
pub mod collections;
pub mod dispatch;
pub mod error;
mod graph;
mod macros;
pub mod persist;
pub mod reader;
pub mod resolver;
pub mod scalars;
pub mod schema;
pub mod token;
pub mod writer;

pub use codec::{BinaryGraphCodec, CodecBuilder, CodecOptions};
pub use dispatch::{
    decode, decode_with, default_codec, detect, encode, encode_with, CodecKind, BINARY_MARKER,
};
pub use error::{CodecError, CodecResult};
pub use persist::{
    scalar_qualified_name, MapInsert, MapLike, Persistent, Scalar, SeqInsert, SeqLike, Value,
};
pub use reader::Reader;
pub use resolver::{identity_of, DecodedObject, RegisteredType, RenameTable, TypeResolver};
pub use schema::{
    schema_of, CollectionAccess, Envelope, Getter, PropertyDescriptor, SchemaCache, Setter,
    TypeSchema,
};
pub use writer::Writer;

pub use objgraph_types::{ScalarKind, TypeIdentity};
