//! # Persistence Traits
//!
//! The binary graph codec works over three capabilities:
//!
//! - [`Value`]: anything that can appear as a property value, map key/item or
//!   list element. Scalars write a `V` frame, objects write a nested object.
//! - [`Scalar`]: a value with a fixed-width or length-prefixed frame encoding
//!   and a string-construction fallback used when the frame was written for a
//!   different type.
//! - [`Persistent`]: an object with a type identity, a list of property
//!   descriptors and an optional collection envelope. Usually generated by
//!   [`define_persistent!`](crate::define_persistent).
//!
//! Map and list envelopes are reached through [`MapLike`]/[`MapInsert`] and
//! [`SeqLike`]/[`SeqInsert`]; their associated types name the element types so
//! nothing has to be discovered at runtime.

use crate::error::CodecResult;
use crate::reader::Reader;
use crate::schema::{Envelope, PropertyDescriptor};
use crate::writer::Writer;
use objgraph_types::{ScalarKind, TypeIdentity};
use std::borrow::Cow;

/// A value that can be written to and read from a graph stream
pub trait Value: Sized + Send + 'static {
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()>;

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self>;

    /// Assembly-qualified name, as embedded in generic collection identities
    fn qualified_name() -> String;
}

/// Scalar frame encoding with a string-construction fallback
pub trait Scalar: Sized + Send + 'static {
    const KIND: ScalarKind;
    const TYPE_NAME: &'static str;
    const ASSEMBLY: &'static str;

    fn to_frame(&self) -> CodecResult<Cow<'_, [u8]>>;

    /// Direct conversion from a frame written for this type
    fn from_frame(frame: &[u8]) -> Result<Self, String>;

    /// Construct from the canonical string form
    fn from_canonical(text: &str) -> Result<Self, String>;
}

/// A persistable object
pub trait Persistent: Default + Send + 'static {
    fn identity() -> TypeIdentity;

    /// All declared properties, including ones excluded from the schema
    fn properties() -> Vec<PropertyDescriptor<Self>> {
        Vec::new()
    }

    fn envelope() -> Envelope<Self> {
        Envelope::None
    }
}

/// Read access to key/item pairs, written as a `DICT` envelope
pub trait MapLike {
    type Key: Value;
    type Item: Value;

    fn entries(&self) -> Box<dyn Iterator<Item = (&Self::Key, &Self::Item)> + '_>;
}

/// Insertion capability required to decode a `DICT` envelope
pub trait MapInsert: MapLike {
    fn insert_entry(&mut self, key: Self::Key, item: Self::Item);
}

/// Read access to ordered elements, written as a `LIST` envelope
pub trait SeqLike {
    type Element: Value;

    fn elements(&self) -> Box<dyn Iterator<Item = &Self::Element> + '_>;
}

/// Insertion capability required to decode a `LIST` envelope
pub trait SeqInsert: SeqLike {
    fn push_element(&mut self, element: Self::Element);
}

pub fn scalar_qualified_name<S: Scalar>() -> String {
    format!("{}, {}", S::TYPE_NAME, S::ASSEMBLY)
}

/// Missing value in the stream maps to `None`
impl<T: Value> Value for Option<T> {
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()> {
        match self {
            Some(value) => value.encode_value(w),
            None => w.write_null(),
        }
    }

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self> {
        if r.take_null() {
            Ok(None)
        } else {
            T::decode_value(r).map(Some)
        }
    }

    fn qualified_name() -> String {
        TypeIdentity::generic("Option`1", "core", &[T::qualified_name()]).qualified_name()
    }
}

impl<T: Value> Value for Box<T> {
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()> {
        self.as_ref().encode_value(w)
    }

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self> {
        T::decode_value(r).map(Box::new)
    }

    fn qualified_name() -> String {
        T::qualified_name()
    }
}
