//! # Property Schema Cache
//!
//! ## Purpose
//!
//! Derives, once per concrete type, the ordered list of properties the codec
//! writes and accepts. A declared property takes part only when it has both a
//! getter and a setter, is not indexed and is not marked transient; every
//! other descriptor is dropped at derivation time.
//!
//! ## Caching
//!
//! - [`SchemaCache`]: process-wide, keyed by `TypeId`, safe for concurrent
//!   readers and writers. Entries live for the process unless invalidated.
//! - [`DepthCache`]: owned by one writer or reader; remembers the last schema
//!   seen at each nesting depth so sibling properties of the same type skip
//!   the shared map.

use crate::error::CodecResult;
use crate::persist::{MapInsert, MapLike, Persistent, SeqInsert, SeqLike, Value};
use crate::reader::Reader;
use crate::writer::Writer;
use dashmap::DashMap;
use objgraph_types::TypeIdentity;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Writes one property value
pub type Getter<T> = fn(&T, &mut Writer<'_>) -> CodecResult<()>;

/// Reads one property value and assigns it
pub type Setter<T> = fn(&mut T, &mut Reader<'_>) -> CodecResult<()>;

/// Declared property of a persistable type
pub struct PropertyDescriptor<T> {
    pub name: &'static str,
    pub type_name: &'static str,
    pub getter: Option<Getter<T>>,
    pub setter: Option<Setter<T>>,
    pub indexed: bool,
    pub transient: bool,
}

impl<T> PropertyDescriptor<T> {
    pub fn new(
        name: &'static str,
        type_name: &'static str,
        getter: Getter<T>,
        setter: Setter<T>,
    ) -> Self {
        Self {
            name,
            type_name,
            getter: Some(getter),
            setter: Some(setter),
            indexed: false,
            transient: false,
        }
    }

    pub fn read_only(name: &'static str, type_name: &'static str, getter: Getter<T>) -> Self {
        Self {
            name,
            type_name,
            getter: Some(getter),
            setter: None,
            indexed: false,
            transient: false,
        }
    }

    pub fn write_only(name: &'static str, type_name: &'static str, setter: Setter<T>) -> Self {
        Self {
            name,
            type_name,
            getter: None,
            setter: Some(setter),
            indexed: false,
            transient: false,
        }
    }

    /// Field that exists on the type but never reaches the stream
    pub fn transient_field(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            getter: None,
            setter: None,
            indexed: false,
            transient: true,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn is_persistable(&self) -> bool {
        self.exclusion_reason().is_none()
    }

    fn exclusion_reason(&self) -> Option<&'static str> {
        if self.transient {
            Some("transient")
        } else if self.indexed {
            Some("indexed")
        } else if self.getter.is_none() && self.setter.is_none() {
            Some("no accessors")
        } else if self.setter.is_none() {
            Some("read-only")
        } else if self.getter.is_none() {
            Some("write-only")
        } else {
            None
        }
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            type_name: self.type_name,
            getter: self.getter,
            setter: self.setter,
            indexed: self.indexed,
            transient: self.transient,
        }
    }
}

impl<T> std::fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("readable", &self.getter.is_some())
            .field("writable", &self.setter.is_some())
            .field("indexed", &self.indexed)
            .field("transient", &self.transient)
            .finish()
    }
}

/// Writer and optional inserter for a collection envelope
pub struct CollectionAccess<T> {
    pub write: Getter<T>,
    pub insert: Option<Setter<T>>,
}

impl<T> Clone for CollectionAccess<T> {
    fn clone(&self) -> Self {
        Self {
            write: self.write,
            insert: self.insert,
        }
    }
}

/// Collection section written after the property block
pub enum Envelope<T> {
    None,
    /// `DICT` key/item pairs
    Map(CollectionAccess<T>),
    /// `LIST` elements
    List(CollectionAccess<T>),
}

impl<T> Envelope<T> {
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Envelope::None => None,
            Envelope::Map(_) => Some(crate::token::DICT),
            Envelope::List(_) => Some(crate::token::LIST),
        }
    }
}

impl<T> Clone for Envelope<T> {
    fn clone(&self) -> Self {
        match self {
            Envelope::None => Envelope::None,
            Envelope::Map(access) => Envelope::Map(access.clone()),
            Envelope::List(access) => Envelope::List(access.clone()),
        }
    }
}

impl<T: MapLike> Envelope<T> {
    /// Map envelope that is written but rejected on decode
    pub fn read_only_map() -> Self {
        Envelope::Map(CollectionAccess {
            write: write_map_entries::<T>,
            insert: None,
        })
    }
}

impl<T: MapInsert> Envelope<T> {
    pub fn map() -> Self {
        Envelope::Map(CollectionAccess {
            write: write_map_entries::<T>,
            insert: Some(insert_map_entry::<T>),
        })
    }
}

impl<T: SeqLike> Envelope<T> {
    /// List envelope that is written but rejected on decode
    pub fn read_only_list() -> Self {
        Envelope::List(CollectionAccess {
            write: write_seq_elements::<T>,
            insert: None,
        })
    }
}

impl<T: SeqInsert> Envelope<T> {
    pub fn list() -> Self {
        Envelope::List(CollectionAccess {
            write: write_seq_elements::<T>,
            insert: Some(push_seq_element::<T>),
        })
    }
}

fn write_map_entries<T: MapLike>(map: &T, w: &mut Writer<'_>) -> CodecResult<()> {
    for (key, item) in map.entries() {
        key.encode_value(w)?;
        item.encode_value(w)?;
    }
    Ok(())
}

fn insert_map_entry<T: MapInsert>(map: &mut T, r: &mut Reader<'_>) -> CodecResult<()> {
    let key = <T::Key as Value>::decode_value(r)?;
    let item = <T::Item as Value>::decode_value(r)?;
    map.insert_entry(key, item);
    Ok(())
}

fn write_seq_elements<T: SeqLike>(seq: &T, w: &mut Writer<'_>) -> CodecResult<()> {
    for element in seq.elements() {
        element.encode_value(w)?;
    }
    Ok(())
}

fn push_seq_element<T: SeqInsert>(seq: &mut T, r: &mut Reader<'_>) -> CodecResult<()> {
    let element = <T::Element as Value>::decode_value(r)?;
    seq.push_element(element);
    Ok(())
}

/// Derived, cached view of a persistable type
pub struct TypeSchema<T> {
    identity: TypeIdentity,
    header: String,
    properties: Vec<PropertyDescriptor<T>>,
    by_name: HashMap<&'static str, usize>,
    envelope: Envelope<T>,
}

impl<T: Persistent> TypeSchema<T> {
    pub fn derive() -> Self {
        let identity = T::identity();
        let mut properties = Vec::new();

        for descriptor in T::properties() {
            match descriptor.exclusion_reason() {
                None => properties.push(descriptor),
                Some(reason) => debug!(
                    type_name = %identity.full_name,
                    property = descriptor.name,
                    reason,
                    "Excluding property from schema"
                ),
            }
        }

        let by_name = properties
            .iter()
            .enumerate()
            .map(|(idx, descriptor)| (descriptor.name, idx))
            .collect();

        debug!(
            type_name = %identity.full_name,
            assembly = %identity.assembly,
            properties = properties.len(),
            "Derived property schema"
        );

        Self {
            header: identity.header(),
            identity,
            properties,
            by_name,
            envelope: T::envelope(),
        }
    }
}

impl<T> TypeSchema<T> {
    pub fn identity(&self) -> &TypeIdentity {
        &self.identity
    }

    /// Header token text written before the property block
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Persistable properties in stream order
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.by_name.get(name).map(|&idx| &self.properties[idx])
    }

    pub fn envelope(&self) -> &Envelope<T> {
        &self.envelope
    }
}

type ErasedSchema = Arc<dyn Any + Send + Sync>;

static SCHEMA_CACHE: Lazy<SchemaCache> = Lazy::new(SchemaCache::new);

/// Process-wide schema memo keyed by `TypeId`
pub struct SchemaCache {
    entries: DashMap<TypeId, ErasedSchema>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn global() -> &'static SchemaCache {
        &SCHEMA_CACHE
    }

    pub fn schema_of<T: Persistent>(&self) -> Arc<TypeSchema<T>> {
        let erased = self
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(TypeSchema::<T>::derive()) as ErasedSchema)
            .value()
            .clone();

        match erased.downcast::<TypeSchema<T>>() {
            Ok(schema) => schema,
            Err(_) => {
                let schema = Arc::new(TypeSchema::<T>::derive());
                self.entries
                    .insert(TypeId::of::<T>(), schema.clone() as ErasedSchema);
                schema
            }
        }
    }

    /// Drop the cached schema for `T`; the next use re-derives it
    pub fn invalidate<T: 'static>(&self) -> bool {
        self.entries.remove(&TypeId::of::<T>()).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up the shared schema for `T`
pub fn schema_of<T: Persistent>() -> Arc<TypeSchema<T>> {
    SchemaCache::global().schema_of::<T>()
}

/// Per-call "last schema seen" slot per nesting depth
pub(crate) struct DepthCache {
    slots: Vec<Option<(TypeId, ErasedSchema)>>,
}

impl DepthCache {
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(slots).collect(),
        }
    }

    pub(crate) fn get<T: Persistent>(&mut self, depth: usize) -> Arc<TypeSchema<T>> {
        let type_id = TypeId::of::<T>();

        if let Some(Some((cached_id, cached))) = self.slots.get(depth) {
            if *cached_id == type_id {
                if let Ok(schema) = Arc::clone(cached).downcast::<TypeSchema<T>>() {
                    return schema;
                }
            }
        }

        let schema = schema_of::<T>();
        if let Some(slot) = self.slots.get_mut(depth) {
            *slot = Some((type_id, schema.clone() as ErasedSchema));
        }
        schema
    }
}
