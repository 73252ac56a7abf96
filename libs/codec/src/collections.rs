//! Standard collections as persistable objects
//!
//! `Vec<T>` writes a `LIST` envelope, `HashMap`/`BTreeMap` write a `DICT`
//! envelope. Their identities are generic (`Vec`1[[i32, core]]`), so a
//! reader accepts any instantiation of the same generic definition and lets
//! each element's own frame or header decide the rest.

use crate::error::CodecResult;
use crate::persist::{MapInsert, MapLike, Persistent, SeqInsert, SeqLike, Value};
use crate::reader::Reader;
use crate::schema::Envelope;
use crate::writer::Writer;
use objgraph_types::TypeIdentity;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

impl<T: Value> SeqLike for Vec<T> {
    type Element = T;

    fn elements(&self) -> Box<dyn Iterator<Item = &T> + '_> {
        Box::new(self.iter())
    }
}

impl<T: Value> SeqInsert for Vec<T> {
    fn push_element(&mut self, element: T) {
        self.push(element);
    }
}

impl<T: Value> Persistent for Vec<T> {
    fn identity() -> TypeIdentity {
        TypeIdentity::generic("Vec`1", "alloc", &[T::qualified_name()])
    }

    fn envelope() -> Envelope<Self> {
        Envelope::list()
    }
}

impl<T: Value> Value for Vec<T> {
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()> {
        w.write_object(self)
    }

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self> {
        r.read_object()
    }

    fn qualified_name() -> String {
        Self::identity().qualified_name()
    }
}

impl<K, V> MapLike for HashMap<K, V>
where
    K: Value + Eq + Hash,
    V: Value,
{
    type Key = K;
    type Item = V;

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }
}

impl<K, V> MapInsert for HashMap<K, V>
where
    K: Value + Eq + Hash,
    V: Value,
{
    fn insert_entry(&mut self, key: K, item: V) {
        self.insert(key, item);
    }
}

impl<K, V> Persistent for HashMap<K, V>
where
    K: Value + Eq + Hash,
    V: Value,
{
    fn identity() -> TypeIdentity {
        TypeIdentity::generic(
            "HashMap`2",
            "std",
            &[K::qualified_name(), V::qualified_name()],
        )
    }

    fn envelope() -> Envelope<Self> {
        Envelope::map()
    }
}

impl<K, V> Value for HashMap<K, V>
where
    K: Value + Eq + Hash,
    V: Value,
{
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()> {
        w.write_object(self)
    }

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self> {
        r.read_object()
    }

    fn qualified_name() -> String {
        Self::identity().qualified_name()
    }
}

impl<K: Value + Ord, V: Value> MapLike for BTreeMap<K, V> {
    type Key = K;
    type Item = V;

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(self.iter())
    }
}

impl<K: Value + Ord, V: Value> MapInsert for BTreeMap<K, V> {
    fn insert_entry(&mut self, key: K, item: V) {
        self.insert(key, item);
    }
}

impl<K: Value + Ord, V: Value> Persistent for BTreeMap<K, V> {
    fn identity() -> TypeIdentity {
        TypeIdentity::generic(
            "BTreeMap`2",
            "alloc",
            &[K::qualified_name(), V::qualified_name()],
        )
    }

    fn envelope() -> Envelope<Self> {
        Envelope::map()
    }
}

impl<K: Value + Ord, V: Value> Value for BTreeMap<K, V> {
    fn encode_value(&self, w: &mut Writer<'_>) -> CodecResult<()> {
        w.write_object(self)
    }

    fn decode_value(r: &mut Reader<'_>) -> CodecResult<Self> {
        r.read_object()
    }

    fn qualified_name() -> String {
        Self::identity().qualified_name()
    }
}
