//! # Type Resolver
//!
//! ## Purpose
//!
//! Maps the `(type, assembly short, assembly full)` identity embedded in a
//! stream back to a Rust type. Identities are normalised before comparison:
//!
//! 1. the caller-supplied [`RenameTable`] rewrites type and assembly names;
//! 2. `Version=`, `Culture=` and `PublicKeyToken=` segments are stripped;
//! 3. the assembly matches on its short name, or on the short name recovered
//!    from the full assembly name.
//!
//! Typed decoding checks the stream identity against the requested type.
//! Untyped decoding ([`decode_any`](crate::BinaryGraphCodec::decode_any))
//! goes through the registry of types added with
//! [`register`](crate::BinaryGraphCodec::register).

use crate::error::{CodecError, CodecResult};
use crate::graph;
use crate::persist::Persistent;
use crate::reader::Reader;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use objgraph_types::TypeIdentity;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Explicit old-name → new-name mappings; never inferred
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable {
    types: HashMap<String, String>,
    assemblies: HashMap<String, String>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename_type(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.types.insert(from.into(), to.into());
        self
    }

    pub fn rename_assembly(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.assemblies.insert(from.into(), to.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.assemblies.is_empty()
    }

    pub fn type_renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn assembly_renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assemblies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply renames to a stream identity
    pub fn apply(&self, identity: &TypeIdentity) -> TypeIdentity {
        let mut renamed = identity.clone();
        if self.is_empty() {
            return renamed;
        }

        let normalized = identity.normalized_name();
        if let Some(to) = self.types.get(&normalized) {
            trace!(from = %normalized, to = %to, "Applying type rename");
            renamed.full_name = to.clone();
        }

        if let Some(to) = self.assemblies.get(&identity.assembly) {
            trace!(from = %identity.assembly, to = %to, "Applying assembly rename");
            renamed.assembly = to.clone();
        }

        if let Some(short) = identity.assembly_from_full() {
            if let Some(to) = self.assemblies.get(short) {
                renamed.assembly_full = match identity.assembly_full.split_once(',') {
                    Some((_, rest)) => format!("{to},{rest}"),
                    None => to.clone(),
                };
            }
        }

        renamed
    }
}

/// Factory producing a boxed value from an object body
pub type DecodeFn = fn(&mut Reader<'_>) -> CodecResult<Box<dyn Any + Send>>;

/// Registry entry for untyped decoding
#[derive(Clone)]
pub struct RegisteredType {
    pub identity: TypeIdentity,
    pub type_id: TypeId,
    pub rust_name: &'static str,
    pub(crate) decode: DecodeFn,
}

impl fmt::Debug for RegisteredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredType")
            .field("identity", &self.identity)
            .field("rust_name", &self.rust_name)
            .finish()
    }
}

/// Object decoded without naming its type up front
pub struct DecodedObject {
    pub identity: TypeIdentity,
    pub rust_name: &'static str,
    pub value: Box<dyn Any + Send>,
}

impl DecodedObject {
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the concrete value, or get the object back on mismatch
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        let Self {
            identity,
            rust_name,
            value,
        } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                identity,
                rust_name,
                value,
            }),
        }
    }
}

impl fmt::Debug for DecodedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedObject")
            .field("identity", &self.identity)
            .field("rust_name", &self.rust_name)
            .finish_non_exhaustive()
    }
}

type RegistryKey = (String, String);

/// Rename table plus the registry of known types
#[derive(Debug, Default)]
pub struct TypeResolver {
    renames: RenameTable,
    registry: DashMap<RegistryKey, RegisteredType>,
}

impl TypeResolver {
    pub fn new(renames: RenameTable) -> Self {
        Self {
            renames,
            registry: DashMap::new(),
        }
    }

    pub fn renames(&self) -> &RenameTable {
        &self.renames
    }

    /// Add `T` to the registry; the first registration of an identity wins
    pub fn register<T: Persistent>(&self) {
        let identity = T::identity();
        let key = (identity.normalized_name(), identity.assembly.clone());
        let rust_name = std::any::type_name::<T>();

        match self.registry.entry(key) {
            Entry::Occupied(existing) => {
                if existing.get().type_id != TypeId::of::<T>() {
                    warn!(
                        type_name = %identity.full_name,
                        registered = existing.get().rust_name,
                        ignored = rust_name,
                        "Identity already registered to another type; keeping first registration"
                    );
                }
            }
            Entry::Vacant(slot) => {
                debug!(type_name = %identity.full_name, rust_name, "Registered type");
                slot.insert(RegisteredType {
                    identity,
                    type_id: TypeId::of::<T>(),
                    rust_name,
                    decode: graph::decode_registered::<T>,
                });
            }
        }
    }

    pub fn is_registered(&self, identity: &TypeIdentity) -> bool {
        self.lookup(&self.renames.apply(identity)).is_some()
    }

    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    /// Find the registered type a stream identity designates
    pub fn resolve(&self, stream: &TypeIdentity) -> CodecResult<RegisteredType> {
        let renamed = self.renames.apply(stream);
        self.lookup(&renamed).ok_or_else(|| {
            debug!(type_name = %renamed.full_name, assembly = %renamed.assembly, "Unresolved type");
            CodecError::type_resolution(
                &stream.full_name,
                &stream.assembly,
                &stream.assembly_full,
                "no registered type matches after renames and version stripping",
            )
        })
    }

    /// Check that a stream identity designates the type described by `expected`
    pub fn resolve_as(
        &self,
        stream: &TypeIdentity,
        expected: &TypeIdentity,
        rust_name: &str,
    ) -> CodecResult<()> {
        let renamed = self.renames.apply(stream);
        if identities_match(&renamed, expected) {
            return Ok(());
        }

        let reason = match self.lookup(&renamed) {
            Some(other) => format!(
                "stream type is registered as {}, but {} was requested",
                other.rust_name, rust_name
            ),
            None => format!(
                "does not match requested type {} ({})",
                expected.qualified_name(),
                rust_name
            ),
        };

        Err(CodecError::type_resolution(
            &stream.full_name,
            &stream.assembly,
            &stream.assembly_full,
            reason,
        ))
    }

    fn lookup(&self, identity: &TypeIdentity) -> Option<RegisteredType> {
        let name = identity.normalized_name();
        if let Some(found) = self.registry.get(&(name.clone(), identity.assembly.clone())) {
            return Some(found.value().clone());
        }

        let short = identity.assembly_from_full()?;
        self.registry
            .get(&(name, short.to_string()))
            .map(|found| found.value().clone())
    }
}

/// Identity a `T` is written under
pub fn identity_of<T: Persistent>() -> TypeIdentity {
    T::identity()
}

fn identities_match(stream: &TypeIdentity, expected: &TypeIdentity) -> bool {
    let names_match = match (stream.generic_definition(), expected.generic_definition()) {
        (Some(stream_def), Some(expected_def)) => stream_def == expected_def,
        (None, None) => stream.normalized_name() == expected.normalized_name(),
        _ => false,
    };

    names_match
        && (stream.assembly == expected.assembly
            || stream.assembly_from_full() == Some(expected.assembly.as_str()))
}
