//! # Binary Graph Codec - Entry Points
//!
//! [`BinaryGraphCodec`] owns the options and type resolver shared by every
//! call. Each `encode`/`decode` call builds its own [`Writer`]/[`Reader`], so
//! one codec instance can serve any number of threads.

use crate::dispatch::BINARY_MARKER;
use crate::error::{CodecError, CodecResult};
use crate::persist::Persistent;
use crate::reader::Reader;
use crate::resolver::{DecodedObject, RenameTable, TypeResolver};
use crate::writer::Writer;
use objgraph_types::TypeIdentity;
use tracing::trace;

pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_DEPTH_CACHE_SLOTS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct CodecOptions {
    /// Nesting ceiling; deeper graphs fail with `DepthLimitExceeded`
    pub max_depth: usize,
    /// Per-call "last schema seen" slots, one per nesting depth
    pub depth_cache_slots: usize,
    pub renames: RenameTable,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            depth_cache_slots: DEFAULT_DEPTH_CACHE_SLOTS,
            renames: RenameTable::default(),
        }
    }
}

#[derive(Debug)]
pub struct BinaryGraphCodec {
    options: CodecOptions,
    resolver: TypeResolver,
}

impl BinaryGraphCodec {
    pub fn new() -> Self {
        Self::with_options(CodecOptions::default())
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            resolver: TypeResolver::new(options.renames.clone()),
            options,
        }
    }

    pub fn builder() -> CodecBuilder {
        CodecBuilder::default()
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Make `T` available to [`decode_any`](Self::decode_any)
    pub fn register<T: Persistent>(&self) -> &Self {
        self.resolver.register::<T>();
        self
    }

    pub fn encode<T: Persistent>(&self, obj: &T) -> CodecResult<Vec<u8>> {
        let mut w = Writer::new(&self.options);
        w.write_raw(&BINARY_MARKER);
        w.write_object(obj)?;
        Ok(w.into_bytes())
    }

    pub fn decode<T: Persistent>(&self, bytes: &[u8]) -> CodecResult<T> {
        let mut r = self.reader(bytes)?;
        let obj = r.read_object::<T>()?;
        log_trailing(&r);
        Ok(obj)
    }

    /// Decode through the registry, without naming the type up front
    pub fn decode_any(&self, bytes: &[u8]) -> CodecResult<DecodedObject> {
        let mut r = self.reader(bytes)?;

        let offset = r.position();
        let header = r.next_token()?;
        let identity = TypeIdentity::parse_header(header)
            .map_err(|e| r.format_error(offset, format!("expected an object header: {e}")))?;

        let registered = self.resolver.resolve(&identity)?;
        let value = (registered.decode)(&mut r)?;
        log_trailing(&r);

        Ok(DecodedObject {
            identity: registered.identity,
            rust_name: registered.rust_name,
            value,
        })
    }

    fn reader<'a>(&'a self, bytes: &'a [u8]) -> CodecResult<Reader<'a>> {
        if !bytes.starts_with(&BINARY_MARKER) {
            return Err(CodecError::stream_format(
                0,
                format!("missing binary graph marker {}", hex::encode(BINARY_MARKER)),
                bytes,
            ));
        }
        Ok(Reader::new(bytes, BINARY_MARKER.len(), self))
    }
}

impl Default for BinaryGraphCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn log_trailing(r: &Reader<'_>) {
    if r.remaining() > 0 {
        trace!(
            trailing = r.remaining(),
            offset = r.position(),
            "Ignoring trailing bytes after root object"
        );
    }
}

/// Builder for a configured [`BinaryGraphCodec`]
#[derive(Debug, Default)]
pub struct CodecBuilder {
    options: CodecOptions,
}

impl CodecBuilder {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    pub fn depth_cache_slots(mut self, slots: usize) -> Self {
        self.options.depth_cache_slots = slots;
        self
    }

    pub fn rename_type(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.options.renames = self.options.renames.rename_type(from, to);
        self
    }

    pub fn rename_assembly(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.options.renames = self.options.renames.rename_assembly(from, to);
        self
    }

    pub fn renames(mut self, renames: RenameTable) -> Self {
        self.options.renames = renames;
        self
    }

    pub fn build(self) -> BinaryGraphCodec {
        BinaryGraphCodec::with_options(self.options)
    }
}
