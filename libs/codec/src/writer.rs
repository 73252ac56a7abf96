//! Output cursor for one encode call

use crate::block;
use crate::codec::CodecOptions;
use crate::error::{CodecError, CodecResult};
use crate::graph;
use crate::persist::{Persistent, Scalar};
use crate::schema::{DepthCache, TypeSchema};
use crate::token::{NAME_PREFIX, VALUE};
use std::sync::Arc;

/// Growable output buffer plus the per-call nesting state
///
/// Created by [`BinaryGraphCodec::encode`](crate::BinaryGraphCodec::encode)
/// and handed to property getters; never shared between calls.
pub struct Writer<'c> {
    buf: Vec<u8>,
    options: &'c CodecOptions,
    depth: usize,
    schemas: DepthCache,
}

impl<'c> Writer<'c> {
    pub(crate) fn new(options: &'c CodecOptions) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            options,
            depth: 0,
            schemas: DepthCache::new(options.depth_cache_slots),
        }
    }

    pub fn write_block(&mut self, data: Option<&[u8]>) -> CodecResult<()> {
        block::write_block(&mut self.buf, data)
    }

    pub fn write_token(&mut self, token: &str) -> CodecResult<()> {
        self.write_block(Some(token.as_bytes()))
    }

    /// `N:<name>` token without building the joined string
    pub fn write_name(&mut self, name: &str) -> CodecResult<()> {
        let len = NAME_PREFIX.len() + name.len();
        block::write_length(&mut self.buf, len as i64)?;
        self.buf.extend_from_slice(NAME_PREFIX.as_bytes());
        self.buf.extend_from_slice(name.as_bytes());
        Ok(())
    }

    /// `V` followed by the null sentinel
    pub fn write_null(&mut self) -> CodecResult<()> {
        self.write_token(VALUE)?;
        self.write_block(None)
    }

    pub fn write_scalar<S: Scalar>(&mut self, value: &S) -> CodecResult<()> {
        let frame = value.to_frame()?;
        self.write_token(VALUE)?;
        self.write_block(Some(&frame))
    }

    pub fn write_object<T: Persistent>(&mut self, obj: &T) -> CodecResult<()> {
        graph::encode_object(self, obj)
    }

    /// Bytes written so far
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn enter(&mut self) -> CodecResult<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(CodecError::DepthLimitExceeded {
                depth: self.depth,
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn schema<T: Persistent>(&mut self) -> Arc<TypeSchema<T>> {
        self.schemas.get::<T>(self.depth)
    }
}
