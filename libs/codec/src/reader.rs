//! Input cursor for one decode call

use crate::block;
use crate::codec::BinaryGraphCodec;
use crate::error::{CodecError, CodecResult};
use crate::graph;
use crate::persist::{Persistent, Scalar};
use crate::resolver::TypeResolver;
use crate::schema::{DepthCache, TypeSchema};
use crate::token::VALUE;
use std::sync::Arc;

/// Borrowed input plus position and nesting state
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    codec: &'a BinaryGraphCodec,
    depth: usize,
    schemas: DepthCache,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8], start: usize, codec: &'a BinaryGraphCodec) -> Self {
        Self {
            buf,
            pos: start,
            codec,
            depth: 0,
            schemas: DepthCache::new(codec.options().depth_cache_slots),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn resolver(&self) -> &'a TypeResolver {
        self.codec.resolver()
    }

    pub fn read_block(&mut self) -> CodecResult<Option<&'a [u8]>> {
        block::read_block(self.buf, &mut self.pos)
    }

    pub fn next_token(&mut self) -> CodecResult<&'a str> {
        let offset = self.pos;
        match self.read_block()? {
            None => Err(self.format_error(offset, "expected a token, found a null frame")),
            Some(bytes) => std::str::from_utf8(bytes).map_err(|e| {
                self.format_error(offset, format!("token is not valid UTF-8: {e}"))
            }),
        }
    }

    pub fn peek_token(&mut self) -> CodecResult<&'a str> {
        let start = self.pos;
        let token = self.next_token();
        self.pos = start;
        token
    }

    pub fn expect_token(&mut self, expected: &str) -> CodecResult<()> {
        let offset = self.pos;
        let token = self.next_token()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.unexpected_token(offset, token, expected))
        }
    }

    /// Consume `V` + null sentinel if that is what comes next
    pub fn take_null(&mut self) -> bool {
        let start = self.pos;
        let is_null = matches!(self.next_token(), Ok(VALUE)) && matches!(self.read_block(), Ok(None));
        if !is_null {
            self.pos = start;
        }
        is_null
    }

    /// `V` + frame, converted directly or through the string fallback
    pub fn read_scalar<S: Scalar>(&mut self) -> CodecResult<S> {
        self.expect_token(VALUE)?;
        match self.read_block()? {
            None => Err(CodecError::value_conversion(
                S::TYPE_NAME,
                "stream holds null",
                "null cannot initialise a non-optional value",
            )),
            Some(frame) => convert_frame(frame),
        }
    }

    pub fn read_object<T: Persistent>(&mut self) -> CodecResult<T> {
        graph::decode_object(self)
    }

    pub(crate) fn enter(&mut self) -> CodecResult<()> {
        self.depth += 1;
        let limit = self.codec.options().max_depth;
        if self.depth > limit {
            return Err(CodecError::DepthLimitExceeded {
                depth: self.depth,
                limit,
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

    pub(crate) fn format_error(&self, offset: usize, description: impl Into<String>) -> CodecError {
        CodecError::stream_format(offset, description, self.buf)
    }

    pub(crate) fn unexpected_token(&self, offset: usize, found: &str, expected: &str) -> CodecError {
        self.format_error(offset, format!("expected {expected}, found token '{found}'"))
    }
}

/// Direct frame conversion first, then UTF-8 + canonical string construction
///
/// Frames carry no type tag, so the fallback only runs when the direct
/// conversion rejects the frame. Text whose byte length equals the target's
/// fixed width is read as binary: the 4-byte string `"1234"` written for a
/// property that is now `i32` decodes as `0x34333231`, without an error.
pub(crate) fn convert_frame<S: Scalar>(frame: &[u8]) -> CodecResult<S> {
    let direct = match S::KIND
        .check_width(frame.len())
        .and_then(|()| S::from_frame(frame))
    {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let fallback = match std::str::from_utf8(frame) {
        Ok(text) => match S::from_canonical(text) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        },
        Err(e) => format!("frame is not UTF-8 text: {e}"),
    };

    Err(CodecError::value_conversion(S::TYPE_NAME, direct, fallback))
}
