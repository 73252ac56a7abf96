//! # Length/Tag Primitive
//!
//! Every token and scalar frame in the binary graph format is written as a
//! block: a variable-width header followed by the payload. The low two bits of
//! the header's first byte select the header width:
//!
//! | Tag  | Header       | Lengths            | Layout             |
//! |------|--------------|--------------------|--------------------|
//! | `11` | 1 byte       | special            | `0xFF` null, `0x03` empty |
//! | `10` | 1 byte       | 1 ..= 63           | `len << 2 \| 0b10` |
//! | `01` | 2 bytes LE   | 64 ..= 16 383      | `len << 2 \| 0b01` |
//! | `00` | 4 bytes LE   | 16 384 ..= 2³⁰ − 1 | `len << 2`         |
//!
//! Null and empty are distinct states. Writers always emit the special empty
//! pattern for zero-length payloads; readers also accept a `10` header with a
//! length of zero.

use crate::error::{CodecError, CodecResult};
use byteorder::{ByteOrder, LittleEndian};

pub const TAG_MASK: u8 = 0b11;
pub const TAG_SPECIAL: u8 = 0b11;
pub const TAG_TINY: u8 = 0b10;
pub const TAG_SHORT: u8 = 0b01;
pub const TAG_WIDE: u8 = 0b00;

pub const NULL_BLOCK: u8 = 0xFF;
pub const EMPTY_BLOCK: u8 = 0x03;

pub const TINY_MAX: usize = 63;
pub const SHORT_MAX: usize = 16_383;
pub const WIDE_MAX: usize = (u32::MAX >> 2) as usize;

/// Decoded block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockHeader {
    Null,
    Empty,
    Length(usize),
}

/// Write a block length header.
///
/// Negative lengths are the null sentinel; zero is the empty pattern.
pub fn write_length(buf: &mut Vec<u8>, len: i64) -> CodecResult<()> {
    if len < 0 {
        buf.push(NULL_BLOCK);
        return Ok(());
    }

    let len = len as u64;
    if len == 0 {
        buf.push(EMPTY_BLOCK);
    } else if len <= TINY_MAX as u64 {
        buf.push(((len as u8) << 2) | TAG_TINY);
    } else if len <= SHORT_MAX as u64 {
        let mut word = [0u8; 2];
        LittleEndian::write_u16(&mut word, ((len as u16) << 2) | u16::from(TAG_SHORT));
        buf.extend_from_slice(&word);
    } else if len <= WIDE_MAX as u64 {
        let mut word = [0u8; 4];
        LittleEndian::write_u32(&mut word, (len as u32) << 2);
        buf.extend_from_slice(&word);
    } else {
        return Err(CodecError::BlockTooLarge {
            len,
            max: WIDE_MAX as u64,
        });
    }
    Ok(())
}

/// Write a complete block; `None` writes the null sentinel
pub fn write_block(buf: &mut Vec<u8>, data: Option<&[u8]>) -> CodecResult<()> {
    match data {
        None => write_length(buf, -1),
        Some(bytes) => {
            let len = i64::try_from(bytes.len()).map_err(|_| CodecError::BlockTooLarge {
                len: bytes.len() as u64,
                max: WIDE_MAX as u64,
            })?;
            write_length(buf, len)?;
            buf.extend_from_slice(bytes);
            Ok(())
        }
    }
}

/// Read a block header at `*pos`, advancing past it
pub fn read_header(buf: &[u8], pos: &mut usize) -> CodecResult<BlockHeader> {
    let start = *pos;
    let first = *buf
        .get(start)
        .ok_or_else(|| CodecError::stream_format(start, "expected block header, found end of stream", buf))?;

    let header = match first & TAG_MASK {
        TAG_SPECIAL => match first {
            NULL_BLOCK => BlockHeader::Null,
            EMPTY_BLOCK => BlockHeader::Empty,
            other => {
                return Err(CodecError::stream_format(
                    start,
                    format!("invalid special block header {other:#04x}"),
                    buf,
                ))
            }
        },
        TAG_TINY => match usize::from(first >> 2) {
            0 => BlockHeader::Empty,
            len => BlockHeader::Length(len),
        },
        TAG_SHORT => {
            let word = buf.get(start..start + 2).ok_or_else(|| {
                CodecError::stream_format(start, "truncated 2-byte block header", buf)
            })?;
            *pos += 1;
            BlockHeader::Length(usize::from(LittleEndian::read_u16(word) >> 2))
        }
        _ => {
            let word = buf.get(start..start + 4).ok_or_else(|| {
                CodecError::stream_format(start, "truncated 4-byte block header", buf)
            })?;
            *pos += 3;
            BlockHeader::Length((LittleEndian::read_u32(word) >> 2) as usize)
        }
    };

    *pos += 1;
    Ok(header)
}

/// Read a block at `*pos`; `None` is the null sentinel
pub fn read_block<'a>(buf: &'a [u8], pos: &mut usize) -> CodecResult<Option<&'a [u8]>> {
    let start = *pos;
    match read_header(buf, pos)? {
        BlockHeader::Null => Ok(None),
        BlockHeader::Empty => Ok(Some(&buf[*pos..*pos])),
        BlockHeader::Length(len) => {
            let body = *pos;
            let payload = buf.get(body..body + len).ok_or_else(|| {
                CodecError::stream_format(
                    start,
                    format!(
                        "block declares {len} bytes but only {} remain",
                        buf.len().saturating_sub(body)
                    ),
                    buf,
                )
            })?;
            *pos = body + len;
            Ok(Some(payload))
        }
    }
}

/// Size of the header `write_length` emits for `len`
pub fn header_width(len: usize) -> usize {
    match len {
        0..=TINY_MAX => 1,
        _ if len <= SHORT_MAX => 2,
        _ => 4,
    }
}
