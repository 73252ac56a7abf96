//! # Binary Graph Codec - Recursive Encode/Decode
//!
//! ## Encoding
//!
//! ```text
//! header  "Object:<full>:<short>:<asmFull>"
//! "P"     ("N:<name>" value)* "E"        ; schema order
//! "DICT"  (key item)* "E"                ; map-like types only
//! "LIST"  element* "E"                   ; sequence-like types only
//! "E"
//! ```
//!
//! ## Decoding
//!
//! The header is resolved against the requested type, a default instance is
//! built and sections are applied as they arrive. Stream properties unknown to
//! the current type are consumed and dropped; properties the stream lacks keep
//! their default. An envelope the type cannot accept is a schema violation,
//! reported before any of its entries are read.

use crate::error::{CodecError, CodecResult};
use crate::persist::Persistent;
use crate::reader::Reader;
use crate::schema::{Envelope, TypeSchema};
use crate::token::{Token, DICT, END, LIST, PROPERTIES};
use crate::writer::Writer;
use objgraph_types::TypeIdentity;
use std::any::Any;
use tracing::debug;

pub(crate) fn encode_object<T: Persistent>(w: &mut Writer<'_>, obj: &T) -> CodecResult<()> {
    w.enter()?;
    let schema = w.schema::<T>();

    w.write_token(schema.header())?;

    w.write_token(PROPERTIES)?;
    for property in schema.properties() {
        if let Some(getter) = property.getter {
            w.write_name(property.name)?;
            getter(obj, w).map_err(|e| e.in_property(property.name))?;
        }
    }
    w.write_token(END)?;

    match schema.envelope() {
        Envelope::None => {}
        Envelope::Map(access) => {
            w.write_token(DICT)?;
            (access.write)(obj, w)?;
            w.write_token(END)?;
        }
        Envelope::List(access) => {
            w.write_token(LIST)?;
            (access.write)(obj, w)?;
            w.write_token(END)?;
        }
    }

    w.write_token(END)?;
    w.leave();
    Ok(())
}

pub(crate) fn decode_object<T: Persistent>(r: &mut Reader<'_>) -> CodecResult<T> {
    // Written for an optional object or collection
    if r.take_null() {
        return Err(CodecError::value_conversion(
            std::any::type_name::<T>(),
            "stream holds null",
            "null cannot initialise a non-optional object",
        ));
    }

    r.enter()?;
    let schema = r.schema::<T>();

    let offset = r.position();
    let header = r.next_token()?;
    let identity = TypeIdentity::parse_header(header)
        .map_err(|e| r.format_error(offset, format!("expected an object header: {e}")))?;

    r.resolver()
        .resolve_as(&identity, schema.identity(), std::any::type_name::<T>())?;

    let obj = decode_body(r, &schema)?;
    r.leave();
    Ok(obj)
}

/// Registry factory: the header has already been read and resolved
pub(crate) fn decode_registered<T: Persistent>(
    r: &mut Reader<'_>,
) -> CodecResult<Box<dyn Any + Send>> {
    r.enter()?;
    let schema = r.schema::<T>();
    let obj = decode_body(r, &schema)?;
    r.leave();
    Ok(Box::new(obj))
}

fn decode_body<T: Persistent>(r: &mut Reader<'_>, schema: &TypeSchema<T>) -> CodecResult<T> {
    let mut obj = T::default();

    loop {
        let offset = r.position();
        let token = r.next_token()?;
        match Token::classify(token) {
            Token::Properties => decode_properties(r, schema, &mut obj)?,
            Token::Dict | Token::List => decode_envelope(r, schema, &mut obj, token)?,
            Token::End => return Ok(obj),
            _ => return Err(r.unexpected_token(offset, token, "P, DICT, LIST or E")),
        }
    }
}

fn decode_properties<T>(
    r: &mut Reader<'_>,
    schema: &TypeSchema<T>,
    obj: &mut T,
) -> CodecResult<()> {
    loop {
        let offset = r.position();
        let token = r.next_token()?;
        let name = match Token::classify(token) {
            Token::End => return Ok(()),
            Token::Name(name) => name,
            _ => return Err(r.unexpected_token(offset, token, "N:<name> or E")),
        };

        match schema.property(name).and_then(|property| property.setter) {
            Some(setter) => setter(obj, r).map_err(|e| e.in_property(name))?,
            None => {
                debug!(
                    type_name = %schema.identity().full_name,
                    property = name,
                    "Skipping stream property unknown to target type"
                );
                skip_value(r)?;
            }
        }
    }
}

fn decode_envelope<T>(
    r: &mut Reader<'_>,
    schema: &TypeSchema<T>,
    obj: &mut T,
    section: &str,
) -> CodecResult<()> {
    let access = match (section, schema.envelope()) {
        (DICT, Envelope::Map(access)) | (LIST, Envelope::List(access)) => access,
        (_, envelope) => {
            let accepts = envelope.kind().unwrap_or("no collection section");
            return Err(CodecError::schema_violation(
                &schema.identity().full_name,
                format!("stream carries a {section} section but the type accepts {accepts}"),
            ));
        }
    };

    let Some(insert) = access.insert else {
        return Err(CodecError::schema_violation(
            &schema.identity().full_name,
            format!("stream carries a {section} section but the collection is read-only"),
        ));
    };

    loop {
        if r.peek_token()? == END {
            r.next_token()?;
            return Ok(());
        }
        insert(obj, r)?;
    }
}

/// Consume one value (scalar frame or whole nested object) without decoding it
pub(crate) fn skip_value(r: &mut Reader<'_>) -> CodecResult<()> {
    let offset = r.position();
    let token = r.next_token()?;
    match Token::classify(token) {
        Token::Value => r.read_block().map(|_| ()),
        Token::Object(_) => {
            r.enter()?;
            skip_body(r)?;
            r.leave();
            Ok(())
        }
        _ => Err(r.unexpected_token(offset, token, "V or an object header")),
    }
}

fn skip_body(r: &mut Reader<'_>) -> CodecResult<()> {
    loop {
        let offset = r.position();
        let token = r.next_token()?;
        match Token::classify(token) {
            Token::Properties => loop {
                let offset = r.position();
                let token = r.next_token()?;
                match Token::classify(token) {
                    Token::End => break,
                    Token::Name(_) => skip_value(r)?,
                    _ => return Err(r.unexpected_token(offset, token, "N:<name> or E")),
                }
            },
            Token::Dict | Token::List => {
                while r.peek_token()? != END {
                    skip_value(r)?;
                }
                r.next_token()?;
            }
            Token::End => return Ok(()),
            _ => return Err(r.unexpected_token(offset, token, "P, DICT, LIST or E")),
        }
    }
}
