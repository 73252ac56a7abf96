//! Structural tokens of the binary graph format
//!
//! Tokens are short UTF-8 strings written as blocks. Grammar after the
//! two-byte marker:
//!
//! ```text
//! object   := "Object:<full>:<short>:<asmFull>" section* "E"
//! section  := "P" ("N:<name>" value)* "E"
//!           | "DICT" (value value)* "E"
//!           | "LIST" value* "E"
//! value    := "V" frame
//!           | object
//! ```

pub use objgraph_types::OBJECT_PREFIX;

pub const PROPERTIES: &str = "P";
pub const END: &str = "E";
pub const VALUE: &str = "V";
pub const DICT: &str = "DICT";
pub const LIST: &str = "LIST";
pub const NAME_PREFIX: &str = "N:";

/// Classified token text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Properties,
    End,
    Value,
    Dict,
    List,
    /// Property name without the `N:` prefix
    Name(&'a str),
    /// Full header text including the `Object:` prefix
    Object(&'a str),
    Unknown(&'a str),
}

impl<'a> Token<'a> {
    pub fn classify(text: &'a str) -> Self {
        match text {
            PROPERTIES => Token::Properties,
            END => Token::End,
            VALUE => Token::Value,
            DICT => Token::Dict,
            LIST => Token::List,
            _ => {
                if let Some(name) = text.strip_prefix(NAME_PREFIX) {
                    Token::Name(name)
                } else if text.starts_with(OBJECT_PREFIX) {
                    Token::Object(text)
                } else {
                    Token::Unknown(text)
                }
            }
        }
    }
}
