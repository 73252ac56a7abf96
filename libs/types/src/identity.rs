//! # Type Identity - Self-Describing Object Headers
//!
//! ## Purpose
//!
//! Every object written by the binary graph codec starts with a header naming
//! its type: `Object:<full name>:<assembly short name>:<assembly full name>`.
//! The "assembly" is the crate that defines the type; its full name carries the
//! crate version (`demo, Version=1.4.0`), the short name does not.
//!
//! Generic collection identities embed the assembly-qualified names of their
//! arguments (`Vec`1[[Shop.Order, shop]]`). Those argument strings are stripped
//! of `Version=`, `Culture=` and `PublicKeyToken=` segments before emission so
//! that upgrading a dependency does not invalidate stored data.

use crate::errors::IdentityError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Prefix of the header token that opens every serialized object
pub const OBJECT_PREFIX: &str = "Object:";

static VERSION_METADATA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*,\s*(?:Version|Culture|PublicKeyToken)=[^,\]]*")
        .expect("version metadata pattern is valid")
});

/// Remove `Version=`, `Culture=` and `PublicKeyToken=` segments from a
/// (possibly generic) assembly-qualified type name.
pub fn strip_version_info(name: &str) -> String {
    VERSION_METADATA.replace_all(name, "").into_owned()
}

/// Stream identity of a persistable type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeIdentity {
    /// Namespace-qualified type name, e.g. `Shop.Model.Order`
    pub full_name: String,
    /// Short name of the defining crate, e.g. `shop`
    pub assembly: String,
    /// Full name of the defining crate including version, or empty
    pub assembly_full: String,
}

impl TypeIdentity {
    pub fn new(
        full_name: impl Into<String>,
        assembly: impl Into<String>,
        assembly_full: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            assembly: assembly.into(),
            assembly_full: assembly_full.into(),
        }
    }

    /// Identity of a generic type instantiation.
    ///
    /// `arguments` are assembly-qualified names; their version metadata is
    /// stripped. The full assembly name of a generic instantiation is empty.
    pub fn generic(definition: &str, assembly: &str, arguments: &[String]) -> Self {
        let args = arguments
            .iter()
            .map(|arg| format!("[{}]", strip_version_info(arg)))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            full_name: format!("{definition}[{args}]"),
            assembly: assembly.to_string(),
            assembly_full: String::new(),
        }
    }

    /// Assembly-qualified name as embedded in generic argument lists
    pub fn qualified_name(&self) -> String {
        if self.assembly_full.is_empty() {
            format!("{}, {}", self.full_name, self.assembly)
        } else {
            format!("{}, {}", self.full_name, self.assembly_full)
        }
    }

    /// Header token text for this identity
    pub fn header(&self) -> String {
        format!(
            "{OBJECT_PREFIX}{}:{}:{}",
            self.full_name, self.assembly, self.assembly_full
        )
    }

    /// Parse a header token produced by [`TypeIdentity::header`].
    ///
    /// Segments are split from the right so type names may themselves
    /// contain `:`.
    pub fn parse_header(header: &str) -> Result<Self, IdentityError> {
        let body = header
            .strip_prefix(OBJECT_PREFIX)
            .ok_or_else(|| IdentityError::MissingPrefix {
                expected: OBJECT_PREFIX,
                header: header.to_string(),
            })?;

        let mut segments = body.rsplitn(3, ':');
        let (Some(assembly_full), Some(assembly), Some(full_name)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(IdentityError::MissingSegments {
                header: header.to_string(),
            });
        };

        if full_name.is_empty() {
            return Err(IdentityError::EmptyTypeName {
                header: header.to_string(),
            });
        }

        Ok(Self::new(full_name, assembly, assembly_full))
    }

    /// Type name with version metadata removed from any generic arguments
    pub fn normalized_name(&self) -> String {
        strip_version_info(&self.full_name)
    }

    /// Generic definition (`Vec`1`) for generic instantiations
    pub fn generic_definition(&self) -> Option<&str> {
        self.full_name
            .find('[')
            .map(|idx| &self.full_name[..idx])
            .filter(|def| !def.is_empty())
    }

    /// Short assembly name recovered from the full assembly name
    pub fn assembly_from_full(&self) -> Option<&str> {
        self.assembly_full
            .split(',')
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
