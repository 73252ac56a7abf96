//! Declarative codegen for persistable types
//!
//! [`define_persistent!`] generates a struct, its `Default` impl, its
//! [`Persistent`](crate::Persistent) descriptor list and its
//! [`Value`](crate::Value) impl from one declaration. Fields are grouped into
//! sections: `persist:` fields are written in declaration order, `transient:`
//! fields exist on the struct but never reach the stream.
//!
//! ```rust
//! use objgraph_codec::define_persistent;
//!
//! define_persistent! {
//!     /// Catalogue entry
//!     pub struct Product as "Shop.Model.Product" {
//!         persist: {
//!             sku: String,
//!             price: i64 = 100,
//!             tags: Vec<String>,
//!         }
//!         transient: {
//!             dirty: bool,
//!         }
//!     }
//! }
//!
//! let product = Product::default();
//! assert_eq!(product.price, 100);
//! ```
//!
//! The identity's assembly is the crate that invokes the macro, with its
//! version as the full assembly name.

/// Define a persistable struct
#[macro_export]
macro_rules! define_persistent {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident as $type_name:literal {
            persist: {
                $(
                    $(#[$field_meta:meta])*
                    $field:ident : $field_ty:ty $(= $default:expr)?
                ),* $(,)?
            }
            $(
                transient: {
                    $(
                        $(#[$transient_meta:meta])*
                        $transient:ident : $transient_ty:ty $(= $transient_default:expr)?
                    ),* $(,)?
                }
            )?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $field_ty,
            )*
            $($(
                $(#[$transient_meta])*
                pub $transient: $transient_ty,
            )*)?
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $crate::__persistent_default!($($default)?), )*
                    $($( $transient: $crate::__persistent_default!($($transient_default)?), )*)?
                }
            }
        }

        impl $crate::Persistent for $name {
            fn identity() -> $crate::TypeIdentity {
                $crate::TypeIdentity::new(
                    $type_name,
                    ::core::env!("CARGO_PKG_NAME"),
                    ::core::concat!(
                        ::core::env!("CARGO_PKG_NAME"),
                        ", Version=",
                        ::core::env!("CARGO_PKG_VERSION")
                    ),
                )
            }

            fn properties() -> ::std::vec::Vec<$crate::PropertyDescriptor<Self>> {
                ::std::vec![
                    $(
                        $crate::PropertyDescriptor::new(
                            ::core::stringify!($field),
                            ::core::stringify!($field_ty),
                            |obj: &Self, w: &mut $crate::Writer<'_>| {
                                $crate::Value::encode_value(&obj.$field, w)
                            },
                            |obj: &mut Self, r: &mut $crate::Reader<'_>| {
                                obj.$field = <$field_ty as $crate::Value>::decode_value(r)?;
                                ::core::result::Result::Ok(())
                            },
                        ),
                    )*
                    $($(
                        $crate::PropertyDescriptor::transient_field(
                            ::core::stringify!($transient),
                            ::core::stringify!($transient_ty),
                        ),
                    )*)?
                ]
            }
        }

        $crate::persistent_value!($name);
    };
}

/// `Value` impl for a `Persistent` type written as a nested object
#[macro_export]
macro_rules! persistent_value {
    ($ty:ty) => {
        impl $crate::Value for $ty {
            fn encode_value(&self, w: &mut $crate::Writer<'_>) -> $crate::CodecResult<()> {
                w.write_object(self)
            }

            fn decode_value(r: &mut $crate::Reader<'_>) -> $crate::CodecResult<Self> {
                r.read_object::<Self>()
            }

            fn qualified_name() -> ::std::string::String {
                <Self as $crate::Persistent>::identity().qualified_name()
            }
        }
    };
}

/// Persist `#[repr(i64)]` enums (with `num_enum` conversions) as their discriminant
///
/// The string fallback accepts the decimal discriminant.
#[macro_export]
macro_rules! persist_enum {
    ($($ty:ty => $type_name:literal),+ $(,)?) => {
        $(
            impl $crate::Scalar for $ty {
                const KIND: $crate::ScalarKind = $crate::ScalarKind::Enum;
                const TYPE_NAME: &'static str = $type_name;
                const ASSEMBLY: &'static str = ::core::env!("CARGO_PKG_NAME");

                fn to_frame(&self) -> $crate::CodecResult<::std::borrow::Cow<'_, [u8]>> {
                    let raw: i64 = (*self).into();
                    ::core::result::Result::Ok(::std::borrow::Cow::Owned(raw.to_le_bytes().to_vec()))
                }

                fn from_frame(frame: &[u8]) -> ::core::result::Result<Self, ::std::string::String> {
                    let bytes: [u8; 8] = frame
                        .try_into()
                        .map_err(|_| ::std::format!("expected 8 bytes, got {}", frame.len()))?;
                    <$ty>::try_from(i64::from_le_bytes(bytes)).map_err(|e| e.to_string())
                }

                fn from_canonical(text: &str) -> ::core::result::Result<Self, ::std::string::String> {
                    let raw = text
                        .trim()
                        .parse::<i64>()
                        .map_err(|e| ::std::format!("'{text}' is not a discriminant of {}: {e}", $type_name))?;
                    <$ty>::try_from(raw).map_err(|e| e.to_string())
                }
            }

            $crate::__scalar_value!($ty);
        )+
    };
}

/// Persist types through their `Display`/`FromStr` string form
#[macro_export]
macro_rules! persist_as_string {
    ($($ty:ty => $type_name:literal),+ $(,)?) => {
        $(
            impl $crate::Scalar for $ty {
                const KIND: $crate::ScalarKind = $crate::ScalarKind::String;
                const TYPE_NAME: &'static str = $type_name;
                const ASSEMBLY: &'static str = ::core::env!("CARGO_PKG_NAME");

                fn to_frame(&self) -> $crate::CodecResult<::std::borrow::Cow<'_, [u8]>> {
                    ::core::result::Result::Ok(::std::borrow::Cow::Owned(self.to_string().into_bytes()))
                }

                fn from_frame(frame: &[u8]) -> ::core::result::Result<Self, ::std::string::String> {
                    let text = ::std::str::from_utf8(frame).map_err(|e| e.to_string())?;
                    <Self as $crate::Scalar>::from_canonical(text)
                }

                fn from_canonical(text: &str) -> ::core::result::Result<Self, ::std::string::String> {
                    text.parse::<$ty>().map_err(|e| e.to_string())
                }
            }

            $crate::__scalar_value!($ty);
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __persistent_default {
    () => {
        ::core::default::Default::default()
    };
    ($value:expr) => {
        $value
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __scalar_value {
    ($ty:ty) => {
        impl $crate::Value for $ty {
            fn encode_value(&self, w: &mut $crate::Writer<'_>) -> $crate::CodecResult<()> {
                w.write_scalar(self)
            }

            fn decode_value(r: &mut $crate::Reader<'_>) -> $crate::CodecResult<Self> {
                r.read_scalar::<Self>()
            }

            fn qualified_name() -> ::std::string::String {
                $crate::scalar_qualified_name::<Self>()
            }
        }
    };
}
