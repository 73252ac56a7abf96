//! # Version Tolerance Tests
//!
//! Producer and consumer type definitions evolve independently. These tests
//! pair an older and a newer definition that share one stream identity and
//! check what survives in each direction, plus type renames, read-only
//! collections and the string-construction fallback.

use objgraph_codec::{
    define_persistent, persistent_value, BinaryGraphCodec, CodecError, Envelope, MapInsert,
    MapLike, Persistent, TypeIdentity,
};
use std::collections::BTreeMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("objgraph_codec=debug")
        .with_test_writer()
        .try_init();
}

define_persistent! {
    pub struct Address as "Crm.Address" {
        persist: {
            street: String,
            zip: Option<String>,
        }
    }
}

mod v1 {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Customer as "Crm.Customer" {
            persist: {
                name: String,
                email: Option<String>,
                address: super::Address,
                legacy_code: i32,
            }
        }
    }
}

mod v2 {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Customer as "Crm.Customer" {
            persist: {
                name: String,
                loyalty: i32 = 5,
                nickname: Option<String>,
            }
        }
    }
}

#[test]
fn test_newer_reader_skips_removed_properties() {
    init_tracing();
    let codec = BinaryGraphCodec::new();

    let old = v1::Customer {
        name: "Ada".to_string(),
        email: Some("ada@example.org".to_string()),
        address: Address {
            street: "1 Analytical Way".to_string(),
            zip: None,
        },
        legacy_code: 17,
    };

    let bytes = codec.encode(&old).unwrap();
    let new: v2::Customer = codec.decode(&bytes).unwrap();

    assert_eq!(new.name, "Ada");
    // Missing from the stream: keeps the declared default
    assert_eq!(new.loyalty, 5);
    assert_eq!(new.nickname, None);
}

#[test]
fn test_older_reader_keeps_defaults_for_added_properties() {
    init_tracing();
    let codec = BinaryGraphCodec::new();

    let new = v2::Customer {
        name: "Grace".to_string(),
        loyalty: 42,
        nickname: Some("Amazing".to_string()),
    };

    let bytes = codec.encode(&new).unwrap();
    let old: v1::Customer = codec.decode(&bytes).unwrap();

    assert_eq!(old.name, "Grace");
    assert_eq!(old.email, None);
    assert_eq!(old.address, Address::default());
    assert_eq!(old.legacy_code, 0);
}

mod before_rename {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Foo as "Old.Ns.Foo" {
            persist: { value: i32, note: String }
        }
    }

    define_persistent! {
        pub struct Holder as "Ns.Holder" {
            persist: { foo: Foo }
        }
    }
}

mod after_rename {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Foo as "New.Ns.Foo" {
            persist: { value: i32, note: String }
        }
    }

    define_persistent! {
        pub struct Holder as "Ns.Holder" {
            persist: { foo: Foo }
        }
    }
}

#[test]
fn test_rename_table_maps_old_type_name() {
    let old = before_rename::Foo {
        value: 7,
        note: "renamed".to_string(),
    };
    let bytes = BinaryGraphCodec::new().encode(&old).unwrap();

    let plain = BinaryGraphCodec::new();
    let err = plain.decode::<after_rename::Foo>(&bytes).unwrap_err();
    match err {
        CodecError::TypeResolution { type_name, .. } => assert_eq!(type_name, "Old.Ns.Foo"),
        other => panic!("unexpected error {other:?}"),
    }

    let renaming = BinaryGraphCodec::builder()
        .rename_type("Old.Ns.Foo", "New.Ns.Foo")
        .build();
    let new: after_rename::Foo = renaming.decode(&bytes).unwrap();
    assert_eq!(new.value, 7);
    assert_eq!(new.note, "renamed");
}

#[test]
fn test_rename_applies_to_nested_objects() {
    let holder = before_rename::Holder {
        foo: before_rename::Foo {
            value: 3,
            note: String::new(),
        },
    };
    let bytes = BinaryGraphCodec::new().encode(&holder).unwrap();

    let renaming = BinaryGraphCodec::builder()
        .rename_type("Old.Ns.Foo", "New.Ns.Foo")
        .build();
    let decoded: after_rename::Holder = renaming.decode(&bytes).unwrap();
    assert_eq!(decoded.foo.value, 3);
}

#[test]
fn test_assembly_rename() {
    define_persistent! {
        pub struct Gadget as "Lab.Gadget" {
            persist: { id: i64 }
        }
    }

    // Same type name written by a crate that has since been renamed
    let mut bytes = BinaryGraphCodec::new().encode(&Gadget { id: 9 }).unwrap();
    let identity = Gadget::identity();
    let legacy = TypeIdentity::new("Lab.Gadget", "lab-legacy", "lab-legacy, Version=0.0.1");
    let header_at = 2;
    let old_header = identity.header();
    let new_header = legacy.header();
    assert!(old_header.len() < 64 && new_header.len() < 64);
    bytes.splice(
        header_at..header_at + 1 + old_header.len(),
        std::iter::once(((new_header.len() as u8) << 2) | 0b10).chain(new_header.bytes()),
    );

    let plain = BinaryGraphCodec::new();
    assert!(matches!(
        plain.decode::<Gadget>(&bytes),
        Err(CodecError::TypeResolution { .. })
    ));

    let renaming = BinaryGraphCodec::builder()
        .rename_assembly("lab-legacy", env!("CARGO_PKG_NAME"))
        .build();
    assert_eq!(renaming.decode::<Gadget>(&bytes).unwrap().id, 9);
}

mod writable {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Catalog {
        pub items: BTreeMap<String, i32>,
    }

    impl MapLike for Catalog {
        type Key = String;
        type Item = i32;

        fn entries(&self) -> Box<dyn Iterator<Item = (&String, &i32)> + '_> {
            Box::new(self.items.iter())
        }
    }

    impl MapInsert for Catalog {
        fn insert_entry(&mut self, key: String, item: i32) {
            self.items.insert(key, item);
        }
    }

    impl Persistent for Catalog {
        fn identity() -> TypeIdentity {
            TypeIdentity::new(
                "Shop.Catalog",
                env!("CARGO_PKG_NAME"),
                concat!(env!("CARGO_PKG_NAME"), ", Version=1.0.0"),
            )
        }

        fn envelope() -> Envelope<Self> {
            Envelope::map()
        }
    }

    persistent_value!(Catalog);
}

mod frozen {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Catalog {
        pub items: BTreeMap<String, i32>,
    }

    impl MapLike for Catalog {
        type Key = String;
        type Item = i32;

        fn entries(&self) -> Box<dyn Iterator<Item = (&String, &i32)> + '_> {
            Box::new(self.items.iter())
        }
    }

    impl Persistent for Catalog {
        fn identity() -> TypeIdentity {
            TypeIdentity::new(
                "Shop.Catalog",
                env!("CARGO_PKG_NAME"),
                concat!(env!("CARGO_PKG_NAME"), ", Version=2.0.0"),
            )
        }

        fn envelope() -> Envelope<Self> {
            Envelope::read_only_map()
        }
    }

    persistent_value!(Catalog);
}

#[test]
fn test_read_only_collection_rejects_envelope() {
    let codec = BinaryGraphCodec::new();
    let catalog = writable::Catalog {
        items: BTreeMap::from([("apple".to_string(), 3), ("pear".to_string(), 5)]),
    };
    let bytes = codec.encode(&catalog).unwrap();

    let err = codec.decode::<frozen::Catalog>(&bytes).unwrap_err();
    match err {
        CodecError::SchemaViolation { type_name, reason } => {
            assert_eq!(type_name, "Shop.Catalog");
            assert!(reason.contains("read-only"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    // A read-only collection still writes its entries
    let frozen = frozen::Catalog {
        items: catalog.items.clone(),
    };
    let bytes = codec.encode(&frozen).unwrap();
    assert_eq!(codec.decode::<writable::Catalog>(&bytes).unwrap(), catalog);
}

mod open_shelf {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Shelf as "Shop.Shelf" {
            persist: { aisle: i32, catalog: super::writable::Catalog }
        }
    }
}

mod sealed_shelf {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Shelf as "Shop.Shelf" {
            persist: { aisle: i32, catalog: super::frozen::Catalog }
        }
    }
}

#[test]
fn test_nested_read_only_collection_rejects_envelope() {
    let codec = BinaryGraphCodec::new();
    let shelf = open_shelf::Shelf {
        aisle: 4,
        catalog: writable::Catalog {
            items: BTreeMap::from([("plum".to_string(), 2)]),
        },
    };
    let bytes = codec.encode(&shelf).unwrap();

    let err = codec.decode::<sealed_shelf::Shelf>(&bytes).unwrap_err();
    match err {
        CodecError::SchemaViolation { type_name, reason } => {
            assert_eq!(type_name, "Shop.Catalog");
            assert!(reason.contains("read-only"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_envelope_kind_mismatch_is_schema_violation() {
    define_persistent! {
        pub struct Plain as "Shop.Catalog" {
            persist: {}
        }
    }

    let bytes = BinaryGraphCodec::new()
        .encode(&writable::Catalog {
            items: BTreeMap::from([("x".to_string(), 1)]),
        })
        .unwrap();
    let err = BinaryGraphCodec::new().decode::<Plain>(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::SchemaViolation { .. }));
}

mod text_era {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Counter as "Stats.Counter" {
            persist: { count: String, ratio: String, seen: String }
        }
    }
}

mod typed_era {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Counter as "Stats.Counter" {
            persist: { count: i32, ratio: f64, seen: bool }
        }
    }
}

#[test]
fn test_string_construction_fallback() {
    let codec = BinaryGraphCodec::new();
    let text = text_era::Counter {
        count: "42".to_string(),
        ratio: "0.25".to_string(),
        seen: "True".to_string(),
    };
    let typed: typed_era::Counter = codec.decode(&codec.encode(&text).unwrap()).unwrap();
    assert_eq!(typed.count, 42);
    assert_eq!(typed.ratio, 0.25);
    assert!(typed.seen);
}

#[test]
fn test_width_matching_text_is_read_as_binary() {
    // Four characters fill an i32 frame exactly, so no text parsing happens
    let codec = BinaryGraphCodec::new();
    let text = text_era::Counter {
        count: "1234".to_string(),
        ratio: "0.5".to_string(),
        seen: "true".to_string(),
    };
    let typed: typed_era::Counter = codec.decode(&codec.encode(&text).unwrap()).unwrap();
    assert_eq!(typed.count, i32::from_le_bytes(*b"1234"));
    assert_eq!(typed.count, 875_770_417);
    assert_eq!(typed.ratio, 0.5);
}

#[test]
fn test_conversion_failure_names_property() {
    let codec = BinaryGraphCodec::new();
    let text = text_era::Counter {
        count: "forty".to_string(),
        ratio: "1".to_string(),
        seen: "no".to_string(),
    };
    let err = codec
        .decode::<typed_era::Counter>(&codec.encode(&text).unwrap())
        .unwrap_err();
    match err {
        CodecError::ValueConversion {
            property,
            target,
            direct,
            fallback,
        } => {
            assert_eq!(property, "count");
            assert_eq!(target, "i32");
            assert!(!direct.is_empty());
            assert!(fallback.contains("forty"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

mod nullable {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Profile as "Crm.Profile" {
            persist: { nickname: Option<String> }
        }
    }
}

mod strict {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Profile as "Crm.Profile" {
            persist: { nickname: String }
        }
    }
}

#[test]
fn test_null_into_non_optional_target() {
    let codec = BinaryGraphCodec::new();

    let bytes = codec.encode(&nullable::Profile { nickname: None }).unwrap();
    let err = codec.decode::<strict::Profile>(&bytes).unwrap_err();
    assert!(
        matches!(err, CodecError::ValueConversion { ref property, .. } if property == "nickname")
    );

    let bytes = codec
        .encode(&nullable::Profile {
            nickname: Some(String::new()),
        })
        .unwrap();
    assert_eq!(codec.decode::<strict::Profile>(&bytes).unwrap().nickname, "");
}

define_persistent! {
    pub struct Part as "Crm.Part" {
        persist: { label: String }
    }
}

mod loose {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Order as "Crm.Order" {
            persist: {
                part: Option<super::Part>,
                tags: Option<Vec<String>>,
            }
        }
    }
}

mod tight {
    use objgraph_codec::define_persistent;

    define_persistent! {
        pub struct Order as "Crm.Order" {
            persist: {
                part: super::Part,
                tags: Vec<String>,
            }
        }
    }
}

#[test]
fn test_null_into_non_optional_object() {
    let codec = BinaryGraphCodec::new();
    let bytes = codec
        .encode(&loose::Order {
            part: None,
            tags: Some(vec!["red".to_string()]),
        })
        .unwrap();

    let err = codec.decode::<tight::Order>(&bytes).unwrap_err();
    match err {
        CodecError::ValueConversion { property, direct, .. } => {
            assert_eq!(property, "part");
            assert!(direct.contains("null"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_null_into_non_optional_collection() {
    let codec = BinaryGraphCodec::new();
    let part = Part {
        label: "bolt".to_string(),
    };
    let bytes = codec
        .encode(&loose::Order {
            part: Some(part.clone()),
            tags: None,
        })
        .unwrap();

    let err = codec.decode::<tight::Order>(&bytes).unwrap_err();
    assert!(
        matches!(err, CodecError::ValueConversion { ref property, .. } if property == "tags"),
        "unexpected error {err:?}"
    );

    let bytes = codec
        .encode(&loose::Order {
            part: Some(part.clone()),
            tags: Some(Vec::new()),
        })
        .unwrap();
    let order: tight::Order = codec.decode(&bytes).unwrap();
    assert_eq!(order.part, part);
    assert!(order.tags.is_empty());
}

#[test]
fn test_unknown_nested_collections_are_skipped() {
    define_persistent! {
        pub struct Wide as "Tests.Evolving" {
            persist: {
                keep: i32,
                history: Vec<BTreeMap<String, Address>>,
                extra: Option<Address>,
                after: String,
            }
        }
    }
    define_persistent! {
        pub struct Narrow as "Tests.Evolving" {
            persist: { keep: i32, after: String }
        }
    }

    let wide = Wide {
        keep: 1,
        history: vec![BTreeMap::from([(
            "home".to_string(),
            Address {
                street: "Elm".to_string(),
                zip: Some("123".to_string()),
            },
        )])],
        extra: None,
        after: "tail".to_string(),
    };

    let codec = BinaryGraphCodec::new();
    let narrow: Narrow = codec.decode(&codec.encode(&wide).unwrap()).unwrap();
    assert_eq!(narrow.keep, 1);
    assert_eq!(narrow.after, "tail");
}
