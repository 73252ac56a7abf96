//! # Graph Codec Round-Trip Tests
//!
//! End-to-end encode/decode through the public API:
//! - every built-in scalar, including null vs empty strings
//! - nested objects, lists and maps
//! - enum and string-form scalars declared with the helper macros
//! - untyped decoding through the registry
//! - one codec shared by many threads

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use objgraph_codec::{
    decode, define_persistent, encode, identity_of, persist_as_string, persist_enum,
    BinaryGraphCodec, CodecError, CodecKind,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum Level {
    Low = 0,
    High = 2,
    Critical = 7,
}

impl Default for Level {
    fn default() -> Self {
        Level::Low
    }
}

persist_enum!(Level => "Tests.Level");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb(u8, u8, u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or("missing '#'")?;
        if hex.len() != 6 {
            return Err(format!("'{s}' is not #rrggbb"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

persist_as_string!(Rgb => "Tests.Rgb");

define_persistent! {
    /// One property per built-in scalar
    pub struct Sample as "Tests.Sample" {
        persist: {
            small: i32,
            big: i64,
            unsigned: u64,
            ratio: f64,
            flag: bool,
            level: Level,
            label: String,
            missing: Option<String>,
            stamp: NaiveDateTime,
            utc: DateTime<Utc>,
            span: TimeDelta,
            id: Uuid,
            blob: Bytes,
            color: Rgb,
            maybe: Option<i32>,
        }
    }
}

define_persistent! {
    pub struct Person as "Demo.Person" {
        persist: {
            name: Option<String>,
            tags: Vec<String>,
            scores: BTreeMap<i32, i32>,
        }
    }
}

define_persistent! {
    pub struct Team as "Demo.Team" {
        persist: {
            lead: Person,
            deputy: Option<Person>,
            members: Vec<Person>,
            by_login: HashMap<String, Person>,
        }
        transient: {
            revision: u64 = 1,
        }
    }
}

fn sample() -> Sample {
    Sample {
        small: -42,
        big: i64::MIN + 1,
        unsigned: u64::MAX,
        ratio: 0.125,
        flag: true,
        level: Level::Critical,
        label: "héllo wörld".to_string(),
        missing: None,
        stamp: NaiveDate::from_ymd_opt(2023, 11, 5)
            .unwrap()
            .and_hms_micro_opt(17, 4, 33, 250_000)
            .unwrap(),
        utc: NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc(),
        span: TimeDelta::hours(-26) + TimeDelta::milliseconds(15),
        id: Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap(),
        blob: Bytes::from_static(&[0, 1, 2, 253, 254, 255]),
        color: Rgb(0x12, 0xab, 0xff),
        maybe: Some(0),
    }
}

fn ann() -> Person {
    Person {
        name: Some("Ann".to_string()),
        tags: vec!["a".to_string(), "b".to_string()],
        scores: BTreeMap::from([(1, 10), (2, 20)]),
    }
}

#[test]
fn test_scalar_round_trip() {
    let original = sample();
    let bytes = encode(&original, CodecKind::Binary).unwrap();
    let decoded: Sample = decode(&bytes).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_default_scalars_round_trip() {
    let original = Sample::default();
    let bytes = encode(&original, CodecKind::Binary).unwrap();
    assert_eq!(decode::<Sample>(&bytes).unwrap(), original);
}

#[test]
fn test_empty_string_and_null_stay_distinct() {
    let mut with_empty = Person::default();
    with_empty.name = Some(String::new());
    let bytes = encode(&with_empty, CodecKind::Binary).unwrap();
    assert_eq!(decode::<Person>(&bytes).unwrap().name, Some(String::new()));

    let without = Person::default();
    let bytes = encode(&without, CodecKind::Binary).unwrap();
    assert_eq!(decode::<Person>(&bytes).unwrap().name, None);
}

#[test]
fn test_person_scenario() {
    let bytes = encode(&ann(), CodecKind::Binary).unwrap();
    assert_eq!(&bytes[..2], b"S2");

    let decoded: Person = decode(&bytes).unwrap();
    assert_eq!(decoded.name.as_deref(), Some("Ann"));
    assert_eq!(decoded.tags, vec!["a", "b"]);
    assert_eq!(decoded.scores, BTreeMap::from([(1, 10), (2, 20)]));
}

#[test]
fn test_nested_objects_lists_and_maps() {
    let mut bob = ann();
    bob.name = Some("Bob".to_string());
    bob.scores.clear();

    let team = Team {
        lead: ann(),
        deputy: None,
        members: vec![ann(), bob.clone(), Person::default()],
        by_login: HashMap::from([("ann".to_string(), ann()), ("bob".to_string(), bob)]),
        revision: 99,
    };

    let bytes = encode(&team, CodecKind::Binary).unwrap();
    let decoded: Team = decode(&bytes).unwrap();

    assert_eq!(decoded.lead, team.lead);
    assert_eq!(decoded.deputy, None);
    assert_eq!(decoded.members, team.members);
    assert_eq!(decoded.by_login, team.by_login);
    // Transient fields come back at their declared default
    assert_eq!(decoded.revision, 1);
}

#[test]
fn test_collection_roots() {
    let people = vec![ann(), Person::default()];
    let bytes = encode(&people, CodecKind::Binary).unwrap();
    assert_eq!(decode::<Vec<Person>>(&bytes).unwrap(), people);

    let empty: Vec<i64> = Vec::new();
    let bytes = encode(&empty, CodecKind::Binary).unwrap();
    assert!(decode::<Vec<i64>>(&bytes).unwrap().is_empty());

    let lookup: HashMap<i64, Option<String>> =
        HashMap::from([(1, Some("one".to_string())), (2, None)]);
    let bytes = encode(&lookup, CodecKind::Binary).unwrap();
    assert_eq!(decode::<HashMap<i64, Option<String>>>(&bytes).unwrap(), lookup);
}

#[test]
fn test_nested_generic_collections() {
    let grid: Vec<Vec<i32>> = vec![vec![1, 2], vec![], vec![3]];
    let bytes = encode(&grid, CodecKind::Binary).unwrap();
    assert_eq!(decode::<Vec<Vec<i32>>>(&bytes).unwrap(), grid);

    let index: BTreeMap<String, Vec<Uuid>> =
        BTreeMap::from([("k".to_string(), vec![Uuid::nil(), Uuid::from_u128(0xdead_beef_0000_0001)])]);
    let bytes = encode(&index, CodecKind::Binary).unwrap();
    assert_eq!(decode::<BTreeMap<String, Vec<Uuid>>>(&bytes).unwrap(), index);
}

#[test]
fn test_wrong_root_type_is_resolution_error() {
    let bytes = encode(&ann(), CodecKind::Binary).unwrap();
    let err = decode::<Team>(&bytes).unwrap_err();
    match err {
        CodecError::TypeResolution { type_name, .. } => assert_eq!(type_name, "Demo.Person"),
        other => panic!("unexpected error {other:?}"),
    }

    let err = decode::<Vec<Person>>(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::TypeResolution { .. }));
}

#[test]
fn test_decode_any_through_registry() {
    let codec = BinaryGraphCodec::new();
    assert!(!codec.resolver().is_registered(&identity_of::<Person>()));
    codec.register::<Person>().register::<Team>();
    codec.register::<Person>();
    assert_eq!(codec.resolver().registered_count(), 2);
    assert!(codec.resolver().is_registered(&identity_of::<Team>()));

    let bytes = codec.encode(&ann()).unwrap();
    let decoded = codec.decode_any(&bytes).unwrap();
    assert_eq!(decoded.identity, identity_of::<Person>());
    assert!(decoded.is::<Person>());
    assert!(!decoded.is::<Team>());
    assert_eq!(decoded.downcast::<Person>().unwrap(), ann());
}

#[test]
fn test_decode_any_unregistered_type() {
    let codec = BinaryGraphCodec::new();
    let bytes = codec.encode(&ann()).unwrap();
    let err = codec.decode_any(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::TypeResolution { .. }));
    assert!(err.is_incompatible_data());
}

#[test]
fn test_downcast_mismatch_returns_object() {
    let codec = BinaryGraphCodec::new();
    codec.register::<Person>();
    let decoded = codec.decode_any(&codec.encode(&ann()).unwrap()).unwrap();
    let back = decoded.downcast::<Team>().unwrap_err();
    assert_eq!(back.downcast_ref::<Person>(), Some(&ann()));
}

#[test]
fn test_enum_out_of_range_discriminant() {
    define_persistent! {
        pub struct RawLevel as "Tests.Holder" {
            persist: { level: i64 }
        }
    }
    define_persistent! {
        pub struct TypedLevel as "Tests.Holder" {
            persist: { level: Level }
        }
    }

    let bytes = encode(&RawLevel { level: 2 }, CodecKind::Binary).unwrap();
    assert_eq!(decode::<TypedLevel>(&bytes).unwrap().level, Level::High);

    let bytes = encode(&RawLevel { level: 5 }, CodecKind::Binary).unwrap();
    let err = decode::<TypedLevel>(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::ValueConversion { ref property, .. } if property == "level"));
}

#[test]
fn test_one_codec_shared_across_threads() {
    let codec = BinaryGraphCodec::new();
    let reference = codec.encode(&ann()).unwrap();

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let codec = &codec;
            let reference = &reference;
            scope.spawn(move || {
                for round in 0..50 {
                    let mut person = ann();
                    person.scores.insert(100 + worker, round);
                    let bytes = codec.encode(&person).unwrap();
                    assert_eq!(codec.decode::<Person>(&bytes).unwrap(), person);
                    assert_eq!(codec.encode(&ann()).unwrap(), *reference);
                }
            });
        }
    });
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let mut bytes = encode(&ann(), CodecKind::Binary).unwrap();
    bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(decode::<Person>(&bytes).unwrap(), ann());
}
