//! Property tests for header parsing and tick arithmetic

use objgraph_types::{
    datetime_to_ticks, strip_version_info, ticks_to_datetime, ticks_to_timespan,
    timespan_to_ticks, ScalarKind, TypeIdentity, MAX_TICKS,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_header_round_trip(
        full_name in "[A-Za-z][A-Za-z0-9_.:`\\[\\]]{0,40}",
        assembly in "[a-z][a-z0-9_-]{0,20}",
        version in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
    ) {
        let identity = TypeIdentity::new(
            &full_name,
            &assembly,
            &format!("{assembly}, Version={version}"),
        );
        let parsed = TypeIdentity::parse_header(&identity.header()).unwrap();
        prop_assert_eq!(parsed, identity);
    }

    #[test]
    fn prop_datetime_ticks_round_trip(ticks in 0..=MAX_TICKS) {
        let value = ticks_to_datetime(ticks).unwrap();
        prop_assert_eq!(datetime_to_ticks(value).unwrap(), ticks);
    }

    #[test]
    fn prop_timespan_ticks_round_trip(ticks in -(1i64 << 60)..(1i64 << 60)) {
        prop_assert_eq!(timespan_to_ticks(ticks_to_timespan(ticks)).unwrap(), ticks);
    }

    #[test]
    fn prop_out_of_range_ticks_rejected(ticks in prop_oneof![i64::MIN..0, (MAX_TICKS + 1)..=i64::MAX]) {
        prop_assert!(ticks_to_datetime(ticks).is_err());
    }
}

#[test]
fn test_version_info_stripped_from_generic_arguments() {
    let full = "Vec`1[[Demo.Person, demo, Version=1.2.3, Culture=neutral, PublicKeyToken=null]]";
    assert_eq!(strip_version_info(full), "Vec`1[[Demo.Person, demo]]");

    let identity = TypeIdentity::new(full, "alloc", "");
    assert_eq!(identity.normalized_name(), "Vec`1[[Demo.Person, demo]]");
    assert_eq!(identity.generic_definition(), Some("Vec`1"));
}

#[test]
fn test_scalar_kind_discriminants_are_stable() {
    assert_eq!(u8::from(ScalarKind::Int32), 1);
    assert_eq!(u8::from(ScalarKind::String), 11);
    assert_eq!(ScalarKind::try_from(9u8).unwrap(), ScalarKind::Guid);
    assert!(ScalarKind::try_from(0u8).is_err());
    assert!(ScalarKind::try_from(12u8).is_err());
}
