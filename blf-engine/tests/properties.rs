//! Property-based tests for the container and record codecs.
//!
//! - Compress then decompress returns the input for every level
//! - Variable-length records survive encode/decode with arbitrary payloads
//! - Unknown object types re-encode to the exact input bytes

use proptest::prelude::*;

use blf_engine::container::Container;
use blf_engine::records::{
    self, AppText, BaseHeader, EthernetFrameEx, ObjectHeader, SystemVariable, UnknownObject,
};
use blf_engine::{ObjectType, Record};

/// Object types without a registered layout
fn unknown_tag_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(10), Just(26), Just(52), Just(108), Just(117), 132u32..10_000]
}

fn header_strategy() -> impl Strategy<Value = ObjectHeader> {
    prop_oneof![
        any::<u64>().prop_map(ObjectHeader::with_time_ns),
        (any::<u32>(), any::<u8>(), any::<u64>(), any::<u64>()).prop_map(
            |(object_flags, time_stamp_status, object_time_stamp, original_time_stamp)| {
                ObjectHeader::V2 {
                    object_flags,
                    time_stamp_status,
                    reserved: 0,
                    object_version: 0,
                    object_time_stamp,
                    original_time_stamp,
                }
            }
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_container_round_trip(
        data in prop::collection::vec(any::<u8>(), 0..8192),
        level in 0u32..=9,
    ) {
        let mut container = Container::new(0, 8192);
        container.append(&data);
        container.finalize();

        let block = container.compress(level).unwrap();
        prop_assert_eq!(block.uncompressed_size as usize, data.len());
        prop_assert_eq!(block.decompress().unwrap(), data);
    }

    #[test]
    fn prop_ethernet_frame_round_trip(
        header in header_strategy(),
        channel in any::<u16>(),
        frame_data in prop::collection::vec(any::<u8>(), 0..2048),
        trailing in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let record = Record::EthernetFrameEx(EthernetFrameEx {
            header,
            channel,
            frame_data,
            trailing,
            ..Default::default()
        });
        let bytes = record.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), record.calculate_size());
        prop_assert_eq!(records::decode(&bytes).unwrap(), record);
    }

    #[test]
    fn prop_string_records_round_trip(
        text in prop::collection::vec(any::<u8>(), 0..512),
        name in prop::collection::vec(any::<u8>(), 0..64),
        data in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let app_text = Record::AppText(AppText { text, ..Default::default() });
        let bytes = app_text.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), app_text.calculate_size());
        prop_assert_eq!(records::decode(&bytes).unwrap(), app_text);

        let sysvar = Record::SystemVariable(SystemVariable { name, data, ..Default::default() });
        let bytes = sysvar.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), sysvar.calculate_size());
        prop_assert_eq!(records::decode(&bytes).unwrap(), sysvar);
    }

    #[test]
    fn prop_unknown_tags_pass_through(
        tag in unknown_tag_strategy(),
        payload in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let header = ObjectHeader::default();
        let base = BaseHeader {
            header_size: header.header_size(),
            header_version: header.version(),
            object_size: header.header_size() as u32 + payload.len() as u32,
            object_type: tag,
        };
        let mut bytes = Vec::new();
        base.write_to(&mut bytes).unwrap();
        header.write_to(&mut bytes).unwrap();
        bytes.extend_from_slice(&payload);

        let decoded = records::decode(&bytes).unwrap();
        prop_assert!(matches!(decoded, Record::Unknown(_)));
        prop_assert_eq!(decoded.object_type(), tag);
        prop_assert_eq!(decoded.to_bytes().unwrap(), bytes.clone());
        prop_assert_eq!(UnknownObject::from_bytes(bytes).unwrap().object_type(), tag);
    }

    #[test]
    fn prop_zeroed_records_have_consistent_size(
        index in 0usize..ObjectType::ALL.len(),
    ) {
        let record = Record::new(ObjectType::ALL[index]);
        let bytes = record.to_bytes().unwrap();
        prop_assert_eq!(bytes.len(), record.calculate_size());
        prop_assert_eq!(records::decode(&bytes).unwrap(), record);
    }
}
