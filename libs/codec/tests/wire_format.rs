//! Wire format properties for pathway headers and transaction records

use pathway_codec::{
    decode_checkpoint_map, CheckpointRegistry, CodecError, EncodedPathway, TransactionInfo,
    PATHWAY_WIRE_SIZE, UNASSIGNED_CHECKPOINT_ID,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

proptest! {
    #[test]
    fn prop_valid_pathways_survive_header_round_trip(
        hash in 1u64..,
        start in 0u64..u64::MAX / 2,
        delta in 0u64..u64::MAX / 2,
    ) {
        let original = EncodedPathway::new(hash, start, start + delta);
        let header = original.to_header_value();
        prop_assert_eq!(EncodedPathway::from_header_value(&header)?, original);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..64)) {
        match EncodedPathway::from_bytes(&data) {
            Ok(decoded) => {
                prop_assert_eq!(data.len(), PATHWAY_WIRE_SIZE);
                prop_assert!(decoded.hash != 0);
                let reencoded = decoded.to_bytes();
                prop_assert_eq!(reencoded.as_slice(), data.as_slice());
            }
            Err(_) => {}
        }
    }

    #[test]
    fn prop_transaction_decode_matches_input(
        id in "[a-zA-Z0-9-]{0,300}",
        ts in any::<u64>(),
    ) {
        let registry = CheckpointRegistry::new();
        let bytes = TransactionInfo::new(id.clone(), ts, "checkout").to_bytes_with(&registry);
        let decoded = TransactionInfo::decode(&bytes)?;
        prop_assert_eq!(decoded.checkpoint_id, 1);
        prop_assert_eq!(decoded.timestamp_ns, ts);
        let expected_len = id.len().min(255);
        prop_assert_eq!(decoded.transaction_id.as_str(), &id[..expected_len]);
    }
}

#[test]
fn test_whitespace_around_header_is_ignored() {
    let pathway = EncodedPathway::new(42, 10, 20);
    let header = format!("  {}\n", pathway.to_header_value());
    assert_eq!(EncodedPathway::from_header_value(&header).unwrap(), pathway);
}

#[test]
fn test_wrong_length_base64_is_rejected() {
    // 18 bytes of valid base64 payload
    let header = "AAAAAAAAAAAAAAAAAAAAAAAA";
    assert!(matches!(
        EncodedPathway::from_header_value(header),
        Err(CodecError::MessageTooSmall { got: 18, .. })
    ));
}

#[test]
fn test_concurrent_first_sightings_share_one_id() {
    let registry = Arc::new(CheckpointRegistry::new());
    let names: Vec<String> = (0..16).map(|i| format!("stage-{i}")).collect();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let names = names.clone();
            thread::spawn(move || {
                names
                    .iter()
                    .map(|name| (name.clone(), registry.checkpoint_id(name)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<(String, u8)>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    for pairs in &results[1..] {
        assert_eq!(pairs, &results[0]);
    }

    let ids: HashSet<u8> = results[0].iter().map(|(_, id)| *id).collect();
    assert_eq!(ids.len(), names.len());
    assert!(!ids.contains(&UNASSIGNED_CHECKPOINT_ID));

    let map = decode_checkpoint_map(&registry.snapshot()).unwrap();
    assert_eq!(map.len(), names.len());
    for (id, name) in map {
        let expected = results[0].iter().find(|(n, _)| *n == name).unwrap().1;
        assert_eq!(id, expected);
    }
}
