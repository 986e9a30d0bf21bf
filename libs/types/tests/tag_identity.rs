//! # Tag Identity Tests
//!
//! Pins the hash values every host must agree on and checks the tier rules:
//! - Golden FNV-1 values for common edge shapes
//! - Identity / aggregation / informational monotonicity
//! - Builder call order never changes identity

use pathway_types::{base_hash, hash, pathway_hash, Direction, TagKey, TagSet};
use proptest::prelude::*;

fn produce_orders() -> TagSet {
    TagSet::builder("kafka")
        .direction(Direction::Outbound)
        .topic("orders")
        .build()
}

#[test]
fn test_services_seed_distinct_node_hashes() {
    let tags = produce_orders();
    let checkout = tags.hashes_from(base_hash("checkout", None));
    let billing = tags.hashes_from(base_hash("billing", None));

    assert_eq!(checkout.hash, 17_377_352_726_628_477_463);
    assert_eq!(billing.hash, 10_711_815_804_036_660_156);
    assert_ne!(checkout.aggregation_hash, billing.aggregation_hash);
    assert_eq!(pathway_hash(0, checkout.hash), 6_754_879_138_402_117_615);
}

#[test]
fn test_golden_hashes_are_stable() {
    let tags = produce_orders();
    assert_eq!(tags.hash(), 12_695_476_755_090_437_360);
    assert_eq!(tags.aggregation_hash(), 12_695_476_755_090_437_360);
    assert_eq!(tags.complete_hash(), 12_695_476_755_090_437_360);

    let consume = TagSet::with_group("kafka", Some(Direction::Inbound), Some("orders"), Some("billing"));
    assert_eq!(consume.hash(), 4_740_650_259_547_717_217);
    assert_eq!(consume.complete_hash(), 12_238_106_070_158_552_097);
}

#[test]
fn test_golden_pathway_chain() {
    let h1 = hash::pathway_hash(0, produce_orders().hash());
    assert_eq!(h1, 17_964_965_713_354_120_205);

    let consume = TagSet::with_group("kafka", Some(Direction::Inbound), Some("orders"), Some("billing"));
    assert_eq!(hash::pathway_hash(h1, consume.hash()), 12_827_225_933_000_091_368);
}

#[test]
fn test_informational_tag_changes_only_complete_hash() {
    let base = produce_orders();
    let with_partition = TagSet::builder("kafka")
        .direction(Direction::Outbound)
        .topic("orders")
        .partition("3")
        .build();

    assert_eq!(with_partition.hash(), base.hash());
    assert_eq!(with_partition.aggregation_hash(), base.aggregation_hash());
    assert_ne!(with_partition.complete_hash(), base.complete_hash());
    assert_eq!(with_partition.complete_hash(), 10_661_222_621_459_491_767);
    assert_ne!(with_partition, base);
}

#[test]
fn test_aggregation_tag_keeps_identity_hash() {
    let base = produce_orders();
    let with_dataset = TagSet::builder("kafka")
        .direction(Direction::Outbound)
        .topic("orders")
        .dataset_namespace("warehouse")
        .build();

    assert_eq!(with_dataset.hash(), base.hash());
    assert_ne!(with_dataset.aggregation_hash(), base.aggregation_hash());
    assert_ne!(with_dataset.complete_hash(), base.complete_hash());
}

#[test]
fn test_identity_tag_changes_every_hash() {
    let base = produce_orders();
    let other_topic = TagSet::builder("kafka")
        .direction(Direction::Outbound)
        .topic("payments")
        .build();

    assert_ne!(other_topic.hash(), base.hash());
    assert_ne!(other_topic.aggregation_hash(), base.aggregation_hash());
    assert_ne!(other_topic.complete_hash(), base.complete_hash());
}

#[test]
fn test_non_null_size_counts_every_tier() {
    let tags = TagSet::builder("kafka")
        .direction(Direction::Inbound)
        .topic("orders")
        .manual(true)
        .consumer_group("billing")
        .kafka_cluster_id("c1")
        .build();
    assert_eq!(tags.non_null_size(), 6);
    assert_eq!(tags.value(TagKey::Manual), Some("true"));
}

#[test]
fn test_tag_set_serializes_rendered_tags() {
    let json = serde_json::to_value(produce_orders()).unwrap();
    assert_eq!(
        json["tags"],
        serde_json::json!(["direction:out", "topic:orders", "type:kafka"])
    );
    assert_eq!(json["hash"], 12_695_476_755_090_437_360u64);
}

proptest! {
    #[test]
    fn prop_builder_order_does_not_matter(
        topic in "[a-z]{1,12}",
        group in "[a-z]{1,12}",
        partition in 0u32..64,
        reverse in any::<bool>(),
    ) {
        let forward = TagSet::builder("kafka")
            .direction(Direction::Inbound)
            .topic(topic.clone())
            .group(group.clone())
            .partition(partition.to_string())
            .build();

        let shuffled = if reverse {
            TagSet::builder("kafka")
                .partition(partition.to_string())
                .group(group)
                .topic(topic)
                .direction(Direction::Inbound)
                .build()
        } else {
            TagSet::builder("kafka")
                .group(group)
                .direction(Direction::Inbound)
                .partition(partition.to_string())
                .topic(topic)
                .build()
        };

        prop_assert_eq!(forward.complete_hash(), shuffled.complete_hash());
        prop_assert_eq!(forward.hash(), shuffled.hash());
        prop_assert_eq!(forward, shuffled);
    }

    #[test]
    fn prop_hashing_is_deterministic(topic in "\\PC{0,32}") {
        let a = TagSet::with_topic("sqs", Some(Direction::Outbound), Some(topic.as_str()));
        let b = TagSet::with_topic("sqs", Some(Direction::Outbound), Some(topic.as_str()));
        prop_assert_eq!(a.hash(), b.hash());
        prop_assert_eq!(a.aggregation_hash(), b.aggregation_hash());
        prop_assert_eq!(a.complete_hash(), b.complete_hash());
    }
}
