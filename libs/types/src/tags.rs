//! # Tag Sets - Layered Edge Attributes
//!
//! ## Purpose
//!
//! A [`TagSet`] is the frozen description of one pathway edge type (for example
//! "kafka, outbound, topic `orders`"). Every tag belongs to exactly one
//! [`TagTier`], and the tier decides which of the three precomputed hashes the
//! tag feeds:
//!
//! | Tier            | Keys                                                              | Feeds                         |
//! |-----------------|-------------------------------------------------------------------|-------------------------------|
//! | `Identity`      | bus, direction, exchange, topic, type, subscription               | hash, aggregation, complete   |
//! | `Aggregation`   | ds.name, ds.namespace, manual_checkpoint                          | aggregation, complete         |
//! | `Informational` | group, consumer_group, has_routing_key, kafka_cluster_id, partition | complete                    |
//!
//! The traversal order is [`TagKey::ALL`]. Reordering it changes every hash
//! produced by every host, so it is part of the wire contract.
//!
//! ## Usage
//!
//! ```rust
//! use pathway_types::{Direction, TagSet};
//!
//! let tags = TagSet::builder("kafka")
//!     .direction(Direction::Outbound)
//!     .topic("orders")
//!     .partition("3")
//!     .build();
//!
//! assert_eq!(tags.value(pathway_types::TagKey::Topic), Some("orders"));
//! assert_eq!(tags.non_null_size(), 4);
//! ```

use crate::hash::{continue_hash, FNV_OFFSET_BASIS};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Role a tag plays in pathway identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagTier {
    /// Always hashed; decides the pathway node identity
    Identity = 0,
    /// Splits statistics buckets without changing the node identity
    Aggregation = 1,
    /// Carried for display only
    Informational = 2,
}

/// Every tag key the pathway system understands, in hashing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKey {
    Bus = 0,
    Direction = 1,
    Exchange = 2,
    Topic = 3,
    Type = 4,
    Subscription = 5,
    DatasetName = 6,
    DatasetNamespace = 7,
    Manual = 8,
    Group = 9,
    ConsumerGroup = 10,
    HasRoutingKey = 11,
    KafkaClusterId = 12,
    Partition = 13,
}

impl TagKey {
    /// Number of known keys
    pub const COUNT: usize = 14;

    /// Declaration order; grouped by tier, identity first
    pub const ALL: [TagKey; TagKey::COUNT] = [
        TagKey::Bus,
        TagKey::Direction,
        TagKey::Exchange,
        TagKey::Topic,
        TagKey::Type,
        TagKey::Subscription,
        TagKey::DatasetName,
        TagKey::DatasetNamespace,
        TagKey::Manual,
        TagKey::Group,
        TagKey::ConsumerGroup,
        TagKey::HasRoutingKey,
        TagKey::KafkaClusterId,
        TagKey::Partition,
    ];

    /// Key as rendered in `key:value` tags
    pub const fn name(self) -> &'static str {
        match self {
            TagKey::Bus => "bus",
            TagKey::Direction => "direction",
            TagKey::Exchange => "exchange",
            TagKey::Topic => "topic",
            TagKey::Type => "type",
            TagKey::Subscription => "subscription",
            TagKey::DatasetName => "ds.name",
            TagKey::DatasetNamespace => "ds.namespace",
            TagKey::Manual => "manual_checkpoint",
            TagKey::Group => "group",
            TagKey::ConsumerGroup => "consumer_group",
            TagKey::HasRoutingKey => "has_routing_key",
            TagKey::KafkaClusterId => "kafka_cluster_id",
            TagKey::Partition => "partition",
        }
    }

    pub const fn tier(self) -> TagTier {
        match self {
            TagKey::Bus
            | TagKey::Direction
            | TagKey::Exchange
            | TagKey::Topic
            | TagKey::Type
            | TagKey::Subscription => TagTier::Identity,
            TagKey::DatasetName | TagKey::DatasetNamespace | TagKey::Manual => {
                TagTier::Aggregation
            }
            TagKey::Group
            | TagKey::ConsumerGroup
            | TagKey::HasRoutingKey
            | TagKey::KafkaClusterId
            | TagKey::Partition => TagTier::Informational,
        }
    }

    /// Look a key up by its rendered name
    pub fn from_name(name: &str) -> Option<TagKey> {
        TagKey::ALL.into_iter().find(|key| key.name() == name)
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flow direction of an edge relative to the instrumented process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "in")]
    Inbound,
    #[serde(rename = "out")]
    Outbound,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }

    pub fn parse(value: &str) -> Option<Direction> {
        match value {
            "in" => Some(Direction::Inbound),
            "out" => Some(Direction::Outbound),
            _ => None,
        }
    }
}

/// Immutable, pre-hashed set of edge tags
///
/// Equality and `Hash` are defined by [`TagSet::complete_hash`] only.
#[derive(Clone)]
pub struct TagSet {
    /// Rendered `key:value` strings indexed by `TagKey as usize`
    rendered: [Option<Box<str>>; TagKey::COUNT],
    hash: u64,
    aggregation_hash: u64,
    complete_hash: u64,
    non_null_size: usize,
}

impl TagSet {
    /// Start building a tag set; `type` is the one mandatory tag
    pub fn builder(edge_type: impl Into<String>) -> TagSetBuilder {
        TagSetBuilder::new(edge_type)
    }

    /// `type` + optional direction + optional topic
    pub fn with_topic(
        edge_type: &str,
        direction: Option<Direction>,
        topic: Option<&str>,
    ) -> TagSet {
        TagSet::builder(edge_type)
            .maybe_direction(direction)
            .maybe(TagKey::Topic, topic)
            .build()
    }

    /// Topic edge with a consumer `group`
    pub fn with_group(
        edge_type: &str,
        direction: Option<Direction>,
        topic: Option<&str>,
        group: Option<&str>,
    ) -> TagSet {
        TagSet::builder(edge_type)
            .maybe_direction(direction)
            .maybe(TagKey::Topic, topic)
            .maybe(TagKey::Group, group)
            .build()
    }

    /// Partition-level edge, used by offset/backlog style signals
    pub fn with_partition(
        edge_type: &str,
        topic: &str,
        partition: &str,
        cluster_id: Option<&str>,
        consumer_group: Option<&str>,
    ) -> TagSet {
        TagSet::builder(edge_type)
            .topic(topic)
            .partition(partition)
            .maybe(TagKey::KafkaClusterId, cluster_id)
            .maybe(TagKey::ConsumerGroup, consumer_group)
            .build()
    }

    /// Exchange-routed edge; `manual_checkpoint:false` is always set
    pub fn with_exchange(
        edge_type: &str,
        direction: Direction,
        exchange: &str,
        has_routing_key: bool,
    ) -> TagSet {
        TagSet::builder(edge_type)
            .direction(direction)
            .exchange(exchange)
            .manual(false)
            .has_routing_key(has_routing_key)
            .build()
    }

    /// Event-bus edge (`type:bus`)
    pub fn with_bus(direction: Direction, bus: &str) -> TagSet {
        TagSet::builder("bus").direction(direction).bus(bus).build()
    }

    pub fn with_subscription(edge_type: &str, direction: Direction, subscription: &str) -> TagSet {
        TagSet::builder(edge_type)
            .direction(direction)
            .subscription(subscription)
            .build()
    }

    /// Dataset edge (object stores, tables)
    pub fn with_dataset(
        edge_type: &str,
        direction: Direction,
        topic: &str,
        dataset_name: &str,
        dataset_namespace: &str,
    ) -> TagSet {
        TagSet::builder(edge_type)
            .direction(direction)
            .topic(topic)
            .dataset_name(dataset_name)
            .dataset_namespace(dataset_namespace)
            .build()
    }

    /// Checkpoint created through the manual instrumentation API
    pub fn manual(edge_type: &str, direction: Direction, topic: &str) -> TagSet {
        TagSet::builder(edge_type)
            .direction(direction)
            .topic(topic)
            .manual(true)
            .build()
    }

    /// Chain over identity tags only
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Chain over identity + aggregation tags
    #[inline]
    pub fn aggregation_hash(&self) -> u64 {
        self.aggregation_hash
    }

    /// Chain over every tag; defines equality
    #[inline]
    pub fn complete_hash(&self) -> u64 {
        self.complete_hash
    }

    /// Number of tags present
    #[inline]
    pub fn non_null_size(&self) -> usize {
        self.non_null_size
    }

    /// Rendered `key:value` tag, if present
    pub fn tag(&self, key: TagKey) -> Option<&str> {
        self.rendered[key as usize].as_deref()
    }

    /// Value part of a tag, if present
    pub fn value(&self, key: TagKey) -> Option<&str> {
        self.tag(key).map(|tag| &tag[key.name().len() + 1..])
    }

    pub fn edge_type(&self) -> &str {
        self.value(TagKey::Type).unwrap_or_default()
    }

    pub fn direction(&self) -> Option<Direction> {
        self.value(TagKey::Direction).and_then(Direction::parse)
    }

    /// Present tags in hashing order
    pub fn iter(&self) -> impl Iterator<Item = (TagKey, &str)> + '_ {
        TagKey::ALL
            .into_iter()
            .filter_map(move |key| self.tag(key).map(|tag| (key, tag)))
    }

    /// True when every `key:value` in `expected` is present with that exact value
    ///
    /// Unknown keys or entries without a `:` never match.
    pub fn has_all_tags(&self, expected: &[&str]) -> bool {
        expected.iter().all(|entry| {
            let Some((name, _)) = entry.split_once(':') else {
                return false;
            };
            match TagKey::from_name(name) {
                Some(key) => self.tag(key) == Some(*entry),
                None => false,
            }
        })
    }

    /// The three tier hashes chained from `seed` instead of the offset basis
    ///
    /// Used when a process base hash or service-name override has to take part
    /// in every tier, as node hashes do.
    pub fn hashes_from(&self, seed: u64) -> TagHashes {
        Self::chain(&self.rendered, seed).0
    }

    fn from_rendered(rendered: [Option<Box<str>>; TagKey::COUNT]) -> TagSet {
        let (hashes, non_null_size) = Self::chain(&rendered, FNV_OFFSET_BASIS);
        TagSet {
            rendered,
            hash: hashes.hash,
            aggregation_hash: hashes.aggregation_hash,
            complete_hash: hashes.complete_hash,
            non_null_size,
        }
    }

    fn chain(rendered: &[Option<Box<str>>; TagKey::COUNT], seed: u64) -> (TagHashes, usize) {
        let mut running = seed;
        let mut tier_hash = [seed; 3];
        let mut non_null_size = 0;

        // ALL is grouped by tier, so after the loop each slot holds the chain
        // value at the end of its tier.
        for key in TagKey::ALL {
            if let Some(tag) = rendered[key as usize].as_deref() {
                running = continue_hash(running, tag);
                non_null_size += 1;
            }
            tier_hash[key.tier() as usize] = running;
        }

        let hashes = TagHashes {
            hash: tier_hash[TagTier::Identity as usize],
            aggregation_hash: tier_hash[TagTier::Aggregation as usize],
            complete_hash: tier_hash[TagTier::Informational as usize],
        };
        (hashes, non_null_size)
    }
}

/// Tier hashes of one tag set under a given seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHashes {
    pub hash: u64,
    pub aggregation_hash: u64,
    pub complete_hash: u64,
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.complete_hash == other.complete_hash
    }
}

impl Eq for TagSet {}

impl Hash for TagSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.complete_hash);
    }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagSet")
            .field("tags", &self.iter().map(|(_, tag)| tag).collect::<Vec<_>>())
            .field("hash", &self.hash)
            .field("aggregation_hash", &self.aggregation_hash)
            .field("complete_hash", &self.complete_hash)
            .finish()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, tag) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tags: Vec<&str> = self.iter().map(|(_, tag)| tag).collect();
        let mut state = serializer.serialize_struct("TagSet", 3)?;
        state.serialize_field("tags", &tags)?;
        state.serialize_field("hash", &self.hash)?;
        state.serialize_field("aggregation_hash", &self.aggregation_hash)?;
        state.end()
    }
}

/// Builder for [`TagSet`]; call order does not affect the result
#[derive(Debug, Clone)]
pub struct TagSetBuilder {
    values: [Option<String>; TagKey::COUNT],
}

impl TagSetBuilder {
    fn new(edge_type: impl Into<String>) -> Self {
        let mut builder = Self {
            values: Default::default(),
        };
        builder.values[TagKey::Type as usize] = Some(edge_type.into());
        builder
    }

    /// Set any tag by key; a later call for the same key wins
    pub fn set(mut self, key: TagKey, value: impl Into<String>) -> Self {
        self.values[key as usize] = Some(value.into());
        self
    }

    /// Set `key` only when `value` is `Some`
    pub fn maybe(self, key: TagKey, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn direction(self, direction: Direction) -> Self {
        self.set(TagKey::Direction, direction.as_str())
    }

    pub fn maybe_direction(self, direction: Option<Direction>) -> Self {
        match direction {
            Some(direction) => self.direction(direction),
            None => self,
        }
    }

    pub fn topic(self, topic: impl Into<String>) -> Self {
        self.set(TagKey::Topic, topic)
    }

    pub fn bus(self, bus: impl Into<String>) -> Self {
        self.set(TagKey::Bus, bus)
    }

    pub fn exchange(self, exchange: impl Into<String>) -> Self {
        self.set(TagKey::Exchange, exchange)
    }

    pub fn subscription(self, subscription: impl Into<String>) -> Self {
        self.set(TagKey::Subscription, subscription)
    }

    pub fn dataset_name(self, name: impl Into<String>) -> Self {
        self.set(TagKey::DatasetName, name)
    }

    pub fn dataset_namespace(self, namespace: impl Into<String>) -> Self {
        self.set(TagKey::DatasetNamespace, namespace)
    }

    pub fn manual(self, manual: bool) -> Self {
        self.set(TagKey::Manual, manual.to_string())
    }

    pub fn group(self, group: impl Into<String>) -> Self {
        self.set(TagKey::Group, group)
    }

    pub fn consumer_group(self, group: impl Into<String>) -> Self {
        self.set(TagKey::ConsumerGroup, group)
    }

    pub fn has_routing_key(self, has_routing_key: bool) -> Self {
        self.set(TagKey::HasRoutingKey, has_routing_key.to_string())
    }

    pub fn kafka_cluster_id(self, cluster_id: impl Into<String>) -> Self {
        self.set(TagKey::KafkaClusterId, cluster_id)
    }

    pub fn partition(self, partition: impl Into<String>) -> Self {
        self.set(TagKey::Partition, partition)
    }

    /// Render, hash and freeze; empty values count as absent
    pub fn build(self) -> TagSet {
        let mut rendered: [Option<Box<str>>; TagKey::COUNT] = Default::default();
        for (key, value) in TagKey::ALL.into_iter().zip(self.values) {
            if let Some(value) = value.filter(|value| !value.is_empty()) {
                rendered[key as usize] = Some(format!("{}:{}", key.name(), value).into_boxed_str());
            }
        }
        TagSet::from_rendered(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_grouped_by_tier() {
        let tiers: Vec<TagTier> = TagKey::ALL.iter().map(|key| key.tier()).collect();
        let mut sorted = tiers.clone();
        sorted.sort_by_key(|tier| *tier as u8);
        assert_eq!(tiers, sorted);
        for (index, key) in TagKey::ALL.iter().enumerate() {
            assert_eq!(*key as usize, index);
        }
    }

    #[test]
    fn test_hashes_from_offset_basis_match_precomputed() {
        let tags = TagSet::builder("kafka").topic("orders").group("billing").build();
        let hashes = tags.hashes_from(FNV_OFFSET_BASIS);
        assert_eq!(hashes.hash, tags.hash());
        assert_eq!(hashes.aggregation_hash, tags.aggregation_hash());
        assert_eq!(hashes.complete_hash, tags.complete_hash());
    }

    #[test]
    fn test_seed_reaches_every_tier() {
        let tags = TagSet::builder("kafka").topic("orders").group("billing").build();
        let seeded = tags.hashes_from(42);
        assert_ne!(seeded.hash, tags.hash());
        assert_ne!(seeded.aggregation_hash, tags.aggregation_hash());
        assert_ne!(seeded.complete_hash, tags.complete_hash());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let tags = TagSet::builder("kafka").topic("").group("").build();
        assert_eq!(tags, TagSet::builder("kafka").build());
        assert_eq!(tags.non_null_size(), 1);

        let untyped = TagSet::builder("").build();
        assert_eq!(untyped.edge_type(), "");
        assert_eq!(untyped.non_null_size(), 0);
    }

    #[test]
    fn test_from_name_round_trips() {
        for key in TagKey::ALL {
            assert_eq!(TagKey::from_name(key.name()), Some(key));
        }
        assert_eq!(TagKey::from_name("nope"), None);
    }

    #[test]
    fn test_value_strips_key_prefix() {
        let tags = TagSet::builder("kafka").dataset_name("users").build();
        assert_eq!(tags.tag(TagKey::DatasetName), Some("ds.name:users"));
        assert_eq!(tags.value(TagKey::DatasetName), Some("users"));
        assert_eq!(tags.edge_type(), "kafka");
        assert_eq!(tags.value(TagKey::Topic), None);
    }

    #[test]
    fn test_identity_only_set_has_equal_hashes() {
        let tags = TagSet::with_topic("kafka", Some(Direction::Outbound), Some("orders"));
        assert_eq!(tags.hash(), tags.aggregation_hash());
        assert_eq!(tags.aggregation_hash(), tags.complete_hash());
        assert_eq!(tags.non_null_size(), 3);
    }

    #[test]
    fn test_exchange_constructor_sets_manual_false() {
        let tags = TagSet::with_exchange("rabbitmq", Direction::Outbound, "ex", true);
        assert!(tags.has_all_tags(&[
            "manual_checkpoint:false",
            "has_routing_key:true",
            "exchange:ex",
            "direction:out",
        ]));
        assert!(!tags.has_all_tags(&["topic:ex"]));
        assert!(!tags.has_all_tags(&["unknown:1"]));
        assert!(!tags.has_all_tags(&["no-colon"]));
    }

    #[test]
    fn test_display_lists_tags_in_hash_order() {
        let tags = TagSet::builder("sqs")
            .partition("1")
            .topic("q")
            .direction(Direction::Inbound)
            .build();
        assert_eq!(tags.to_string(), "direction:in,topic:q,type:sqs,partition:1");
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("in"), Some(Direction::Inbound));
        assert_eq!(Direction::parse("out"), Some(Direction::Outbound));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
