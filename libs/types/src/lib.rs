//! # Pathway Types
//!
//! Pure data for data-streams pathway tracking: the hash engine, layered tag
//! sets, the stats point emitted at each checkpoint and the auxiliary reports
//! that share its emission path.
//!
//! ## Design Philosophy
//!
//! - **Coordinator-free identity**: every hash is a deterministic FNV-1 chain,
//!   so independent hosts agree on pathway identities without talking
//! - **Frozen values**: tag sets hash once at construction and never change
//! - **No I/O**: nothing here allocates threads, sockets or clocks
//!
//! ## Quick Start
//!
//! ```rust
//! use pathway_types::{hash, Direction, TagSet};
//!
//! let produce = TagSet::with_topic("kafka", Some(Direction::Outbound), Some("orders"));
//! let first_edge = hash::pathway_hash(0, produce.hash());
//! assert_ne!(first_edge, 0);
//! ```

pub mod hash;
pub mod reports;
pub mod stats_point;
pub mod tags;

pub use hash::{base_hash, continue_hash, pathway_hash, FNV_OFFSET_BASIS};
pub use reports::{Backlog, ConfigReport, SchemaOperation, SchemaUsage};
pub use stats_point::StatsPoint;
pub use tags::{Direction, TagHashes, TagKey, TagSet, TagSetBuilder, TagTier};
