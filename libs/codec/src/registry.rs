//! # Checkpoint Registry - Process-wide Name → Id Cache
//!
//! ## Purpose
//!
//! Transaction records name the checkpoint they passed through. Sending the
//! full name on every record is wasteful, so each distinct name is assigned a
//! one-byte id the first time it is seen and the `(id, name)` pair is appended
//! to a shared byte map. A reporter ships the map alongside the records and the
//! backend resolves ids without the names ever being repeated.
//!
//! ## Concurrency
//!
//! - Insert-if-absent on a sharded concurrent map: racing first sightings of
//!   the same name resolve to exactly one id
//! - The byte map is copy-on-append behind an `Arc`; snapshots handed to
//!   readers are never mutated afterwards
//! - Ids are never reused or reassigned for the lifetime of the process
//!
//! ## Map Layout
//!
//! ```text
//! [id:u8][name_len:u8][name bytes] [id:u8][name_len:u8][name bytes] ...
//! ```

use crate::constants::{MAX_CHECKPOINT_NAME_LEN, UNASSIGNED_CHECKPOINT_ID};
use crate::error::{CodecError, CodecResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static GLOBAL_REGISTRY: Lazy<CheckpointRegistry> = Lazy::new(CheckpointRegistry::new);

/// Append-only checkpoint name → id cache
#[derive(Debug)]
pub struct CheckpointRegistry {
    ids: DashMap<String, u8>,
    next_id: AtomicU16,
    encoded: RwLock<Arc<Vec<u8>>>,
    exhausted_logged: AtomicBool,
}

impl CheckpointRegistry {
    pub fn new() -> Self {
        Self {
            ids: DashMap::new(),
            next_id: AtomicU16::new(1),
            encoded: RwLock::new(Arc::new(Vec::new())),
            exhausted_logged: AtomicBool::new(false),
        }
    }

    /// The registry shared by every caller in this process
    pub fn global() -> &'static CheckpointRegistry {
        &GLOBAL_REGISTRY
    }

    /// Resolve `name` to its id, assigning the next id on first sight
    ///
    /// Returns [`UNASSIGNED_CHECKPOINT_ID`] once all 255 ids are taken.
    pub fn checkpoint_id(&self, name: &str) -> u8 {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }

        match self.ids.entry(name.to_owned()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let Some(id) = self.allocate_id() else {
                    if !self.exhausted_logged.swap(true, Ordering::Relaxed) {
                        warn!(
                            "Checkpoint id space exhausted, '{}' and later names are unassigned",
                            name
                        );
                    }
                    return UNASSIGNED_CHECKPOINT_ID;
                };
                self.append(id, name);
                entry.insert(id);
                debug!("Assigned checkpoint id {} to '{}'", id, name);
                id
            }
        }
    }

    /// Number of names holding an id
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Immutable snapshot of the id → name map bytes
    pub fn snapshot(&self) -> Arc<Vec<u8>> {
        Arc::clone(&*self.encoded.read())
    }

    fn allocate_id(&self) -> Option<u8> {
        self.next_id
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next <= u16::from(u8::MAX)).then_some(next + 1)
            })
            .ok()
            .map(|id| id as u8)
    }

    fn append(&self, id: u8, name: &str) {
        let name_bytes = truncate_utf8(name, MAX_CHECKPOINT_NAME_LEN);
        let mut guard = self.encoded.write();
        let buf = Arc::make_mut(&mut *guard);
        buf.reserve(2 + name_bytes.len());
        buf.push(id);
        buf.push(name_bytes.len() as u8);
        buf.extend_from_slice(name_bytes);
    }
}

impl Default for CheckpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a map snapshot back into `(id, name)` pairs
pub fn decode_checkpoint_map(data: &[u8]) -> CodecResult<Vec<(u8, String)>> {
    let mut entries = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        if data.len() - offset < 2 {
            return Err(CodecError::message_too_small(
                offset + 2,
                data.len(),
                "checkpoint map entry header",
            ));
        }
        let id = data[offset];
        let len = data[offset + 1] as usize;
        let start = offset + 2;
        let end = start + len;
        if end > data.len() {
            return Err(CodecError::message_too_small(
                end,
                data.len(),
                "checkpoint map entry name",
            ));
        }
        entries.push((id, String::from_utf8_lossy(&data[start..end]).into_owned()));
        offset = end;
    }
    Ok(entries)
}

/// Longest prefix of `value` that fits in `max` bytes without splitting a char
pub(crate) fn truncate_utf8(value: &str, max: usize) -> &[u8] {
    if value.len() <= max {
        return value.as_bytes();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value.as_bytes()[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_id() {
        let registry = CheckpointRegistry::new();
        let first = registry.checkpoint_id("ingest");
        let second = registry.checkpoint_id("ingest");
        assert_eq!(first, 1);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert_eq!(*registry.snapshot(), vec![1, 6, b'i', b'n', b'g', b'e', b's', b't']);
    }

    #[test]
    fn test_sequential_ids() {
        let registry = CheckpointRegistry::new();
        assert_eq!(registry.checkpoint_id("a"), 1);
        assert_eq!(registry.checkpoint_id("b"), 2);
        assert_eq!(registry.checkpoint_id("a"), 1);
        assert_eq!(registry.checkpoint_id("c"), 3);
        assert_eq!(
            decode_checkpoint_map(&registry.snapshot()).unwrap(),
            vec![(1, "a".to_string()), (2, "b".to_string()), (3, "c".to_string())]
        );
    }

    #[test]
    fn test_snapshot_is_not_mutated_by_later_appends() {
        let registry = CheckpointRegistry::new();
        registry.checkpoint_id("first");
        let before = registry.snapshot();
        registry.checkpoint_id("second");
        assert_eq!(decode_checkpoint_map(&before).unwrap().len(), 1);
        assert_eq!(decode_checkpoint_map(&registry.snapshot()).unwrap().len(), 2);
    }

    #[test]
    fn test_id_space_exhaustion_returns_unassigned() {
        let registry = CheckpointRegistry::new();
        for i in 0..255 {
            assert_ne!(registry.checkpoint_id(&format!("cp-{i}")), UNASSIGNED_CHECKPOINT_ID);
        }
        assert_eq!(registry.checkpoint_id("cp-0"), 1);
        assert_eq!(registry.checkpoint_id("one-too-many"), UNASSIGNED_CHECKPOINT_ID);
        assert_eq!(registry.checkpoint_id("one-too-many"), UNASSIGNED_CHECKPOINT_ID);
        assert_eq!(registry.len(), 255);
    }

    #[test]
    fn test_long_names_are_truncated_in_map() {
        let registry = CheckpointRegistry::new();
        let name = "x".repeat(300);
        registry.checkpoint_id(&name);
        let entries = decode_checkpoint_map(&registry.snapshot()).unwrap();
        assert_eq!(entries[0].1.len(), MAX_CHECKPOINT_NAME_LEN);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_utf8("héllo", 2), b"h");
        assert_eq!(truncate_utf8("abc", 10), b"abc");
    }

    #[test]
    fn test_decode_rejects_truncated_map() {
        assert!(decode_checkpoint_map(&[1]).is_err());
        assert!(decode_checkpoint_map(&[1, 5, b'a']).is_err());
        assert!(decode_checkpoint_map(&[]).unwrap().is_empty());
    }
}
