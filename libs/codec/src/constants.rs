//! # Wire Constants
//!
//! ## Purpose
//!
//! Values shared by every process that propagates pathway context. They define
//! the on-the-wire contract and must stay stable across releases; changing one
//! splits pathways between hosts running different versions.
//!
//! ## Architecture Role
//!
//! ```text
//! Transport adapter → [PATHWAY_HEADER_KEY] → base64(24-byte context)
//! Reporter          → checkpoint map bytes → [id, len, name]*
//! ```

/// Header / message-attribute key carrying the encoded pathway context
pub const PATHWAY_HEADER_KEY: &str = "dd-pathway-ctx-base64";

/// Encoded pathway context: hash, pathway start, edge start (u64 each)
pub const PATHWAY_WIRE_SIZE: usize = 24;

/// Longest transaction id (in bytes) written to the wire; longer ids are truncated
pub const MAX_TRANSACTION_ID_LEN: usize = u8::MAX as usize;

/// Longest checkpoint name (in bytes) stored in the shared checkpoint map
pub const MAX_CHECKPOINT_NAME_LEN: usize = u8::MAX as usize;

/// Checkpoint id reserved for names that could not be assigned an id
pub const UNASSIGNED_CHECKPOINT_ID: u8 = 0;

/// Fixed part of an encoded transaction: checkpoint id, timestamp, id length
pub const TRANSACTION_HEADER_SIZE: usize = 1 + 8 + 1;
