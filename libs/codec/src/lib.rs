//! # Pathway Codec - Wire Formats for Pathway Propagation
//!
//! ## Purpose
//!
//! The "rules" layer between pure data-streams types and whatever transport
//! carries them:
//! - Encoding and strict decoding of the 24-byte pathway context
//! - Base64 header values under a single well-known key
//! - Compact transaction records with one-byte checkpoint ids
//! - The process-wide checkpoint name → id registry
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/monitoring → transport headers
//!     ↑           ↓              ↓
//! Tag sets    Wire rules     Pathway contexts
//! Hashes      Validation     Inbox / reporter
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Pathway state machines (belongs in libs/monitoring)
//! - Tag hashing (belongs in libs/types)
//! - Any transport or header-carrier abstraction

pub mod constants;
pub mod error;
pub mod pathway;
pub mod registry;
pub mod transaction;

pub use constants::*;
pub use error::{CodecError, CodecResult};
pub use pathway::EncodedPathway;
pub use registry::{decode_checkpoint_map, CheckpointRegistry};
pub use transaction::{DecodedTransaction, TransactionInfo};
