//! # Transaction Info - Compact Transaction/Checkpoint Correlation
//!
//! ## Purpose
//!
//! Correlates a business transaction id with the checkpoint it passed through
//! at a point in time. The checkpoint name is replaced on the wire by its
//! registry id, and the transaction id is cut to fit a one-byte length prefix.
//! Truncation happens only in the encoding: the in-memory record keeps the
//! full id.
//!
//! ## Wire Layout
//!
//! ```text
//! ┌───────────────┬───────────────────┬───────────┬──────────────────────┐
//! │ checkpoint id │ timestamp_ns      │ id length │ transaction id bytes │
//! │ u8            │ u64 big-endian    │ u8        │ ≤ 255 bytes          │
//! └───────────────┴───────────────────┴───────────┴──────────────────────┘
//! ```

use crate::constants::{MAX_TRANSACTION_ID_LEN, TRANSACTION_HEADER_SIZE};
use crate::error::{CodecError, CodecResult};
use crate::registry::{truncate_utf8, CheckpointRegistry};
use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;

/// One observed (transaction, checkpoint) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionInfo {
    transaction_id: String,
    timestamp_ns: u64,
    checkpoint: String,
}

/// Fields recovered from an encoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub checkpoint_id: u8,
    pub timestamp_ns: u64,
    pub transaction_id: String,
}

impl TransactionInfo {
    pub fn new(
        transaction_id: impl Into<String>,
        timestamp_ns: u64,
        checkpoint: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            timestamp_ns,
            checkpoint: checkpoint.into(),
        }
    }

    /// Full, untruncated id
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_ns
    }

    pub fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    /// Encode using the process-wide checkpoint registry
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with(CheckpointRegistry::global())
    }

    /// Encode resolving the checkpoint name through `registry`
    pub fn to_bytes_with(&self, registry: &CheckpointRegistry) -> Vec<u8> {
        let checkpoint_id = registry.checkpoint_id(&self.checkpoint);
        let id_bytes = truncate_utf8(&self.transaction_id, MAX_TRANSACTION_ID_LEN);

        let mut buf = vec![0u8; TRANSACTION_HEADER_SIZE + id_bytes.len()];
        buf[0] = checkpoint_id;
        BigEndian::write_u64(&mut buf[1..9], self.timestamp_ns);
        buf[9] = id_bytes.len() as u8;
        buf[TRANSACTION_HEADER_SIZE..].copy_from_slice(id_bytes);
        buf
    }

    /// Parse one encoded record; trailing bytes are rejected
    pub fn decode(data: &[u8]) -> CodecResult<DecodedTransaction> {
        if data.len() < TRANSACTION_HEADER_SIZE {
            return Err(CodecError::message_too_small(
                TRANSACTION_HEADER_SIZE,
                data.len(),
                "transaction header",
            ));
        }

        let id_len = data[9] as usize;
        let expected = TRANSACTION_HEADER_SIZE + id_len;
        if data.len() < expected {
            return Err(CodecError::message_too_small(
                expected,
                data.len(),
                "transaction id",
            ));
        }
        if data.len() > expected {
            return Err(CodecError::unexpected_length(
                expected,
                data.len(),
                "transaction record",
            ));
        }

        Ok(DecodedTransaction {
            checkpoint_id: data[0],
            timestamp_ns: BigEndian::read_u64(&data[1..9]),
            transaction_id: String::from_utf8_lossy(&data[TRANSACTION_HEADER_SIZE..]).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let registry = CheckpointRegistry::new();
        let info = TransactionInfo::new("tx-1", 0x0102_0304_0506_0708, "ingest");
        let bytes = info.to_bytes_with(&registry);

        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..9], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(bytes[9], 4);
        assert_eq!(&bytes[10..], b"tx-1");
    }

    #[test]
    fn test_long_id_truncated_only_on_wire() {
        let registry = CheckpointRegistry::new();
        let long_id = "t".repeat(400);
        let info = TransactionInfo::new(long_id.clone(), 5, "publish");
        let bytes = info.to_bytes_with(&registry);

        assert_eq!(bytes.len(), TRANSACTION_HEADER_SIZE + MAX_TRANSACTION_ID_LEN);
        assert_eq!(info.transaction_id(), long_id);

        let decoded = TransactionInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.transaction_id.len(), MAX_TRANSACTION_ID_LEN);
        assert_eq!(decoded.timestamp_ns, 5);
    }

    #[test]
    fn test_checkpoint_ids_shared_across_records() {
        let registry = CheckpointRegistry::new();
        let a = TransactionInfo::new("a", 1, "ingest").to_bytes_with(&registry);
        let b = TransactionInfo::new("b", 2, "publish").to_bytes_with(&registry);
        let c = TransactionInfo::new("c", 3, "ingest").to_bytes_with(&registry);
        assert_eq!(a[0], c[0]);
        assert_ne!(a[0], b[0]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        assert!(TransactionInfo::decode(&[1, 2, 3]).is_err());

        let registry = CheckpointRegistry::new();
        let mut bytes = TransactionInfo::new("abc", 1, "x").to_bytes_with(&registry);
        bytes.pop();
        assert!(matches!(
            TransactionInfo::decode(&bytes),
            Err(CodecError::MessageTooSmall { .. })
        ));
        bytes.extend_from_slice(b"cz");
        assert!(matches!(
            TransactionInfo::decode(&bytes),
            Err(CodecError::UnexpectedLength { .. })
        ));
    }
}
