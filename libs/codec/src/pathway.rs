//! # Pathway Wire Codec
//!
//! ## Purpose
//!
//! Serializes the minimal state a downstream hop needs to continue a pathway:
//! the running hash, when the pathway started and when the last edge ended.
//! The binary form is a fixed 24-byte little-endian layout, carried in
//! transport headers as standard base64 under [`PATHWAY_HEADER_KEY`].
//!
//! ## Wire Layout
//!
//! ```text
//! offset  0        8                 16                24
//!         ┌────────┬─────────────────┬─────────────────┐
//!         │ hash   │ pathway_start_ns│ edge_start_ns   │
//!         │ u64 LE │ u64 LE          │ u64 LE          │
//!         └────────┴─────────────────┴─────────────────┘
//! ```
//!
//! Decoding is strict: wrong length, zero hash or an edge start before the
//! pathway start are rejected so callers can fall back to a fresh context.
//!
//! [`PATHWAY_HEADER_KEY`]: crate::constants::PATHWAY_HEADER_KEY

use crate::constants::PATHWAY_WIRE_SIZE;
use crate::error::{CodecError, CodecResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

/// Decoded pathway state as it crosses a process boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodedPathway {
    pub hash: u64,
    pub pathway_start_ns: u64,
    pub edge_start_ns: u64,
}

impl EncodedPathway {
    pub fn new(hash: u64, pathway_start_ns: u64, edge_start_ns: u64) -> Self {
        Self {
            hash,
            pathway_start_ns,
            edge_start_ns,
        }
    }

    /// Fixed 24-byte binary form
    pub fn to_bytes(&self) -> [u8; PATHWAY_WIRE_SIZE] {
        let mut buf = [0u8; PATHWAY_WIRE_SIZE];
        LittleEndian::write_u64(&mut buf[0..8], self.hash);
        LittleEndian::write_u64(&mut buf[8..16], self.pathway_start_ns);
        LittleEndian::write_u64(&mut buf[16..24], self.edge_start_ns);
        buf
    }

    /// Parse and validate the 24-byte binary form
    pub fn from_bytes(data: &[u8]) -> CodecResult<Self> {
        if data.len() < PATHWAY_WIRE_SIZE {
            return Err(CodecError::message_too_small(
                PATHWAY_WIRE_SIZE,
                data.len(),
                "pathway context",
            ));
        }
        if data.len() > PATHWAY_WIRE_SIZE {
            return Err(CodecError::unexpected_length(
                PATHWAY_WIRE_SIZE,
                data.len(),
                "pathway context",
            ));
        }

        let decoded = Self {
            hash: LittleEndian::read_u64(&data[0..8]),
            pathway_start_ns: LittleEndian::read_u64(&data[8..16]),
            edge_start_ns: LittleEndian::read_u64(&data[16..24]),
        };

        // Timestamps come from other hosts' clocks and are taken as-is.
        if decoded.hash == 0 {
            return Err(CodecError::ZeroHash);
        }

        Ok(decoded)
    }

    /// Transport-safe header value
    pub fn to_header_value(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Inverse of [`EncodedPathway::to_header_value`]
    pub fn from_header_value(value: &str) -> CodecResult<Self> {
        let trimmed = value.trim();
        let bytes = STANDARD
            .decode(trimmed)
            .map_err(|e| CodecError::invalid_base64(e, trimmed.len()))?;
        Self::from_bytes(&bytes)
    }
}
