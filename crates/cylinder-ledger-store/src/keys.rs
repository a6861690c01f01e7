//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in column families.

use cylinder_ledger_core::{CylinderKey, EventSeq, GasType};

/// Separator between the gas name and the cylinder code in index keys.
const SEPARATOR: u8 = 0x00;

/// Create an event key from a sequence id.
///
/// Big-endian encoding keeps the `events` column family in sequence order.
#[must_use]
pub fn event_key(seq: EventSeq) -> [u8; 8] {
    seq.to_bytes()
}

/// Decode a sequence id from an event key or a latest-index value.
///
/// Returns `None` if the slice is not exactly 8 bytes.
#[must_use]
pub fn decode_seq(bytes: &[u8]) -> Option<EventSeq> {
    let bytes: [u8; 8] = bytes.try_into().ok()?;
    Some(EventSeq::from_bytes(bytes))
}

/// Create a latest-index key for a cylinder.
///
/// Format: `gas name || 0x00 || cylinder code`
#[must_use]
pub fn cylinder_key(cylinder: &CylinderKey) -> Vec<u8> {
    let mut key = gas_prefix(&cylinder.gas);
    key.extend_from_slice(cylinder.code.as_str().as_bytes());
    key
}

/// Create a prefix for iterating all cylinders of one gas.
#[must_use]
pub fn gas_prefix(gas: &GasType) -> Vec<u8> {
    let mut key = Vec::with_capacity(gas.as_str().len() + 16);
    key.extend_from_slice(gas.as_str().as_bytes());
    key.push(SEPARATOR);
    key
}
