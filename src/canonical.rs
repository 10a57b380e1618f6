//! Canonical serialization for deterministic fingerprints.
//!
//! Fingerprints let the editor tell whether the live graph differs from
//! the last saved one without keeping a second deep copy around.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: node and edge order is part of the document
//! - No HashMap allowed: Use BTreeMap for maps in hashed data

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

use crate::types::ProcessGraph;

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = to_canonical_bytes(value);
    xxh64(&bytes, 0)
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

/// Fingerprint of a process graph's full content.
///
/// Two graphs share a fingerprint iff they serialize identically, which
/// includes node order, positions, labels and edge order.
pub fn graph_fingerprint(graph: &ProcessGraph) -> String {
    canonical_hash_hex(graph)
}
