//! Canonical serialization for deterministic hashing.
//!
//! Serializes values to a canonical JSON byte form and digests them with
//! xxh64, so repeated exports of the same document can be compared by id.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: Struct fields serialize in declaration order
//! - Stable Vec order: Vectors serialize in index order
//! - No HashMap allowed: Use BTreeMap for maps in hashed data
//! - Floats are quantized by callers before hashing (see [`quantize`]);
//!   the manifest id hashes sprite centers and scales this way

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Quantization factor for float normalization.
const FLOAT_QUANTIZATION_FACTOR: f64 = 1_000_000.0;

/// Error type for canonical serialization.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    /// The value could not be serialized.
    #[error("Canonical serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize a value to canonical JSON bytes for hashing.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    Ok(serde_json::to_vec(value)?)
}

/// Compute canonical hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<u64, CanonicalError> {
    let bytes = to_canonical_bytes(value)?;
    Ok(xxh64(&bytes, 0))
}

/// Compute canonical hash and return as hex string.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    Ok(format!("{:016x}", canonical_hash(value)?))
}

/// Quantize a float to an i64 for deterministic hashing.
pub fn quantize(value: f64) -> i64 {
    (value * FLOAT_QUANTIZATION_FACTOR).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Placement {
        name: String,
        x: u32,
    }

    #[test]
    fn test_determinism() {
        let p = Placement {
            name: "Walk".to_string(),
            x: 42,
        };

        assert_eq!(canonical_hash(&p).unwrap(), canonical_hash(&p).unwrap());
        assert_eq!(canonical_hash_hex(&p).unwrap().len(), 16);
    }

    #[test]
    fn test_btreemap_order_is_insertion_independent() {
        let mut a = BTreeMap::new();
        a.insert("b", 2);
        a.insert("a", 1);
        let mut b = BTreeMap::new();
        b.insert("a", 1);
        b.insert("b", 2);

        assert_eq!(canonical_hash_hex(&a).unwrap(), canonical_hash_hex(&b).unwrap());
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(1.5), 1_500_000);
        assert_eq!(quantize(0.1 + 0.2), quantize(0.3));
    }
}
