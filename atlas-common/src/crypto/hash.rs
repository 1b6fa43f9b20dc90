use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Size in bytes of every hash used by the consensus types.
pub const HASH_SIZE: usize = 32;

/// Size in bytes of a truncated hash (validator addresses).
pub const TRUNCATED_SIZE: usize = 20;

/// A SHA-256 digest.
pub type HashBytes = [u8; HASH_SIZE];

/// Computes the SHA-256 digest of the given data.
pub fn sum(data: &[u8]) -> HashBytes {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the SHA-256 digest of several byte strings, fed in order.
pub fn sum_parts(parts: &[&[u8]]) -> HashBytes {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// First [`TRUNCATED_SIZE`] bytes of the SHA-256 digest.
pub fn sum_truncated(data: &[u8]) -> [u8; TRUNCATED_SIZE] {
    let full = sum(data);
    let mut out = [0u8; TRUNCATED_SIZE];
    out.copy_from_slice(&full[..TRUNCATED_SIZE]);
    out
}

/// A hash field is valid when it is either unset (empty) or exactly [`HASH_SIZE`] bytes.
pub fn validate_hash(field: &'static str, h: &[u8]) -> Result<(), ValidationError> {
    if !h.is_empty() && h.len() != HASH_SIZE {
        return Err(ValidationError::WrongHashLength {
            field,
            expected: HASH_SIZE,
            got: h.len(),
        });
    }
    Ok(())
}
