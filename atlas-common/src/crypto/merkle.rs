use rs_merkle::{Hasher, MerkleTree};

use super::hash::{self, HashBytes};

/// Prefix of every leaf pre-image.
const LEAF_PREFIX: u8 = 0x00;

/// Prefix of every inner node pre-image. Distinct from [`LEAF_PREFIX`] so a
/// leaf can never be confused with an inner node of the tree.
const INNER_PREFIX: u8 = 0x01;

/// SHA-256 tree hasher with domain-separated inner nodes.
///
/// An unpaired node is promoted to the next level unchanged.
#[derive(Clone)]
pub struct TreeHasher;

impl Hasher for TreeHasher {
    type Hash = HashBytes;

    fn hash(data: &[u8]) -> HashBytes {
        hash::sum(data)
    }

    fn concat_and_hash(left: &HashBytes, right: Option<&HashBytes>) -> HashBytes {
        match right {
            Some(right) => inner_hash(left, right),
            None => *left,
        }
    }
}

/// Root of a tree without leaves: the SHA-256 of the empty string.
pub fn empty_root() -> HashBytes {
    hash::sum(&[])
}

/// Hashes a single leaf (`SHA-256(0x00 || item)`).
pub fn leaf_hash(item: &[u8]) -> HashBytes {
    hash::sum_parts(&[[LEAF_PREFIX].as_slice(), item])
}

/// Hashes two children (`SHA-256(0x01 || left || right)`).
pub fn inner_hash(left: &HashBytes, right: &HashBytes) -> HashBytes {
    hash::sum_parts(&[[INNER_PREFIX].as_slice(), left.as_slice(), right.as_slice()])
}

/// Calculates the Merkle Root of an ordered list of byte strings.
///
/// The order of `items` is significant. An empty list yields [`empty_root`].
pub fn hash_from_byte_slices<T: AsRef<[u8]>>(items: &[T]) -> HashBytes {
    if items.is_empty() {
        return empty_root();
    }

    let leaves: Vec<HashBytes> = items.iter().map(|i| leaf_hash(i.as_ref())).collect();
    let tree = MerkleTree::<TreeHasher>::from_leaves(&leaves);

    tree.root().unwrap_or_else(empty_root)
}
