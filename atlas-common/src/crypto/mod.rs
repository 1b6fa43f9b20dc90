pub mod hash;
pub mod merkle;

pub use hash::{HashBytes, HASH_SIZE};
