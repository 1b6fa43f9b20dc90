//! Consensus value types shared across the Atlas workspace.
//!
//! Votes, block ids, headers, commits, validator sets and light blocks,
//! their wire messages, and the hashing primitives they are committed with.

pub mod address;
pub mod crypto;
pub mod env;
pub mod error;
pub mod proto;
pub mod utils;

pub use address::{Address, PublicKey};
pub use env::consensus::{
    BlockId, Commit, CommitSig, Header, LightBlock, PartSetHeader, SignedHeader, SignedMsgType,
    Validator, ValidatorSet, Version, Vote, BLOCK_PROTOCOL,
};
pub use error::{ProtoError, ValidationError};
