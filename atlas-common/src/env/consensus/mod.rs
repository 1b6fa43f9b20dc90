pub mod light_block;
pub mod types;
pub mod validator;
pub mod vote;

pub use light_block::{Commit, CommitSig, Header, LightBlock, SignedHeader, Version, BLOCK_PROTOCOL};
pub use types::{BlockId, PartSetHeader, SignedMsgType};
pub use validator::{Validator, ValidatorSet};
pub use vote::Vote;
