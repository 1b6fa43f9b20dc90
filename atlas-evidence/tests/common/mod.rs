#![allow(dead_code)]

use atlas_common::{crypto::hash::HASH_SIZE, BlockId, LightBlock, PartSetHeader, Vote};
use atlas_evidence::mock::{make_mock_vote, new_mock_light_block, MockPV};
use chrono::{DateTime, TimeZone, Utc};

pub const CHAIN_ID: &str = "atlas-itest";

pub fn t0() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 500).unwrap()
}

/// Block id whose hash starts with `first`, so ordering is predictable.
pub fn block_id(first: u8) -> BlockId {
    let mut hash = vec![0x5a; HASH_SIZE];
    hash[0] = first;
    BlockId {
        hash,
        part_set_header: PartSetHeader {
            total: 2,
            hash: vec![0x33; HASH_SIZE],
        },
    }
}

/// A precommit from `pv` at `t0`, signed for [`CHAIN_ID`].
pub fn signed_vote(pv: &MockPV, height: i64, block_id: BlockId) -> Vote {
    let mut vote = make_mock_vote(height, 0, 0, pv.address(), block_id, t0());
    pv.sign_vote(CHAIN_ID, &mut vote);
    vote
}

pub fn light_block(height: i64, signers: &[MockPV]) -> LightBlock {
    new_mock_light_block(CHAIN_ID, height, t0(), signers)
}
