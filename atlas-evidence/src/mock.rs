//! Evidence generators for tests. Unstable: not part of the public contract.
//!
//! Votes are for round 0 and validator index 0 unless stated otherwise.

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};
use rand::{rngs::OsRng, RngCore};

use atlas_common::{
    address::Address,
    crypto::hash::HASH_SIZE,
    BlockId, Commit, CommitSig, Header, LightBlock, PartSetHeader, PublicKey, SignedHeader,
    SignedMsgType, Validator, ValidatorSet, Version, Vote, BLOCK_PROTOCOL,
};

use crate::evidence::{AttackType, DuplicateVoteEvidence, LightClientAttackEvidence};

/// A private validator holding its key in memory.
#[derive(Debug, Clone)]
pub struct MockPV {
    key: SigningKey,
}

impl MockPV {
    pub fn new() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from(self.key.verifying_key())
    }

    pub fn address(&self) -> Address {
        self.pub_key().address()
    }

    pub fn sign_vote(&self, chain_id: &str, vote: &mut Vote) {
        let sig = self.key.sign(&vote.sign_bytes(chain_id));
        vote.signature = sig.to_bytes().to_vec();
    }
}

impl Default for MockPV {
    fn default() -> Self {
        Self::new()
    }
}

pub fn rand_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    buf
}

pub fn rand_block_id() -> BlockId {
    BlockId {
        hash: rand_bytes(HASH_SIZE),
        part_set_header: PartSetHeader {
            total: 1,
            hash: rand_bytes(HASH_SIZE),
        },
    }
}

/// An unsigned precommit.
pub fn make_mock_vote(
    height: i64,
    round: i32,
    index: i32,
    addr: Address,
    block_id: BlockId,
    time: DateTime<Utc>,
) -> Vote {
    Vote {
        msg_type: SignedMsgType::Precommit,
        height,
        round,
        block_id,
        timestamp: time,
        validator_address: addr,
        validator_index: index,
        signature: Vec::new(),
    }
}

pub fn new_mock_duplicate_vote_evidence(
    height: i64,
    time: DateTime<Utc>,
    chain_id: &str,
) -> DuplicateVoteEvidence {
    new_mock_duplicate_vote_evidence_with_validator(height, time, &MockPV::new(), chain_id)
}

/// Two signed precommits from `pv` for random blocks at `height`.
pub fn new_mock_duplicate_vote_evidence_with_validator(
    height: i64,
    time: DateTime<Utc>,
    pv: &MockPV,
    chain_id: &str,
) -> DuplicateVoteEvidence {
    let mut vote_a = make_mock_vote(height, 0, 0, pv.address(), rand_block_id(), time);
    pv.sign_vote(chain_id, &mut vote_a);
    let mut vote_b = make_mock_vote(height, 0, 0, pv.address(), rand_block_id(), time);
    pv.sign_vote(chain_id, &mut vote_b);

    DuplicateVoteEvidence::new(Some(vote_a), Some(vote_b), time)
        .expect("both votes are present")
}

/// A light block at `height` committed by every validator in `pvs`.
pub fn new_mock_light_block(
    chain_id: &str,
    height: i64,
    time: DateTime<Utc>,
    pvs: &[MockPV],
) -> LightBlock {
    let validators: Vec<Validator> = pvs.iter().map(|pv| Validator::new(pv.pub_key(), 10)).collect();
    let validator_set = ValidatorSet::new(validators);
    let vals_hash = validator_set.hash().to_vec();

    let header = Header {
        version: Version {
            block: BLOCK_PROTOCOL,
            app: 1,
        },
        chain_id: chain_id.to_string(),
        height,
        time,
        last_block_id: rand_block_id(),
        last_commit_hash: rand_bytes(HASH_SIZE),
        data_hash: rand_bytes(HASH_SIZE),
        validators_hash: vals_hash.clone(),
        next_validators_hash: vals_hash,
        consensus_hash: rand_bytes(HASH_SIZE),
        app_hash: rand_bytes(HASH_SIZE),
        last_results_hash: rand_bytes(HASH_SIZE),
        evidence_hash: rand_bytes(HASH_SIZE),
        proposer_address: pvs.first().map(MockPV::address).unwrap_or_else(|| Address::new([0u8; 20])),
    };

    let block_id = BlockId {
        hash: header.hash(),
        part_set_header: PartSetHeader {
            total: 1,
            hash: rand_bytes(HASH_SIZE),
        },
    };

    let signatures = pvs
        .iter()
        .enumerate()
        .map(|(idx, pv)| {
            let mut vote = make_mock_vote(height, 0, idx as i32, pv.address(), block_id.clone(), time);
            pv.sign_vote(chain_id, &mut vote);
            CommitSig::ForBlock {
                validator_address: vote.validator_address,
                timestamp: vote.timestamp,
                signature: vote.signature,
            }
        })
        .collect();

    let commit = Commit {
        height,
        round: 0,
        block_id,
        signatures,
    };

    LightBlock {
        signed_header: SignedHeader { header, commit },
        validator_set,
    }
}

/// A lunatic attack: a conflicting block at `height`, signed by three
/// fresh validators, forking after `common_height`.
pub fn new_mock_light_client_attack_evidence(
    common_height: i64,
    height: i64,
    time: DateTime<Utc>,
    chain_id: &str,
) -> LightClientAttackEvidence {
    let pvs: Vec<MockPV> = (0..3).map(|_| MockPV::new()).collect();
    LightClientAttackEvidence {
        conflicting_block: new_mock_light_block(chain_id, height, time, &pvs),
        common_height,
        timestamp: time,
        attack_type: AttackType::Lunatic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_votes_verify() {
        let pv = MockPV::new();
        let ev = new_mock_duplicate_vote_evidence_with_validator(5, Utc::now(), &pv, "mock-chain");

        assert!(ev.vote_a.verify("mock-chain", &pv.pub_key()).is_ok());
        assert!(ev.vote_b.verify("mock-chain", &pv.pub_key()).is_ok());
        assert!(ev.validate_basic().is_ok());
    }

    #[test]
    fn test_mock_light_block_is_valid() {
        let pvs = vec![MockPV::new(), MockPV::new()];
        let lb = new_mock_light_block("mock-chain", 12, Utc::now(), &pvs);

        assert!(lb.validate_basic("mock-chain").is_ok());
        assert_eq!(lb.validator_set.len(), 2);
        assert_eq!(lb.signed_header.commit.signatures.len(), 2);
    }
}
