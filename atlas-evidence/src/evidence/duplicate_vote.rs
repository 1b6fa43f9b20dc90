use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};

use atlas_common::{
    address::Address,
    crypto::{hash, HashBytes},
    utils::time,
    Vote,
};

use crate::{
    errors::{EvidenceError, WireError},
    proto,
};

/// Evidence that a validator signed two conflicting votes for the same
/// height and round.
///
/// `vote_a` always carries the smaller block id key. Values built with
/// [`DuplicateVoteEvidence::new`] are ordered; values received from peers
/// are checked by [`DuplicateVoteEvidence::validate_basic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateVoteEvidence {
    pub vote_a: Vote,
    pub vote_b: Vote,
    pub timestamp: DateTime<Utc>,
}

impl DuplicateVoteEvidence {
    /// Orders the two votes by block id key. Returns `None` when either
    /// vote is missing: no evidence can be formed from a single vote.
    pub fn new(vote1: Option<Vote>, vote2: Option<Vote>, timestamp: DateTime<Utc>) -> Option<Self> {
        let (vote1, vote2) = match (vote1, vote2) {
            (Some(v1), Some(v2)) => (v1, v2),
            _ => return None,
        };

        let (vote_a, vote_b) = if vote1.block_id.key() < vote2.block_id.key() {
            (vote1, vote2)
        } else {
            (vote2, vote1)
        };

        Some(DuplicateVoteEvidence {
            vote_a,
            vote_b,
            timestamp,
        })
    }

    /// Height of the conflicting votes.
    pub fn height(&self) -> i64 {
        self.vote_a.height
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The equivocating validator.
    pub fn addresses(&self) -> Vec<Address> {
        vec![self.vote_a.validator_address]
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    pub fn hash(&self) -> HashBytes {
        hash::sum(&self.bytes())
    }

    /// Checks both votes and their canonical order. Never reorders.
    pub fn validate_basic(&self) -> Result<(), EvidenceError> {
        self.vote_a
            .validate_basic()
            .map_err(EvidenceError::InvalidVoteA)?;
        self.vote_b
            .validate_basic()
            .map_err(EvidenceError::InvalidVoteB)?;

        if self.vote_a.block_id.key() >= self.vote_b.block_id.key() {
            return Err(EvidenceError::InvalidVoteOrder);
        }

        Ok(())
    }

    pub fn to_proto(&self) -> proto::DuplicateVoteEvidence {
        proto::DuplicateVoteEvidence {
            vote_a: Some(self.vote_a.to_proto()),
            vote_b: Some(self.vote_b.to_proto()),
            timestamp: Some(time::to_proto(&self.timestamp)),
        }
    }
}

/// Decodes and validates. Misordered votes are rejected, not swapped.
impl TryFrom<proto::DuplicateVoteEvidence> for DuplicateVoteEvidence {
    type Error = WireError;

    fn try_from(pb: proto::DuplicateVoteEvidence) -> Result<Self, Self::Error> {
        let (vote_a, vote_b) = match (pb.vote_a, pb.vote_b) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(EvidenceError::MissingVote.into()),
        };

        let evidence = DuplicateVoteEvidence {
            vote_a: Vote::try_from(vote_a)?,
            vote_b: Vote::try_from(vote_b)?,
            timestamp: time::from_proto(pb.timestamp, "DuplicateVoteEvidence.Timestamp")?,
        };
        evidence.validate_basic()?;

        Ok(evidence)
    }
}

impl fmt::Display for DuplicateVoteEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DuplicateVoteEvidence{{VoteA: {}, VoteB: {}}}", self.vote_a, self.vote_b)
    }
}
