use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};

use super::types::{BlockId, SignedMsgType};
use crate::{
    address::{Address, AddressError, PublicKey, MAX_SIGNATURE_SIZE},
    error::{ProtoError, ValidationError},
    proto,
    utils::time,
};

/// A signed prevote or precommit from a validator for a block at a
/// given height and round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "type")]
    pub msg_type: SignedMsgType,
    pub height: i64,
    pub round: i32,
    pub block_id: BlockId,
    pub timestamp: DateTime<Utc>,
    pub validator_address: Address,
    pub validator_index: i32,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl Vote {
    /// Performs stateless validation checks. Does not verify the signature.
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if !self.msg_type.is_vote_type() {
            return Err(ValidationError::InvalidVoteType(self.msg_type.into()));
        }

        if self.height <= 0 {
            return Err(ValidationError::NonPositiveHeight {
                field: "Height",
                got: self.height,
            });
        }

        if self.round < 0 {
            return Err(ValidationError::Negative {
                field: "Round",
                got: self.round.into(),
            });
        }

        self.block_id
            .validate_basic()
            .map_err(|e| e.context("wrong BlockID"))?;

        // A vote is either for nil or for a fully identified block.
        if !self.block_id.is_zero() && !self.block_id.is_complete() {
            return Err(ValidationError::IncompleteBlockId);
        }

        if self.validator_index < 0 {
            return Err(ValidationError::Negative {
                field: "ValidatorIndex",
                got: self.validator_index.into(),
            });
        }

        if self.signature.is_empty() {
            return Err(ValidationError::MissingSignature);
        }

        if self.signature.len() > MAX_SIGNATURE_SIZE {
            return Err(ValidationError::SignatureTooBig {
                max: MAX_SIGNATURE_SIZE,
                got: self.signature.len(),
            });
        }

        Ok(())
    }

    /// Bytes covered by the vote signature for the given chain.
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        let canonical = proto::CanonicalVote {
            r#type: self.msg_type.into(),
            height: self.height,
            round: self.round.into(),
            block_id: if self.block_id.is_zero() {
                None
            } else {
                Some(self.block_id.to_proto())
            },
            timestamp: Some(time::to_proto(&self.timestamp)),
            chain_id: chain_id.to_string(),
        };
        canonical.encode_length_delimited_to_vec()
    }

    /// Verifies the signature against `pub_key`, which must also own
    /// the vote's validator address.
    pub fn verify(&self, chain_id: &str, pub_key: &PublicKey) -> Result<(), AddressError> {
        if pub_key.address() != self.validator_address {
            return Err(AddressError::InvalidPublicKey(format!(
                "key address {} does not match validator address {}",
                pub_key.address(),
                self.validator_address
            )));
        }
        pub_key.verify(&self.sign_bytes(chain_id), &self.signature)
    }

    pub fn to_proto(&self) -> proto::Vote {
        proto::Vote {
            r#type: self.msg_type.into(),
            height: self.height,
            round: self.round,
            block_id: Some(self.block_id.to_proto()),
            timestamp: Some(time::to_proto(&self.timestamp)),
            validator_address: self.validator_address.to_vec(),
            validator_index: self.validator_index,
            signature: self.signature.clone(),
        }
    }
}

impl TryFrom<proto::Vote> for Vote {
    type Error = ProtoError;

    fn try_from(pb: proto::Vote) -> Result<Self, Self::Error> {
        let validator_address = Address::try_from(pb.validator_address.as_slice()).map_err(|_| {
            ProtoError::InvalidLength {
                field: "Vote.ValidatorAddress",
                expected: crate::address::ADDRESS_SIZE,
                got: pb.validator_address.len(),
            }
        })?;

        Ok(Vote {
            msg_type: SignedMsgType::try_from(pb.r#type)?,
            height: pb.height,
            round: pb.round,
            block_id: pb.block_id.map(BlockId::from).unwrap_or_default(),
            timestamp: time::from_proto(pb.timestamp, "Vote.Timestamp")?,
            validator_address,
            validator_index: pb.validator_index,
            signature: pb.signature,
        })
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sig_prefix: String = hex::encode_upper(&self.signature).chars().take(12).collect();
        write!(
            f,
            "Vote{{{}:{} {}/{:02}/{}({}) {} {} @ {}}}",
            self.validator_index,
            self.validator_address,
            self.height,
            self.round,
            i32::from(self.msg_type),
            self.msg_type,
            self.block_id,
            sig_prefix,
            self.timestamp.to_rfc3339(),
        )
    }
}
