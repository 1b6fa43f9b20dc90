use std::fmt;

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::{
    crypto::hash::{validate_hash, HASH_SIZE},
    error::{ProtoError, ValidationError},
    proto,
};

/// Header of the set of parts a block was split into for gossiping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartSetHeader {
    pub total: u32,
    #[serde(with = "hex::serde")]
    pub hash: Vec<u8>,
}

impl PartSetHeader {
    pub fn is_zero(&self) -> bool {
        self.total == 0 && self.hash.is_empty()
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_hash("PartSetHeader.Hash", &self.hash)
    }

    pub fn to_proto(&self) -> proto::PartSetHeader {
        proto::PartSetHeader {
            total: self.total,
            hash: self.hash.clone(),
        }
    }
}

impl From<proto::PartSetHeader> for PartSetHeader {
    fn from(pb: proto::PartSetHeader) -> Self {
        PartSetHeader {
            total: pb.total,
            hash: pb.hash,
        }
    }
}

/// Identifies a block by its hash and the header of its part set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    #[serde(with = "hex::serde")]
    pub hash: Vec<u8>,
    pub part_set_header: PartSetHeader,
}

impl BlockId {
    /// Deterministic key used to order and compare block ids:
    /// the block hash followed by the encoded part set header.
    ///
    /// Keys are compared lexicographically byte by byte.
    pub fn key(&self) -> Vec<u8> {
        let psh = self.part_set_header.to_proto().encode_to_vec();
        let mut key = Vec::with_capacity(self.hash.len() + psh.len());
        key.extend_from_slice(&self.hash);
        key.extend_from_slice(&psh);
        key
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        validate_hash("Hash", &self.hash)?;
        self.part_set_header
            .validate_basic()
            .map_err(|e| e.context("wrong PartSetHeader"))
    }

    /// True for the id of a nil block.
    pub fn is_zero(&self) -> bool {
        self.hash.is_empty() && self.part_set_header.is_zero()
    }

    /// True when every component is set.
    pub fn is_complete(&self) -> bool {
        self.hash.len() == HASH_SIZE
            && self.part_set_header.total > 0
            && self.part_set_header.hash.len() == HASH_SIZE
    }

    pub fn to_proto(&self) -> proto::BlockId {
        proto::BlockId {
            hash: self.hash.clone(),
            part_set_header: Some(self.part_set_header.to_proto()),
        }
    }
}

impl From<proto::BlockId> for BlockId {
    fn from(pb: proto::BlockId) -> Self {
        BlockId {
            hash: pb.hash,
            part_set_header: pb.part_set_header.map(PartSetHeader::from).unwrap_or_default(),
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            hex::encode_upper(&self.hash),
            self.part_set_header.total,
            hex::encode_upper(&self.part_set_header.hash)
        )
    }
}

/// Type of a signed consensus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignedMsgType {
    Unknown,
    Prevote,
    Precommit,
    Proposal,
}

impl SignedMsgType {
    /// Only prevotes and precommits are votes.
    pub fn is_vote_type(&self) -> bool {
        matches!(self, SignedMsgType::Prevote | SignedMsgType::Precommit)
    }
}

impl From<SignedMsgType> for proto::SignedMsgType {
    fn from(t: SignedMsgType) -> Self {
        match t {
            SignedMsgType::Unknown => proto::SignedMsgType::Unknown,
            SignedMsgType::Prevote => proto::SignedMsgType::Prevote,
            SignedMsgType::Precommit => proto::SignedMsgType::Precommit,
            SignedMsgType::Proposal => proto::SignedMsgType::Proposal,
        }
    }
}

impl From<SignedMsgType> for i32 {
    fn from(t: SignedMsgType) -> Self {
        proto::SignedMsgType::from(t) as i32
    }
}

impl TryFrom<i32> for SignedMsgType {
    type Error = ProtoError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match proto::SignedMsgType::try_from(value) {
            Ok(proto::SignedMsgType::Unknown) => Ok(SignedMsgType::Unknown),
            Ok(proto::SignedMsgType::Prevote) => Ok(SignedMsgType::Prevote),
            Ok(proto::SignedMsgType::Precommit) => Ok(SignedMsgType::Precommit),
            Ok(proto::SignedMsgType::Proposal) => Ok(SignedMsgType::Proposal),
            Err(_) => Err(ProtoError::UnknownEnumValue {
                field: "SignedMsgType",
                value,
            }),
        }
    }
}

impl fmt::Display for SignedMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignedMsgType::Unknown => "Unknown",
            SignedMsgType::Prevote => "Prevote",
            SignedMsgType::Precommit => "Precommit",
            SignedMsgType::Proposal => "Proposal",
        };
        write!(f, "{}", s)
    }
}
