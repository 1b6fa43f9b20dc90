//! light_block.rs
//!
//! Block headers, commits and the light block a light client verifies:
//! a signed header together with the validator set that signed it.

use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};

use super::{types::BlockId, validator::ValidatorSet};
use crate::{
    address::{Address, MAX_SIGNATURE_SIZE},
    crypto::{hash::validate_hash, merkle},
    error::{ProtoError, ValidationError},
    proto,
    utils::time,
};

/// Version of the block protocol the header encodes.
pub const BLOCK_PROTOCOL: u64 = 11;

/// Maximum length of a chain identifier.
pub const MAX_CHAIN_ID_LEN: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub block: u64,
    pub app: u64,
}

impl Version {
    pub fn to_proto(&self) -> proto::Consensus {
        proto::Consensus {
            block: self.block,
            app: self.app,
        }
    }
}

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: Version,
    pub chain_id: String,
    pub height: i64,
    pub time: DateTime<Utc>,
    pub last_block_id: BlockId,
    #[serde(with = "hex::serde")]
    pub last_commit_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub data_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub validators_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub next_validators_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub consensus_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub app_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub last_results_hash: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub evidence_hash: Vec<u8>,
    pub proposer_address: Address,
}

impl Header {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.version.block != BLOCK_PROTOCOL {
            return Err(ValidationError::WrongBlockVersion {
                expected: BLOCK_PROTOCOL,
                got: self.version.block,
            });
        }

        if self.chain_id.len() > MAX_CHAIN_ID_LEN {
            return Err(ValidationError::ChainIdTooLong {
                max: MAX_CHAIN_ID_LEN,
                got: self.chain_id.len(),
            });
        }

        if self.height <= 0 {
            return Err(ValidationError::NonPositiveHeight {
                field: "Header.Height",
                got: self.height,
            });
        }

        self.last_block_id
            .validate_basic()
            .map_err(|e| e.context("wrong LastBlockID"))?;

        validate_hash("LastCommitHash", &self.last_commit_hash)?;
        validate_hash("DataHash", &self.data_hash)?;
        validate_hash("EvidenceHash", &self.evidence_hash)?;
        validate_hash("ValidatorsHash", &self.validators_hash)?;
        validate_hash("NextValidatorsHash", &self.next_validators_hash)?;
        validate_hash("ConsensusHash", &self.consensus_hash)?;
        validate_hash("LastResultsHash", &self.last_results_hash)?;
        // app hash is arbitrary-length, set by the application

        Ok(())
    }

    /// Merkle root over the encoded header fields.
    ///
    /// Empty when the validators hash is unset: such a header cannot be
    /// committed and has no identity.
    pub fn hash(&self) -> Vec<u8> {
        if self.validators_hash.is_empty() {
            return Vec::new();
        }

        let fields: Vec<Vec<u8>> = vec![
            self.version.to_proto().encode_to_vec(),
            self.chain_id.as_bytes().to_vec(),
            self.height.to_be_bytes().to_vec(),
            time::to_proto(&self.time).encode_to_vec(),
            self.last_block_id.to_proto().encode_to_vec(),
            self.last_commit_hash.clone(),
            self.data_hash.clone(),
            self.validators_hash.clone(),
            self.next_validators_hash.clone(),
            self.consensus_hash.clone(),
            self.app_hash.clone(),
            self.last_results_hash.clone(),
            self.evidence_hash.clone(),
            self.proposer_address.to_vec(),
        ];

        merkle::hash_from_byte_slices(&fields).to_vec()
    }

    pub fn to_proto(&self) -> proto::Header {
        proto::Header {
            version: Some(self.version.to_proto()),
            chain_id: self.chain_id.clone(),
            height: self.height,
            time: Some(time::to_proto(&self.time)),
            last_block_id: Some(self.last_block_id.to_proto()),
            last_commit_hash: self.last_commit_hash.clone(),
            data_hash: self.data_hash.clone(),
            validators_hash: self.validators_hash.clone(),
            next_validators_hash: self.next_validators_hash.clone(),
            consensus_hash: self.consensus_hash.clone(),
            app_hash: self.app_hash.clone(),
            last_results_hash: self.last_results_hash.clone(),
            evidence_hash: self.evidence_hash.clone(),
            proposer_address: self.proposer_address.to_vec(),
        }
    }
}

impl TryFrom<proto::Header> for Header {
    type Error = ProtoError;

    fn try_from(pb: proto::Header) -> Result<Self, Self::Error> {
        let version = pb.version.ok_or(ProtoError::MissingField("Header.Version"))?;
        let proposer_address =
            Address::try_from(pb.proposer_address.as_slice()).map_err(|_| ProtoError::InvalidLength {
                field: "Header.ProposerAddress",
                expected: crate::address::ADDRESS_SIZE,
                got: pb.proposer_address.len(),
            })?;

        Ok(Header {
            version: Version {
                block: version.block,
                app: version.app,
            },
            chain_id: pb.chain_id,
            height: pb.height,
            time: time::from_proto(pb.time, "Header.Time")?,
            last_block_id: pb.last_block_id.map(BlockId::from).unwrap_or_default(),
            last_commit_hash: pb.last_commit_hash,
            data_hash: pb.data_hash,
            validators_hash: pb.validators_hash,
            next_validators_hash: pb.next_validators_hash,
            consensus_hash: pb.consensus_hash,
            app_hash: pb.app_hash,
            last_results_hash: pb.last_results_hash,
            evidence_hash: pb.evidence_hash,
            proposer_address,
        })
    }
}

/// A validator's signature inside a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "block_id_flag")]
pub enum CommitSig {
    /// No vote was received from the validator.
    Absent,
    /// Voted for the commit's block.
    ForBlock {
        validator_address: Address,
        timestamp: DateTime<Utc>,
        #[serde(with = "hex::serde")]
        signature: Vec<u8>,
    },
    /// Voted for nil.
    ForNil {
        validator_address: Address,
        timestamp: DateTime<Utc>,
        #[serde(with = "hex::serde")]
        signature: Vec<u8>,
    },
}

impl CommitSig {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        match self {
            CommitSig::Absent => Ok(()),
            CommitSig::ForBlock { signature, .. } | CommitSig::ForNil { signature, .. } => {
                if signature.is_empty() {
                    return Err(ValidationError::MissingSignature);
                }
                if signature.len() > MAX_SIGNATURE_SIZE {
                    return Err(ValidationError::SignatureTooBig {
                        max: MAX_SIGNATURE_SIZE,
                        got: signature.len(),
                    });
                }
                Ok(())
            }
        }
    }

    pub fn to_proto(&self) -> proto::CommitSig {
        match self {
            CommitSig::Absent => proto::CommitSig {
                block_id_flag: proto::BlockIdFlag::Absent as i32,
                ..Default::default()
            },
            CommitSig::ForBlock {
                validator_address,
                timestamp,
                signature,
            } => proto::CommitSig {
                block_id_flag: proto::BlockIdFlag::Commit as i32,
                validator_address: validator_address.to_vec(),
                timestamp: Some(time::to_proto(timestamp)),
                signature: signature.clone(),
            },
            CommitSig::ForNil {
                validator_address,
                timestamp,
                signature,
            } => proto::CommitSig {
                block_id_flag: proto::BlockIdFlag::Nil as i32,
                validator_address: validator_address.to_vec(),
                timestamp: Some(time::to_proto(timestamp)),
                signature: signature.clone(),
            },
        }
    }
}

impl TryFrom<proto::CommitSig> for CommitSig {
    type Error = ProtoError;

    fn try_from(pb: proto::CommitSig) -> Result<Self, Self::Error> {
        let flag = proto::BlockIdFlag::try_from(pb.block_id_flag).map_err(|_| {
            ProtoError::UnknownEnumValue {
                field: "BlockIdFlag",
                value: pb.block_id_flag,
            }
        })?;

        if flag == proto::BlockIdFlag::Absent {
            if !pb.validator_address.is_empty() || !pb.signature.is_empty() {
                return Err(ProtoError::AbsentSignatureWithData);
            }
            return Ok(CommitSig::Absent);
        }

        let validator_address =
            Address::try_from(pb.validator_address.as_slice()).map_err(|_| ProtoError::InvalidLength {
                field: "CommitSig.ValidatorAddress",
                expected: crate::address::ADDRESS_SIZE,
                got: pb.validator_address.len(),
            })?;
        let timestamp = time::from_proto(pb.timestamp, "CommitSig.Timestamp")?;

        match flag {
            proto::BlockIdFlag::Commit => Ok(CommitSig::ForBlock {
                validator_address,
                timestamp,
                signature: pb.signature,
            }),
            proto::BlockIdFlag::Nil => Ok(CommitSig::ForNil {
                validator_address,
                timestamp,
                signature: pb.signature,
            }),
            _ => Err(ProtoError::UnknownEnumValue {
                field: "BlockIdFlag",
                value: pb.block_id_flag,
            }),
        }
    }
}

/// +2/3 precommits for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub height: i64,
    pub round: i32,
    pub block_id: BlockId,
    pub signatures: Vec<CommitSig>,
}

impl Commit {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.height < 0 {
            return Err(ValidationError::Negative {
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

        if self.height >= 1 {
            if self.block_id.is_zero() {
                return Err(ValidationError::NilCommitBlock);
            }
            if self.signatures.is_empty() {
                return Err(ValidationError::EmptyCommit);
            }
            for (i, sig) in self.signatures.iter().enumerate() {
                sig.validate_basic()
                    .map_err(|e| e.context(format!("wrong CommitSig #{}", i)))?;
            }
        }

        Ok(())
    }

    pub fn to_proto(&self) -> proto::Commit {
        proto::Commit {
            height: self.height,
            round: self.round,
            block_id: Some(self.block_id.to_proto()),
            signatures: self.signatures.iter().map(CommitSig::to_proto).collect(),
        }
    }
}

impl TryFrom<proto::Commit> for Commit {
    type Error = ProtoError;

    fn try_from(pb: proto::Commit) -> Result<Self, Self::Error> {
        let signatures = pb
            .signatures
            .into_iter()
            .map(CommitSig::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Commit {
            height: pb.height,
            round: pb.round,
            block_id: pb.block_id.map(BlockId::from).unwrap_or_default(),
            signatures,
        })
    }
}

/// A header together with the commit that signs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    pub header: Header,
    pub commit: Commit,
}

impl SignedHeader {
    /// Checks that the header and commit are consistent and belong to `chain_id`.
    /// Signatures are not verified.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), ValidationError> {
        self.header
            .validate_basic()
            .map_err(|e| e.context("invalid header"))?;
        self.commit
            .validate_basic()
            .map_err(|e| e.context("invalid commit"))?;

        if self.header.chain_id != chain_id {
            return Err(ValidationError::WrongChainId {
                expected: chain_id.to_string(),
                got: self.header.chain_id.clone(),
            });
        }

        if self.commit.height != self.header.height {
            return Err(ValidationError::HeightMismatch {
                header: self.header.height,
                commit: self.commit.height,
            });
        }

        let header_hash = self.header.hash();
        if self.commit.block_id.hash != header_hash {
            return Err(ValidationError::CommitHashMismatch {
                commit: hex::encode_upper(&self.commit.block_id.hash),
                header: hex::encode_upper(&header_hash),
            });
        }

        Ok(())
    }

    pub fn to_proto(&self) -> proto::SignedHeader {
        proto::SignedHeader {
            header: Some(self.header.to_proto()),
            commit: Some(self.commit.to_proto()),
        }
    }
}

impl TryFrom<proto::SignedHeader> for SignedHeader {
    type Error = ProtoError;

    fn try_from(pb: proto::SignedHeader) -> Result<Self, Self::Error> {
        let header = pb.header.ok_or(ProtoError::MissingField("SignedHeader.Header"))?;
        let commit = pb.commit.ok_or(ProtoError::MissingField("SignedHeader.Commit"))?;
        Ok(SignedHeader {
            header: Header::try_from(header)?,
            commit: Commit::try_from(commit)?,
        })
    }
}

/// A signed header and the validator set that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightBlock {
    pub signed_header: SignedHeader,
    pub validator_set: ValidatorSet,
}

impl LightBlock {
    pub fn height(&self) -> i64 {
        self.signed_header.header.height
    }

    pub fn chain_id(&self) -> &str {
        &self.signed_header.header.chain_id
    }

    pub fn header(&self) -> &Header {
        &self.signed_header.header
    }

    /// Hash of the block's header.
    pub fn hash(&self) -> Vec<u8> {
        self.signed_header.header.hash()
    }

    pub fn validate_basic(&self, chain_id: &str) -> Result<(), ValidationError> {
        self.signed_header.validate_basic(chain_id)?;
        self.validator_set
            .validate_basic()
            .map_err(|e| e.context("invalid validator set"))?;

        let valset_hash = self.validator_set.hash();
        if self.signed_header.header.validators_hash != valset_hash {
            return Err(ValidationError::ValidatorsHashMismatch {
                header: hex::encode_upper(&self.signed_header.header.validators_hash),
                valset: hex::encode_upper(valset_hash),
            });
        }

        Ok(())
    }

    /// Fails when the validator set cannot be encoded.
    pub fn to_proto(&self) -> Result<proto::LightBlock, ProtoError> {
        Ok(proto::LightBlock {
            signed_header: Some(self.signed_header.to_proto()),
            validator_set: Some(self.validator_set.to_proto()?),
        })
    }
}

impl TryFrom<proto::LightBlock> for LightBlock {
    type Error = ProtoError;

    fn try_from(pb: proto::LightBlock) -> Result<Self, Self::Error> {
        let signed_header = pb
            .signed_header
            .ok_or(ProtoError::MissingField("LightBlock.SignedHeader"))?;
        let validator_set = pb
            .validator_set
            .ok_or(ProtoError::MissingField("LightBlock.ValidatorSet"))?;

        Ok(LightBlock {
            signed_header: SignedHeader::try_from(signed_header)?,
            validator_set: ValidatorSet::try_from(validator_set)?,
        })
    }
}

impl fmt::Display for LightBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LightBlock{{ChainID: {}, Height: {}, Hash: {}, {}}}",
            self.chain_id(),
            self.height(),
            hex::encode_upper(self.hash()),
            self.validator_set
        )
    }
}
