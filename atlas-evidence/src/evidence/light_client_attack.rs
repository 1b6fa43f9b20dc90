use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;
use serde::{Deserialize, Serialize};

use atlas_common::{
    address::Address,
    crypto::{hash, HashBytes},
    error::ProtoError,
    utils::time,
    LightBlock,
};

use crate::{
    errors::{EvidenceError, WireError},
    proto,
};

/// How the conflicting block was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    #[default]
    Unknown,
    /// The conflicting block was signed by validators outside the trusted set.
    Lunatic,
    /// A trusted quorum signed two blocks in the same round.
    Equivocation,
    /// A trusted quorum signed two blocks in different rounds.
    Amnesia,
}

impl From<AttackType> for proto::LightClientAttackType {
    fn from(t: AttackType) -> Self {
        match t {
            AttackType::Unknown => proto::LightClientAttackType::Unknown,
            AttackType::Lunatic => proto::LightClientAttackType::Lunatic,
            AttackType::Equivocation => proto::LightClientAttackType::Equivocation,
            AttackType::Amnesia => proto::LightClientAttackType::Amnesia,
        }
    }
}

impl TryFrom<i32> for AttackType {
    type Error = ProtoError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match proto::LightClientAttackType::try_from(value) {
            Ok(proto::LightClientAttackType::Unknown) => Ok(AttackType::Unknown),
            Ok(proto::LightClientAttackType::Lunatic) => Ok(AttackType::Lunatic),
            Ok(proto::LightClientAttackType::Equivocation) => Ok(AttackType::Equivocation),
            Ok(proto::LightClientAttackType::Amnesia) => Ok(AttackType::Amnesia),
            Err(_) => Err(ProtoError::UnknownEnumValue {
                field: "LightClientAttackEvidence.AttackType",
                value,
            }),
        }
    }
}

/// Evidence that a light client was shown a block conflicting with the
/// trusted chain after `common_height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClientAttackEvidence {
    pub conflicting_block: LightBlock,
    /// Last height at which the trusted chain and the conflicting block agree.
    pub common_height: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attack_type: AttackType,
}

impl LightClientAttackEvidence {
    /// The attack is attributed to the common height, where the trusted
    /// validator set is known.
    pub fn height(&self) -> i64 {
        self.common_height
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Every validator of the conflicting block, in set order.
    pub fn addresses(&self) -> Vec<Address> {
        self.conflicting_block.validator_set.addresses()
    }

    /// Canonical encoding.
    ///
    /// Panics if the conflicting block cannot be encoded, which a value that
    /// passed [`Self::validate_basic`] never does.
    pub fn bytes(&self) -> Vec<u8> {
        self.to_proto()
            .expect("serialize light client attack evidence")
            .encode_to_vec()
    }

    /// SHA-256 over the full conflicting block hash followed by the common
    /// height as 8 big-endian bytes.
    pub fn hash(&self) -> HashBytes {
        let block_hash = self.conflicting_block.hash();
        let height = self.common_height.to_be_bytes();
        hash::sum_parts(&[block_hash.as_slice(), height.as_slice()])
    }

    pub fn validate_basic(&self) -> Result<(), EvidenceError> {
        self.conflicting_block
            .validate_basic(self.conflicting_block.chain_id())
            .map_err(EvidenceError::InvalidConflictingBlock)?;

        if self.common_height <= 0 {
            return Err(EvidenceError::NonPositiveCommonHeight(self.common_height));
        }

        let conflicting = self.conflicting_block.height();
        if self.common_height >= conflicting {
            return Err(EvidenceError::CommonHeightAhead {
                common: self.common_height,
                conflicting,
            });
        }

        Ok(())
    }

    pub fn to_proto(&self) -> Result<proto::LightClientAttackEvidence, ProtoError> {
        Ok(proto::LightClientAttackEvidence {
            conflicting_block: Some(self.conflicting_block.to_proto()?),
            common_height: self.common_height,
            timestamp: Some(time::to_proto(&self.timestamp)),
            attack_type: proto::LightClientAttackType::from(self.attack_type) as i32,
        })
    }
}

/// Decodes and validates.
impl TryFrom<proto::LightClientAttackEvidence> for LightClientAttackEvidence {
    type Error = WireError;

    fn try_from(pb: proto::LightClientAttackEvidence) -> Result<Self, Self::Error> {
        let block = pb.conflicting_block.ok_or(EvidenceError::NilConflictingBlock)?;
        if block
            .signed_header
            .as_ref()
            .map_or(true, |sh| sh.header.is_none())
        {
            return Err(EvidenceError::MissingHeader.into());
        }

        let evidence = LightClientAttackEvidence {
            conflicting_block: LightBlock::try_from(block)?,
            common_height: pb.common_height,
            timestamp: time::from_proto(pb.timestamp, "LightClientAttackEvidence.Timestamp")?,
            attack_type: AttackType::try_from(pb.attack_type)?,
        };
        evidence.validate_basic()?;

        Ok(evidence)
    }
}

impl fmt::Display for LightClientAttackEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LightClientAttackEvidence{{ConflictingBlock: {}, CommonHeight: {}, Timestamp: {}, AttackType: {:?}}}",
            self.conflicting_block,
            self.common_height,
            self.timestamp.to_rfc3339(),
            self.attack_type
        )
    }
}
