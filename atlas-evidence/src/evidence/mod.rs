//! Proofs of validator misbehavior.
//!
//! [`Evidence`] is closed over the two kinds the chain knows how to punish.
//! Adding a kind means touching every match below and in `wire`.

pub mod duplicate_vote;
pub mod light_client_attack;

use std::fmt;

use chrono::{DateTime, Utc};
use prost::Message;

use atlas_common::{address::Address, crypto::HashBytes, ValidatorSet};

use crate::{
    abci::{Misbehavior, MisbehaviorType},
    errors::{EvidenceError, WireError},
    proto, wire,
};

pub use duplicate_vote::DuplicateVoteEvidence;
pub use light_client_attack::{AttackType, LightClientAttackEvidence};

/// Kind tag of a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EvidenceKind {
    DuplicateVote,
    LightClientAttack,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 2] = [EvidenceKind::DuplicateVote, EvidenceKind::LightClientAttack];

    /// Field number of the kind in the `Evidence` wire union.
    pub fn wire_tag(&self) -> u32 {
        match self {
            EvidenceKind::DuplicateVote => 1,
            EvidenceKind::LightClientAttack => 2,
        }
    }

    /// Name the kind is registered under for tagged JSON.
    pub fn json_name(&self) -> &'static str {
        match self {
            EvidenceKind::DuplicateVote => "atlas/DuplicateVoteEvidence",
            EvidenceKind::LightClientAttack => "atlas/LightClientAttackEvidence",
        }
    }
}

impl From<EvidenceKind> for MisbehaviorType {
    fn from(kind: EvidenceKind) -> Self {
        match kind {
            EvidenceKind::DuplicateVote => MisbehaviorType::DuplicateVote,
            EvidenceKind::LightClientAttack => MisbehaviorType::LightClientAttack,
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MisbehaviorType::from(*self), f)
    }
}

/// A proof that one or more validators misbehaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    DuplicateVote(DuplicateVoteEvidence),
    LightClientAttack(LightClientAttackEvidence),
}

impl Evidence {
    /// Height of the misbehavior.
    pub fn height(&self) -> i64 {
        match self {
            Evidence::DuplicateVote(ev) => ev.height(),
            Evidence::LightClientAttack(ev) => ev.height(),
        }
    }

    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Evidence::DuplicateVote(ev) => ev.time(),
            Evidence::LightClientAttack(ev) => ev.time(),
        }
    }

    /// Addresses of the implicated validators.
    pub fn addresses(&self) -> Vec<Address> {
        match self {
            Evidence::DuplicateVote(ev) => ev.addresses(),
            Evidence::LightClientAttack(ev) => ev.addresses(),
        }
    }

    /// Canonical encoding of the concrete kind, without the union tag.
    /// This is the leaf committed by [`crate::EvidenceList::hash`].
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Evidence::DuplicateVote(ev) => ev.bytes(),
            Evidence::LightClientAttack(ev) => ev.bytes(),
        }
    }

    pub fn hash(&self) -> HashBytes {
        match self {
            Evidence::DuplicateVote(ev) => ev.hash(),
            Evidence::LightClientAttack(ev) => ev.hash(),
        }
    }

    /// Stateless checks. Signatures and validator membership are verified
    /// by the evidence pool.
    pub fn validate_basic(&self) -> Result<(), EvidenceError> {
        match self {
            Evidence::DuplicateVote(ev) => ev.validate_basic(),
            Evidence::LightClientAttack(ev) => ev.validate_basic(),
        }
    }

    pub fn kind(&self) -> EvidenceKind {
        match self {
            Evidence::DuplicateVote(_) => EvidenceKind::DuplicateVote,
            Evidence::LightClientAttack(_) => EvidenceKind::LightClientAttack,
        }
    }

    /// Projects the evidence onto one record per implicated validator.
    ///
    /// `vals` is the validator set at the evidence height; powers come from it.
    pub fn to_abci(&self, vals: &ValidatorSet) -> Vec<Misbehavior> {
        let kind = MisbehaviorType::from(self.kind());
        let height = self.height();
        let time = self.time();

        self.addresses()
            .into_iter()
            .map(|address| Misbehavior {
                kind,
                validator_address: address,
                validator_power: vals
                    .get_by_address(&address)
                    .map_or(0, |(_, v)| v.voting_power),
                height,
                time,
                total_voting_power: vals.total_voting_power,
            })
            .collect()
    }

    /// Tagged wire encoding.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        Ok(wire::evidence_to_proto(Some(self))?.encode_to_vec())
    }

    /// Decodes a tagged wire message. The result is always validated.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let pb = proto::Evidence::decode(buf)?;
        wire::evidence_from_proto(Some(pb))
    }
}

impl From<DuplicateVoteEvidence> for Evidence {
    fn from(ev: DuplicateVoteEvidence) -> Self {
        Evidence::DuplicateVote(ev)
    }
}

impl From<LightClientAttackEvidence> for Evidence {
    fn from(ev: LightClientAttackEvidence) -> Self {
        Evidence::LightClientAttack(ev)
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::DuplicateVote(ev) => fmt::Display::fmt(ev, f),
            Evidence::LightClientAttack(ev) => fmt::Display::fmt(ev, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        new_mock_duplicate_vote_evidence, new_mock_duplicate_vote_evidence_with_validator,
        new_mock_light_client_attack_evidence, MockPV,
    };
    use atlas_common::Validator;

    const CHAIN_ID: &str = "atlas-ev";

    #[test]
    fn test_kind_and_tags() {
        let dve: Evidence = new_mock_duplicate_vote_evidence(2, Utc::now(), CHAIN_ID).into();
        let lcae: Evidence = new_mock_light_client_attack_evidence(1, 3, Utc::now(), CHAIN_ID).into();

        assert_eq!(dve.kind(), EvidenceKind::DuplicateVote);
        assert_eq!(lcae.kind(), EvidenceKind::LightClientAttack);
        assert_eq!(dve.kind().wire_tag(), 1);
        assert_eq!(lcae.kind().wire_tag(), 2);
        assert_eq!(dve.kind().to_string(), "DUPLICATE_VOTE");
    }

    #[test]
    fn test_delegates_to_concrete_kind() {
        let inner = new_mock_duplicate_vote_evidence(6, Utc::now(), CHAIN_ID);
        let ev = Evidence::from(inner.clone());

        assert_eq!(ev.height(), inner.height());
        assert_eq!(ev.time(), inner.time());
        assert_eq!(ev.bytes(), inner.bytes());
        assert_eq!(ev.hash(), inner.hash());
        assert_eq!(ev.to_string(), inner.to_string());
        assert!(ev.validate_basic().is_ok());
    }

    #[test]
    fn test_encode_decode_preserves_hash() {
        let ev: Evidence = new_mock_light_client_attack_evidence(2, 9, Utc::now(), CHAIN_ID).into();
        let back = Evidence::decode(&ev.encode().unwrap()).unwrap();
        assert_eq!(back.bytes(), ev.bytes());
        assert_eq!(back.hash(), ev.hash());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(Evidence::decode(&[0xff, 0xff, 0xff]), Err(WireError::Decode(_))));
        assert_eq!(Evidence::decode(&[]), Err(WireError::UnrecognizedEvidenceKind));
    }

    #[test]
    fn test_to_abci_duplicate_vote() {
        let pv = MockPV::new();
        let other = Validator::new(MockPV::new().pub_key(), 5);
        let offender = Validator::new(pv.pub_key(), 7);
        let vals = ValidatorSet::new(vec![other, offender]);

        let ev: Evidence =
            new_mock_duplicate_vote_evidence_with_validator(3, Utc::now(), &pv, CHAIN_ID).into();
        let records = ev.to_abci(&vals);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MisbehaviorType::DuplicateVote);
        assert_eq!(records[0].validator_address, pv.address());
        assert_eq!(records[0].validator_power, 7);
        assert_eq!(records[0].total_voting_power, 12);
        assert_eq!(records[0].height, 3);
    }

    #[test]
    fn test_to_abci_light_client_attack_covers_set() {
        let ev: Evidence = new_mock_light_client_attack_evidence(2, 4, Utc::now(), CHAIN_ID).into();
        let stranger = Validator::new(MockPV::new().pub_key(), 1);
        let vals = ValidatorSet::new(vec![stranger]);

        let records = ev.to_abci(&vals);
        assert_eq!(
            records.iter().map(|m| m.validator_address).collect::<Vec<_>>(),
            ev.addresses()
        );
        assert!(records.iter().all(|m| m.validator_power == 0 && m.height == 2));
    }
}
