//! Misbehavior records handed to the application for punishment.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlas_common::address::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MisbehaviorType {
    DuplicateVote,
    LightClientAttack,
}

impl fmt::Display for MisbehaviorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MisbehaviorType::DuplicateVote => "DUPLICATE_VOTE",
            MisbehaviorType::LightClientAttack => "LIGHT_CLIENT_ATTACK",
        };
        f.write_str(name)
    }
}

/// One implicated validator and the power it held at the evidence height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Misbehavior {
    #[serde(rename = "type")]
    pub kind: MisbehaviorType,
    pub validator_address: Address,
    /// 0 when the validator is not part of the set at `height`.
    pub validator_power: i64,
    pub height: i64,
    pub time: DateTime<Utc>,
    pub total_voting_power: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvidenceKind;

    #[test]
    fn test_every_kind_has_its_own_type() {
        let types: Vec<MisbehaviorType> = EvidenceKind::ALL.iter().map(|k| MisbehaviorType::from(*k)).collect();
        assert_eq!(types, vec![MisbehaviorType::DuplicateVote, MisbehaviorType::LightClientAttack]);
        assert_eq!(types[1].to_string(), "LIGHT_CLIENT_ATTACK");
    }
}
