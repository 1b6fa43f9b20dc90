//! Schema-tagged JSON for evidence.
//!
//! Evidence is written as `{"type": <registered name>, "value": <object>}`.
//! The names live in a [`JsonRegistry`] owned by the caller and filled once
//! at startup with [`register_evidence_types`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    errors::JsonError,
    evidence::{DuplicateVoteEvidence, Evidence, EvidenceKind, LightClientAttackEvidence},
};

#[derive(Debug, Serialize, Deserialize)]
struct Tagged {
    #[serde(rename = "type")]
    type_name: String,
    value: Value,
}

/// Maps evidence kinds to their JSON type names and back.
#[derive(Debug, Default, Clone)]
pub struct JsonRegistry {
    names: HashMap<EvidenceKind, String>,
    kinds: HashMap<String, EvidenceKind>,
}

impl JsonRegistry {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            kinds: HashMap::new(),
        }
    }

    /// Registers `kind` under `name`. Both must be unused.
    pub fn register(&mut self, kind: EvidenceKind, name: &str) -> Result<(), JsonError> {
        if self.kinds.contains_key(name) {
            return Err(JsonError::DuplicateName(name.to_string()));
        }
        if self.names.contains_key(&kind) {
            return Err(JsonError::DuplicateKind(kind));
        }

        self.names.insert(kind, name.to_string());
        self.kinds.insert(name.to_string(), kind);
        debug!(%kind, name, "registered evidence type");
        Ok(())
    }

    pub fn name_of(&self, kind: EvidenceKind) -> Option<&str> {
        self.names.get(&kind).map(String::as_str)
    }

    pub fn kind_of(&self, name: &str) -> Option<EvidenceKind> {
        self.kinds.get(name).copied()
    }

    pub fn to_value(&self, evidence: &Evidence) -> Result<Value, JsonError> {
        let kind = evidence.kind();
        let type_name = self
            .name_of(kind)
            .ok_or(JsonError::UnregisteredKind(kind))?
            .to_string();

        let value = match evidence {
            Evidence::DuplicateVote(ev) => serde_json::to_value(ev)?,
            Evidence::LightClientAttack(ev) => serde_json::to_value(ev)?,
        };

        Ok(serde_json::to_value(Tagged { type_name, value })?)
    }

    pub fn to_string(&self, evidence: &Evidence) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&self.to_value(evidence)?)?)
    }

    pub fn to_string_pretty(&self, evidence: &Evidence) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_value(evidence)?)?)
    }

    /// Decodes and validates.
    pub fn from_value(&self, value: Value) -> Result<Evidence, JsonError> {
        let tagged: Tagged = serde_json::from_value(value)?;
        let kind = self
            .kind_of(&tagged.type_name)
            .ok_or_else(|| JsonError::UnknownType(tagged.type_name.clone()))?;

        let evidence = match kind {
            EvidenceKind::DuplicateVote => {
                Evidence::from(serde_json::from_value::<DuplicateVoteEvidence>(tagged.value)?)
            }
            EvidenceKind::LightClientAttack => {
                Evidence::from(serde_json::from_value::<LightClientAttackEvidence>(tagged.value)?)
            }
        };

        if let Err(err) = evidence.validate_basic() {
            warn!("⚠️ Rejected {} evidence from JSON: {}", kind, err);
            return Err(err.into());
        }

        Ok(evidence)
    }

    pub fn from_str(&self, json: &str) -> Result<Evidence, JsonError> {
        self.from_value(serde_json::from_str(json)?)
    }
}

/// Registers every evidence kind under its stable name.
/// Call once while setting up the process.
pub fn register_evidence_types(registry: &mut JsonRegistry) -> Result<(), JsonError> {
    for kind in EvidenceKind::ALL {
        registry.register(kind, kind.json_name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::EvidenceError,
        mock::{new_mock_duplicate_vote_evidence, new_mock_light_client_attack_evidence},
    };
    use chrono::Utc;
    use serde_json::json;

    const CHAIN_ID: &str = "atlas-json";

    fn registry() -> JsonRegistry {
        let mut registry = JsonRegistry::new();
        register_evidence_types(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_registered_names() {
        let registry = registry();
        assert_eq!(
            registry.name_of(EvidenceKind::DuplicateVote),
            Some("atlas/DuplicateVoteEvidence")
        );
        assert_eq!(
            registry.kind_of("atlas/LightClientAttackEvidence"),
            Some(EvidenceKind::LightClientAttack)
        );
    }

    #[test]
    fn test_double_registration_fails() {
        let mut registry = registry();
        assert!(matches!(
            register_evidence_types(&mut registry),
            Err(JsonError::DuplicateName(_))
        ));
        assert!(matches!(
            registry.register(EvidenceKind::DuplicateVote, "other/name"),
            Err(JsonError::DuplicateKind(EvidenceKind::DuplicateVote))
        ));
    }

    #[test]
    fn test_roundtrip_preserves_hash() {
        let registry = registry();
        let all: Vec<Evidence> = vec![
            new_mock_duplicate_vote_evidence(4, Utc::now(), CHAIN_ID).into(),
            new_mock_light_client_attack_evidence(1, 4, Utc::now(), CHAIN_ID).into(),
        ];

        for ev in all {
            let json = registry.to_string(&ev).unwrap();
            let back = registry.from_str(&json).unwrap();
            assert_eq!(back.hash(), ev.hash());
            assert_eq!(back, ev);
        }
    }

    #[test]
    fn test_tagged_shape() {
        let registry = registry();
        let ev: Evidence = new_mock_duplicate_vote_evidence(4, Utc::now(), CHAIN_ID).into();
        let value = registry.to_value(&ev).unwrap();

        assert_eq!(value["type"], json!("atlas/DuplicateVoteEvidence"));
        assert!(value["value"]["vote_a"].is_object());
        assert_eq!(value["value"]["vote_a"]["height"], json!(4));
    }

    #[test]
    fn test_unknown_type_and_unregistered_kind() {
        let registry = registry();
        let err = registry
            .from_value(json!({"type": "atlas/Nope", "value": {}}))
            .unwrap_err();
        assert!(matches!(err, JsonError::UnknownType(name) if name == "atlas/Nope"));

        let empty = JsonRegistry::new();
        let ev: Evidence = new_mock_duplicate_vote_evidence(4, Utc::now(), CHAIN_ID).into();
        assert!(matches!(
            empty.to_value(&ev),
            Err(JsonError::UnregisteredKind(EvidenceKind::DuplicateVote))
        ));
    }

    #[test]
    fn test_decoding_validates() {
        let registry = registry();
        let mut ev = new_mock_duplicate_vote_evidence(4, Utc::now(), CHAIN_ID);
        std::mem::swap(&mut ev.vote_a, &mut ev.vote_b);

        let json = registry.to_string(&Evidence::from(ev)).unwrap();
        assert!(matches!(
            registry.from_str(&json),
            Err(JsonError::Invalid(EvidenceError::InvalidVoteOrder))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let registry = registry();
        assert!(matches!(registry.from_str("{not json"), Err(JsonError::Malformed(_))));
    }
}
