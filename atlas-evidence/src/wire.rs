//! Conversion between [`Evidence`] and its tagged wire message.
//!
//! Decoding always validates: no caller can obtain unvalidated evidence
//! from bytes received off the network.

use tracing::{debug, warn};

use crate::{
    errors::WireError,
    evidence::{DuplicateVoteEvidence, Evidence, LightClientAttackEvidence},
    proto::{self, evidence::Sum},
};

pub fn evidence_to_proto(evidence: Option<&Evidence>) -> Result<proto::Evidence, WireError> {
    let evidence = evidence.ok_or(WireError::NilEvidence)?;

    let sum = match evidence {
        Evidence::DuplicateVote(ev) => Sum::DuplicateVoteEvidence(ev.to_proto()),
        Evidence::LightClientAttack(ev) => Sum::LightClientAttackEvidence(ev.to_proto()?),
    };

    Ok(proto::Evidence { sum: Some(sum) })
}

pub fn evidence_from_proto(pb: Option<proto::Evidence>) -> Result<Evidence, WireError> {
    let pb = pb.ok_or(WireError::NilEvidence)?;

    let decoded = match pb.sum {
        Some(Sum::DuplicateVoteEvidence(dve)) => DuplicateVoteEvidence::try_from(dve).map(Evidence::from),
        Some(Sum::LightClientAttackEvidence(lcae)) => {
            LightClientAttackEvidence::try_from(lcae).map(Evidence::from)
        }
        None => Err(WireError::UnrecognizedEvidenceKind),
    };

    match decoded {
        Ok(evidence) => {
            debug!(
                kind = %evidence.kind(),
                height = evidence.height(),
                hash = %hex::encode_upper(evidence.hash()),
                "decoded evidence"
            );
            Ok(evidence)
        }
        Err(err) => {
            warn!("⚠️ Rejected evidence from the wire: {}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::EvidenceError,
        mock::{new_mock_duplicate_vote_evidence, new_mock_light_client_attack_evidence},
    };
    use chrono::Utc;
    use prost::Message;

    const CHAIN_ID: &str = "atlas-wire";

    #[test]
    fn test_nil_evidence() {
        assert_eq!(evidence_to_proto(None), Err(WireError::NilEvidence));
        assert_eq!(evidence_from_proto(None), Err(WireError::NilEvidence));
    }

    #[test]
    fn test_empty_union_is_unrecognized() {
        let pb = proto::Evidence { sum: None };
        assert_eq!(evidence_from_proto(Some(pb)), Err(WireError::UnrecognizedEvidenceKind));
    }

    #[test]
    fn test_unknown_tag_is_unrecognized() {
        // field 3, length-delimited, empty payload
        let bytes = [0x1a, 0x00];
        let pb = proto::Evidence::decode(&bytes[..]).unwrap();
        assert_eq!(evidence_from_proto(Some(pb)), Err(WireError::UnrecognizedEvidenceKind));
    }

    #[test]
    fn test_roundtrip_both_kinds() {
        let all: Vec<Evidence> = vec![
            new_mock_duplicate_vote_evidence(5, Utc::now(), CHAIN_ID).into(),
            new_mock_light_client_attack_evidence(2, 6, Utc::now(), CHAIN_ID).into(),
        ];

        for ev in all {
            let pb = evidence_to_proto(Some(&ev)).unwrap();
            let back = evidence_from_proto(Some(pb)).unwrap();
            assert_eq!(back, ev);
            assert_eq!(back.bytes(), ev.bytes());
            assert_eq!(back.hash(), ev.hash());
        }
    }

    #[test]
    fn test_decode_runs_validation() {
        let mut ev = new_mock_light_client_attack_evidence(2, 6, Utc::now(), CHAIN_ID);
        ev.common_height = 6;
        let pb = evidence_to_proto(Some(&Evidence::from(ev))).unwrap();

        assert_eq!(
            evidence_from_proto(Some(pb)),
            Err(WireError::Invalid(EvidenceError::CommonHeightAhead {
                common: 6,
                conflicting: 6
            }))
        );
    }

    #[test]
    fn test_missing_proposer_fails_encoding() {
        let mut ev = new_mock_light_client_attack_evidence(2, 6, Utc::now(), CHAIN_ID);
        ev.conflicting_block.validator_set.proposer = None;
        assert!(matches!(
            evidence_to_proto(Some(&Evidence::from(ev))),
            Err(WireError::Proto(_))
        ));
    }
}
