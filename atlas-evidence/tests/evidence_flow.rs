mod common;

use atlas_evidence::{
    evidence_from_proto, evidence_to_proto, register_evidence_types, AttackType,
    DuplicateVoteEvidence, Evidence, EvidenceError, EvidenceList, EvidenceParams, JsonRegistry,
    LightClientAttackEvidence, WireError,
};
use atlas_evidence::mock::{new_mock_duplicate_vote_evidence, MockPV};
use chrono::{TimeZone, Utc};
use common::{block_id, light_block, signed_vote, t0, CHAIN_ID};
use prost::Message;

fn duplicate_vote_at_ten() -> (MockPV, DuplicateVoteEvidence) {
    let val = MockPV::new();
    let vote_on_a = signed_vote(&val, 10, block_id(b'A'));
    let vote_on_b = signed_vote(&val, 10, block_id(b'B'));
    let ev = DuplicateVoteEvidence::new(Some(vote_on_b), Some(vote_on_a), t0()).unwrap();
    (val, ev)
}

fn light_client_attack(common_height: i64, height: i64) -> LightClientAttackEvidence {
    let signers = vec![MockPV::new(), MockPV::new()];
    LightClientAttackEvidence {
        conflicting_block: light_block(height, &signers),
        common_height,
        timestamp: t0(),
        attack_type: AttackType::Equivocation,
    }
}

#[test]
fn test_duplicate_vote_scenario() {
    let (val, ev) = duplicate_vote_at_ten();

    assert_eq!(ev.vote_a.block_id, block_id(b'A'));
    assert_eq!(ev.height(), 10);
    assert_eq!(ev.time(), t0());
    assert!(ev.validate_basic().is_ok());

    assert!(ev.vote_a.verify(CHAIN_ID, &val.pub_key()).is_ok());
    assert_eq!(Evidence::from(ev).addresses(), vec![val.address()]);
}

#[test]
fn test_null_vote_gives_no_evidence() {
    let val = MockPV::new();
    let vote = signed_vote(&val, 10, block_id(b'A'));
    assert!(DuplicateVoteEvidence::new(None, Some(vote), t0()).is_none());
}

#[test]
fn test_bytes_roundtrip_through_peer() {
    let (_, dve) = duplicate_vote_at_ten();
    let all: Vec<Evidence> = vec![dve.into(), light_client_attack(3, 7).into()];

    for ev in all {
        let wire = ev.encode().unwrap();
        let received = Evidence::decode(&wire).unwrap();
        assert_eq!(received.bytes(), ev.bytes());
        assert_eq!(received.hash(), ev.hash());
        assert_eq!(received.encode().unwrap(), wire);
    }
}

#[test]
fn test_leap_second_evidence_survives_the_wire() {
    // 2016-12-31T23:59:60.5Z
    let leap = Utc.timestamp_opt(1_483_228_799, 1_500_000_000).unwrap();
    let ev: Evidence = new_mock_duplicate_vote_evidence(10, leap, CHAIN_ID).into();
    assert!(ev.validate_basic().is_ok());

    let received = evidence_from_proto(Some(evidence_to_proto(Some(&ev)).unwrap())).unwrap();
    assert_eq!(received.bytes(), ev.bytes());
    assert_eq!(received.hash(), ev.hash());
    assert_eq!(received.time(), Utc.timestamp_opt(1_483_228_800, 500_000_000).unwrap());
}

#[test]
fn test_peer_cannot_smuggle_misordered_votes() {
    let (_, ev) = duplicate_vote_at_ten();
    let mut pb = evidence_to_proto(Some(&Evidence::from(ev))).unwrap();

    if let Some(atlas_evidence::proto::evidence::Sum::DuplicateVoteEvidence(dve)) = pb.sum.as_mut() {
        std::mem::swap(&mut dve.vote_a, &mut dve.vote_b);
    }
    let bytes = pb.encode_to_vec();

    assert_eq!(
        Evidence::decode(&bytes),
        Err(WireError::Invalid(EvidenceError::InvalidVoteOrder))
    );
    assert_eq!(
        evidence_from_proto(Some(pb)),
        Err(WireError::Invalid(EvidenceError::InvalidVoteOrder))
    );
}

#[test]
fn test_common_height_must_precede_conflicting_block() {
    assert!(light_client_attack(4, 5).validate_basic().is_ok());

    for common in [0, -3, 5, 6] {
        let ev = light_client_attack(common, 5);
        assert!(ev.validate_basic().is_err(), "common height {} accepted", common);
    }
}

#[test]
fn test_block_commitment() {
    let (_, dve) = duplicate_vote_at_ten();
    let lcae = light_client_attack(2, 4);
    let list: EvidenceList = vec![Evidence::from(dve.clone()), Evidence::from(lcae)]
        .into_iter()
        .collect();

    let params = EvidenceParams::default();
    assert!(params.check_count(list.len()).is_ok());
    assert!(list.validate_basic().is_ok());

    let received = EvidenceList::try_from(list.to_proto().unwrap()).unwrap();
    assert_eq!(received.hash(), list.hash());
    assert!(received.has(&Evidence::from(dve)));

    let (_, unrelated) = duplicate_vote_at_ten();
    assert!(!received.has(&Evidence::from(unrelated)));

    let err = list.check_overflow(1).unwrap_err();
    assert_eq!(err.to_string(), "Too much evidence: Max 1, got 2");
}

#[test]
fn test_json_registry_roundtrip() {
    let mut registry = JsonRegistry::new();
    register_evidence_types(&mut registry).unwrap();

    let ev: Evidence = light_client_attack(1, 3).into();
    let json = registry.to_string_pretty(&ev).unwrap();
    assert!(json.contains("\"atlas/LightClientAttackEvidence\""));

    let back = registry.from_str(&json).unwrap();
    assert_eq!(back.hash(), ev.hash());
}
