//! Evidence of validator misbehavior for the Atlas consensus engine.
//!
//! Represents, validates, hashes and encodes the proofs that are gossiped
//! between nodes and committed into blocks: duplicate votes and light client
//! attacks. Signature checks against the validator set and the evidence pool
//! itself live elsewhere.

pub mod abci;
pub mod config;
pub mod errors;
pub mod evidence;
pub mod json;
pub mod list;
pub mod proto;
pub mod wire;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use abci::{Misbehavior, MisbehaviorType};
pub use config::EvidenceParams;
pub use errors::{ConfigError, EvidenceError, EvidenceInvalid, EvidenceOverflow, JsonError, WireError};
pub use evidence::{AttackType, DuplicateVoteEvidence, Evidence, EvidenceKind, LightClientAttackEvidence};
pub use json::{register_evidence_types, JsonRegistry};
pub use list::EvidenceList;
pub use wire::{evidence_from_proto, evidence_to_proto};

/// Maximum encoded size of a single piece of evidence, in bytes.
/// Enforced by the pool and block assembly, not by the types here.
pub const MAX_EVIDENCE_BYTES: i64 = 444;
