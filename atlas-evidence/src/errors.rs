use thiserror::Error;

use atlas_common::error::{ProtoError, ValidationError};

use crate::evidence::{Evidence, EvidenceKind};

/// Reasons a piece of evidence fails basic validation.
///
/// Every variant is recoverable: the caller drops the evidence (and may
/// penalize the peer that sent it).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvidenceError {
    /// A duplicate vote message arrived without one of its votes.
    #[error("one or both of the votes are empty")]
    MissingVote,

    #[error("invalid VoteA: {0}")]
    InvalidVoteA(#[source] ValidationError),

    #[error("invalid VoteB: {0}")]
    InvalidVoteB(#[source] ValidationError),

    /// `VoteA`'s block id key is not strictly smaller than `VoteB`'s.
    #[error("duplicate votes in invalid order")]
    InvalidVoteOrder,

    #[error("conflicting block is nil")]
    NilConflictingBlock,

    #[error("conflicting block missing header")]
    MissingHeader,

    #[error("invalid conflicting light block: {0}")]
    InvalidConflictingBlock(#[source] ValidationError),

    #[error("incorrect common height (#{0} <= 0)")]
    NonPositiveCommonHeight(i64),

    #[error("common height is ahead of the conflicting block height ({common} >= {conflicting})")]
    CommonHeightAhead { common: i64, conflicting: i64 },
}

/// Failures crossing the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("nil evidence")]
    NilEvidence,

    #[error("evidence is not recognized")]
    UnrecognizedEvidenceKind,

    #[error("failed to decode evidence: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("malformed evidence message: {0}")]
    Proto(#[from] ProtoError),

    #[error(transparent)]
    Invalid(#[from] EvidenceError),
}

/// Failures of the schema-tagged JSON encoding.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("evidence type name {0:?} is already registered")]
    DuplicateName(String),

    #[error("evidence kind {0} is already registered")]
    DuplicateKind(EvidenceKind),

    #[error("evidence kind {0} is not registered")]
    UnregisteredKind(EvidenceKind),

    #[error("unknown evidence type {0:?}")]
    UnknownType(String),

    #[error("malformed evidence JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] EvidenceError),
}

/// Wraps a piece of evidence and the error denoting how or why it is invalid.
#[derive(Debug, Clone, Error)]
#[error("Invalid evidence: {source}. Evidence: {evidence}")]
pub struct EvidenceInvalid {
    pub evidence: Box<Evidence>,
    pub source: EvidenceError,
}

impl EvidenceInvalid {
    pub fn new(evidence: Evidence, source: EvidenceError) -> Self {
        EvidenceInvalid {
            evidence: Box::new(evidence),
            source,
        }
    }
}

/// Raised when there is more evidence than allowed in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Too much evidence: Max {max}, got {got}")]
pub struct EvidenceOverflow {
    pub max: usize,
    pub got: usize,
}

impl EvidenceOverflow {
    pub fn new(max: usize, got: usize) -> Self {
        EvidenceOverflow { max, got }
    }
}

/// Invalid evidence parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_age_num_blocks must be positive, got {0}")]
    InvalidMaxAgeNumBlocks(i64),

    #[error("max_age_duration must be positive")]
    InvalidMaxAgeDuration,

    #[error("max_age_duration is out of range, got {0} seconds")]
    MaxAgeDurationTooLarge(i64),

    #[error("max_bytes must be positive, got {0}")]
    InvalidMaxBytes(i64),

    #[error("max_num ({max_num}) * MAX_EVIDENCE_BYTES ({item}) exceeds max_bytes ({max_bytes})")]
    MaxNumTooLarge { max_num: u32, item: i64, max_bytes: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_message_contains_both_numbers() {
        let err = EvidenceOverflow::new(2, 3);
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('3'));
        assert_eq!(msg, "Too much evidence: Max 2, got 3");
    }

    #[test]
    fn test_vote_error_keeps_source() {
        use std::error::Error as _;

        let err = EvidenceError::InvalidVoteA(ValidationError::MissingSignature);
        assert_eq!(err.to_string(), "invalid VoteA: signature is missing");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_common_height_message() {
        let err = EvidenceError::CommonHeightAhead { common: 10, conflicting: 10 };
        assert_eq!(
            err.to_string(),
            "common height is ahead of the conflicting block height (10 >= 10)"
        );
    }

    #[test]
    fn test_wire_error_wraps_validation() {
        let err: WireError = EvidenceError::InvalidVoteOrder.into();
        assert_eq!(err.to_string(), "duplicate votes in invalid order");
        assert_eq!(err, WireError::Invalid(EvidenceError::InvalidVoteOrder));
    }
}
