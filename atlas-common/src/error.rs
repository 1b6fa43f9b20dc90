use thiserror::Error;

/// Stateless validation failures of the consensus value types
/// (votes, block ids, headers, commits, validator sets, light blocks).
///
/// Nested failures keep the offending sub-field in `context` so a caller
/// can log exactly which part of a structure was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("expected {field} size to be {expected} bytes, got {got} bytes")]
    WrongHashLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid vote type: {0}")]
    InvalidVoteType(i32),

    #[error("{field} must be positive, got {got}")]
    NonPositiveHeight { field: &'static str, got: i64 },

    #[error("negative {field}: {got}")]
    Negative { field: &'static str, got: i64 },

    #[error("blockID must be either empty or complete")]
    IncompleteBlockId,

    #[error("signature is missing")]
    MissingSignature,

    #[error("signature is too big (max: {max}, got: {got})")]
    SignatureTooBig { max: usize, got: usize },

    #[error("block version must be {expected}, got {got}")]
    WrongBlockVersion { expected: u64, got: u64 },

    #[error("chainID is too long; got: {got}, max: {max}")]
    ChainIdTooLong { max: usize, got: usize },

    #[error("header belongs to another chain {got:?}, not {expected:?}")]
    WrongChainId { expected: String, got: String },

    #[error("header and commit height mismatch: {header} vs {commit}")]
    HeightMismatch { header: i64, commit: i64 },

    #[error("commit signs block {commit}, header is block {header}")]
    CommitHashMismatch { commit: String, header: String },

    #[error("commit cannot be for nil block")]
    NilCommitBlock,

    #[error("no signatures in commit")]
    EmptyCommit,

    #[error("validator set is nil or empty")]
    EmptyValidatorSet,

    #[error("validator set has no proposer")]
    MissingProposer,

    #[error("validator address {address} does not match public key address {expected}")]
    AddressMismatch { address: String, expected: String },

    #[error("expected validator hash of header to match validator set hash ({header} != {valset})")]
    ValidatorsHashMismatch { header: String, valset: String },
}

impl ValidationError {
    /// Wraps the error with the name of the sub-field that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        ValidationError::Nested {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Failures converting a wire message into its in-memory counterpart
/// (or, for the few fallible encoders, the other way around).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid length for {field}: expected {expected}, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("timestamp out of range: seconds={seconds} nanos={nanos}")]
    InvalidTimestamp { seconds: i64, nanos: i32 },

    #[error("unknown enum value {value} for {field}")]
    UnknownEnumValue { field: &'static str, value: i32 },

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("absent commit signature carries data")]
    AbsentSignatureWithData,

    #[error("negative {field}: {got}")]
    NegativeValue { field: &'static str, got: i64 },
}
