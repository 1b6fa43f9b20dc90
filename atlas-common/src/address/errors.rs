use ed25519_dalek::SignatureError;
use thiserror::Error;

/// Errors related specifically to validator addresses and keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Address is not exactly 20 bytes.
    #[error("Invalid address length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// Address string is not valid hex.
    #[error("Invalid address encoding: {0}")]
    InvalidHex(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Public key length is not 32 bytes.
    #[error("Invalid public key length: {0}")]
    InvalidPublicKeyLength(usize),

    /// Signature could not be parsed or does not verify.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
}

impl From<SignatureError> for AddressError {
    fn from(err: SignatureError) -> Self {
        AddressError::InvalidPublicKey(err.to_string())
    }
}
