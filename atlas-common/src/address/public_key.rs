use std::fmt;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize};

use super::{address::Address, errors::AddressError};
use crate::crypto::hash;

/// Length of an ed25519 public key.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Maximum length of a signature accepted on votes and commits.
pub const MAX_SIGNATURE_SIZE: usize = 64;

/// An ed25519 validator public key.
///
/// Deserialization goes through [`PublicKey::from_bytes`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PublicKey(#[serde(serialize_with = "hex::serde::serialize")] [u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let arr: [u8; PUBLIC_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidPublicKeyLength(bytes.len()))?;
        // Reject points that are not on the curve up front.
        VerifyingKey::from_bytes(&arr)?;
        Ok(PublicKey(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// The validator address this key controls.
    pub fn address(&self) -> Address {
        Address::new(hash::sum_truncated(&self.0))
    }

    /// Verifies an ed25519 signature over `msg`.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> Result<(), AddressError> {
        let key = VerifyingKey::from_bytes(&self.0)?;
        let sig = Signature::from_slice(signature)
            .map_err(|e| AddressError::InvalidSignature(e.to_string()))?;
        key.verify(msg, &sig)
            .map_err(|e| AddressError::InvalidSignature(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = hex::serde::deserialize(deserializer)?;
        PublicKey::from_bytes(&bytes).map_err(de::Error::custom)
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey(key.to_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKeyEd25519{{{}}}", hex::encode_upper(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    #[test]
    fn test_sign_and_verify() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let pk = PublicKey::from(signing_key.verifying_key());

        let msg = b"precommit";
        let sig = signing_key.sign(msg);

        assert!(pk.verify(msg, &sig.to_bytes()).is_ok());
        assert!(pk.verify(b"prevote", &sig.to_bytes()).is_err());
    }

    #[test]
    fn test_address_is_truncated_hash() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let pk = PublicKey::from(signing_key.verifying_key());
        let expected = hash::sum_truncated(pk.as_bytes());
        assert_eq!(pk.address().as_bytes(), &expected[..]);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert_eq!(
            PublicKey::from_bytes(&[1u8; 31]),
            Err(AddressError::InvalidPublicKeyLength(31))
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let pk = PublicKey::from(SigningKey::generate(&mut OsRng).verifying_key());
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", hex::encode(pk.as_bytes())));
        assert_eq!(serde_json::from_str::<PublicKey>(&json).unwrap(), pk);
    }

    #[test]
    fn test_json_rejects_what_from_bytes_rejects() {
        let off_curve = (0u8..=255)
            .map(|b| [b; PUBLIC_KEY_SIZE])
            .find(|bytes| PublicKey::from_bytes(bytes).is_err())
            .unwrap();
        let json = format!("\"{}\"", hex::encode(off_curve));
        assert!(serde_json::from_str::<PublicKey>(&json).is_err());

        let short = format!("\"{}\"", hex::encode([7u8; 31]));
        assert!(serde_json::from_str::<PublicKey>(&short).is_err());
    }
}
