use std::fmt;

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, PublicKey},
    crypto::{merkle, HashBytes},
    error::{ProtoError, ValidationError},
    proto,
};

/// A member of the validator set with its voting power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub address: Address,
    pub pub_key: PublicKey,
    pub voting_power: i64,
    #[serde(default)]
    pub proposer_priority: i64,
}

impl Validator {
    pub fn new(pub_key: PublicKey, voting_power: i64) -> Self {
        Validator {
            address: pub_key.address(),
            pub_key,
            voting_power,
            proposer_priority: 0,
        }
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.voting_power < 0 {
            return Err(ValidationError::Negative {
                field: "VotingPower",
                got: self.voting_power,
            });
        }

        let expected = self.pub_key.address();
        if self.address != expected {
            return Err(ValidationError::AddressMismatch {
                address: self.address.to_string(),
                expected: expected.to_string(),
            });
        }

        Ok(())
    }

    /// Merkle leaf of this validator: public key and voting power.
    /// The proposer priority changes every round and is left out.
    pub fn bytes(&self) -> Vec<u8> {
        proto::SimpleValidator {
            pub_key: self.pub_key.as_bytes().to_vec(),
            voting_power: self.voting_power,
        }
        .encode_to_vec()
    }

    pub fn to_proto(&self) -> proto::Validator {
        proto::Validator {
            address: self.address.to_vec(),
            pub_key: self.pub_key.as_bytes().to_vec(),
            voting_power: self.voting_power,
            proposer_priority: self.proposer_priority,
        }
    }
}

impl TryFrom<proto::Validator> for Validator {
    type Error = ProtoError;

    fn try_from(pb: proto::Validator) -> Result<Self, Self::Error> {
        let address = Address::try_from(pb.address.as_slice()).map_err(|_| ProtoError::InvalidLength {
            field: "Validator.Address",
            expected: crate::address::ADDRESS_SIZE,
            got: pb.address.len(),
        })?;
        let pub_key = PublicKey::from_bytes(&pb.pub_key)
            .map_err(|e| ProtoError::InvalidPublicKey(e.to_string()))?;

        Ok(Validator {
            address,
            pub_key,
            voting_power: pb.voting_power,
            proposer_priority: pb.proposer_priority,
        })
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validator{{{} {} VP:{} A:{}}}",
            self.address, self.pub_key, self.voting_power, self.proposer_priority
        )
    }
}

/// An ordered set of validators and the current proposer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    pub validators: Vec<Validator>,
    pub proposer: Option<Validator>,
    pub total_voting_power: i64,
}

impl ValidatorSet {
    /// Builds a set, taking the first validator as proposer.
    pub fn new(validators: Vec<Validator>) -> Self {
        let total_voting_power = validators.iter().map(|v| v.voting_power).sum();
        let proposer = validators.first().cloned();
        ValidatorSet {
            validators,
            proposer,
            total_voting_power,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Validator addresses, in set order.
    pub fn addresses(&self) -> Vec<Address> {
        self.validators.iter().map(|v| v.address).collect()
    }

    /// Index and validator owning `address`, if it is in the set.
    pub fn get_by_address(&self, address: &Address) -> Option<(usize, &Validator)> {
        self.validators
            .iter()
            .enumerate()
            .find(|(_, v)| &v.address == address)
    }

    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.validators.is_empty() {
            return Err(ValidationError::EmptyValidatorSet);
        }

        for (idx, val) in self.validators.iter().enumerate() {
            val.validate_basic()
                .map_err(|e| e.context(format!("invalid validator #{}", idx)))?;
        }

        match &self.proposer {
            Some(p) => p
                .validate_basic()
                .map_err(|e| e.context("proposer failed validate basic")),
            None => Err(ValidationError::MissingProposer),
        }
    }

    /// Merkle root over the validators' [`Validator::bytes`], in order.
    pub fn hash(&self) -> HashBytes {
        let leaves: Vec<Vec<u8>> = self.validators.iter().map(Validator::bytes).collect();
        merkle::hash_from_byte_slices(&leaves)
    }

    /// Fails for a non-empty set without a proposer.
    pub fn to_proto(&self) -> Result<proto::ValidatorSet, ProtoError> {
        if self.validators.is_empty() {
            return Ok(proto::ValidatorSet::default());
        }

        let proposer = self
            .proposer
            .as_ref()
            .ok_or(ProtoError::MissingField("ValidatorSet.Proposer"))?;

        Ok(proto::ValidatorSet {
            validators: self.validators.iter().map(Validator::to_proto).collect(),
            proposer: Some(proposer.to_proto()),
            total_voting_power: self.total_voting_power,
        })
    }
}

impl TryFrom<proto::ValidatorSet> for ValidatorSet {
    type Error = ProtoError;

    fn try_from(pb: proto::ValidatorSet) -> Result<Self, Self::Error> {
        let validators = pb
            .validators
            .into_iter()
            .map(Validator::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let proposer = pb.proposer.map(Validator::try_from).transpose()?;

        Ok(ValidatorSet {
            validators,
            proposer,
            total_voting_power: pb.total_voting_power,
        })
    }
}

impl fmt::Display for ValidatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorSet{{")?;
        if let Some(p) = &self.proposer {
            write!(f, "Proposer: {} ", p.address)?;
        }
        write!(f, "Validators: [")?;
        for (i, v) in self.validators.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    fn random_validator(power: i64) -> Validator {
        let key = SigningKey::generate(&mut OsRng);
        Validator::new(PublicKey::from(key.verifying_key()), power)
    }

    #[test]
    fn test_new_set_picks_proposer_and_total() {
        let set = ValidatorSet::new(vec![random_validator(10), random_validator(5)]);
        assert_eq!(set.total_voting_power, 15);
        assert_eq!(set.proposer.as_ref(), set.validators.first());
        assert!(set.validate_basic().is_ok());
    }

    #[test]
    fn test_get_by_address() {
        let a = random_validator(2);
        let b = random_validator(3);
        let set = ValidatorSet::new(vec![a.clone(), b.clone()]);

        assert_eq!(set.get_by_address(&b.address), Some((1, &b)));
        assert!(set.get_by_address(&Address::new([0u8; 20])).is_none());
    }

    #[test]
    fn test_empty_set_is_invalid() {
        let set = ValidatorSet::new(vec![]);
        assert_eq!(set.validate_basic(), Err(ValidationError::EmptyValidatorSet));
    }

    #[test]
    fn test_missing_proposer() {
        let mut set = ValidatorSet::new(vec![random_validator(1)]);
        set.proposer = None;
        assert_eq!(set.validate_basic(), Err(ValidationError::MissingProposer));
        assert_eq!(
            set.to_proto(),
            Err(ProtoError::MissingField("ValidatorSet.Proposer"))
        );
    }

    #[test]
    fn test_address_must_match_key() {
        let mut v = random_validator(1);
        v.address = Address::new([0u8; 20]);
        assert!(matches!(
            v.validate_basic(),
            Err(ValidationError::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_hash_ignores_priority_but_not_order() {
        let a = random_validator(3);
        let b = random_validator(4);
        let set = ValidatorSet::new(vec![a.clone(), b.clone()]);

        let mut shuffled_priority = set.clone();
        shuffled_priority.validators[0].proposer_priority = 99;
        assert_eq!(set.hash(), shuffled_priority.hash());

        let reversed = ValidatorSet::new(vec![b, a]);
        assert_ne!(set.hash(), reversed.hash());
    }

    #[test]
    fn test_proto_roundtrip() {
        let set = ValidatorSet::new(vec![random_validator(7), random_validator(8)]);
        let back = ValidatorSet::try_from(set.to_proto().unwrap()).unwrap();
        assert_eq!(back, set);
    }
}
