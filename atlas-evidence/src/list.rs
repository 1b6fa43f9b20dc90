use std::fmt;

use atlas_common::crypto::{merkle, HashBytes};

use crate::{
    errors::{EvidenceInvalid, EvidenceOverflow, WireError},
    evidence::Evidence,
    proto, wire,
};

/// Evidence committed in a block. Order is commitment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceList(Vec<Evidence>);

impl EvidenceList {
    pub fn new(evidence: Vec<Evidence>) -> Self {
        EvidenceList(evidence)
    }

    /// Merkle root over each item's [`Evidence::bytes`].
    /// The empty list hashes to the empty root.
    pub fn hash(&self) -> HashBytes {
        let leaves: Vec<Vec<u8>> = self.0.iter().map(Evidence::bytes).collect();
        merkle::hash_from_byte_slices(&leaves)
    }

    /// Whether an item with the same hash is in the list.
    pub fn has(&self, evidence: &Evidence) -> bool {
        let target = evidence.hash();
        self.0.iter().any(|ev| ev.hash() == target)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Evidence> {
        self.0.iter()
    }

    pub fn push(&mut self, evidence: Evidence) {
        self.0.push(evidence);
    }

    pub fn into_inner(self) -> Vec<Evidence> {
        self.0
    }

    /// Fails when the list carries more than `max` items.
    pub fn check_overflow(&self, max: usize) -> Result<(), EvidenceOverflow> {
        if self.0.len() > max {
            return Err(EvidenceOverflow::new(max, self.0.len()));
        }
        Ok(())
    }

    /// Validates every item, reporting the first invalid one.
    pub fn validate_basic(&self) -> Result<(), EvidenceInvalid> {
        for ev in &self.0 {
            ev.validate_basic()
                .map_err(|e| EvidenceInvalid::new(ev.clone(), e))?;
        }
        Ok(())
    }

    pub fn to_proto(&self) -> Result<proto::EvidenceList, WireError> {
        let evidence = self
            .0
            .iter()
            .map(|ev| wire::evidence_to_proto(Some(ev)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(proto::EvidenceList { evidence })
    }
}

/// Decodes and validates every item.
impl TryFrom<proto::EvidenceList> for EvidenceList {
    type Error = WireError;

    fn try_from(pb: proto::EvidenceList) -> Result<Self, Self::Error> {
        pb.evidence
            .into_iter()
            .map(|ev| wire::evidence_from_proto(Some(ev)))
            .collect()
    }
}

impl From<Vec<Evidence>> for EvidenceList {
    fn from(evidence: Vec<Evidence>) -> Self {
        EvidenceList(evidence)
    }
}

impl FromIterator<Evidence> for EvidenceList {
    fn from_iter<I: IntoIterator<Item = Evidence>>(iter: I) -> Self {
        EvidenceList(iter.into_iter().collect())
    }
}

impl IntoIterator for EvidenceList {
    type Item = Evidence;
    type IntoIter = std::vec::IntoIter<Evidence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a EvidenceList {
    type Item = &'a Evidence;
    type IntoIter = std::slice::Iter<'a, Evidence>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for EvidenceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ev in &self.0 {
            write!(f, "{}\t\t", ev)?;
        }
        Ok(())
    }
}
