use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Selected trait slot for every layer, in layer order.
///
/// Entry `i` is the slot index of the trait chosen for layer `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitVector(Vec<usize>);

impl TraitVector {
    pub fn new(slots: Vec<usize>) -> Self {
        Self(slots)
    }

    /// Number of layers covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slot selected for `layer`, if the vector covers it.
    pub fn get(&self, layer: usize) -> Option<usize> {
        self.0.get(layer).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().copied().enumerate()
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Compact fingerprint: each slot as three zero-padded decimal digits.
    ///
    /// Slots above 999 widen their field rather than truncate.
    pub fn code(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 3);
        for slot in &self.0 {
            // Writing into a String cannot fail.
            let _ = write!(out, "{slot:03}");
        }
        out
    }
}

impl From<Vec<usize>> for TraitVector {
    fn from(slots: Vec<usize>) -> Self {
        Self(slots)
    }
}

impl FromIterator<usize> for TraitVector {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_zero_padded() {
        let v = TraitVector::new(vec![0, 7, 42, 123]);
        assert_eq!(v.code(), "000007042123");
    }

    #[test]
    fn empty_vector_has_empty_code() {
        assert_eq!(TraitVector::default().code(), "");
    }

    #[test]
    fn iter_yields_layer_and_slot() {
        let v = TraitVector::new(vec![3, 1]);
        let pairs: Vec<_> = v.iter().collect();
        assert_eq!(pairs, vec![(0, 3), (1, 1)]);
    }

    #[test]
    fn serde_is_a_plain_array() {
        let v = TraitVector::new(vec![1, 2, 3]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1,2,3]");
    }
}
