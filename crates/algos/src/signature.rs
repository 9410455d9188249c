//! Normalized graphlet frequency vectors.

use crate::graphlets::{Graphlet, GraphletCounts};

/// The normalized 9-vector summarizing a graph's graphlet composition.
///
/// Signatures are values: immutable after construction. Sampling noise in
/// the underlying counts is absorbed by the normalization, so signatures
/// from sampled counts compare like exact ones.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    vec: [f64; 9],
}

impl Signature {
    pub fn from_counts(counts: &GraphletCounts) -> Self {
        Self {
            vec: counts.normalized(),
        }
    }

    pub(crate) const fn from_raw(vec: [f64; 9]) -> Self {
        Self { vec }
    }

    pub fn as_array(&self) -> &[f64; 9] {
        &self.vec
    }

    pub fn component(&self, graphlet: Graphlet) -> f64 {
        self.vec[graphlet.index()]
    }

    /// True for the signature of an empty graph.
    pub fn is_zero(&self) -> bool {
        self.vec.iter().all(|&v| v == 0.0)
    }

    pub fn edge_ratio(&self) -> f64 {
        self.vec[0]
    }

    pub fn path_ratio(&self) -> f64 {
        self.vec[1] + self.vec[3]
    }

    pub fn star_ratio(&self) -> f64 {
        self.vec[4]
    }

    pub fn triangle_ratio(&self) -> f64 {
        self.vec[2] + self.vec[6] + self.vec[7] + self.vec[8]
    }

    pub fn cycle_ratio(&self) -> f64 {
        self.vec[5]
    }

    /// Cosine similarity in `[0, 1]`; both vectors are non-negative.
    /// Zero if either signature is all-zero.
    pub fn cosine(&self, other: &Signature) -> f64 {
        let dot: f64 = self
            .vec
            .iter()
            .zip(other.vec.iter())
            .map(|(a, b)| a * b)
            .sum();
        let norm = self.norm() * other.norm();
        if norm == 0.0 {
            0.0
        } else {
            dot / norm
        }
    }

    pub fn euclidean(&self, other: &Signature) -> f64 {
        self.vec
            .iter()
            .zip(other.vec.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    fn norm(&self) -> f64 {
        self.vec.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn normalized_components_sum_to_one() {
        let counts = GraphletCounts::new([6, 0, 4, 0, 0, 0, 0, 0, 1], false);
        let sig = Signature::from_counts(&counts);
        let sum: f64 = sig.as_array().iter().sum();
        assert!((sum - 1.0).abs() < EPS);
    }

    #[test]
    fn empty_counts_give_the_zero_vector() {
        let sig = Signature::from_counts(&GraphletCounts::zero());
        assert!(sig.is_zero());
        let sum: f64 = sig.as_array().iter().sum();
        assert_eq!(sum, 0.0);
    }

    #[test]
    fn cosine_with_itself_is_one() {
        let counts = GraphletCounts::new([5, 4, 1, 3, 0, 0, 2, 0, 0], false);
        let sig = Signature::from_counts(&counts);
        assert!((sig.cosine(&sig) - 1.0).abs() < EPS);
    }

    #[test]
    fn cosine_of_disjoint_supports_is_zero() {
        let a = Signature::from_counts(&GraphletCounts::new([1, 0, 2, 0, 0, 0, 0, 0, 0], false));
        let b = Signature::from_counts(&GraphletCounts::new([0, 3, 0, 1, 0, 0, 0, 0, 0], false));
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn cosine_with_the_zero_vector_is_zero() {
        let a = Signature::from_counts(&GraphletCounts::new([1, 1, 0, 0, 0, 0, 0, 0, 0], false));
        let zero = Signature::from_counts(&GraphletCounts::zero());
        assert_eq!(a.cosine(&zero), 0.0);
    }

    #[test]
    fn ratios_partition_the_vector() {
        let counts = GraphletCounts::new([2, 3, 5, 7, 11, 13, 17, 19, 23], false);
        let sig = Signature::from_counts(&counts);
        let covered = sig.edge_ratio()
            + sig.path_ratio()
            + sig.star_ratio()
            + sig.triangle_ratio()
            + sig.cycle_ratio();
        assert!((covered - 1.0).abs() < EPS);
    }

    #[test]
    fn euclidean_distance_of_equal_signatures_is_zero() {
        let counts = GraphletCounts::new([1, 2, 3, 4, 0, 0, 0, 0, 0], false);
        let sig = Signature::from_counts(&counts);
        assert_eq!(sig.euclidean(&sig), 0.0);
    }
}
