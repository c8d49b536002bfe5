//! Fixed-length scalar and point sequences with the splitting, scaling,
//! and folding operations used by the recursive argument.
//!
//! A single generic container covers both element types: the protocol
//! manipulates `ScalarVector`s (witness halves) and `PointVector`s
//! (generator halves) through the same operations, so the element type is
//! a type parameter rather than a pair of near-identical structs.

use std::iter::FromIterator;
use std::ops::{Add, Index, Mul};
use std::slice;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;

use errors::ProofError;

/// An ordered, fixed-length sequence of protocol elements.
///
/// All binary operations require equal-length operands and fail with
/// `ProofError::VectorLengthMismatch` otherwise; lengths are never
/// silently truncated or padded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector<T> {
    elems: Vec<T>,
}

/// A vector of scalars mod the Ristretto group order.
pub type ScalarVector = Vector<Scalar>;

/// A vector of Ristretto points.
pub type PointVector = Vector<RistrettoPoint>;

impl<T> Vector<T> {
    /// The number of elements in the vector.
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Returns an iterator over the elements.
    pub fn iter(&self) -> slice::Iter<T> {
        self.elems.iter()
    }

    /// Splits an even-length vector into its first and second halves.
    ///
    /// Splitting an odd-length vector is a protocol violation, not a
    /// recoverable condition, so this fails rather than padding.
    pub fn split(mut self) -> Result<(Vector<T>, Vector<T>), ProofError> {
        if self.elems.len() % 2 != 0 {
            return Err(ProofError::InvalidVectorLength);
        }
        let half = self.elems.len() / 2;
        let right = self.elems.split_off(half);
        Ok((Vector { elems: self.elems }, Vector { elems: right }))
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.elems[..]
    }
}

impl<T: Copy + Add<Output = T>> Vector<T> {
    /// Elementwise sum of two equal-length vectors.
    pub fn add_vec(&self, other: &Vector<T>) -> Result<Vector<T>, ProofError> {
        if self.len() != other.len() {
            return Err(ProofError::VectorLengthMismatch);
        }
        Ok(self
            .iter()
            .zip(other.iter())
            .map(|(l, r)| *l + *r)
            .collect())
    }
}

impl<T: Copy + Mul<Scalar, Output = T>> Vector<T> {
    /// Scales every element by `x`.
    pub fn scale(&self, x: Scalar) -> Vector<T> {
        self.iter().map(|e| *e * x).collect()
    }
}

impl<T: Copy + Add<Output = T> + Mul<Scalar, Output = T>> Vector<T> {
    /// Folds `self` (a left half) with `right` under the challenge `x`,
    /// producing `out[i] = self[i] + x * right[i]`.
    pub fn fold(&self, right: &Vector<T>, x: Scalar) -> Result<Vector<T>, ProofError> {
        if self.len() != right.len() {
            return Err(ProofError::VectorLengthMismatch);
        }
        Ok(self
            .iter()
            .zip(right.iter())
            .map(|(l, r)| *l + *r * x)
            .collect())
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(elems: Vec<T>) -> Vector<T> {
        Vector { elems }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Vector<T> {
        Vector {
            elems: iter.into_iter().collect(),
        }
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elems[index]
    }
}

/// Computes `\sum a_i * b_i` mod the group order.
pub fn inner_product(a: &ScalarVector, b: &ScalarVector) -> Result<Scalar, ProofError> {
    if a.len() != b.len() {
        return Err(ProofError::VectorLengthMismatch);
    }
    let mut out = Scalar::zero();
    for (a_i, b_i) in a.iter().zip(b.iter()) {
        out += a_i * b_i;
    }
    Ok(out)
}

/// Computes `\sum scalars_i * points_i` as a single variable-time
/// multiscalar multiplication. This is the dominant cost of committing
/// and of the first rounds of proving.
pub fn multiscalar_mul(
    scalars: &ScalarVector,
    points: &PointVector,
) -> Result<RistrettoPoint, ProofError> {
    if scalars.len() != points.len() {
        return Err(ProofError::VectorLengthMismatch);
    }
    Ok(RistrettoPoint::vartime_multiscalar_mul(
        scalars.iter(),
        points.iter(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;

    fn scalar_fixture() -> ScalarVector {
        (1u64..9).map(Scalar::from).collect()
    }

    fn point_fixture() -> PointVector {
        (1u64..9)
            .map(|i| RISTRETTO_BASEPOINT_POINT * Scalar::from(i))
            .collect()
    }

    #[test]
    fn split_halves_an_even_vector() {
        let (left, right) = scalar_fixture().split().unwrap();
        assert_eq!(left, (1u64..5).map(Scalar::from).collect());
        assert_eq!(right, (5u64..9).map(Scalar::from).collect());
    }

    #[test]
    fn split_rejects_odd_length() {
        let v = ScalarVector::from(vec![Scalar::one(); 3]);
        assert_eq!(v.split(), Err(ProofError::InvalidVectorLength));
    }

    #[test]
    fn add_vec_is_elementwise() {
        let v = scalar_fixture();
        let doubled: ScalarVector = (1u64..9).map(|i| Scalar::from(2 * i)).collect();
        assert_eq!(v.add_vec(&v).unwrap(), doubled);
    }

    #[test]
    fn add_vec_rejects_mismatched_lengths() {
        let v = scalar_fixture();
        let w: ScalarVector = (0u64..4).map(Scalar::from).collect();
        assert_eq!(v.add_vec(&w), Err(ProofError::VectorLengthMismatch));
    }

    #[test]
    fn scale_points_by_scalar() {
        let v = point_fixture();
        let doubled: PointVector = v.iter().map(|p| p * Scalar::from(2u64)).collect();
        assert_eq!(v.scale(Scalar::from(2u64)), doubled);
    }

    #[test]
    fn fold_combines_halves() {
        let (left, right) = scalar_fixture().split().unwrap();
        let x = Scalar::from(3u64);
        let folded = left.fold(&right, x).unwrap();
        for i in 0..4 {
            assert_eq!(folded[i], left[i] + x * right[i]);
        }
    }

    #[test]
    fn inner_product_of_fixture_is_sum_of_squares() {
        let v = scalar_fixture();
        let expected = Scalar::from((1u64..9).map(|i| i * i).sum::<u64>());
        assert_eq!(inner_product(&v, &v).unwrap(), expected);
    }

    #[test]
    fn inner_product_rejects_mismatched_lengths() {
        let v = scalar_fixture();
        let w: ScalarVector = (0u64..4).map(Scalar::from).collect();
        assert_eq!(inner_product(&v, &w), Err(ProofError::VectorLengthMismatch));
    }

    #[test]
    fn multiscalar_mul_matches_sum_of_squares() {
        let v = scalar_fixture();
        let p = point_fixture();
        let expected =
            RISTRETTO_BASEPOINT_POINT * Scalar::from((1u64..9).map(|i| i * i).sum::<u64>());
        assert_eq!(multiscalar_mul(&v, &p).unwrap(), expected);
    }
}
