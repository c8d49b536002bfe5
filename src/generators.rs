#![allow(non_snake_case)]
//! Public parameter generation.
//!
//! The setup samples two independent base points and two secret scalars,
//! bakes even powers of the secrets into the generator vectors, publishes
//! the squared-power ladders the verifier needs, and erases the secrets.

use clear_on_drop::clear::Clear;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use digest::{ExtendableOutput, Input, XofReader};
use rand::thread_rng;
use rand::RngCore;
use sha3::{Sha3XofReader, Shake256};

use errors::ProofError;
use util::exp_iter;
use vectors::PointVector;

/// The `GeneratorsChain` creates an arbitrary-length sequence of
/// uniformly distributed Ristretto points, deterministically derived
/// from a seed by a Shake256 reader.
struct GeneratorsChain {
    reader: Sha3XofReader,
}

impl GeneratorsChain {
    /// Creates a chain of generators, determined by the hash of `label`.
    fn new(label: &[u8]) -> Self {
        let mut shake = Shake256::default();
        shake.input(b"GeneratorsChain");
        shake.input(label);
        GeneratorsChain {
            reader: shake.xof_result(),
        }
    }
}

impl Iterator for GeneratorsChain {
    type Item = RistrettoPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let mut uniform_bytes = [0u8; 64];
        self.reader.read(&mut uniform_bytes);
        Some(RistrettoPoint::from_uniform_bytes(&uniform_bytes))
    }
}

/// Public parameters shared read-only by the prover and the verifier.
///
/// The generator vectors carry hidden structure: `G_vec[i] = G·α^(2i)`
/// and `H_vec[i] = H·β^(2i)` for setup scalars `α`, `β` that are erased
/// before the constructor returns. The published ladders
/// `alpha_vec[k] = α^(2^(k+1))` and `beta_vec[k] = β^(2^(k+1))` let the
/// verifier reconstruct the single generator left standing after all
/// fold rounds with `O(log n)` scalar work, instead of replaying the
/// fold over the whole vector.
#[derive(Clone, Debug)]
pub struct GipaGens {
    /// Generators for the `a` side of the commitment.
    pub(crate) G_vec: PointVector,
    /// Generators for the `b` side of the commitment.
    pub(crate) H_vec: PointVector,
    /// Squared-power ladder of the `g`-side setup scalar.
    pub(crate) alpha_vec: Vec<Scalar>,
    /// Squared-power ladder of the `h`-side setup scalar.
    pub(crate) beta_vec: Vec<Scalar>,
}

impl GipaGens {
    /// Constructs parameters for arguments over vectors of length
    /// `gens_capacity`, which must be a power of two.
    pub fn new(gens_capacity: usize) -> Result<GipaGens, ProofError> {
        if gens_capacity == 0 || !gens_capacity.is_power_of_two() {
            return Err(ProofError::InvalidGeneratorsLength);
        }
        let lg_n = gens_capacity.trailing_zeros() as usize;

        let mut rng = thread_rng();
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let bases: Vec<RistrettoPoint> = GeneratorsChain::new(&seed).take(2).collect();
        let (G, H) = (bases[0], bases[1]);

        // Toxic setup scalars. Published only as the even powers baked
        // into the vectors and ladders below; erased before return.
        let mut alpha = Scalar::random(&mut rng);
        let mut beta = Scalar::random(&mut rng);

        let alpha_sq = alpha * alpha;
        let beta_sq = beta * beta;

        let G_vec = exp_iter(alpha_sq)
            .take(gens_capacity)
            .map(|e| G * e)
            .collect();
        let H_vec = exp_iter(beta_sq)
            .take(gens_capacity)
            .map(|e| H * e)
            .collect();

        // alpha_vec[k] = α^(2^(k+1)), i.e. successive squarings of α².
        let mut alpha_vec = Vec::with_capacity(lg_n);
        let mut beta_vec = Vec::with_capacity(lg_n);
        let mut a_pow = alpha_sq;
        let mut b_pow = beta_sq;
        for _ in 0..lg_n {
            alpha_vec.push(a_pow);
            beta_vec.push(b_pow);
            a_pow = a_pow * a_pow;
            b_pow = b_pow * b_pow;
        }

        alpha.clear();
        beta.clear();

        Ok(GipaGens {
            G_vec,
            H_vec,
            alpha_vec,
            beta_vec,
        })
    }

    /// The number of generators on each side.
    pub fn len(&self) -> usize {
        self.G_vec.len()
    }

    /// Reconstructs the single `g`-side generator remaining after all
    /// fold rounds, from the *inverted* round challenges in round order.
    ///
    /// Folding `G_vec` directly through challenges `x_1, ..., x_ℓ` (each
    /// round keeping `left + x_i^{-1}·right`) leaves
    /// `G_vec[0] · Π_i (1 + x_i^{-1}·alpha_vec[ℓ-i])`; the factors walk
    /// the ladder in reverse, so the whole fold collapses to `ℓ` scalar
    /// multiplications and one point multiplication.
    pub fn folded_g(&self, challenges_inv: &[Scalar]) -> Result<RistrettoPoint, ProofError> {
        Ok(self.G_vec[0] * self.g_fold_scalar(challenges_inv)?)
    }

    /// Reconstructs the single `h`-side generator remaining after all
    /// fold rounds, from the round challenges in round order.
    pub fn folded_h(&self, challenges: &[Scalar]) -> Result<RistrettoPoint, ProofError> {
        Ok(self.H_vec[0] * self.h_fold_scalar(challenges)?)
    }

    /// The scalar `Π (1 + xᵢ⁻¹·alpha_vec[ℓ-i])` that carries `G_vec[0]`
    /// to the folded `g`-side generator. Split out from `folded_g` so
    /// the verifier can fuse it into its one multiscalar multiplication.
    pub(crate) fn g_fold_scalar(&self, challenges_inv: &[Scalar]) -> Result<Scalar, ProofError> {
        fold_coefficient(&self.alpha_vec, challenges_inv)
    }

    /// The `h`-side counterpart of `g_fold_scalar`.
    pub(crate) fn h_fold_scalar(&self, challenges: &[Scalar]) -> Result<Scalar, ProofError> {
        fold_coefficient(&self.beta_vec, challenges)
    }
}

fn fold_coefficient(ladder: &[Scalar], challenges: &[Scalar]) -> Result<Scalar, ProofError> {
    if challenges.len() != ladder.len() {
        return Err(ProofError::VectorLengthMismatch);
    }
    let mut co = Scalar::one();
    for (x, rung) in challenges.iter().zip(ladder.iter().rev()) {
        co *= Scalar::one() + x * rung;
    }
    Ok(co)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_must_be_a_power_of_two() {
        assert_eq!(GipaGens::new(12).err(), Some(ProofError::InvalidGeneratorsLength));
        assert_eq!(GipaGens::new(0).err(), Some(ProofError::InvalidGeneratorsLength));
        assert!(GipaGens::new(1).is_ok());
        assert!(GipaGens::new(64).is_ok());
    }

    #[test]
    fn ladder_lengths_match_round_count() {
        let gens = GipaGens::new(8).unwrap();
        assert_eq!(gens.len(), 8);
        assert_eq!(gens.alpha_vec.len(), 3);
        assert_eq!(gens.beta_vec.len(), 3);
    }

    #[test]
    fn vectors_step_by_the_first_ladder_rung() {
        // G_vec[i+1] = G_vec[i]·α² and alpha_vec[0] = α², so the public
        // parameters are mutually checkable without the setup scalars.
        let gens = GipaGens::new(8).unwrap();
        for i in 0..7 {
            assert_eq!(gens.G_vec[i + 1], gens.G_vec[i] * gens.alpha_vec[0]);
            assert_eq!(gens.H_vec[i + 1], gens.H_vec[i] * gens.beta_vec[0]);
        }
    }

    #[test]
    fn ladder_rungs_are_successive_squares() {
        let gens = GipaGens::new(16).unwrap();
        for k in 0..3 {
            assert_eq!(gens.alpha_vec[k + 1], gens.alpha_vec[k] * gens.alpha_vec[k]);
            assert_eq!(gens.beta_vec[k + 1], gens.beta_vec[k] * gens.beta_vec[k]);
        }
    }

    #[test]
    fn folded_generators_match_a_direct_fold() {
        let gens = GipaGens::new(16).unwrap();
        let challenges: Vec<Scalar> =
            [2u64, 3, 5, 7].iter().map(|&x| Scalar::from(x)).collect();
        let challenges_inv: Vec<Scalar> = challenges.iter().map(|x| x.invert()).collect();

        let mut g = gens.G_vec.clone();
        let mut h = gens.H_vec.clone();
        for (x, x_inv) in challenges.iter().zip(challenges_inv.iter()) {
            let (g_l, g_r) = g.split().unwrap();
            let (h_l, h_r) = h.split().unwrap();
            g = g_l.fold(&g_r, *x_inv).unwrap();
            h = h_l.fold(&h_r, *x).unwrap();
        }

        assert_eq!(gens.folded_g(&challenges_inv).unwrap(), g[0]);
        assert_eq!(gens.folded_h(&challenges).unwrap(), h[0]);
    }

    #[test]
    fn folded_g_rejects_wrong_challenge_count() {
        let gens = GipaGens::new(8).unwrap();
        let xs = [Scalar::one(); 2];
        assert_eq!(gens.folded_g(&xs).err(), Some(ProofError::VectorLengthMismatch));
    }
}
