#![allow(non_snake_case)]
#![doc = include_str!("../docs/gipa-protocol.md")]

use std::iter;

use clear_on_drop::clear::Clear;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, VartimeMultiscalarMul};
use merlin::Transcript;
use rand::thread_rng;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

use errors::ProofError;
use generators::GipaGens;
use transcript::TranscriptProtocol;
use util::read32;
use vectors::{inner_product, PointVector, ScalarVector};

/// The prover's secret witness: the scalar vectors bound by a
/// commitment. Consumed by proof creation and never shared.
#[derive(Clone, Debug)]
pub struct CommitmentKey {
    pub(crate) a: ScalarVector,
    pub(crate) b: ScalarVector,
}

impl CommitmentKey {
    /// Wraps the witness vectors `a` and `b`.
    ///
    /// Length agreement is checked where the key is used, so that a
    /// mismatched key is reported by `Commitment::create` rather than
    /// silently truncated here.
    pub fn new(a: ScalarVector, b: ScalarVector) -> CommitmentKey {
        CommitmentKey { a, b }
    }
}

/// Overwrite secrets with null bytes when they go out of scope.
impl Drop for CommitmentKey {
    fn drop(&mut self) {
        for e in self.a.as_mut_slice().iter_mut() {
            e.clear();
        }
        for e in self.b.as_mut_slice().iter_mut() {
            e.clear();
        }
    }
}

/// A binding commitment \\(C = \langle a, g \rangle + \langle b, h \rangle
/// + \langle a, b \rangle Q\\) to a commitment key, together with the
/// fresh per-commitment generator \\(Q\\).
///
/// Downstream layers treat this as an opaque pair of group elements.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Commitment {
    pub(crate) Q: RistrettoPoint,
    pub(crate) C: RistrettoPoint,
}

impl Commitment {
    /// Commits to `ck` under `gens`, sampling a fresh generator `Q`.
    ///
    /// Fails with `VectorLengthMismatch` unless `ck.a`, `ck.b`, and the
    /// generator vectors all have the same length.
    pub fn create(gens: &GipaGens, ck: &CommitmentKey) -> Result<Commitment, ProofError> {
        if ck.a.len() != ck.b.len() || ck.a.len() != gens.len() {
            return Err(ProofError::VectorLengthMismatch);
        }

        let z = inner_product(&ck.a, &ck.b)?;
        let Q = RistrettoPoint::random(&mut thread_rng());
        let C = RistrettoPoint::vartime_multiscalar_mul(
            ck.a.iter().chain(ck.b.iter()).chain(iter::once(&z)),
            gens.G_vec
                .iter()
                .chain(gens.H_vec.iter())
                .chain(iter::once(&Q)),
        );

        Ok(Commitment { Q, C })
    }

    /// Serializes the commitment as 64 bytes: `Q` then `C`, compressed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(self.Q.compress().as_bytes());
        buf.extend_from_slice(self.C.compress().as_bytes());
        buf
    }

    /// Deserializes a commitment from 64 bytes.
    pub fn from_bytes(slice: &[u8]) -> Result<Commitment, ProofError> {
        if slice.len() != 64 {
            return Err(ProofError::FormatError);
        }
        let Q = CompressedRistretto(read32(slice))
            .decompress()
            .ok_or(ProofError::FormatError)?;
        let C = CompressedRistretto(read32(&slice[32..]))
            .decompress()
            .ok_or(ProofError::FormatError)?;
        Ok(Commitment { Q, C })
    }
}

impl PartialEq for Commitment {
    fn eq(&self, other: &Commitment) -> bool {
        (self.Q.ct_eq(&other.Q) & self.C.ct_eq(&other.C)).into()
    }
}

impl Eq for Commitment {}

/// A logarithmic-size argument of knowledge of the commitment key
/// behind a `Commitment`: the chain of per-round cross commitments plus
/// the two scalars left after the final fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GipaProof {
    pub(crate) CL_vec: Vec<CompressedRistretto>,
    pub(crate) CR_vec: Vec<CompressedRistretto>,
    pub(crate) a: Scalar,
    pub(crate) b: Scalar,
}

/// State carried between fold rounds: the current witness halves, the
/// current generator halves, and the running commitment. Each round
/// consumes the previous state and returns a fresh one of half the
/// length, so no vector is ever mutated in place.
struct RoundState {
    a: ScalarVector,
    b: ScalarVector,
    G: PointVector,
    H: PointVector,
    C: RistrettoPoint,
}

impl RoundState {
    /// Runs one halving round: commit the cross terms, derive the round
    /// challenge, fold everything.
    fn fold_round(
        self,
        transcript: &mut Transcript,
        Q: &RistrettoPoint,
    ) -> Result<(RoundState, CompressedRistretto, CompressedRistretto), ProofError> {
        let RoundState { a, b, G, H, C } = self;

        let (a_L, a_R) = a.split()?;
        let (b_L, b_R) = b.split()?;
        let (G_L, G_R) = G.split()?;
        let (H_L, H_R) = H.split()?;

        let z_L = inner_product(&a_R, &b_L)?;
        let z_R = inner_product(&a_L, &b_R)?;

        let CL = RistrettoPoint::vartime_multiscalar_mul(
            a_R.iter().chain(b_L.iter()).chain(iter::once(&z_L)),
            G_L.iter().chain(H_R.iter()).chain(iter::once(Q)),
        );
        let CR = RistrettoPoint::vartime_multiscalar_mul(
            a_L.iter().chain(b_R.iter()).chain(iter::once(&z_R)),
            G_R.iter().chain(H_L.iter()).chain(iter::once(Q)),
        );

        let CL_compressed = CL.compress();
        let CR_compressed = CR.compress();

        transcript.commit_point(b"CL", &CL_compressed);
        transcript.commit_point(b"CR", &CR_compressed);

        let x = transcript.challenge_scalar(b"x");
        if x == Scalar::zero() {
            return Err(ProofError::NonInvertibleScalar);
        }
        let x_inv = x.invert();

        let next = RoundState {
            a: a_L.fold(&a_R, x)?,
            b: b_L.fold(&b_R, x_inv)?,
            G: G_L.fold(&G_R, x_inv)?,
            H: H_L.fold(&H_R, x)?,
            C: RistrettoPoint::vartime_multiscalar_mul(
                &[x, Scalar::one(), x_inv],
                &[CL, C, CR],
            ),
        };

        Ok((next, CL_compressed, CR_compressed))
    }
}

impl GipaProof {
    /// Create an inner-product argument for `commitment`, consuming the
    /// commitment key.
    ///
    /// The witness vectors must match `gens` in length; the length is a
    /// power of two by construction of `GipaGens`, and the resulting
    /// chain holds exactly its base-2 logarithm of cross-commitment
    /// pairs.
    pub fn create(
        transcript: &mut Transcript,
        gens: &GipaGens,
        commitment: &Commitment,
        ck: CommitmentKey,
    ) -> Result<GipaProof, ProofError> {
        let n = gens.len();
        if ck.a.len() != ck.b.len() || ck.a.len() != n {
            return Err(ProofError::VectorLengthMismatch);
        }

        transcript.gipa_domain_sep(n as u64);

        let lg_n = n.trailing_zeros() as usize;
        let mut CL_vec = Vec::with_capacity(lg_n);
        let mut CR_vec = Vec::with_capacity(lg_n);

        let mut state = RoundState {
            a: ck.a.clone(),
            b: ck.b.clone(),
            G: gens.G_vec.clone(),
            H: gens.H_vec.clone(),
            C: commitment.C,
        };

        while state.a.len() > 1 {
            let (next, CL, CR) = state.fold_round(transcript, &commitment.Q)?;
            CL_vec.push(CL);
            CR_vec.push(CR);
            state = next;
        }

        Ok(GipaProof {
            CL_vec,
            CR_vec,
            a: state.a[0],
            b: state.b[0],
        })
    }

    /// The number of fold rounds recorded in the proof chain.
    pub fn rounds(&self) -> usize {
        self.CL_vec.len()
    }

    /// Recomputes the round challenges and their inverses by replaying
    /// the transcript against the proof's cross commitments.
    ///
    /// This is the verifier's only pass over the chain and costs
    /// `O(log n)` work regardless of how a dishonest prover folded.
    pub(crate) fn verification_scalars(
        &self,
        n: usize,
        transcript: &mut Transcript,
    ) -> Result<(Vec<Scalar>, Vec<Scalar>), ProofError> {
        let lg_n = self.CL_vec.len();
        if lg_n >= 32 {
            return Err(ProofError::VerificationError);
        }
        if n != (1 << lg_n) {
            return Err(ProofError::VerificationError);
        }

        transcript.gipa_domain_sep(n as u64);

        let mut challenges = Vec::with_capacity(lg_n);
        for (CL, CR) in self.CL_vec.iter().zip(self.CR_vec.iter()) {
            transcript.commit_point(b"CL", CL);
            transcript.commit_point(b"CR", CR);
            let x = transcript.challenge_scalar(b"x");
            if x == Scalar::zero() {
                return Err(ProofError::NonInvertibleScalar);
            }
            challenges.push(x);
        }

        let mut challenges_inv = challenges.clone();
        Scalar::batch_invert(&mut challenges_inv);

        Ok((challenges, challenges_inv))
    }

    /// Verifies the argument against `commitment`.
    ///
    /// The folded commitment is accumulated from the proof chain and
    /// the two final generators are reconstructed from the exponent
    /// ladders, so the generator vectors are never folded and the whole
    /// check is a single multiscalar multiplication of `2·log n + 4`
    /// terms.
    pub fn verify(
        &self,
        transcript: &mut Transcript,
        gens: &GipaGens,
        commitment: &Commitment,
    ) -> Result<(), ProofError> {
        let (challenges, challenges_inv) = self.verification_scalars(gens.len(), transcript)?;

        let co_g = gens.g_fold_scalar(&challenges_inv)?;
        let co_h = gens.h_fold_scalar(&challenges)?;

        let CLs = self
            .CL_vec
            .iter()
            .map(|p| p.decompress().ok_or(ProofError::VerificationError))
            .collect::<Result<Vec<_>, _>>()?;
        let CRs = self
            .CR_vec
            .iter()
            .map(|p| p.decompress().ok_or(ProofError::VerificationError))
            .collect::<Result<Vec<_>, _>>()?;

        // With C' the chain-folded commitment and g', h' the ladder
        // generators, the acceptance condition a·g' + b·h' + (a·b)·Q = C'
        // becomes a single identity test:
        //   a·co_g·g[0] + b·co_h·h[0] + (a·b)·Q − C − Σ xᵢ·CLᵢ − Σ xᵢ⁻¹·CRᵢ = 0
        let check = RistrettoPoint::vartime_multiscalar_mul(
            iter::once(self.a * co_g)
                .chain(iter::once(self.b * co_h))
                .chain(iter::once(self.a * self.b))
                .chain(iter::once(-Scalar::one()))
                .chain(challenges.iter().map(|x| -x))
                .chain(challenges_inv.iter().map(|x| -x)),
            iter::once(&gens.G_vec[0])
                .chain(iter::once(&gens.H_vec[0]))
                .chain(iter::once(&commitment.Q))
                .chain(iter::once(&commitment.C))
                .chain(CLs.iter())
                .chain(CRs.iter()),
        );

        if check.is_identity() {
            Ok(())
        } else {
            Err(ProofError::VerificationError)
        }
    }

    /// Returns the size in bytes required to serialize the proof.
    pub fn serialized_size(&self) -> usize {
        (self.CL_vec.len() * 2 + 2) * 32
    }

    /// Serializes the proof into a byte array of \\(2n+2\\) 32-byte
    /// elements: \\(n\\) pairs of compressed points
    /// \\(CL_0, CR_0, \dots, CL_{n-1}, CR_{n-1}\\), then the two final
    /// scalars \\(a, b\\).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        for (l, r) in self.CL_vec.iter().zip(self.CR_vec.iter()) {
            buf.extend_from_slice(l.as_bytes());
            buf.extend_from_slice(r.as_bytes());
        }
        buf.extend_from_slice(self.a.as_bytes());
        buf.extend_from_slice(self.b.as_bytes());
        buf
    }

    /// Deserializes the proof from a byte slice. Returns an error in
    /// the following cases:
    /// * the slice does not hold \\(2n+2\\) 32-byte elements,
    /// * \\(n\\) is larger or equal to 32 (proof is too big),
    /// * either of the 2 scalars is not canonical modulo the group order.
    pub fn from_bytes(slice: &[u8]) -> Result<GipaProof, ProofError> {
        let b = slice.len();
        if b % 32 != 0 {
            return Err(ProofError::FormatError);
        }
        let num_elements = b / 32;
        if num_elements < 2 {
            return Err(ProofError::FormatError);
        }
        if (num_elements - 2) % 2 != 0 {
            return Err(ProofError::FormatError);
        }
        let lg_n = (num_elements - 2) / 2;
        if lg_n >= 32 {
            return Err(ProofError::FormatError);
        }

        let mut CL_vec = Vec::with_capacity(lg_n);
        let mut CR_vec = Vec::with_capacity(lg_n);
        for i in 0..lg_n {
            let pos = 2 * i * 32;
            CL_vec.push(CompressedRistretto(read32(&slice[pos..])));
            CR_vec.push(CompressedRistretto(read32(&slice[pos + 32..])));
        }

        let pos = 2 * lg_n * 32;
        let a =
            Scalar::from_canonical_bytes(read32(&slice[pos..])).ok_or(ProofError::FormatError)?;
        let b = Scalar::from_canonical_bytes(read32(&slice[pos + 32..]))
            .ok_or(ProofError::FormatError)?;

        Ok(GipaProof { CL_vec, CR_vec, a, b })
    }
}

impl Serialize for GipaProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes()[..])
    }
}

impl<'de> Deserialize<'de> for GipaProof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GipaProofVisitor;

        impl<'de> Visitor<'de> for GipaProofVisitor {
            type Value = GipaProof;

            fn expecting(&self, formatter: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                formatter.write_str("a valid GipaProof")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<GipaProof, E>
            where
                E: ::serde::de::Error,
            {
                GipaProof::from_bytes(v).map_err(::serde::de::Error::custom)
            }
        }

        deserializer.deserialize_bytes(GipaProofVisitor)
    }
}
