//! Defines a `TranscriptProtocol` trait for using a Merlin transcript.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use merlin::Transcript;

/// Extension trait for the Fiat-Shamir transcript used by provers and
/// verifiers. Both roles must drive the transcript through exactly the
/// same sequence of calls, or the recomputed challenges will differ.
pub trait TranscriptProtocol {
    /// Commit a domain separator for an inner-product argument over
    /// vectors of length `n`.
    fn gipa_domain_sep(&mut self, n: u64);

    /// Commit a `point` with the given `label`.
    fn commit_point(&mut self, label: &'static [u8], point: &CompressedRistretto);

    /// Compute a `label`ed challenge scalar.
    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar;
}

impl TranscriptProtocol for Transcript {
    fn gipa_domain_sep(&mut self, n: u64) {
        self.append_message(b"dom-sep", b"gipa v1");
        self.append_message(b"n", &n.to_le_bytes());
    }

    fn commit_point(&mut self, label: &'static [u8], point: &CompressedRistretto) {
        self.append_message(label, point.as_bytes());
    }

    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        Scalar::from_bytes_mod_order_wide(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::RISTRETTO_BASEPOINT_COMPRESSED;

    #[test]
    fn challenges_are_deterministic() {
        let mut t1 = Transcript::new(b"transcript test");
        let mut t2 = Transcript::new(b"transcript test");

        t1.gipa_domain_sep(8);
        t2.gipa_domain_sep(8);
        t1.commit_point(b"CL", &RISTRETTO_BASEPOINT_COMPRESSED);
        t2.commit_point(b"CL", &RISTRETTO_BASEPOINT_COMPRESSED);

        assert_eq!(t1.challenge_scalar(b"x"), t2.challenge_scalar(b"x"));
    }

    #[test]
    fn challenges_diverge_on_different_commitments() {
        let mut t1 = Transcript::new(b"transcript test");
        let mut t2 = Transcript::new(b"transcript test");

        t1.gipa_domain_sep(8);
        t2.gipa_domain_sep(16);
        t1.commit_point(b"CL", &RISTRETTO_BASEPOINT_COMPRESSED);
        t2.commit_point(b"CL", &RISTRETTO_BASEPOINT_COMPRESSED);

        assert_ne!(t1.challenge_scalar(b"x"), t2.challenge_scalar(b"x"));
    }
}
