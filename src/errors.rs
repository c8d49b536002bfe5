//! Errors related to proving and verifying inner-product arguments.

/// Represents an error in proof creation, verification, or parsing.
#[derive(Fail, Clone, Debug, Eq, PartialEq)]
pub enum ProofError {
    /// This error occurs when a proof failed to verify.
    #[fail(display = "Proof verification failed.")]
    VerificationError,
    /// This error occurs when the proof encoding is malformed.
    #[fail(display = "Proof data could not be parsed.")]
    FormatError,
    /// This error occurs when two vectors that must be used together
    /// have different lengths.
    #[fail(display = "Paired vectors have mismatched lengths.")]
    VectorLengthMismatch,
    /// This error occurs when an odd-length vector is split in half.
    #[fail(display = "Vector of odd length cannot be split.")]
    InvalidVectorLength,
    /// This error occurs when the requested generator length is not a
    /// power of two.
    #[fail(display = "Invalid generators length, which must be a power of two.")]
    InvalidGeneratorsLength,
    /// This error occurs when a challenge scalar reduces to zero, so its
    /// inverse does not exist. The protocol must be restarted with a
    /// fresh commitment.
    #[fail(display = "Challenge scalar is zero and has no inverse.")]
    NonInvertibleScalar,
}
