#![doc = include_str!("../README.md")]

extern crate clear_on_drop;
extern crate curve25519_dalek;
extern crate digest;
extern crate merlin;
extern crate rand;
extern crate serde;
extern crate sha3;
extern crate subtle;

#[macro_use]
extern crate failure;

#[macro_use]
extern crate serde_derive;

mod errors;
mod generators;
mod gipa;
mod transcript;
mod util;
mod vectors;

pub use errors::ProofError;
pub use generators::GipaGens;
pub use gipa::{Commitment, CommitmentKey, GipaProof};
pub use transcript::TranscriptProtocol;
pub use vectors::{inner_product, multiscalar_mul, PointVector, ScalarVector, Vector};
