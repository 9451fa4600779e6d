//! Schnorr identification over a safe-prime subgroup of `Z_p^*`.
//!
//! This library implements the interactive three-move Schnorr protocol:
//! - The prover commits to `t = g^r mod p` for a fresh nonce `r`
//! - The verifier replies with a challenge `c` in `[1, 2^w - 1]`
//! - The prover answers `z = r - c * x mod q`
//! - The verifier accepts iff `A` is a subgroup element and `t = g^z * A^c mod p`
//!
//! # Example
//!
//! ```
//! use modp::registry;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use schnorr::{DEFAULT_CHALLENGE_BITS, KeyPair, Prover, Transcript, Verifier};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let params = registry::lookup(256).expect("256-bit group");
//! let keys = KeyPair::random(&params, &mut rng).expect("keygen");
//!
//! let verifier = Verifier::new(params.clone(), keys.public_key().clone(), DEFAULT_CHALLENGE_BITS);
//! let mut prover = Prover::new(params, keys);
//!
//! let t = prover.commit(&mut rng).expect("commit");
//! let c = verifier.challenge(&mut rng).expect("challenge");
//! let z = prover.respond(&c).expect("respond");
//!
//! assert!(verifier.validate(&Transcript::new(t, c, z)));
//! ```
//!
//! # Security Considerations
//!
//! - Big-integer exponentiation here is not constant-time
//! - A nonce must never answer two different challenges; the prover enforces this
//! - Validation is only as strong as the group parameters it is given

mod constants;
mod errors;
mod keys;
mod protocol;

#[cfg(test)]
mod tests;

pub use constants::DEFAULT_CHALLENGE_BITS;
pub use errors::SchnorrError;
pub use keys::{KeyPair, PublicKey, SecretKey};
pub use protocol::{Prover, Transcript, Verifier, random_challenge, validate};
