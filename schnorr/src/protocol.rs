//! Prover, verifier and transcript types for the three-move identification protocol.

use modp::{GroupParameters, RandomBigUint};
use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::SchnorrError;
use crate::keys::{KeyPair, PublicKey, SecretKey};

/// One protocol run as seen on the wire: commitment, challenge, response.
///
/// A transcript is valid when `t = g^z * A^c mod p` for the prover's public key `A`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transcript {
    /// The commitment `t = g^r mod p`
    pub t: BigUint,
    /// The verifier's challenge
    pub c: BigUint,
    /// The response `z = r - c * x mod q`
    pub z: BigUint,
}

impl Transcript {
    pub fn new(t: BigUint, c: BigUint, z: BigUint) -> Self {
        Self { t, c, z }
    }
}

/// The proving side of the protocol.
///
/// The prover remembers the nonce of its latest commitment until a response
/// consumes it, so every nonce answers exactly one challenge.
#[derive(Clone, Debug)]
pub struct Prover {
    params: GroupParameters,
    keys: KeyPair,
    nonce: Option<BigUint>,
}

impl Prover {
    pub fn new(params: GroupParameters, keys: KeyPair) -> Self {
        Self {
            params,
            keys,
            nonce: None,
        }
    }

    #[inline]
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }

    /// The prover's own secret, for wrappers that derive nonces from it.
    #[inline]
    pub fn secret_key(&self) -> &SecretKey {
        self.keys.secret_key()
    }

    /// Draws `r` uniformly from `[1, q - 1]` and returns `t = g^r mod p`.
    pub fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, SchnorrError> {
        let r = self.params.random_exponent(rng)?;
        Ok(self.commit_with_nonce(r))
    }

    /// Commits to a caller-chosen nonce `r`, returning `g^r mod p`.
    pub fn commit_with_nonce(&mut self, r: BigUint) -> BigUint {
        let t = self.params.pow_g(&r);
        self.nonce = Some(r);
        t
    }

    /// Answers challenge `c` with `z = (r - c * x) mod q`.
    pub fn respond(&mut self, c: &BigUint) -> Result<BigUint, SchnorrError> {
        let r = self.nonce.take().ok_or(SchnorrError::MissingCommitment)?;
        let cx = c * self.keys.secret_key().as_biguint();
        Ok(self.params.sub_exponents(&r, &cx))
    }
}

/// The honest verifying side of the protocol.
#[derive(Clone, Debug)]
pub struct Verifier {
    params: GroupParameters,
    public_key: PublicKey,
    challenge_bits: usize,
}

impl Verifier {
    pub fn new(params: GroupParameters, public_key: PublicKey, challenge_bits: usize) -> Self {
        Self {
            params,
            public_key,
            challenge_bits,
        }
    }

    #[inline]
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    #[inline]
    pub fn challenge_bits(&self) -> usize {
        self.challenge_bits
    }

    /// Draws a fresh uniform challenge of the configured width.
    pub fn challenge<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BigUint, SchnorrError> {
        random_challenge(rng, self.challenge_bits)
    }

    /// Checks a complete transcript against this verifier's public key.
    pub fn validate(&self, transcript: &Transcript) -> bool {
        validate(
            &self.params,
            &self.public_key,
            &transcript.t,
            &transcript.c,
            &transcript.z,
        )
    }
}

/// Draws a challenge uniformly from `[1, 2^bits - 1]`.
pub fn random_challenge<R: Rng + ?Sized>(
    rng: &mut R,
    bits: usize,
) -> Result<BigUint, SchnorrError> {
    if bits == 0 {
        return Err(SchnorrError::InvalidChallengeWidth);
    }
    let one = BigUint::one();
    let bound = &one << bits;
    Ok(BigUint::random_range(rng, &one, &bound)?)
}

/// The protocol's correctness predicate.
///
/// Returns true only if all of the following hold:
/// - `1 <= A <= p - 1`
/// - `A^q = 1 mod p`
/// - `t = g^z * A^c mod p`
pub fn validate(
    params: &GroupParameters,
    public_key: &PublicKey,
    t: &BigUint,
    c: &BigUint,
    z: &BigUint,
) -> bool {
    if !public_key.is_valid(params) {
        return false;
    }

    let lhs = t % params.p();
    let rhs = params.mul(&params.pow_g(z), &params.pow(public_key.as_biguint(), c));
    lhs == rhs
}
