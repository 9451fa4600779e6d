//! Long-term key material for the Schnorr identification protocol.

use core::fmt;

use modp::GroupParameters;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::SchnorrError;

/// The prover's secret exponent `x` in `[1, q - 1]`.
///
/// Bits are addressed most-significant first: position `0` is the leading
/// one bit of `x` and position `bit_length() - 1` is its least significant bit.
/// The `Debug` output never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    x: BigUint,
}

/// The public key `A = g^x mod p`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    a: BigUint,
}

/// A secret key together with its public key.
///
/// # Example
///
/// ```
/// use modp::registry;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use schnorr::KeyPair;
///
/// let params = registry::lookup(128).expect("128-bit group");
/// let mut rng = StdRng::seed_from_u64(42);
/// let keys = KeyPair::random(&params, &mut rng).expect("keygen");
/// assert!(keys.public_key().is_valid(&params));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl SecretKey {
    /// Wraps `x`, checking that it lies in `[1, q - 1]`.
    pub fn new(params: &GroupParameters, x: BigUint) -> Result<Self, SchnorrError> {
        if x.is_zero() || &x >= params.q() {
            return Err(SchnorrError::InvalidSecretKey);
        }
        Ok(Self { x })
    }

    /// The raw exponent.
    #[inline]
    pub fn as_biguint(&self) -> &BigUint {
        &self.x
    }

    /// Number of significant bits of `x`.
    #[inline]
    pub fn bit_length(&self) -> usize {
        self.x.bits() as usize
    }

    /// Bit at `position`, counted from the most significant bit.
    ///
    /// Positions wrap modulo `bit_length()`.
    pub fn bit(&self, position: usize) -> bool {
        let n = self.bit_length();
        let position = position % n;
        self.x.bit((n - 1 - position) as u64)
    }

    /// All bits of `x`, most significant first.
    pub fn bits_msb_first(&self) -> Vec<bool> {
        (0..self.bit_length()).map(|i| self.bit(i)).collect()
    }

    /// Derives `A = g^x mod p`.
    pub fn public_key(&self, params: &GroupParameters) -> PublicKey {
        PublicKey {
            a: params.pow_g(&self.x),
        }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("bits", &self.bit_length())
            .finish_non_exhaustive()
    }
}

impl PublicKey {
    /// Wraps a public key value without checking it.
    ///
    /// Use [`PublicKey::is_valid`] before trusting a key from outside.
    pub fn from_biguint(a: BigUint) -> Self {
        Self { a }
    }

    /// The raw group element.
    #[inline]
    pub fn as_biguint(&self) -> &BigUint {
        &self.a
    }

    /// Checks `1 <= A <= p - 1` and `A^q = 1 mod p`.
    #[inline]
    pub fn is_valid(&self, params: &GroupParameters) -> bool {
        params.is_subgroup_element(&self.a)
    }
}

impl KeyPair {
    /// Generates `x` uniformly in `[1, q - 1]` and derives `A`.
    pub fn random<R: Rng + ?Sized>(
        params: &GroupParameters,
        rng: &mut R,
    ) -> Result<Self, SchnorrError> {
        let x = params.random_exponent(rng)?;
        Self::from_secret(params, x)
    }

    /// Builds a key pair from a fixed secret exponent.
    pub fn from_secret(params: &GroupParameters, x: BigUint) -> Result<Self, SchnorrError> {
        let secret = SecretKey::new(params, x)?;
        let public = secret.public_key(params);
        Ok(Self { secret, public })
    }

    #[inline]
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}
