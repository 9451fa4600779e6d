//! Subgroup arithmetic over a [`GroupParameters`] instance.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use crate::errors::GroupError;
use crate::params::GroupParameters;
use crate::random::RandomBigUint;

impl GroupParameters {
    /// Computes `g^e mod p`.
    #[inline]
    pub fn pow_g(&self, e: &BigUint) -> BigUint {
        self.g().modpow(e, self.p())
    }

    /// Computes `base^e mod p`.
    #[inline]
    pub fn pow(&self, base: &BigUint, e: &BigUint) -> BigUint {
        base.modpow(e, self.p())
    }

    /// Computes `a * b mod p`.
    #[inline]
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % self.p()
    }

    /// Reduces an exponent modulo the subgroup order.
    #[inline]
    pub fn reduce_exponent(&self, e: &BigUint) -> BigUint {
        e % self.q()
    }

    /// Computes `(a - b) mod q` without leaving the unsigned domain.
    pub fn sub_exponents(&self, a: &BigUint, b: &BigUint) -> BigUint {
        let a = self.reduce_exponent(a);
        let b = self.reduce_exponent(b);
        if a >= b {
            a - b
        } else {
            self.q() - (b - a)
        }
    }

    /// Returns true if `y` is in `[1, p - 1]` and `y^q = 1 mod p`.
    pub fn is_subgroup_element(&self, y: &BigUint) -> bool {
        if y.is_zero() || y >= self.p() {
            return false;
        }
        y.modpow(self.q(), self.p()).is_one()
    }

    /// Draws an exponent uniformly from `[1, q - 1]`.
    pub fn random_exponent<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BigUint, GroupError> {
        BigUint::random_range(rng, &BigUint::one(), self.q())
    }
}
