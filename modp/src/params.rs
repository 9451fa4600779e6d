//! Safe-prime group parameters `(p, q, g)`.

use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

use crate::errors::GroupError;

/// Parameters of the order-`q` subgroup of `Z_p^*` for a safe prime `p = 2q + 1`.
///
/// Instances are immutable once built and are always validated: `p` is odd,
/// `q = (p - 1) / 2` and `g` lies in the order-`q` subgroup with `1 < g < p`.
/// Primality of `p` and `q` is not re-checked at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupParameters")]
pub struct GroupParameters {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

#[derive(Deserialize)]
struct RawGroupParameters {
    p: BigUint,
    q: BigUint,
    g: BigUint,
}

impl TryFrom<RawGroupParameters> for GroupParameters {
    type Error = GroupError;

    fn try_from(raw: RawGroupParameters) -> Result<Self, Self::Error> {
        let params = GroupParameters::new(raw.p, raw.g)?;
        if params.q != raw.q {
            return Err(GroupError::MalformedParameters("q does not equal (p - 1) / 2"));
        }
        Ok(params)
    }
}

impl GroupParameters {
    /// Builds parameters from a safe prime `p` and a subgroup generator `g`.
    ///
    /// `q` is derived as `(p - 1) / 2`.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self, GroupError> {
        if p <= BigUint::from(3u32) || !p.bit(0) {
            return Err(GroupError::MalformedParameters(
                "modulus must be an odd prime greater than 3",
            ));
        }
        let one = BigUint::one();
        if g <= one || g >= p {
            return Err(GroupError::MalformedParameters(
                "generator must lie in (1, p)",
            ));
        }

        let q: BigUint = (&p - &one) >> 1;
        if g.modpow(&q, &p) != one {
            return Err(GroupError::MalformedParameters(
                "generator is not in the order-q subgroup",
            ));
        }

        Ok(Self { p, q, g })
    }

    /// The safe prime modulus.
    #[inline]
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// The prime subgroup order `(p - 1) / 2`.
    #[inline]
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The subgroup generator.
    #[inline]
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Bit length of `p`.
    #[inline]
    pub fn modulus_bits(&self) -> usize {
        self.p.bits() as usize
    }

    /// Number of bytes needed to hold any residue modulo `p`.
    #[inline]
    pub fn modulus_bytes(&self) -> usize {
        self.modulus_bits().div_ceil(8)
    }
}
