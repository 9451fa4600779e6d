use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;

use crate::errors::GroupError;

/// Helper trait for sampling uniform big integers.
pub trait RandomBigUint: Sized {
    /// Samples uniformly from `[0, 2^bits)`.
    fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> Self;

    /// Samples uniformly from `[low, high)` by rejection.
    fn random_range<R: Rng + ?Sized>(
        rng: &mut R,
        low: &Self,
        high: &Self,
    ) -> Result<Self, GroupError>;
}

impl RandomBigUint for BigUint {
    fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: u64) -> Self {
        if bits == 0 {
            return BigUint::zero();
        }
        let len = bits.div_ceil(8) as usize;
        let mut bytes = vec![0u8; len];
        rng.fill_bytes(&mut bytes);

        // Clear the bits above `bits` in the leading byte.
        let excess = (len as u64) * 8 - bits;
        bytes[0] &= 0xffu8 >> excess;
        BigUint::from_bytes_be(&bytes)
    }

    fn random_range<R: Rng + ?Sized>(
        rng: &mut R,
        low: &Self,
        high: &Self,
    ) -> Result<Self, GroupError> {
        if low >= high {
            return Err(GroupError::EmptyRange);
        }
        let span = high - low;
        let bits = span.bits();
        loop {
            let candidate = Self::random_bits(rng, bits);
            if candidate < span {
                return Ok(low + candidate);
            }
        }
    }
}
