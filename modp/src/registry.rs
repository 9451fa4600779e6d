//! Built-in safe primes, one per supported modulus bit length.
//!
//! Every entry is a safe prime `p = 2q + 1` of exactly the listed bit length
//! for which `2` generates the order-`q` subgroup (that is, `p = 7 mod 8`).

use num_bigint::BigUint;

use crate::errors::GroupError;
use crate::params::GroupParameters;

/// Generator shared by every built-in group.
pub const GENERATOR: u32 = 2;

// Hex digits, whitespace ignored.
const SAFE_PRIMES: &[(usize, &str)] = &[
    (64, "e3f27bbb 10913397"),
    (128, "d172eb30 979c78cd af815f8e cb026877"),
    (256, "81a0e817 2220f496 5182b5d0 e1cea54e d12e5d88 ea1c04dd ce3150b2 77c857af"),
    (
        512,
        "ab1004f4 9098e160 473ebb3e 9964a4cf 5167cf93 60f6a855 253e418b 4c34f9da
         e53dc1d7 4a9d1d17 a8fbd6e5 6a108fd9 270cf815 8d834a08 d375922c 3fe73b5f",
    ),
    (
        1024,
        "f2804719 d4659489 b879e889 951200a5 acc1f6c0 22d93633 218aeead 32b23700
         def8faf3 eb9441f4 275fae70 78222c1d e986e3d4 d32fee0b c3841348 43e7270f
         b33d2dfa e38f66b1 a2718a45 da13abd4 c9c47b0f 5ec36087 99575401 6423d775
         b2ec966f 2c8a9f99 4e72f4cb 71fc94fd c8cc8142 5deb4519 f9097077 35b8d15f",
    ),
    (
        1536,
        "d4bb46d3 b4ab51da 5512f1a2 d59e1c9e f5add0ea 984c6ac2 d5e29f26 91c3cebb
         2241019c 9be0fcf5 7d9b9951 4f1c5046 22ec7d59 3f3b17a7 f6ebb4eb d8451c07
         800fb6c9 ea47931c 71a8982a 3b361804 e48abd3f 598c6947 48f6a719 74d48817
         c71cf1d4 6faca078 c8bd9516 cf8d92a1 78bd24a4 380c6562 fff69bbb 2c31a840
         b18ac3b9 a0a5271e bcff6678 e912f251 d7708362 c36deebc 449d5140 f41a7240
         fb067401 e34c13fc a05755e0 df900a83 d2127d9f f43ead81 1efa3ccc f8296ee7",
    ),
];

/// Modulus sizes [`lookup`] accepts, ascending.
pub fn supported_bit_lengths() -> Vec<usize> {
    SAFE_PRIMES.iter().map(|(bits, _)| *bits).collect()
}

/// Returns the built-in group for a modulus of `bits` bits.
pub fn lookup(bits: usize) -> Result<GroupParameters, GroupError> {
    let (_, hex) = SAFE_PRIMES
        .iter()
        .find(|(b, _)| *b == bits)
        .ok_or_else(|| GroupError::UnsupportedBitLength {
            bits,
            supported: supported_bit_lengths(),
        })?;
    let digits: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    let p = BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or(GroupError::MalformedModulus { bits })?;
    if p.bits() != bits as u64 {
        return Err(GroupError::MalformedModulus { bits });
    }
    GroupParameters::new(p, BigUint::from(GENERATOR))
}
