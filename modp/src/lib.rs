//! Prime-order subgroups of `Z_p^*` for safe primes `p = 2q + 1`.
//!
//! This crate provides validated group parameters, a registry of built-in
//! safe primes keyed by modulus bit length, subgroup arithmetic, and helpers
//! for uniform sampling of big integers. All arithmetic uses `num-bigint` and is
//! not constant-time.
//!
//! # Example
//!
//! ```
//! use modp::registry;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let params = registry::lookup(256).expect("256-bit group");
//! let mut rng = StdRng::seed_from_u64(1);
//! let x = params.random_exponent(&mut rng).expect("exponent");
//! assert!(params.is_subgroup_element(&params.pow_g(&x)));
//! ```

mod errors;
mod group;
mod params;
mod random;
pub mod registry;

pub use errors::GroupError;
pub use params::GroupParameters;
pub use random::RandomBigUint;
