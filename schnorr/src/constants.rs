//! Constants used by the Schnorr identification protocol.

/// Default bit width of verifier challenges.
///
/// Challenges are drawn from `[1, 2^128 - 1]`.
pub const DEFAULT_CHALLENGE_BITS: usize = 128;
