//! Error types for group parameter construction and lookup.

use thiserror::Error;

/// Errors raised while building or looking up group parameters.
///
/// All of these are fatal for a session: they are reported before any
/// protocol round runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    /// No built-in safe prime exists for the requested modulus size.
    #[error("unsupported modulus bit length {bits}; supported: {supported:?}")]
    UnsupportedBitLength { bits: usize, supported: Vec<usize> },

    /// A modulus string could not be parsed as hexadecimal.
    #[error("malformed modulus encoding for {bits}-bit group")]
    MalformedModulus { bits: usize },

    /// The `(p, g)` pair does not describe an order-`q` subgroup of a safe-prime group.
    #[error("malformed group parameters: {0}")]
    MalformedParameters(&'static str),

    /// An empty range was passed to the uniform sampler.
    #[error("empty sampling range")]
    EmptyRange,
}
