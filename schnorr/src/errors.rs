//! Error types for the Schnorr identification protocol.

use modp::GroupError;
use thiserror::Error;

/// Errors that can occur while running the identification protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchnorrError {
    /// Group parameter construction or sampling failed.
    #[error(transparent)]
    Group(#[from] GroupError),

    /// A secret key outside `[1, q - 1]` was supplied.
    #[error("secret key must lie in [1, q - 1]")]
    InvalidSecretKey,

    /// A response was requested without an outstanding commitment.
    ///
    /// Each commitment nonce answers exactly one challenge.
    #[error("response requested before commitment")]
    MissingCommitment,

    /// A challenge width of zero bits leaves no valid challenge.
    #[error("challenge width must be at least one bit")]
    InvalidChallengeWidth,
}
