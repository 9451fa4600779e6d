//! Error types for the subversion channels, sessions and run store.

use modp::GroupError;
use schnorr::SchnorrError;
use thiserror::Error;

/// Errors raised by channels, adversaries and sessions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KleptoError {
    /// Unsupported or malformed group parameters. Raised before any round runs.
    #[error("parameter error: {0}")]
    Parameter(#[from] GroupError),

    #[error(transparent)]
    Protocol(#[from] SchnorrError),

    /// A round failed the correctness predicate. The session is aborted.
    #[error("round {round} failed validation; session aborted")]
    ValidationFailure { round: usize },

    /// The chained decoder could not attribute a unique bit to a transcript.
    #[error("decoded bit {position} is ambiguous")]
    DecodeAmbiguity { position: usize },

    /// A bit position has fewer votes than the decoding threshold.
    #[error("position {position} has {observed} observations, {required} required")]
    InsufficientSample {
        position: usize,
        observed: u64,
        required: u64,
    },

    /// Fewer chained bits were decoded than the key has.
    #[error("decoded {decoded} bits but the key has {required}")]
    TooFewDecodedBits { decoded: usize, required: usize },

    /// A PRF input does not fit the fixed input width.
    #[error("PRF input needs {len} bytes but the input width is {max}")]
    PrfInputTooLarge { len: usize, max: usize },

    /// More PRF output was requested than the ciphertext provides.
    #[error("PRF output of {requested} bytes exceeds the {available}-byte ciphertext")]
    PrfOutputTooLong { requested: usize, available: usize },

    #[error("invalid backdoor key encoding: {0}")]
    InvalidBackdoorKey(#[from] hex::FromHexError),

    #[error("invalid session configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Errors raised while persisting or loading runs.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("run record encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("unsupported run record version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("unknown run {0}")]
    UnknownRun(String),

    /// Not of the form `run_` followed by eight lowercase hex digits.
    #[error("malformed run id {0:?}")]
    InvalidRunId(String),
}
