//! Session configuration.
//!
//! A [`SessionConfig`] is an immutable value handed to session construction.
//! It derives `serde` traits so callers can keep it in whatever format they
//! already use.

use modp::registry;
use serde::{Deserialize, Serialize};

use crate::errors::KleptoError;
use crate::prf::ciphertext_len;

/// Default number of votes per key bit position before stateless collection stops.
pub const DEFAULT_MIN_SAMPLES_PER_POSITION: u64 = 19;

/// Which party, if any, is subverted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Unmodified protocol, the baseline.
    Honest,
    /// Verifier derives challenges from the previous commitment.
    BiasedChallenge,
    /// Prover chains nonces through the PRF, one key bit per round.
    StatefulCommitment,
    /// Prover rejection-samples commitments once per round.
    StatelessCommitment,
}

/// When a session stops running rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingRule {
    /// Bit length of the secret key plus one round.
    KeyBitsPlusOne,
    /// Exactly this many rounds.
    FixedRounds(usize),
    /// Until every key bit position has at least this many observations.
    MinSamplesPerPosition(u64),
}

impl StoppingRule {
    /// The stopping rule each channel is normally run with.
    pub fn default_for(channel: ChannelKind) -> Self {
        match channel {
            ChannelKind::StatelessCommitment => {
                StoppingRule::MinSamplesPerPosition(DEFAULT_MIN_SAMPLES_PER_POSITION)
            }
            _ => StoppingRule::KeyBitsPlusOne,
        }
    }
}

/// Everything needed to set up one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub modulus_bits: usize,
    pub challenge_bits: usize,
    pub channel: ChannelKind,
    pub stopping: StoppingRule,
}

impl SessionConfig {
    /// A configuration with a 128-bit challenge and the channel's default stopping rule.
    pub fn new(channel: ChannelKind, modulus_bits: usize) -> Self {
        Self {
            modulus_bits,
            challenge_bits: schnorr::DEFAULT_CHALLENGE_BITS,
            channel,
            stopping: StoppingRule::default_for(channel),
        }
    }

    pub fn with_challenge_bits(mut self, challenge_bits: usize) -> Self {
        self.challenge_bits = challenge_bits;
        self
    }

    pub fn with_stopping(mut self, stopping: StoppingRule) -> Self {
        self.stopping = stopping;
        self
    }

    /// Checks the configuration before any key material is generated.
    pub fn validate(&self) -> Result<(), KleptoError> {
        if !registry::supported_bit_lengths().contains(&self.modulus_bits) {
            return Err(KleptoError::Parameter(modp::GroupError::UnsupportedBitLength {
                bits: self.modulus_bits,
                supported: registry::supported_bit_lengths(),
            }));
        }
        if self.challenge_bits == 0 {
            return Err(KleptoError::InvalidConfig("challenge width must be positive"));
        }
        if self.channel == ChannelKind::BiasedChallenge
            && self.challenge_bits.div_ceil(8) > ciphertext_len(self.modulus_bits.div_ceil(8))
        {
            return Err(KleptoError::InvalidConfig(
                "challenge width exceeds the PRF output available for this modulus",
            ));
        }
        match self.stopping {
            StoppingRule::FixedRounds(0) => {
                Err(KleptoError::InvalidConfig("round count must be positive"))
            }
            StoppingRule::MinSamplesPerPosition(0) => {
                Err(KleptoError::InvalidConfig("sample minimum must be positive"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_channel() {
        let stateful = SessionConfig::new(ChannelKind::StatefulCommitment, 256);
        assert_eq!(stateful.challenge_bits, 128);
        assert_eq!(stateful.stopping, StoppingRule::KeyBitsPlusOne);

        let stateless = SessionConfig::new(ChannelKind::StatelessCommitment, 256);
        assert_eq!(stateless.stopping, StoppingRule::MinSamplesPerPosition(19));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = SessionConfig::new(ChannelKind::Honest, 128);
        assert_eq!(base.validate(), Ok(()));

        assert!(matches!(
            SessionConfig::new(ChannelKind::Honest, 100).validate(),
            Err(KleptoError::Parameter(_))
        ));
        assert!(matches!(
            base.clone().with_challenge_bits(0).validate(),
            Err(KleptoError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.clone().with_stopping(StoppingRule::FixedRounds(0)).validate(),
            Err(KleptoError::InvalidConfig(_))
        ));
        assert!(matches!(
            base.with_stopping(StoppingRule::MinSamplesPerPosition(0)).validate(),
            Err(KleptoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_biased_challenge_width_bounded_by_prf_output() {
        let config = SessionConfig::new(ChannelKind::BiasedChallenge, 64);
        assert_eq!(config.validate(), Ok(()));
        assert!(matches!(
            config.with_challenge_bits(256).validate(),
            Err(KleptoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SessionConfig::new(ChannelKind::StatelessCommitment, 512)
            .with_stopping(StoppingRule::MinSamplesPerPosition(25));
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(json.contains("stateless_commitment"));
        let back: SessionConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
