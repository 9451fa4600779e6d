//! Session orchestration: build the parties, run rounds, stop, report.

use std::time::{Duration, Instant};

use modp::{registry, GroupParameters};
use rand::Rng;
use schnorr::{KeyPair, PublicKey, SecretKey, Transcript};
use tracing::{debug, info, warn};

use crate::backdoor::BackdoorKey;
use crate::channel::{
    BiasedChallengeChannel, Channel, HonestChannel, MajorityVoteDecoder,
    StatefulCommitmentChannel, StatelessCommitmentChannel,
};
use crate::config::{ChannelKind, SessionConfig, StoppingRule};
use crate::errors::KleptoError;

/// Ordered transcripts of a finished session and the time each round took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub transcripts: Vec<Transcript>,
    /// Wall-clock time of commit, challenge and response, one entry per round.
    pub timings: Vec<Duration>,
}

impl SessionOutcome {
    #[inline]
    pub fn rounds(&self) -> usize {
        self.transcripts.len()
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().sum()
    }
}

/// One protocol run between a prover and a verifier.
///
/// A session owns its group, key pair, backdoor key and random source, and
/// shares nothing mutable with other sessions. The secret and backdoor keys are
/// reachable only through [`Session::secret_key`] and [`Session::backdoor_key`],
/// which exist for the adversary and the run store.
pub struct Session<R> {
    config: SessionConfig,
    params: GroupParameters,
    keys: KeyPair,
    backdoor: BackdoorKey,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// Validates `config`, looks up its group and draws fresh keys from `rng`.
    pub fn new(config: SessionConfig, mut rng: R) -> Result<Self, KleptoError> {
        config.validate()?;
        let params = registry::lookup(config.modulus_bits)?;
        let keys = KeyPair::random(&params, &mut rng)?;
        let backdoor = BackdoorKey::random(&mut rng);
        Ok(Self {
            config,
            params,
            keys,
            backdoor,
            rng,
        })
    }

    /// Like [`Session::new`] but with caller-chosen keys.
    ///
    /// `keys` must have been built against the configured group.
    pub fn with_keys(
        config: SessionConfig,
        keys: KeyPair,
        backdoor: BackdoorKey,
        rng: R,
    ) -> Result<Self, KleptoError> {
        config.validate()?;
        let params = registry::lookup(config.modulus_bits)?;
        if !keys.public_key().is_valid(&params)
            || keys.secret_key().public_key(&params) != *keys.public_key()
        {
            return Err(schnorr::SchnorrError::InvalidSecretKey.into());
        }
        Ok(Self {
            config,
            params,
            keys,
            backdoor,
            rng,
        })
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }

    /// The prover's secret. Only the run store and evaluation code should need it.
    #[inline]
    pub fn secret_key(&self) -> &SecretKey {
        self.keys.secret_key()
    }

    /// The key shared by the subverted party and the adversary.
    #[inline]
    pub fn backdoor_key(&self) -> &BackdoorKey {
        &self.backdoor
    }

    /// Runs rounds of the configured channel until the stopping rule holds.
    ///
    /// The first round that fails validation aborts the run with
    /// [`KleptoError::ValidationFailure`]; rounds are numbered from one.
    #[tracing::instrument(
        skip_all,
        name = "Session::run",
        fields(channel = ?self.config.channel, bits = self.config.modulus_bits)
    )]
    pub fn run(&mut self) -> Result<SessionOutcome, KleptoError> {
        let challenge_bits = self.config.challenge_bits;
        let keys = self.keys.clone();
        match self.config.channel {
            ChannelKind::Honest => {
                let channel = HonestChannel::new(&self.params, keys, challenge_bits);
                self.drive(channel)
            }
            ChannelKind::BiasedChallenge => {
                let channel =
                    BiasedChallengeChannel::new(&self.params, keys, &self.backdoor, challenge_bits);
                self.drive(channel)
            }
            ChannelKind::StatefulCommitment => {
                let channel = StatefulCommitmentChannel::new(
                    &self.params,
                    keys,
                    &self.backdoor,
                    challenge_bits,
                );
                self.drive(channel)
            }
            ChannelKind::StatelessCommitment => {
                let channel = StatelessCommitmentChannel::new(
                    &self.params,
                    keys,
                    &self.backdoor,
                    challenge_bits,
                );
                self.drive(channel)
            }
        }
    }

    fn drive<C: Channel>(&mut self, mut channel: C) -> Result<SessionOutcome, KleptoError> {
        let key_bits = self.keys.secret_key().bit_length();
        // Sample-driven stopping tallies positions the same way the adversary does.
        let mut tally = match self.config.stopping {
            StoppingRule::MinSamplesPerPosition(_) => Some(MajorityVoteDecoder::new(
                &self.params,
                &self.backdoor,
                key_bits,
            )?),
            _ => None,
        };
        info!(kind = ?channel.kind(), key_bits, "session started");

        let mut transcripts = Vec::new();
        let mut timings = Vec::new();
        while !self.should_stop(transcripts.len(), key_bits, tally.as_ref()) {
            let round = transcripts.len() + 1;

            let start = Instant::now();
            let t = channel.commit(&mut self.rng)?;
            let c = channel.challenge(&mut self.rng, &t)?;
            let z = channel.respond(&c)?;
            let elapsed = start.elapsed();

            let transcript = Transcript::new(t, c, z);
            if !channel.validate(&transcript) {
                warn!(round, "round failed validation, aborting session");
                return Err(KleptoError::ValidationFailure { round });
            }
            if let Some(tally) = tally.as_mut() {
                tally.observe(&transcript.t)?;
            }
            debug!(round, elapsed_us = elapsed.as_micros() as u64, "round complete");

            transcripts.push(transcript);
            timings.push(elapsed);
        }

        let outcome = SessionOutcome {
            transcripts,
            timings,
        };
        info!(
            rounds = outcome.rounds(),
            total_ms = outcome.total_time().as_millis() as u64,
            "session finished"
        );
        Ok(outcome)
    }

    fn should_stop(
        &self,
        rounds: usize,
        key_bits: usize,
        tally: Option<&MajorityVoteDecoder>,
    ) -> bool {
        match self.config.stopping {
            StoppingRule::KeyBitsPlusOne => rounds >= key_bits + 1,
            StoppingRule::FixedRounds(n) => rounds >= n,
            StoppingRule::MinSamplesPerPosition(min) => {
                tally.is_none_or(|tally| tally.is_saturated(min))
            }
        }
    }
}

impl<R> core::fmt::Debug for Session<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("params", &self.params)
            .field("public_key", self.keys.public_key())
            .finish_non_exhaustive()
    }
}
