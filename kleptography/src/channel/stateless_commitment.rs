//! Prover-side subversion by single-retry rejection sampling.
//!
//! The PRF of a commitment names a key bit position and a guess for that bit.
//! The prover keeps a commitment whose guess is right and otherwise redraws
//! once, publishing the second commitment unconditionally. Published guesses
//! are right about three times in four, which a majority vote over many rounds
//! turns into the key.

use std::collections::BTreeMap;

use modp::GroupParameters;
use num_bigint::BigUint;
use rand::Rng;
use schnorr::{KeyPair, Prover, Transcript, Verifier};
use tracing::debug;

use super::Channel;
use crate::backdoor::BackdoorKey;
use crate::config::ChannelKind;
use crate::errors::KleptoError;
use crate::prf::PrfOracle;

/// Number of least-observed positions listed in [`VoteDiagnostics`].
const LEAST_OBSERVED: usize = 5;

/// Subverted prover that rejection-samples its commitment, paired with an honest verifier.
#[derive(Clone, Debug)]
pub struct StatelessCommitmentChannel {
    prover: Prover,
    verifier: Verifier,
    prf: PrfOracle,
    rounds: usize,
    first_trial_accepted: usize,
}

impl StatelessCommitmentChannel {
    pub fn new(
        params: &GroupParameters,
        keys: KeyPair,
        backdoor: &BackdoorKey,
        challenge_bits: usize,
    ) -> Self {
        let verifier = Verifier::new(params.clone(), keys.public_key().clone(), challenge_bits);
        Self {
            prover: Prover::new(params.clone(), keys),
            verifier,
            prf: PrfOracle::for_group(backdoor, params),
            rounds: 0,
            first_trial_accepted: 0,
        }
    }

    /// Commitments produced so far.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Rounds whose first trial commitment already matched and was kept.
    #[inline]
    pub fn accepted_first_trial(&self) -> usize {
        self.first_trial_accepted
    }
}

impl Channel for StatelessCommitmentChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::StatelessCommitment
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, KleptoError> {
        self.rounds += 1;
        let key_bits = self.prover.secret_key().bit_length();

        let t = self.prover.commit(rng)?;
        let (position, guess) = self.prf.position_and_bit(&t, key_bits)?;
        if self.prover.secret_key().bit(position) == guess {
            self.first_trial_accepted += 1;
            return Ok(t);
        }

        // One retry, kept whatever its guess says.
        Ok(self.prover.commit(rng)?)
    }

    fn challenge<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        _commitment: &BigUint,
    ) -> Result<BigUint, KleptoError> {
        Ok(self.verifier.challenge(rng)?)
    }

    fn respond(&mut self, c: &BigUint) -> Result<BigUint, KleptoError> {
        Ok(self.prover.respond(c)?)
    }

    fn validate(&self, transcript: &Transcript) -> bool {
        self.verifier.validate(transcript)
    }
}

/// Adversary for [`StatelessCommitmentChannel`].
///
/// Keeps one signed vote counter and one observation count per key bit
/// position. A position decodes to one iff its counter is strictly positive,
/// so a tied or empty position decodes to zero.
#[derive(Clone, Debug)]
pub struct MajorityVoteDecoder {
    prf: PrfOracle,
    counters: Vec<i64>,
    observations: Vec<u64>,
}

impl MajorityVoteDecoder {
    /// `key_bits` is the bit length `N` of the secret key being recovered.
    pub fn new(
        params: &GroupParameters,
        backdoor: &BackdoorKey,
        key_bits: usize,
    ) -> Result<Self, KleptoError> {
        if key_bits == 0 {
            return Err(KleptoError::InvalidConfig("key bit length must be positive"));
        }
        Ok(Self {
            prf: PrfOracle::for_group(backdoor, params),
            counters: vec![0; key_bits],
            observations: vec![0; key_bits],
        })
    }

    #[inline]
    pub fn key_bits(&self) -> usize {
        self.counters.len()
    }

    /// Records the vote carried by commitment `t`, returning its position.
    pub fn observe(&mut self, t: &BigUint) -> Result<usize, KleptoError> {
        let (position, bit) = self.prf.position_and_bit(t, self.key_bits())?;
        self.counters[position] += if bit { 1 } else { -1 };
        self.observations[position] += 1;
        Ok(position)
    }

    #[tracing::instrument(skip_all, name = "MajorityVoteDecoder::observe_all")]
    pub fn observe_all(&mut self, transcripts: &[Transcript]) -> Result<(), KleptoError> {
        for transcript in transcripts {
            self.observe(&transcript.t)?;
        }
        debug!(
            transcripts = transcripts.len(),
            min_observations = self.min_observations(),
            "collected votes"
        );
        Ok(())
    }

    /// Signed vote counters, one per position.
    #[inline]
    pub fn counters(&self) -> &[i64] {
        &self.counters
    }

    /// Number of votes seen per position.
    #[inline]
    pub fn observations(&self) -> &[u64] {
        &self.observations
    }

    pub fn min_observations(&self) -> u64 {
        self.observations.iter().copied().min().unwrap_or(0)
    }

    /// True once every position has at least `min` observations.
    pub fn is_saturated(&self, min: u64) -> bool {
        self.min_observations() >= min
    }

    /// Majority vote, provided every position has at least `min` observations.
    pub fn decode(&self, min: u64) -> Result<Vec<bool>, KleptoError> {
        if let Some((position, &observed)) = self
            .observations
            .iter()
            .enumerate()
            .find(|(_, &observed)| observed < min)
        {
            return Err(KleptoError::InsufficientSample {
                position,
                observed,
                required: min,
            });
        }
        Ok(self.decode_unchecked())
    }

    /// Majority vote regardless of how many observations each position has.
    pub fn decode_unchecked(&self) -> Vec<bool> {
        self.counters.iter().map(|&count| count > 0).collect()
    }

    /// Confidence report; `truth` is the real key, when evaluating an attack.
    pub fn diagnostics(&self, truth: Option<&[bool]>) -> VoteDiagnostics {
        let recovered = self.decode_unchecked();

        let zero_signal = positions_where(&self.counters, |count| count == 0);

        let mut near_zero: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (position, &count) in self.counters.iter().enumerate() {
            if (-2..=2).contains(&count) {
                near_zero.entry(count).or_default().push(position);
            }
        }

        let mut by_count: Vec<(usize, u64)> =
            self.observations.iter().copied().enumerate().collect();
        by_count.sort_by_key(|&(position, observed)| (observed, position));
        by_count.truncate(LEAST_OBSERVED);

        let mismatches = truth.map(|truth| {
            recovered
                .iter()
                .zip(truth)
                .enumerate()
                .filter(|(_, (got, want))| got != want)
                .map(|(position, _)| position)
                .collect()
        });

        VoteDiagnostics {
            recovered,
            counters: self.counters.clone(),
            observations: self.observations.clone(),
            zero_signal,
            near_zero,
            least_observed: by_count,
            mismatches,
        }
    }
}

fn positions_where(counters: &[i64], pred: impl Fn(i64) -> bool) -> Vec<usize> {
    counters
        .iter()
        .enumerate()
        .filter(|(_, &count)| pred(count))
        .map(|(position, _)| position)
        .collect()
}

/// Snapshot of a majority-vote decode with per-position confidence data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteDiagnostics {
    pub recovered: Vec<bool>,
    pub counters: Vec<i64>,
    pub observations: Vec<u64>,
    /// Positions whose counter is exactly zero; they decode to zero by default.
    pub zero_signal: Vec<usize>,
    /// Positions with counters in `[-2, 2]`, keyed by counter value.
    pub near_zero: BTreeMap<i64, Vec<usize>>,
    /// The least-observed positions with their observation counts, fewest first.
    pub least_observed: Vec<(usize, u64)>,
    /// Positions decoded wrongly, when the true key was supplied.
    pub mismatches: Option<Vec<usize>>,
}

impl VoteDiagnostics {
    /// Fraction of positions decoded correctly, when the true key was supplied.
    pub fn accuracy(&self) -> Option<f64> {
        let total = self.recovered.len();
        self.mismatches
            .as_ref()
            .map(|wrong| (total - wrong.len()) as f64 / total as f64)
    }
}
