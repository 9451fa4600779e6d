//! Protocol channels: the honest baseline and the three subverted variants.
//!
//! Every channel runs the same commit/challenge/respond/validate round over the
//! honest Schnorr core and keeps its own cross-round state. Each subverted
//! channel sits next to the adversary that decodes it from public transcripts.

mod biased_challenge;
mod stateful_commitment;
mod stateless_commitment;

pub use biased_challenge::{BiasedChallengeChannel, ChallengePredictor, PredictionAudit};
pub use stateful_commitment::{
    bits_to_biguint, realign, ChainDecoder, DecodedBit, StatefulCommitmentChannel,
};
pub use stateless_commitment::{
    MajorityVoteDecoder, StatelessCommitmentChannel, VoteDiagnostics,
};

use modp::GroupParameters;
use num_bigint::BigUint;
use rand::Rng;
use schnorr::{KeyPair, Prover, Transcript, Verifier};

use crate::config::ChannelKind;
use crate::errors::KleptoError;

/// One party pair running rounds of the identification protocol.
///
/// Calls for a round must come in order: `commit`, `challenge`, `respond`,
/// then `validate` on the assembled transcript.
pub trait Channel {
    fn kind(&self) -> ChannelKind;

    /// Produces the round's commitment `t`.
    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, KleptoError>;

    /// Produces the challenge for commitment `t`.
    fn challenge<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        commitment: &BigUint,
    ) -> Result<BigUint, KleptoError>;

    /// Produces the response to challenge `c`.
    fn respond(&mut self, c: &BigUint) -> Result<BigUint, KleptoError>;

    /// The honest correctness predicate on a finished round.
    fn validate(&self, transcript: &Transcript) -> bool;
}

/// The unmodified protocol.
#[derive(Clone, Debug)]
pub struct HonestChannel {
    prover: Prover,
    verifier: Verifier,
}

impl HonestChannel {
    pub fn new(params: &GroupParameters, keys: KeyPair, challenge_bits: usize) -> Self {
        let verifier = Verifier::new(params.clone(), keys.public_key().clone(), challenge_bits);
        Self {
            prover: Prover::new(params.clone(), keys),
            verifier,
        }
    }
}

impl Channel for HonestChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Honest
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, KleptoError> {
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
