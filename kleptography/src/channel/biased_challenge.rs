//! Verifier-side subversion: challenges derived from the previous commitment.
//!
//! From round two on, the verifier replaces its random challenge with
//! `PRF(K, t_{i-1})` mapped into the honest challenge range `[1, 2^w - 1]`. Each transcript on its own
//! still looks honest, but anyone holding `K` can predict every challenge one
//! round ahead from public data.

use modp::GroupParameters;
use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;
use schnorr::{KeyPair, Prover, Transcript, Verifier};
use tracing::debug;

use super::Channel;
use crate::backdoor::BackdoorKey;
use crate::config::ChannelKind;
use crate::errors::KleptoError;
use crate::prf::PrfOracle;

/// `ceil(w / 8)` PRF bytes reduced into `[1, 2^w - 1]`, the honest range.
fn derive_challenge(
    prf: &PrfOracle,
    previous_commitment: &BigUint,
    challenge_bits: usize,
) -> Result<BigUint, KleptoError> {
    let raw = prf.evaluate(previous_commitment, challenge_bits.div_ceil(8))?;
    let span = (BigUint::one() << challenge_bits) - 1u32;
    Ok(raw % span + 1u32)
}

/// Honest prover paired with a verifier whose challenges are PRF outputs.
#[derive(Clone, Debug)]
pub struct BiasedChallengeChannel {
    prover: Prover,
    verifier: Verifier,
    prf: PrfOracle,
    previous_commitment: Option<BigUint>,
}

impl BiasedChallengeChannel {
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
            previous_commitment: None,
        }
    }
}

impl Channel for BiasedChallengeChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::BiasedChallenge
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, KleptoError> {
        Ok(self.prover.commit(rng)?)
    }

    fn challenge<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        commitment: &BigUint,
    ) -> Result<BigUint, KleptoError> {
        let c = match &self.previous_commitment {
            None => self.verifier.challenge(rng)?,
            Some(previous) => {
                derive_challenge(&self.prf, previous, self.verifier.challenge_bits())?
            }
        };
        self.previous_commitment = Some(commitment.clone());
        Ok(c)
    }

    fn respond(&mut self, c: &BigUint) -> Result<BigUint, KleptoError> {
        Ok(self.prover.respond(c)?)
    }

    fn validate(&self, transcript: &Transcript) -> bool {
        self.verifier.validate(transcript)
    }
}

/// Outcome of checking a transcript list against predicted challenges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictionAudit {
    /// Transcripts with a predecessor, i.e. all but the first.
    pub checked: usize,
    /// Of those, how many carried exactly the predicted challenge.
    pub matched: usize,
}

impl PredictionAudit {
    /// True if every checkable challenge was predicted.
    pub fn fully_predicted(&self) -> bool {
        self.checked == self.matched
    }
}

/// Backdoor-key holder that predicts the biased verifier's challenges.
///
/// No key extraction is attached to this channel; the predictor shows that
/// challenges after the first are a public function of the previous commitment.
#[derive(Clone, Debug)]
pub struct ChallengePredictor {
    prf: PrfOracle,
    challenge_bits: usize,
}

impl ChallengePredictor {
    pub fn new(params: &GroupParameters, backdoor: &BackdoorKey, challenge_bits: usize) -> Self {
        Self {
            prf: PrfOracle::for_group(backdoor, params),
            challenge_bits,
        }
    }

    /// The challenge the verifier will issue after seeing `previous_commitment`.
    pub fn predict(&self, previous_commitment: &BigUint) -> Result<BigUint, KleptoError> {
        derive_challenge(&self.prf, previous_commitment, self.challenge_bits)
    }

    /// Compares each challenge from round two on with its prediction.
    pub fn audit(&self, transcripts: &[Transcript]) -> Result<PredictionAudit, KleptoError> {
        let mut audit = PredictionAudit {
            checked: 0,
            matched: 0,
        };
        for pair in transcripts.windows(2) {
            audit.checked += 1;
            if self.predict(&pair[0].t)? == pair[1].c {
                audit.matched += 1;
            }
        }
        debug!(
            checked = audit.checked,
            matched = audit.matched,
            "audited challenge predictions"
        );
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modp::registry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_first_challenge_is_random_then_predicted() {
        let mut rng = StdRng::seed_from_u64(17);
        let params = registry::lookup(128).expect("group");
        let keys = KeyPair::random(&params, &mut rng).expect("keygen");
        let backdoor = BackdoorKey::random(&mut rng);
        let mut channel = BiasedChallengeChannel::new(&params, keys, &backdoor, 128);
        let predictor = ChallengePredictor::new(&params, &backdoor, 128);

        let mut previous: Option<BigUint> = None;
        for _ in 0..6 {
            let t = channel.commit(&mut rng).expect("commit");
            let c = channel.challenge(&mut rng, &t).expect("challenge");
            if let Some(prev) = &previous {
                assert_eq!(predictor.predict(prev).expect("predict"), c);
            }
            let z = channel.respond(&c).expect("respond");
            assert!(channel.validate(&Transcript::new(t.clone(), c, z)));
            previous = Some(t);
        }
    }

    #[test]
    fn test_challenge_stays_in_honest_range() {
        let params = registry::lookup(256).expect("group");
        let prf = PrfOracle::for_group(&BackdoorKey::from_bytes([1u8; 32]), &params);
        for bits in [1usize, 2, 7, 64, 100, 128] {
            for seed in 0u32..200 {
                let c = derive_challenge(&prf, &BigUint::from(seed), bits).expect("derive");
                assert!(c >= BigUint::one(), "zero challenge at width {bits}");
                assert!(c.bits() <= bits as u64);
            }
        }
    }

    #[test]
    fn test_one_bit_challenge_matches_honest_verifier() {
        let mut rng = StdRng::seed_from_u64(12);
        let params = registry::lookup(64).expect("group");
        let keys = KeyPair::random(&params, &mut rng).expect("keygen");
        let backdoor = BackdoorKey::random(&mut rng);
        let mut channel = BiasedChallengeChannel::new(&params, keys, &backdoor, 1);

        for _ in 0..50 {
            let t = channel.commit(&mut rng).expect("commit");
            let c = channel.challenge(&mut rng, &t).expect("challenge");
            assert_eq!(c, BigUint::one());
            channel.respond(&c).expect("respond");
        }
    }

    #[test]
    fn test_wrong_key_fails_audit() {
        let mut rng = StdRng::seed_from_u64(5);
        let params = registry::lookup(128).expect("group");
        let keys = KeyPair::random(&params, &mut rng).expect("keygen");
        let backdoor = BackdoorKey::random(&mut rng);
        let mut channel = BiasedChallengeChannel::new(&params, keys, &backdoor, 128);

        let mut transcripts = Vec::new();
        for _ in 0..5 {
            let t = channel.commit(&mut rng).expect("commit");
            let c = channel.challenge(&mut rng, &t).expect("challenge");
            let z = channel.respond(&c).expect("respond");
            transcripts.push(Transcript::new(t, c, z));
        }

        let right = ChallengePredictor::new(&params, &backdoor, 128);
        let audit = right.audit(&transcripts).expect("audit");
        assert_eq!(audit, PredictionAudit { checked: 4, matched: 4 });
        assert!(audit.fully_predicted());

        let wrong = ChallengePredictor::new(&params, &BackdoorKey::random(&mut rng), 128);
        assert_eq!(wrong.audit(&transcripts).expect("audit").matched, 0);
    }
}
