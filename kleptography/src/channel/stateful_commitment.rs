//! Prover-side subversion that chains nonces through the PRF.
//!
//! After the first round the prover's nonce is
//! `r_i = PRF(K, t_{i-1}, x[sigma]) mod p`, where `sigma` walks the secret key's
//! bits most significant first and wraps. Given `t_{i-1}`, only two nonces are
//! possible, so the adversary can tell which key bit was used by recomputing
//! both candidate commitments.
//!
//! Round `i >= 2` embeds key bit `(i - 1) mod N`: the cursor moves on round one
//! too, although that round carries no bit.

use modp::GroupParameters;
use num_bigint::BigUint;
use rand::Rng;
use schnorr::{KeyPair, Prover, Transcript, Verifier};
use tracing::{debug, warn};

use super::Channel;
use crate::backdoor::BackdoorKey;
use crate::config::ChannelKind;
use crate::errors::KleptoError;
use crate::prf::PrfOracle;

fn chained_nonce(
    prf: &PrfOracle,
    params: &GroupParameters,
    previous_commitment: &BigUint,
    bit: bool,
) -> Result<BigUint, KleptoError> {
    let raw = prf.evaluate_with_selector(previous_commitment, bit, prf.input_len())?;
    Ok(raw % params.p())
}

/// Subverted prover with a bit cursor, paired with an honest verifier.
#[derive(Clone, Debug)]
pub struct StatefulCommitmentChannel {
    prover: Prover,
    verifier: Verifier,
    prf: PrfOracle,
    cursor: usize,
    previous_commitment: Option<BigUint>,
}

impl StatefulCommitmentChannel {
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
            cursor: 0,
            previous_commitment: None,
        }
    }

    /// Key bit position the next commitment will embed.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Channel for StatefulCommitmentChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::StatefulCommitment
    }

    fn commit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint, KleptoError> {
        let key_bits = self.prover.secret_key().bit_length();
        let r = match &self.previous_commitment {
            None => self.prover.params().random_exponent(rng)?,
            Some(previous) => {
                let bit = self.prover.secret_key().bit(self.cursor);
                chained_nonce(&self.prf, self.prover.params(), previous, bit)?
            }
        };
        self.cursor = (self.cursor + 1) % key_bits;

        let t = self.prover.commit_with_nonce(r);
        self.previous_commitment = Some(t.clone());
        Ok(t)
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

/// Per-transcript result of chained decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedBit {
    Bit(bool),
    /// Both candidate bits reproduce the commitment.
    Ambiguous,
    /// Neither candidate reproduces the commitment.
    Unmatched,
}

/// Adversary for [`StatefulCommitmentChannel`].
///
/// Uses only the ordered public transcripts and the backdoor key.
#[derive(Clone, Debug)]
pub struct ChainDecoder {
    params: GroupParameters,
    prf: PrfOracle,
}

impl ChainDecoder {
    pub fn new(params: &GroupParameters, backdoor: &BackdoorKey) -> Self {
        Self {
            params: params.clone(),
            prf: PrfOracle::for_group(backdoor, params),
        }
    }

    /// The commitment the prover would publish after `previous` if it embedded `bit`.
    pub fn candidate_commitment(
        &self,
        previous: &BigUint,
        bit: bool,
    ) -> Result<BigUint, KleptoError> {
        let r = chained_nonce(&self.prf, &self.params, previous, bit)?;
        Ok(self.params.pow_g(&r))
    }

    /// Decodes one outcome per transcript after the first, in chain order.
    #[tracing::instrument(skip_all, name = "ChainDecoder::decode")]
    pub fn decode(&self, transcripts: &[Transcript]) -> Result<Vec<DecodedBit>, KleptoError> {
        let mut out = Vec::with_capacity(transcripts.len().saturating_sub(1));
        for pair in transcripts.windows(2) {
            let (previous, current) = (&pair[0].t, &pair[1].t);
            let zero = self.candidate_commitment(previous, false)? == *current;
            let one = self.candidate_commitment(previous, true)? == *current;
            let outcome = match (zero, one) {
                (true, false) => DecodedBit::Bit(false),
                (false, true) => DecodedBit::Bit(true),
                (true, true) => DecodedBit::Ambiguous,
                (false, false) => DecodedBit::Unmatched,
            };
            if !matches!(outcome, DecodedBit::Bit(_)) {
                warn!(position = out.len(), ?outcome, "undecodable chain link");
            }
            out.push(outcome);
        }
        debug!(decoded = out.len(), "decoded commitment chain");
        Ok(out)
    }

    /// Like [`ChainDecoder::decode`] but fails on the first undecodable link.
    pub fn recover_bits(&self, transcripts: &[Transcript]) -> Result<Vec<bool>, KleptoError> {
        self.decode(transcripts)?
            .into_iter()
            .enumerate()
            .map(|(position, outcome)| match outcome {
                DecodedBit::Bit(bit) => Ok(bit),
                _ => Err(KleptoError::DecodeAmbiguity { position }),
            })
            .collect()
    }
}

/// Maps chain-ordered bits back to key order.
///
/// Decoded entry `j` carries key bit `(j + 1) mod key_bits`, so the first
/// `key_bits` entries are rotated right by one. Extra entries are ignored.
pub fn realign(decoded: &[bool], key_bits: usize) -> Result<Vec<bool>, KleptoError> {
    if key_bits == 0 || decoded.len() < key_bits {
        return Err(KleptoError::TooFewDecodedBits {
            decoded: decoded.len(),
            required: key_bits,
        });
    }
    let mut key = decoded[..key_bits].to_vec();
    key.rotate_right(1);
    Ok(key)
}

/// Reads most-significant-first bits as an integer.
pub fn bits_to_biguint(bits: &[bool]) -> BigUint {
    bits.iter().fold(BigUint::default(), |acc, &bit| {
        (acc << 1u32) + u32::from(bit)
    })
}
