//! Kleptographic subversion of Schnorr identification.
//!
//! One party in an otherwise honest protocol run is replaced by a subverted
//! implementation that shares a symmetric [`BackdoorKey`] with an adversary.
//! Every transcript still passes the honest check, yet the adversary, seeing
//! only public transcripts, can either predict the verifier's challenges or
//! recover the prover's secret key.
//!
//! Three channels are provided next to the honest baseline:
//! - [`BiasedChallengeChannel`]: challenges are the PRF of the previous commitment
//! - [`StatefulCommitmentChannel`]: nonces are chained through the PRF, one key bit per round
//! - [`StatelessCommitmentChannel`]: commitments are rejection-sampled to leak a vote per round
//!
//! The PRF is AES-256 keyed with the backdoor key. The arithmetic is not
//! constant-time; this crate is for studying the attacks, not for deployment.
//!
//! # Example
//!
//! ```
//! use kleptography::{realign, bits_to_biguint, ChainDecoder, ChannelKind, Session, SessionConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let config = SessionConfig::new(ChannelKind::StatefulCommitment, 128);
//! let mut session = Session::new(config, StdRng::seed_from_u64(7)).expect("session");
//! let outcome = session.run().expect("run");
//!
//! let decoder = ChainDecoder::new(session.params(), session.backdoor_key());
//! let chain = decoder.recover_bits(&outcome.transcripts).expect("decode");
//! let key_bits = realign(&chain, session.secret_key().bit_length()).expect("realign");
//! assert_eq!(&bits_to_biguint(&key_bits), session.secret_key().as_biguint());
//! ```

mod backdoor;
mod channel;
mod config;
mod errors;
mod prf;
mod session;
mod store;

pub use backdoor::{BackdoorKey, BACKDOOR_KEY_LEN};
pub use channel::{
    bits_to_biguint, realign, BiasedChallengeChannel, ChainDecoder, ChallengePredictor, Channel,
    DecodedBit, HonestChannel, MajorityVoteDecoder, PredictionAudit, StatefulCommitmentChannel,
    StatelessCommitmentChannel, VoteDiagnostics,
};
pub use config::{ChannelKind, SessionConfig, StoppingRule, DEFAULT_MIN_SAMPLES_PER_POSITION};
pub use errors::{KleptoError, StoreError};
pub use prf::{ciphertext_len, PrfOracle, BLOCK_SIZE};
pub use session::{Session, SessionOutcome};
pub use store::{FsRunStore, MemoryRunStore, RunId, RunRecord, RunStore, RUN_RECORD_VERSION};
