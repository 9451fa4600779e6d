use kleptography::{
    bits_to_biguint, realign, ChainDecoder, ChannelKind, FsRunStore, MajorityVoteDecoder,
    RunRecord, RunStore, Session, SessionConfig, DEFAULT_MIN_SAMPLES_PER_POSITION,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    let mut rng = StdRng::seed_from_u64(2024);

    // Stateful channel: one key bit per round, exact recovery.
    let config = SessionConfig::new(ChannelKind::StatefulCommitment, 256);
    let mut session = Session::new(config, StdRng::seed_from_u64(1)).expect("session");
    let outcome = session.run().expect("run");

    let decoder = ChainDecoder::new(session.params(), session.backdoor_key());
    let chain = decoder.recover_bits(&outcome.transcripts).expect("decode");
    let key_bits = realign(&chain, session.secret_key().bit_length()).expect("realign");
    let recovered = bits_to_biguint(&key_bits);
    println!(
        "stateful: {} rounds in {:?}, key recovered: {}",
        outcome.rounds(),
        outcome.total_time(),
        &recovered == session.secret_key().as_biguint()
    );

    let store_dir = std::env::temp_dir().join("kleptography-demo");
    let mut store = FsRunStore::open(&store_dir).expect("store");
    let id = store
        .persist(&RunRecord::from_session(&session, &outcome))
        .expect("persist");
    println!("stored as {}", store_dir.join(id.as_str()).display());

    // Stateless channel: votes accumulate until every position is sampled.
    let config = SessionConfig::new(ChannelKind::StatelessCommitment, 128);
    let mut session = Session::new(config, StdRng::seed_from_u64(rng.random()))
        .expect("session");
    let outcome = session.run().expect("run");
    let truth = session.secret_key().bits_msb_first();

    let mut decoder =
        MajorityVoteDecoder::new(session.params(), session.backdoor_key(), truth.len())
            .expect("decoder");
    decoder.observe_all(&outcome.transcripts).expect("observe");
    decoder
        .decode(DEFAULT_MIN_SAMPLES_PER_POSITION)
        .expect("enough samples");
    let report = decoder.diagnostics(Some(&truth));
    println!(
        "stateless: {} rounds, accuracy {:.3}, zero-signal positions {:?}, least observed {:?}",
        outcome.rounds(),
        report.accuracy().unwrap_or_default(),
        report.zero_signal,
        report.least_observed
    );
}
