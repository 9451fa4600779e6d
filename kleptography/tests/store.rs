use std::path::PathBuf;
use std::time::Duration;

use kleptography::{
    ChainDecoder, ChannelKind, FsRunStore, MemoryRunStore, RunId, RunRecord, RunStore, Session,
    SessionConfig, StoreError, RUN_RECORD_VERSION,
};
use num_bigint::BigUint;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schnorr::Transcript;

fn scratch_dir() -> PathBuf {
    let suffix: u64 = rand::rng().random();
    std::env::temp_dir().join(format!("kleptography-store-{suffix:016x}"))
}

fn finished_run(channel: ChannelKind, bits: usize, seed: u64) -> RunRecord {
    let config = SessionConfig::new(channel, bits);
    let mut session = Session::new(config, StdRng::seed_from_u64(seed)).expect("session");
    let outcome = session.run().expect("run");
    RunRecord::from_session(&session, &outcome)
}

#[test]
fn test_fs_round_trip_and_replay() {
    let dir = scratch_dir();
    let mut store = FsRunStore::open(&dir).expect("open");
    let record = finished_run(ChannelKind::StatefulCommitment, 128, 4);

    let id = store.persist(&record).expect("persist");
    assert!(dir.join(id.as_str()).join("run.bin").is_file());

    let loaded = store.load(&id).expect("load");
    assert_eq!(loaded, record);

    // A loaded run is enough for the adversary to redo the attack.
    let (params, keys, backdoor) = loaded.restore().expect("restore");
    let chain = ChainDecoder::new(&params, &backdoor)
        .recover_bits(&loaded.transcripts)
        .expect("decode");
    let key = kleptography::realign(&chain, keys.secret_key().bit_length()).expect("realign");
    assert_eq!(key, keys.secret_key().bits_msb_first());

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn test_fs_distinct_ids_and_unknown_run() {
    let dir = scratch_dir();
    let mut store = FsRunStore::open(&dir).expect("open");
    let record = finished_run(ChannelKind::Honest, 64, 5);

    let a = store.persist(&record).expect("persist");
    let b = store.persist(&record).expect("persist");
    assert_ne!(a, b);

    let missing: RunId = "run_00000000".parse().expect("id");
    if missing != a && missing != b {
        assert!(matches!(
            store.load(&missing),
            Err(StoreError::UnknownRun(_))
        ));
    }
    assert!(matches!(
        "../escape".parse::<RunId>(),
        Err(StoreError::InvalidRunId(_))
    ));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn test_fs_rejects_future_version() {
    let dir = scratch_dir();
    let mut store = FsRunStore::open(&dir).expect("open");
    let mut record = finished_run(ChannelKind::Honest, 64, 6);
    record.version = 7;

    let id = store.persist(&record).expect("persist");
    assert!(matches!(
        store.load(&id),
        Err(StoreError::UnsupportedVersion {
            found: 7,
            expected: RUN_RECORD_VERSION
        })
    ));

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

fn arb_transcript() -> impl Strategy<Value = Transcript> {
    (any::<u64>(), any::<u128>(), any::<u64>()).prop_map(|(t, c, z)| {
        Transcript::new(BigUint::from(t), BigUint::from(c), BigUint::from(z))
    })
}

fn arb_duration() -> impl Strategy<Value = Duration> {
    (0u64..10_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| Duration::new(secs, nanos))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn memory_store_round_trip_is_exact(
        transcripts in prop::collection::vec(arb_transcript(), 0..40),
        timings in prop::collection::vec(arb_duration(), 0..40),
        secret in 1u64..,
        key in any::<[u8; 32]>(),
    ) {
        let record = RunRecord {
            version: RUN_RECORD_VERSION,
            channel: ChannelKind::StatelessCommitment,
            bit_length: 64,
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(2u32),
            secret_key: BigUint::from(secret),
            public_key: BigUint::from(secret) * 3u32,
            backdoor_key: hex::encode(key),
            transcripts,
            timings,
        };

        let mut store = MemoryRunStore::new();
        let id = store.persist(&record).expect("persist");
        prop_assert_eq!(store.load(&id).expect("load"), record);
    }
}
