use modp::registry;
use rand::SeedableRng;
use rand::rngs::StdRng;
use schnorr::{DEFAULT_CHALLENGE_BITS, KeyPair, Prover, Transcript, Verifier};

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let params = registry::lookup(512).expect("group");
    let keys = KeyPair::random(&params, &mut rng).expect("keygen");
    let verifier = Verifier::new(params.clone(), keys.public_key().clone(), DEFAULT_CHALLENGE_BITS);
    let mut prover = Prover::new(params, keys);

    let t = prover.commit(&mut rng).expect("commit");
    let c = verifier.challenge(&mut rng).expect("challenge");
    let z = prover.respond(&c).expect("respond");
    let transcript = Transcript::new(t, c, z);

    let bytes = bincode::serialize(&transcript).expect("serialize transcript");
    let restored: Transcript = bincode::deserialize(&bytes).expect("deserialize transcript");

    assert_eq!(restored, transcript);
    assert!(verifier.validate(&restored));
}
