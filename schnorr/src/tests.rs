use super::*;
use modp::{GroupParameters, registry};
use num_bigint::BigUint;
use num_traits::One;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn setup(bits: usize, seed: u64) -> (GroupParameters, KeyPair, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let params = registry::lookup(bits).expect("group");
    let keys = KeyPair::random(&params, &mut rng).expect("keygen");
    (params, keys, rng)
}

fn run_round(
    prover: &mut Prover,
    verifier: &Verifier,
    rng: &mut StdRng,
) -> Transcript {
    let t = prover.commit(rng).expect("commit");
    let c = verifier.challenge(rng).expect("challenge");
    let z = prover.respond(&c).expect("respond");
    Transcript::new(t, c, z)
}

#[test]
fn test_honest_round_validates() {
    for bits in [64, 128, 256, 512] {
        let (params, keys, mut rng) = setup(bits, 42);
        let verifier = Verifier::new(params.clone(), keys.public_key().clone(), DEFAULT_CHALLENGE_BITS);
        let mut prover = Prover::new(params, keys);

        for _ in 0..5 {
            let transcript = run_round(&mut prover, &verifier, &mut rng);
            assert!(verifier.validate(&transcript));
        }
    }
}

#[test]
fn test_validate_rejects_tampered_challenge() {
    let (params, keys, mut rng) = setup(128, 7);
    let verifier = Verifier::new(params.clone(), keys.public_key().clone(), DEFAULT_CHALLENGE_BITS);
    let mut prover = Prover::new(params, keys);

    let mut transcript = run_round(&mut prover, &verifier, &mut rng);
    transcript.c += 1u32;
    assert!(!verifier.validate(&transcript));
}

#[test]
fn test_validate_rejects_wrong_key() {
    let (params, keys, mut rng) = setup(128, 9);
    let verifier = Verifier::new(params.clone(), keys.public_key().clone(), DEFAULT_CHALLENGE_BITS);
    let mut prover = Prover::new(params.clone(), keys);
    let transcript = run_round(&mut prover, &verifier, &mut rng);

    let wrong = KeyPair::random(&params, &mut rng).expect("keygen");
    let wrong_verifier = Verifier::new(params, wrong.public_key().clone(), DEFAULT_CHALLENGE_BITS);
    assert!(!wrong_verifier.validate(&transcript));
}

#[test]
fn test_validate_rejects_key_outside_subgroup() {
    let (params, _, _) = setup(128, 3);
    // p - 1 has order 2, so it is never in the order-q subgroup.
    let outsider = PublicKey::from_biguint(params.p() - BigUint::one());
    let one = BigUint::one();
    assert!(!validate(&params, &outsider, &one, &one, &one));

    let zero = PublicKey::from_biguint(BigUint::from(0u32));
    assert!(!validate(&params, &zero, &one, &one, &one));
}

#[test]
fn test_respond_requires_fresh_commitment() {
    let (params, keys, mut rng) = setup(64, 5);
    let mut prover = Prover::new(params, keys);
    let c = BigUint::from(3u32);
    assert_eq!(prover.respond(&c), Err(SchnorrError::MissingCommitment));

    prover.commit(&mut rng).expect("commit");
    prover.respond(&c).expect("respond");
    assert_eq!(prover.respond(&c), Err(SchnorrError::MissingCommitment));
}

#[test]
fn test_secret_key_range_and_bits() {
    let params = registry::lookup(128).expect("group");
    assert_eq!(
        KeyPair::from_secret(&params, BigUint::from(0u32)),
        Err(SchnorrError::InvalidSecretKey)
    );
    assert_eq!(
        KeyPair::from_secret(&params, params.q().clone()),
        Err(SchnorrError::InvalidSecretKey)
    );

    let keys = KeyPair::from_secret(&params, BigUint::from(6u32)).expect("keys");
    let sk = keys.secret_key();
    assert_eq!(sk.bit_length(), 3);
    assert_eq!(sk.bits_msb_first(), vec![true, true, false]);
    assert!(!sk.bit(5));
    assert!(sk.bit(3));
    assert!(format!("{sk:?}").contains("bits"));
    assert!(!format!("{sk:?}").contains('6'));
}

#[test]
fn test_challenges_look_uniform() {
    let mut rng = StdRng::seed_from_u64(2024);
    let bound = BigUint::one() << DEFAULT_CHALLENGE_BITS;
    let trials = 4000;
    let mut top_bit_set = 0;
    let mut low_bit_set = 0;

    for _ in 0..trials {
        let c = random_challenge(&mut rng, DEFAULT_CHALLENGE_BITS).expect("challenge");
        assert!(c >= BigUint::one() && c < bound);
        if c.bit(DEFAULT_CHALLENGE_BITS as u64 - 1) {
            top_bit_set += 1;
        }
        if c.bit(0) {
            low_bit_set += 1;
        }
    }

    // Both frequencies should be near one half; 5 sigma is about 160 here.
    for count in [top_bit_set, low_bit_set] {
        assert!((count as i64 - trials / 2).abs() < 200, "count {count}");
    }
}

#[test]
fn test_challenge_width_must_be_positive() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        random_challenge(&mut rng, 0),
        Err(SchnorrError::InvalidChallengeWidth)
    );
    assert_eq!(random_challenge(&mut rng, 1), Ok(BigUint::one()));
}
