//! Tests for Curl-P-27 and the nonce search

use std::sync::atomic::AtomicBool;

use crate::bitslice::{BitslicedCurl, Lanes, Wide};
use crate::curl::Curl;
use crate::sponge::Sponge;
use crate::ternary::{Trit, trits_to_trytes, trytes_to_trits};
use crate::{
    HASH_LENGTH, HEADER_TRYTES, Miner, PowConfig, PowError, STATE_LENGTH, TRANSACTION_TRYTES,
    Transaction, hash, meets_difficulty, proof_of_work, proof_of_work_with,
};

const ALPHABET: &[u8] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fixed transaction: symbol `i` is `ALPHABET[(7i + 3) mod 27]`
fn sample_transaction() -> Transaction {
    let trytes: String = (0..TRANSACTION_TRYTES)
        .map(|i| ALPHABET[(i * 7 + 3) % 27] as char)
        .collect();
    Transaction::from_trytes(&trytes).unwrap()
}

/// Deterministic trit stream (64-bit LCG)
fn pseudo_random_trits(seed: u64, out: &mut [Trit]) {
    let mut x = seed;
    for trit in out.iter_mut() {
        x = x
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *trit = ((x >> 33) % 3) as Trit - 1;
    }
}

#[test]
fn test_all_zero_header_hashes_to_zero() {
    // The all-zero state is a fixed point of the 27-round permutation
    let header = "9".repeat(HEADER_TRYTES);
    assert_eq!(hash(&header).unwrap(), "9".repeat(81));

    let mut curl = Curl::new();
    curl.absorb_trytes(header.as_bytes()).unwrap();
    assert!(curl.state().iter().all(|&t| t == 0));
}

#[test]
fn test_known_vectors() {
    assert_eq!(
        hash("HELLOWORLD").unwrap(),
        "TJVJNTTDKSYENPURHEFFCGUOQBVURATQIQNHBRNVLGVJVFDAYNHKLKGJVKBVMHOFBXCKXDFEBFUTVOLOM"
    );
    assert_eq!(
        hash(&"ABCDEFGHIJKLMNOPQRSTUVWXYZ9".repeat(3)).unwrap(),
        "ITTFAEIWTRSFQGZGLGUMLUTHFXYSCLXTFYMGVTTDSNNWFUCKBRPSOBERNLXIYCNCEBKUV9QIXI9BDCKSM"
    );
    assert_eq!(
        sample_transaction().hash(),
        "XQGSVWKLHAJSSXOQQPOGKXFLFKXUDVYVIGAOKY9BVOGTHVFYGCOJCQDYGNOUILURLDRYUPBDTCSHAAVYW"
    );
}

#[test]
fn test_hash_is_deterministic() {
    let tx = sample_transaction();
    let first = hash(tx.as_str()).unwrap();
    let second = hash(tx.as_str()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, tx.hash());
}

#[test]
fn test_hash_rejects_invalid_symbols() {
    assert_eq!(
        hash("ABC-DEF"),
        Err(PowError::InvalidTryte {
            position: 3,
            symbol: '-'
        })
    );
}

#[test]
fn test_trit_and_tryte_absorb_agree() {
    let tx = sample_transaction();

    let mut by_trytes = Curl::new();
    by_trytes.absorb_trytes(tx.as_str().as_bytes()).unwrap();

    let mut by_trits = Curl::new();
    by_trits.absorb(tx.trits());

    assert_eq!(by_trytes.state(), by_trits.state());
}

#[test]
fn test_squeeze_and_reset() {
    let mut curl = Curl::new();
    curl.absorb_trytes(b"SQUEEZE").unwrap();
    let digest = curl.digest();

    let mut out = [0; HASH_LENGTH];
    curl.squeeze(&mut out);
    assert_eq!(out, digest);

    curl.reset();
    assert!(curl.state().iter().all(|&t| t == 0));
}

#[test]
fn test_codec_roundtrip_on_transaction() {
    let tx = sample_transaction();
    let mut trits = vec![0; TRANSACTION_TRYTES * 3];
    trytes_to_trits(tx.as_str().as_bytes(), &mut trits).unwrap();
    assert_eq!(trits_to_trytes(&trits), tx.as_str());
}

fn check_broadcast_equivalence<W: Lanes>() {
    let mut state = [0; STATE_LENGTH];
    pseudo_random_trits(W::LANES as u64, &mut state);

    let mut scalar = Curl::from_state(state);
    let mut sliced = BitslicedCurl::<W>::from_trits(&state);

    let mut rate = [0; HASH_LENGTH];
    pseudo_random_trits(99, &mut rate);

    for _ in 0..2 {
        scalar.transform();
        sliced.transform();
        for lane in 0..W::LANES {
            assert_eq!(sliced.lane_state(lane).as_ref(), Some(scalar.state()));
        }

        // Overwrite the rate of both with the same block
        let mut next = *scalar.state();
        next[..HASH_LENGTH].copy_from_slice(&rate);
        scalar = Curl::from_state(next);
        sliced.load_broadcast(&rate);
    }
}

#[test]
fn test_bitsliced_matches_scalar_broadcast() {
    check_broadcast_equivalence::<u32>();
    check_broadcast_equivalence::<u64>();
    check_broadcast_equivalence::<u128>();
    check_broadcast_equivalence::<Wide<2>>();
    check_broadcast_equivalence::<Wide<4>>();
}

fn check_per_lane_equivalence<W: Lanes>() {
    let mut sliced = BitslicedCurl::<W>::new();
    let mut scalars = Vec::with_capacity(W::LANES);

    for lane in 0..W::LANES {
        let mut state = [0; STATE_LENGTH];
        pseudo_random_trits(1000 + lane as u64, &mut state);
        sliced.load_lane(lane, &state);
        scalars.push(Curl::from_state(state));
    }

    sliced.transform();
    for (lane, scalar) in scalars.iter_mut().enumerate() {
        scalar.transform();
        assert_eq!(
            sliced.lane_state(lane).as_ref(),
            Some(scalar.state()),
            "lane {} diverged",
            lane
        );
        assert_eq!(sliced.lane_digest(lane), Some(scalar.digest()));
    }
}

#[test]
fn test_bitsliced_matches_scalar_per_lane() {
    check_per_lane_equivalence::<u32>();
    check_per_lane_equivalence::<u64>();
    check_per_lane_equivalence::<u128>();
    check_per_lane_equivalence::<Wide<2>>();
    check_per_lane_equivalence::<Wide<3>>();
}

#[test]
fn test_bitsliced_sponge_absorb() {
    let tx = sample_transaction();
    let words: Vec<u64> = tx.trits().iter().map(|&t| u64::broadcast(t)).collect();

    let mut sliced = BitslicedCurl::<u64>::new();
    sliced.absorb(&words);

    let expected = tx.hash_trits();
    for lane in [0, 17, 31] {
        assert_eq!(sliced.lane_digest(lane), Some(expected));
    }
    assert_eq!(
        sliced.lane_trit(5, HASH_LENGTH - 1),
        Some(expected[HASH_LENGTH - 1])
    );
}

#[test]
fn test_bitsliced_squeeze_and_reset() {
    let mut state = [0; STATE_LENGTH];
    pseudo_random_trits(7, &mut state);

    let mut scalar = Curl::from_state(state);
    let mut sliced = BitslicedCurl::<u64>::from_trits(&state);

    let mut expected: [Trit; 2 * HASH_LENGTH] = [0; 2 * HASH_LENGTH];
    scalar.squeeze(&mut expected);
    let mut words = [0u64; 2 * HASH_LENGTH];
    sliced.squeeze(&mut words);

    for (&word, &trit) in words.iter().zip(&expected) {
        assert_eq!(word, u64::broadcast(trit));
    }
    for (&word, &trit) in sliced.words().iter().zip(scalar.state()) {
        assert_eq!(word, u64::broadcast(trit));
    }

    sliced.reset();
    assert!(sliced.words().iter().all(|&w| w == <u64 as Lanes>::LOW));
    assert_eq!(sliced.lane_state(9), Some([0; STATE_LENGTH]));
}

#[test]
fn test_transaction_validation() {
    assert_eq!(
        Transaction::from_trytes("ABC").unwrap_err(),
        PowError::InvalidLength {
            expected: TRANSACTION_TRYTES,
            actual: 3
        }
    );

    let mut trytes = sample_transaction().as_str().to_string();
    trytes.replace_range(100..101, "a");
    assert_eq!(
        Transaction::from_trytes(&trytes).unwrap_err(),
        PowError::InvalidTryte {
            position: 100,
            symbol: 'a'
        }
    );

    assert!(sample_transaction().as_str().parse::<Transaction>().is_ok());
}

#[test]
fn test_transaction_fields() {
    let tx = sample_transaction();
    let s = tx.as_str();

    assert_eq!(tx.header(), &s[..2430]);
    assert_eq!(tx.nonce(), &s[2430..2511]);
    assert_eq!(tx.trunk(), &s[2511..2592]);
    assert_eq!(tx.branch(), &s[2592..2673]);

    assert_eq!(trits_to_trytes(tx.nonce_trits()), tx.nonce());
    assert_eq!(trits_to_trytes(tx.trunk_trits()), tx.trunk());
    assert_eq!(trits_to_trytes(tx.branch_trits()), tx.branch());
    assert_eq!(tx.header_trits().len(), 2430 * 3);
}

#[test]
fn test_mid_state_is_header_capacity() {
    let tx = sample_transaction();
    let miner = Miner::<u64>::new(&tx);

    let mut curl = Curl::new();
    curl.absorb_trytes(tx.header().as_bytes()).unwrap();

    let mid = miner.mid_state();
    assert!(mid[..HASH_LENGTH].iter().all(|&w| w == <u64 as Lanes>::LOW));
    for (word, &trit) in mid.iter().zip(curl.state()).skip(HASH_LENGTH) {
        assert_eq!(*word, u64::broadcast(trit));
    }
}

#[test]
fn test_unused_lanes_hold_valid_trits() {
    let miner = Miner::<u64>::new(&sample_transaction())
        .with_lanes(4)
        .unwrap();

    let mut curl = BitslicedCurl::from_words(*miner.mid_state());
    curl.load_lane(0, miner.transaction().nonce_trits());
    curl.transform();

    for lane in [0, 4, 10, 31] {
        assert!(curl.lane_state(lane).is_some(), "lane {}", lane);
    }
}

#[test]
fn test_difficulty_check() {
    let mut digest = [-1; HASH_LENGTH];
    assert!(!meets_difficulty(&digest, 1));

    digest[HASH_LENGTH - 1] = 0;
    digest[HASH_LENGTH - 2] = 0;
    assert!(meets_difficulty(&digest, 1));
    assert!(meets_difficulty(&digest, 2));
    assert!(!meets_difficulty(&digest, 3));

    // A non-zero trit anywhere in the suffix rejects
    let mut digest = [0; HASH_LENGTH];
    digest[HASH_LENGTH - 5] = 1;
    assert!(meets_difficulty(&digest, 4));
    assert!(!meets_difficulty(&digest, 5));
    assert!(!meets_difficulty(&digest, HASH_LENGTH + 1));
}

#[test]
fn test_known_winning_offsets() {
    let miner = Miner::<u64>::new(&sample_transaction());

    // Offset 0 is a real solution
    assert_eq!(miner.search(1), Ok(0));
    assert_eq!(miner.search(2), Ok(20));
    assert_eq!(miner.search(3), Ok(45));
    assert_eq!(miner.search(5), Ok(45));
    assert_eq!(miner.search(6), Ok(1542));

    assert_eq!(
        miner.finalize(45).nonce(),
        "ULQXDKRYELSZFMT9GNUAHOVBIPWCJQXDKRYELSZFMT9GNUAHOVBIPWCJQXDKRYELSZFMT9GNUAHOVBIPW"
    );
    assert_eq!(
        miner.finalize(1542).hash(),
        "SMRAWKMJYBETLEJKVQSTAKDPKMIHHKFJHR9AVQAQPZWATGUAEFFUCJGPKBMERYRWGECYARNPDLGIMVW99"
    );
}

#[test]
fn test_batch_agrees_with_scalar_hashing() {
    let tx = sample_transaction();
    let miner = Miner::<u64>::new(&tx);

    // Every nonce below 20 fails mwm 2 under the scalar hash, 20 passes
    for offset in 0..20 {
        assert!(!miner.finalize(offset).verify(2), "offset {}", offset);
    }
    assert!(miner.finalize(20).verify(2));
    assert_eq!(miner.search_batch(2, 0), Some(20));

    // Batches need not be aligned to the lane count
    assert_eq!(miner.search_batch(2, 5), Some(20));
    assert_eq!(miner.search_batch(6, 0), None);
    assert_eq!(miner.search_batch(6, 1536), Some(1542));
}

#[test]
fn test_lane_count_does_not_change_result() {
    let tx = sample_transaction();

    assert_eq!(Miner::<u32>::new(&tx).search(3), Ok(45));
    assert_eq!(Miner::<u128>::new(&tx).search(3), Ok(45));
    assert_eq!(Miner::<Wide<2>>::new(&tx).search(3), Ok(45));
    assert_eq!(
        Miner::<u64>::new(&tx).with_lanes(7).unwrap().search(6),
        Ok(1542)
    );
    assert_eq!(
        Miner::<u64>::new(&tx).with_lanes(1).unwrap().search(2),
        Ok(20)
    );
}

#[test]
fn test_invalid_lanes() {
    let tx = sample_transaction();
    assert!(matches!(
        Miner::<u64>::new(&tx).with_lanes(0),
        Err(PowError::InvalidConfig(_))
    ));
    assert!(matches!(
        Miner::<u64>::new(&tx).with_lanes(33),
        Err(PowError::InvalidConfig(_))
    ));
    assert!(Miner::<u128>::new(&tx).with_lanes(64).is_ok());
}

#[test]
fn test_parallel_matches_sequential() {
    let miner = Miner::<u64>::new(&sample_transaction());
    let sequential = miner.search(6).unwrap();

    for workers in [1, 2, 3, 4, 7] {
        assert_eq!(
            miner.search_parallel(6, workers),
            Ok(sequential),
            "{} workers",
            workers
        );
    }
}

#[test]
fn test_zero_width_word_is_rejected() {
    let miner = Miner::<Wide<0>>::new(&sample_transaction());
    assert_eq!(miner.lanes(), 0);
    assert!(matches!(miner.search(1), Err(PowError::InvalidConfig(_))));
}

#[test]
fn test_search_near_offset_limit() {
    let miner = Miner::<u64>::new(&sample_transaction());
    let cancel = AtomicBool::new(false);

    // The last full batch still reports its winner
    assert_eq!(
        miner.search_from(2, u64::MAX - 32, 1, &cancel),
        Ok(u64::MAX - 32)
    );

    let single = Miner::<u64>::new(&sample_transaction())
        .with_lanes(1)
        .unwrap();
    assert_eq!(
        single.search_from(2, u64::MAX - 12, 1, &cancel),
        Ok(u64::MAX - 11)
    );
    assert!(single.finalize(u64::MAX - 11).verify(2));
}

#[test]
fn test_offset_exhausted() {
    let miner = Miner::<u64>::new(&sample_transaction());
    let cancel = AtomicBool::new(false);

    // No room for a single batch
    assert_eq!(
        miner.search_from(1, u64::MAX - 10, 1, &cancel),
        Err(PowError::OffsetExhausted)
    );

    // The final batch holds no mwm 3 winner
    assert_eq!(
        miner.search_from(3, u64::MAX - 32, 1, &cancel),
        Err(PowError::OffsetExhausted)
    );
    assert_eq!(
        miner.search_from(3, u64::MAX - 64, 2, &cancel),
        Err(PowError::OffsetExhausted)
    );
}

#[test]
fn test_invalid_min_weight_magnitude() {
    let miner = Miner::<u64>::new(&sample_transaction());
    assert_eq!(miner.search(0), Err(PowError::InvalidMinWeightMagnitude(0)));
    assert_eq!(
        miner.search(244),
        Err(PowError::InvalidMinWeightMagnitude(244))
    );
    assert!(matches!(
        miner.search_parallel(1, 0),
        Err(PowError::InvalidConfig(_))
    ));
}

#[test]
fn test_cancelled_search() {
    let miner = Miner::<u64>::new(&sample_transaction());
    let cancel = AtomicBool::new(true);
    assert_eq!(
        miner.search_with_cancel(243, 2, &cancel),
        Err(PowError::Cancelled)
    );
}

#[test]
fn test_proof_of_work_only_touches_nonce() {
    let tx = sample_transaction();
    let mined = proof_of_work(&tx, 3).unwrap();

    assert!(mined.verify(3));
    assert_eq!(mined.header(), tx.header());
    assert_eq!(mined.trunk(), tx.trunk());
    assert_eq!(mined.branch(), tx.branch());
    assert_eq!(mined.as_str().len(), TRANSACTION_TRYTES);
    assert!(mined.hash().ends_with('9'));
}

#[test]
fn test_proof_of_work_with_config() {
    let tx = sample_transaction();
    let config = PowConfig::new(6).with_threads(3).with_lanes(16);
    let mined = proof_of_work_with(&tx, &config).unwrap();
    assert_eq!(mined, Miner::<u64>::new(&tx).finalize(1542));

    let bad = PowConfig::new(6).with_threads(0);
    assert!(matches!(
        proof_of_work_with(&tx, &bad),
        Err(PowError::InvalidConfig(_))
    ));
}

#[test]
fn test_all_zero_transaction_mines() {
    let tx = Transaction::from_trytes(&"9".repeat(TRANSACTION_TRYTES)).unwrap();
    let mined = proof_of_work(&tx, 1).unwrap();
    assert_eq!(mined, tx);
    assert!(tx.verify(1));
}

#[test]
fn test_config_serde() {
    let config = PowConfig::new(14).with_threads(8);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<PowConfig>(&json).unwrap(), config);

    // Missing fields fall back to defaults
    let partial: PowConfig = serde_json::from_str(r#"{"threads": 2}"#).unwrap();
    assert_eq!(partial, PowConfig::default().with_threads(2));
}
