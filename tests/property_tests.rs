//! Property-based and stress tests for the batch-GCD engine, run end to end
//! through `BatchGcdEngine::run` against a naive O(n^2) gcd oracle.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # Increase case count for thorough testing (default is 256):
//! PROPTEST_CASES=2000 cargo test --test property_tests
//! ```
//!
//! # Testing strategy
//!
//! `prop_batch_gcd_matches_naive_oracle` is the core property from the spec:
//! for any non-empty batch of moduli > 1, `G_i > 1` iff `N_i` shares a prime
//! factor with some other `N_j` in the batch. `prop_permutation_invariance`
//! checks that permuting the input permutes the output identically. The
//! remaining tests are concrete scenarios and a larger stress run.

use batchgcd::bignum::Bignum;
use batchgcd::engine::{BatchGcdEngine, EngineConfig};
use proptest::prelude::*;

fn run_batch(vals: &[u64], spill_threshold: usize) -> Vec<Bignum> {
    let dir = tempfile::tempdir().unwrap();
    let engine = BatchGcdEngine::new(EngineConfig {
        workers: Some(4),
        working_dir: dir.path().to_path_buf(),
        spill_threshold,
    });
    let leaves: Vec<Bignum> = vals.iter().map(|&v| Bignum::from_u64(v)).collect();
    engine.run(leaves).unwrap()
}

fn naive_gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        naive_gcd(b, a % b)
    }
}

proptest! {
    /// `G_i > 1` iff `N_i` shares a factor with some other `N_j` (spec §8).
    #[test]
    fn prop_batch_gcd_matches_naive_oracle(
        vals in prop::collection::vec(2u64..5000, 2..40),
    ) {
        let g = run_batch(&vals, usize::MAX);
        for i in 0..vals.len() {
            let any_shared = (0..vals.len())
                .any(|j| j != i && naive_gcd(vals[i], vals[j]) != 1);
            prop_assert_eq!(g[i] != Bignum::from_u64(1), any_shared, "leaf {}", i);
        }
    }

    /// Permuting the input permutes the output identically.
    #[test]
    fn prop_permutation_invariance(
        vals in prop::collection::vec(2u64..5000, 2..20),
        seed in 0u64..10000,
    ) {
        let mut permuted = vals.clone();
        // deterministic shuffle via a simple index rotation, no RNG state needed
        let shift = (seed as usize) % permuted.len().max(1);
        permuted.rotate_left(shift);

        let g_original = run_batch(&vals, usize::MAX);
        let g_permuted = run_batch(&permuted, usize::MAX);

        for (i, &v) in vals.iter().enumerate() {
            let j = permuted.iter().position(|&p| p == v).unwrap();
            prop_assert_eq!(&g_original[i], &g_permuted[j]);
        }
    }

    /// Spilling to disk must not change the result versus fully in-memory descent.
    #[test]
    fn prop_spilling_does_not_change_result(
        vals in prop::collection::vec(2u64..5000, 2..60),
    ) {
        let resident = run_batch(&vals, usize::MAX);
        let spilled = run_batch(&vals, 4);
        prop_assert_eq!(resident, spilled);
    }
}

#[test]
fn stress_large_batch_against_naive_oracle() {
    let vals: Vec<u64> = (2..1200).collect();
    let g = run_batch(&vals, 64);
    for i in 0..vals.len() {
        let any_shared = (0..vals.len()).any(|j| j != i && naive_gcd(vals[i], vals[j]) != 1);
        assert_eq!(g[i] != Bignum::from_u64(1), any_shared, "leaf {} (value {})", i, vals[i]);
    }
}

#[test]
fn large_bitlength_moduli_round_trip() {
    // Three ~2048-bit moduli: n0 = P*Q, n1 = P*R share prime factor P; n2 is
    // an unrelated ~2048-bit value coprime to both.
    let n0 = "0x31574467ff692d5f905c4c436972563f0e586f33441bfd27bef8c9208594d56831b9badda5e99a4f51b096018939873663db6ca32d1bafd0b61812bea551cc105443d041627e281609ff1878e3fc20da938c3d7d33bbfd2b0534eadd6878b1173f0963d482753a452eb66983dffdb7f8454dda29b0d9eefc02aea41237aa489c822ce6940067692e78f7dbb22aab00e3f4495e4768ef0f6b6d080b8862614c6d260cad9b91016a917b39cca229e77dbeae6c62ddce30df7b4b37de7331c631db3db2998c737617689f58ea8b79b1e05533b93a300650c40afde3b4e51063219823bc4c6b63cc2101d5c3889bd37cd55cb4edef45aebbbf214641dd9b33e161fd";
    let n1 = "0x30b1e792bde0000381639926edd8273a88d67d89f49bafd00f007cbfd1ae35708d7e401ca015e87305fffffba62ce395a4fe02f84931127706300a46a81a3b74392f2d39c0db7816301ca345097c53c5e565f27618e1d5a1530adacfd7bdbaf141aed76cf2c602c2f47c44d953855b747623878a9f1bd535bfb6c71c8d1931d927c7c8e6490c0226423afd4bcc3c0664615a232358b24a1c3a4f410e3888691aa91c663e3d4a400f765ac6d634e620e8ad94a9b44e253f0e03106461952c25ddd835d56ad75c6372b3a838f794e5446da23eb2451f485ca70427617d788facecb9c7d05041414fec2468ccdcc4c9e1bc6df6a739cee4db84ce8e6e294c963491";
    let n2 = "0xbeb799193f22faf823bed01d43cf2fde24933b83757750a9a491f0b2ea1fca65e27a984d654821d07fcd9eb1a7cad415366eb16f508ebad7b7c93acfe059a0ee9132b63ef16287e4e9c349e03602f8ac10f1bc81448aaa9e66b2bc5b50c187fcce177b4e0837b8a3d261a7ab3aa2e4f90e51f30dc6a7ee39c4b032ccd7c524a55304317faf42e12f3838b3268e944239b02b61c4a3d70628ece66fa2fd5166e6451b4cf36123fdf77656af7229d4beef3eabedcbbaa80dd488bd64072bcfbe01a28defe39bf0027312476f57a5e5a5abaefcfad8efc89849b3aa7efe4458a885ab9099a435a240ae5af305535ec42e0829a3b2e95d65a441d58842dea2bc372f";

    let leaves = vec![
        Bignum::from_hex(n0).unwrap(),
        Bignum::from_hex(n1).unwrap(),
        Bignum::from_hex(n2).unwrap(),
    ];
    let dir = tempfile::tempdir().unwrap();
    let engine = BatchGcdEngine::new(EngineConfig {
        workers: Some(2),
        working_dir: dir.path().to_path_buf(),
        spill_threshold: usize::MAX,
    });
    let g = engine.run(leaves).unwrap();
    assert!(g[0] != Bignum::from_u64(1));
    assert!(g[1] != Bignum::from_u64(1));
}
