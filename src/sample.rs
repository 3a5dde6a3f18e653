//! Sampler (C4): draws `K` satisfying assignments by descending the BDD,
//! choosing branches with probability proportional to the odd/even path
//! counts from (C3), filling untouched ("don't-care") variables uniformly,
//! deduplicating, and truncating to the requested count.

use std::collections::HashSet;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;
use rand_mt::Mt19937GenRand64;

use crate::bdd::{Edge, Manager};
use crate::count::PathCounts;

/// A full assignment to the `N` primary inputs, one bit per input.
pub type Assignment = Vec<bool>;

/// How a sampling run concluded. `GaveUp` is not an error: whatever was
/// collected before the give-up threshold is still emitted with exit 0.
pub enum Outcome {
    Complete(Vec<Assignment>),
    GaveUp(Vec<Assignment>),
}

const MAX_ATTEMPTS: u32 = 100;

fn giveup_threshold(k: usize) -> usize {
    (10 * k).max(10_000)
}

/// Draw up to `k` distinct satisfying assignments of the formula rooted at
/// `output`, using `num_inputs` primary inputs and the given RNG seed.
pub fn sample(
    manager: &Manager,
    output: Edge,
    counts: &PathCounts,
    num_inputs: usize,
    k: usize,
    seed: u64,
) -> Outcome {
    let mut rng = Mt19937GenRand64::new(seed);

    if k == 0 {
        return Outcome::Complete(Vec::new());
    }

    let mut seen: HashSet<Assignment> = HashSet::new();
    let mut ordered: Vec<Assignment> = Vec::new();
    let target = 2 * k;
    let giveup = giveup_threshold(k);
    let mut attempts_without_new = 0usize;

    while ordered.len() < target {
        match draw_one(manager, output, counts, num_inputs, &mut rng) {
            Some(assignment) => {
                if seen.insert(assignment.clone()) {
                    ordered.push(assignment);
                    attempts_without_new = 0;
                } else {
                    attempts_without_new += 1;
                }
            }
            None => {
                attempts_without_new += 1;
            }
        }
        if attempts_without_new >= giveup {
            break;
        }
    }

    let gave_up = ordered.len() < k;
    if gave_up {
        log::warn!(
            "sampler gave up: found {} of {} requested unique assignments",
            ordered.len(),
            k
        );
        return Outcome::GaveUp(ordered);
    }

    // Shuffle with the RNG's surviving stream, then truncate to exactly k.
    shuffle(&mut ordered, &mut rng);
    ordered.truncate(k);
    Outcome::Complete(ordered)
}

fn shuffle<R: Rng>(items: &mut [Assignment], rng: &mut R) {
    // Fisher-Yates, consuming RNG state exactly as `rand::seq::SliceRandom`
    // would, kept explicit so the sampler has no dependency on a shuffle
    // that might draw variates in a different order across `rand` versions.
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// One attempt at a full weighted descent, restarting up to `MAX_ATTEMPTS`
/// times if an internal inconsistency is hit (spec's fallback for a
/// path-count bug surfacing as a leaf that disagrees with `target_odd`).
fn draw_one<R: Rng>(
    manager: &Manager,
    output: Edge,
    counts: &PathCounts,
    num_inputs: usize,
    rng: &mut R,
) -> Option<Assignment> {
    for _ in 0..MAX_ATTEMPTS {
        if let Some(assignment) = try_descend(manager, output, counts, num_inputs, rng) {
            return Some(assignment);
        }
    }
    None
}

fn try_descend<R: Rng>(
    manager: &Manager,
    output: Edge,
    counts: &PathCounts,
    num_inputs: usize,
    rng: &mut R,
) -> Option<Assignment> {
    let mut touched = vec![false; num_inputs];
    let mut bits = vec![false; num_inputs];

    let mut node = manager.regular(output);
    let mut target_odd = manager.is_complemented(output);

    while !manager.is_constant(node) {
        let var = manager.var(node) as usize;
        let hi = manager.hi(node);
        let lo = manager.lo(node);

        let target_odd_hi = target_odd ^ manager.is_complemented(hi);
        let target_odd_lo = target_odd ^ manager.is_complemented(lo);

        let (o_hi, e_hi) = counts.edge_counts(manager, manager.regular(hi));
        let (o_lo, e_lo) = counts.edge_counts(manager, manager.regular(lo));
        let w_hi = if target_odd_hi { &o_hi } else { &e_hi };
        let w_lo = if target_odd_lo { &o_lo } else { &e_lo };

        let total = w_hi + w_lo;
        if total.is_zero() {
            return None; // inconsistent weights: let the caller retry
        }

        let choose_hi = draw_weighted(rng, w_hi, &total);
        bits[var] = choose_hi;
        touched[var] = true;

        if choose_hi {
            node = manager.regular(hi);
            target_odd = target_odd_hi;
        } else {
            node = manager.regular(lo);
            target_odd = target_odd_lo;
        }
    }

    let reached_one = node == Edge::ONE && !target_odd;
    if !reached_one {
        return None;
    }

    for (i, was_touched) in touched.iter().enumerate() {
        if !was_touched {
            bits[i] = rng.gen_bool(0.5);
        }
    }
    Some(bits)
}

/// Draw `true` (choose the hi branch) with probability `w_hi / total`,
/// using extended-precision weights reduced to `f64` only at the point they
/// feed the RNG draw.
fn draw_weighted<R: Rng>(rng: &mut R, w_hi: &BigUint, total: &BigUint) -> bool {
    let ratio = biguint_ratio(w_hi, total);
    rng.gen::<f64>() < ratio
}

fn biguint_ratio(numerator: &BigUint, denominator: &BigUint) -> f64 {
    // BigUint has no native `to_f64`; approximate via a shared decimal scale
    // wide enough that the ratio survives rounding (the RNG draw only needs
    // the reduced ratio, per the extended-precision design note).
    const SCALE_DIGITS: u32 = 30;
    let scale = BigUint::from(10u32).pow(SCALE_DIGITS);
    if denominator.is_zero() {
        return 0.0;
    }
    let scaled = (numerator * &scale) / denominator;
    let scaled_str = scaled.to_string();
    scaled_str.parse::<f64>().unwrap_or(0.0) / 10f64.powi(SCALE_DIGITS as i32)
}
