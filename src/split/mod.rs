//! Deterministic train/validation partitioning.
//!
//! The partition is a pure function of `(identifiers, ratio, generator)`:
//! input is sorted first so directory-listing order never leaks into the
//! result, then fully shuffled, then cut at `floor(len * ratio)`.

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::Yolo2CocoError;

/// Default fraction of images that go to the training split.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.9;

/// Default seed for the split shuffle.
pub const DEFAULT_SEED: u64 = 42;

/// The two disjoint subsets produced by a split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainValSplit<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
}

impl<T> TrainValSplit<T> {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.val.is_empty()
    }
}

/// Rejects ratios that are not strictly inside `(0, 1)`.
pub fn validate_train_ratio(ratio: f64) -> Result<(), Yolo2CocoError> {
    if ratio.is_finite() && 0.0 < ratio && ratio < 1.0 {
        Ok(())
    } else {
        Err(Yolo2CocoError::InvalidSplitRatio { ratio })
    }
}

/// Number of items that land in the training split.
pub fn train_count(total: usize, ratio: f64) -> usize {
    ((total as f64 * ratio).floor() as usize).min(total)
}

/// Splits `items` using a generator seeded from `seed`.
pub fn split_train_val<T: Ord>(
    items: Vec<T>,
    train_ratio: f64,
    seed: u64,
) -> Result<TrainValSplit<T>, Yolo2CocoError> {
    let mut rng = StdRng::seed_from_u64(seed);
    split_with_rng(items, train_ratio, &mut rng)
}

/// Splits `items` using a caller-supplied generator.
pub fn split_with_rng<T: Ord, R: Rng + ?Sized>(
    mut items: Vec<T>,
    train_ratio: f64,
    rng: &mut R,
) -> Result<TrainValSplit<T>, Yolo2CocoError> {
    validate_train_ratio(train_ratio)?;

    items.sort();
    items.shuffle(rng);

    let cut = train_count(items.len(), train_ratio);
    let val = items.split_off(cut);

    Ok(TrainValSplit { train: items, val })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img_{i:04}.jpg")).collect()
    }

    #[test]
    fn same_seed_gives_identical_partitions() {
        let a = split_train_val(names(50), 0.8, 7).expect("split");
        let b = split_train_val(names(50), 0.8, 7).expect("split");
        assert_eq!(a, b);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut reversed = names(30);
        reversed.reverse();

        let a = split_train_val(names(30), 0.9, 42).expect("split");
        let b = split_train_val(reversed, 0.9, 42).expect("split");
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let a = split_train_val(names(100), 0.5, 1).expect("split");
        let b = split_train_val(names(100), 0.5, 2).expect("split");
        assert_ne!(a.train, b.train);
    }

    #[test]
    fn cut_uses_floor() {
        let split = split_train_val(names(10), 0.95, 42).expect("split");
        assert_eq!(split.train.len(), 9);
        assert_eq!(split.val.len(), 1);

        let split = split_train_val(names(3), 0.5, 42).expect("split");
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.val.len(), 2);
    }

    #[test]
    fn partition_is_complete_and_disjoint() {
        let input = names(37);
        let split = split_train_val(input.clone(), 0.7, 3).expect("split");

        let train: BTreeSet<_> = split.train.iter().cloned().collect();
        let val: BTreeSet<_> = split.val.iter().cloned().collect();
        assert!(train.is_disjoint(&val));

        let union: BTreeSet<_> = train.union(&val).cloned().collect();
        let expected: BTreeSet<_> = input.into_iter().collect();
        assert_eq!(union, expected);
        assert_eq!(split.len(), 37);
    }

    #[test]
    fn explicit_generator_matches_seeded_variant() {
        let mut rng = StdRng::seed_from_u64(42);
        let explicit = split_with_rng(names(20), 0.9, &mut rng).expect("split");
        let seeded = split_train_val(names(20), 0.9, 42).expect("split");
        assert_eq!(explicit, seeded);
    }

    #[test]
    fn empty_input_gives_empty_subsets() {
        let split = split_train_val(Vec::<String>::new(), 0.9, 42).expect("split");
        assert!(split.is_empty());
    }

    #[test]
    fn ratio_must_be_strictly_inside_unit_interval() {
        for ratio in [0.0, 1.0, -0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = split_train_val(names(4), ratio, 42).unwrap_err();
            assert!(matches!(err, Yolo2CocoError::InvalidSplitRatio { .. }));
        }
    }
}
