//! Seeded train/test split.
//!
//! Rows are ranked by a BLAKE3 sub-seed of their timestamp, and the lowest
//! `ceil(n * test_fraction)` ranks form the test set. Rank depends only on
//! `(seed, timestamp)`, so the partition is the same whatever order the rows
//! arrive in.

use super::{Dataset, ForecastError, Result, Sample};
use crate::rng::SeedHierarchy;

const SPLIT_LABEL: &str = "train-test-split";

/// Split into `(train, test)`, both in ascending date order.
pub fn split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = dataset.len();
    let test_n = (n as f64 * test_fraction).ceil() as usize;
    if test_n == 0 || test_n >= n {
        return Err(ForecastError::InsufficientData {
            needed: test_n + 1,
            got: n,
        });
    }

    let seeds = SeedHierarchy::new(seed);
    let mut ranked: Vec<(u64, Sample)> = dataset
        .samples()
        .iter()
        .map(|s| {
            let timestamp = s.x as i64;
            (seeds.sub_seed(SPLIT_LABEL, &timestamp.to_le_bytes()), *s)
        })
        .collect();
    // dates are unique, so the tiebreak only matters on hash collisions
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.date.cmp(&b.1.date)));

    let test: Vec<Sample> = ranked[..test_n].iter().map(|(_, s)| *s).collect();
    let train: Vec<Sample> = ranked[test_n..].iter().map(|(_, s)| *s).collect();

    Ok((Dataset::from_samples(train), Dataset::from_samples(test)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::prepare;
    use crate::indicators::make_series;
    use proptest::prelude::*;

    fn dataset(n: usize) -> Dataset {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        prepare(&make_series(&closes)).unwrap()
    }

    #[test]
    fn test_size_rounds_up() {
        let (train, test) = split(&dataset(10), 0.2, 42).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(train.len(), 8);

        let (train, test) = split(&dataset(11), 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let ds = dataset(50);
        let (train, test) = split(&ds, 0.2, 42).unwrap();
        let mut dates: Vec<_> = train
            .samples()
            .iter()
            .chain(test.samples())
            .map(|s| s.date)
            .collect();
        dates.sort();
        dates.dedup();
        assert_eq!(dates.len(), 50);
    }

    #[test]
    fn partitions_are_date_ordered() {
        let (train, test) = split(&dataset(30), 0.3, 7).unwrap();
        assert!(train.samples().windows(2).all(|w| w[0].date < w[1].date));
        assert!(test.samples().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn same_seed_same_split() {
        let ds = dataset(40);
        assert_eq!(split(&ds, 0.2, 42).unwrap(), split(&ds, 0.2, 42).unwrap());
    }

    #[test]
    fn different_seed_changes_membership() {
        let ds = dataset(40);
        let (_, a) = split(&ds, 0.2, 1).unwrap();
        let (_, b) = split(&ds, 0.2, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fraction_out_of_range_is_rejected() {
        let ds = dataset(10);
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                split(&ds, bad, 42),
                Err(ForecastError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn empty_train_partition_is_insufficient() {
        // ceil(2 * 0.6) = 2 leaves nothing to train on
        assert!(matches!(
            split(&dataset(2), 0.6, 42),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    proptest! {
        #[test]
        fn membership_ignores_input_order(
            closes in prop::collection::vec(1.0..1e5_f64, 3..60),
            seed in any::<u64>(),
        ) {
            let sorted = prepare(&make_series(&closes)).unwrap();
            let mut samples = sorted.samples().to_vec();
            samples.reverse();
            // bypass from_samples so split sees the rows newest first
            let reversed = Dataset { samples };
            prop_assert_ne!(reversed.samples()[0].date, sorted.samples()[0].date);

            prop_assert_eq!(
                split(&sorted, 0.25, seed).unwrap(),
                split(&reversed, 0.25, seed).unwrap()
            );
        }
    }
}
