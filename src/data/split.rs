//! Stratified train/test split

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::DataError;

/// Result of [`split_dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Split<T> {
    pub x_train: Vec<T>,
    pub x_test: Vec<T>,
    pub y_train: Vec<usize>,
    pub y_test: Vec<usize>,
}

/// Split rows into train/test partitions, preserving class proportions.
///
/// The test partition holds `ceil(test_fraction * n)` rows. Per-class test
/// counts are allocated by largest remainder so that each class keeps its
/// share up to integer rounding. Same inputs and seed give the same split.
pub fn split_dataset<T: Clone>(
    features: &[T],
    target: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<Split<T>, DataError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(DataError::InvalidTestFraction(test_fraction));
    }
    if features.len() != target.len() {
        return Err(DataError::LengthMismatch {
            features: features.len(),
            target: target.len(),
        });
    }
    if features.is_empty() {
        return Err(DataError::Empty);
    }

    let n = features.len();
    // Guard against products like 0.3 * 150 = 45.000000000000004
    let n_test = (test_fraction * n as f64 - 1e-9).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DataError::DegenerateSplit {
            n_samples: n,
            test_fraction,
        });
    }

    tracing::info!("Splitting data with test_size={}", test_fraction);

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in target.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let quotas = allocate_test_counts(&by_class, n, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n - n_test);
    let mut test_idx = Vec::with_capacity(n_test);

    for (indices, quota) in by_class.into_values().zip(quotas) {
        let mut indices = indices;
        indices.shuffle(&mut rng);
        let (test, train) = indices.split_at(quota);
        test_idx.extend_from_slice(test);
        train_idx.extend_from_slice(train);
    }

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    let pick = |idx: &[usize]| -> (Vec<T>, Vec<usize>) {
        idx.iter()
            .map(|&i| (features[i].clone(), target[i]))
            .unzip()
    };

    let (x_train, y_train) = pick(&train_idx);
    let (x_test, y_test) = pick(&test_idx);

    Ok(Split {
        x_train,
        x_test,
        y_train,
        y_test,
    })
}

/// Largest-remainder apportionment of `n_test` rows across classes.
/// Returned counts follow the key order of `by_class`.
fn allocate_test_counts(
    by_class: &BTreeMap<usize, Vec<usize>>,
    n: usize,
    n_test: usize,
) -> Vec<usize> {
    let mut quotas = Vec::with_capacity(by_class.len());
    let mut remainders = Vec::with_capacity(by_class.len());

    for (pos, indices) in by_class.values().enumerate() {
        let exact = indices.len() * n_test;
        quotas.push(exact / n);
        remainders.push((exact % n, pos));
    }

    let mut left = n_test - quotas.iter().sum::<usize>();
    // Biggest remainder first, lower class first on ties
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, pos) in &remainders {
        if left == 0 {
            break;
        }
        let class_size = by_class.values().nth(pos).map_or(0, Vec::len);
        if quotas[pos] < class_size {
            quotas[pos] += 1;
            left -= 1;
        }
    }

    quotas
}
