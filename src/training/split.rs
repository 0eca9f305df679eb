//! Stratified train/test split

use crate::error::{Result, TrainingError};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Row indices of the two partitions, each in ascending order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows so both partitions keep the label proportions.
///
/// Rows of each class are shuffled with a ChaCha8 generator seeded by `seed`;
/// each class sends `round(n_class * test_size)` rows to the test side, clamped
/// so neither side is left without that class.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::InvalidTestSize(test_size).into());
    }

    let by_class: Vec<(u8, Vec<usize>)> = [0u8, 1u8]
        .into_iter()
        .map(|class| {
            let rows: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == class)
                .map(|(i, _)| i)
                .collect();
            (class, rows)
        })
        .filter(|(_, rows)| !rows.is_empty())
        .collect();

    if by_class.len() < 2 {
        return Err(TrainingError::DegenerateLabels(by_class.len()).into());
    }
    for (class, rows) in &by_class {
        if rows.len() < 2 {
            return Err(TrainingError::InsufficientClassMembers {
                class: *class,
                count: rows.len(),
            }
            .into());
        }
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for (_, mut rows) in by_class {
        rows.shuffle(&mut rng);
        let n_test = ((rows.len() as f64 * test_size).round() as usize).clamp(1, rows.len() - 1);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}
