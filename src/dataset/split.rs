//! Seeded train/test splitting.

use super::Table;
use crate::preprocessing::error::PreprocessingError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle the rows with a seeded RNG and split them into `(train, test)`.
///
/// The test part receives `ceil(n_rows * test_size)` rows. The same table,
/// `test_size` and `seed` always produce the same split.
///
/// # Errors
/// Returns [`PreprocessingError::InvalidParameter`] if `test_size` is not in
/// `(0, 1)` or if either part would be empty.
pub fn train_test_split(
    table: &Table,
    test_size: f64,
    seed: u64,
) -> Result<(Table, Table), PreprocessingError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PreprocessingError::InvalidParameter(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n = table.n_rows();
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PreprocessingError::InvalidParameter(format!(
            "cannot split {} rows with test_size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = table.take_rows(&indices[..n_test]);
    let train = table.take_rows(&indices[n_test..]);
    Ok((train, test))
}
