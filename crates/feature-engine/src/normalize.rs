use nalgebra::DMatrix;

/// Per-column min-max scaling to `[0, 1]`.
///
/// A constant column (min == max) maps entirely to 0.0. Row order is kept.
pub fn normalize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut scaled = matrix.clone();
    if scaled.nrows() == 0 {
        return scaled;
    }

    for mut column in scaled.column_iter_mut() {
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        for value in column.iter_mut() {
            *value = if range == 0.0 { 0.0 } else { (*value - min) / range };
        }
    }

    scaled
}
