//! Shared eigen-decomposition plumbing for the spectral methods.

use crate::{MethodError, Result};
use nalgebra::{DMatrix, SymmetricEigen};

/// Eigenvectors of a symmetric matrix for the `count` smallest eigenvalues
/// after skipping the `skip` smallest, as columns of an n-by-count matrix.
///
/// `SymmetricEigen` returns pairs in no particular order, so they are sorted
/// here.
pub(crate) fn bottom_eigenvectors(
    m: DMatrix<f64>,
    skip: usize,
    count: usize,
) -> Result<DMatrix<f64>> {
    let n = m.nrows();
    if skip + count > n {
        return Err(MethodError::DimensionTooLarge { d: count, n });
    }

    let eigen = SymmetricEigen::new(m);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut result = DMatrix::zeros(n, count);
    for (out_col, &src) in order[skip..skip + count].iter().enumerate() {
        result.set_column(out_col, &eigen.eigenvectors.column(src));
    }
    Ok(result)
}
