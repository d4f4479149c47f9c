//! 2-D projection of embeddings.

use crate::{Result, VizError};
use nalgebra::DMatrix;

/// Project an n-by-d embedding to 2-D coordinates.
///
/// Embeddings already in one or two dimensions pass through (padded with a
/// zero axis when d == 1); higher dimensions are reduced with PCA on the
/// centered matrix.
pub fn project_2d(y: &DMatrix<f64>) -> Result<Vec<(f64, f64)>> {
    let (n, d) = y.shape();
    if n == 0 || d == 0 {
        return Err(VizError::Projection("empty embedding".into()));
    }

    if d == 1 {
        return Ok((0..n).map(|i| (y[(i, 0)], 0.0)).collect());
    }
    if d == 2 || n < 2 {
        return Ok((0..n).map(|i| (y[(i, 0)], y[(i, 1)])).collect());
    }

    // PCA: SVD of the column-centered matrix, scores on the top two axes.
    let mut centered = y.clone();
    for j in 0..d {
        let mean = centered.column(j).mean();
        for i in 0..n {
            centered[(i, j)] -= mean;
        }
    }

    let svd = centered.clone().svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| VizError::Projection("SVD produced no right vectors".into()))?;

    let components = v_t.rows(0, 2).transpose();
    let scores = centered * components;
    Ok((0..n).map(|i| (scores[(i, 0)], scores[(i, 1)])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_2d() {
        let y = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let points = project_2d(&y).unwrap();
        assert_eq!(points, vec![(1.0, 2.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_pad_1d() {
        let y = DMatrix::from_row_slice(2, 1, &[5.0, 6.0]);
        let points = project_2d(&y).unwrap();
        assert_eq!(points, vec![(5.0, 0.0), (6.0, 0.0)]);
    }

    #[test]
    fn test_pca_recovers_dominant_axis() {
        // Points spread along one direction in 3-D; the first projected axis
        // must carry (almost) all the variance.
        let y = DMatrix::from_row_slice(
            4,
            3,
            &[
                0.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                2.0, 2.0, 0.0, //
                3.0, 3.0, 0.0,
            ],
        );
        let points = project_2d(&y).unwrap();
        let var_x: f64 = points.iter().map(|p| p.0 * p.0).sum();
        let var_y: f64 = points.iter().map(|p| p.1 * p.1).sum();
        assert!(var_x > 1.0);
        assert!(var_y < 1e-9);
    }

    #[test]
    fn test_empty_rejected() {
        let y = DMatrix::<f64>::zeros(0, 3);
        assert!(project_2d(&y).is_err());
    }
}
