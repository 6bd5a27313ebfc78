// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hermitian eigendecomposition.
//!
//! Backed by nalgebra's [`SymmetricEigen`], which handles complex
//! Hermitian input: Householder reduction to a real tridiagonal form,
//! then implicit symmetric QR. The matrix is scaled by its largest entry
//! before the reduction, so spectra near the `f64` range limits come back
//! intact.
//!
//! This module converts between the crate's `ndarray` matrices and
//! nalgebra's `DMatrix`, and sorts the result into ascending order.

use nalgebra::{DMatrix, SymmetricEigen};
use num_complex::Complex64;

use super::{hermitian_part, identity, Matrix};

/// Cap on implicit QR iterations before the decomposition is reported as
/// failed. Well-conditioned inputs converge in a few iterations per
/// eigenvalue.
const MAX_ITERATIONS: usize = 10_000;

/// Eigendecomposition of a Hermitian matrix.
#[derive(Debug, Clone)]
pub struct Eigh {
    /// Eigenvalues in ascending order.
    pub values: Vec<f64>,
    /// Orthonormal eigenvectors as columns, in the order of `values`.
    pub vectors: Matrix,
}

impl Eigh {
    /// All-NaN result for input the solver cannot handle. Every
    /// downstream check rejects it.
    fn undefined(n: usize) -> Self {
        let nan = Complex64::new(f64::NAN, f64::NAN);
        Self {
            values: vec![f64::NAN; n],
            vectors: Matrix::from_elem((n, n), nan),
        }
    }
}

/// Diagonalize a Hermitian matrix.
///
/// The input is symmetrized as (M + M†)/2 first, so anti-Hermitian noise
/// below the validation tolerance does not leak into the eigenvalues.
/// Callers are expected to have validated Hermiticity. Non-finite input,
/// or a decomposition that fails to converge, yields NaN eigenvalues.
pub fn eigh(m: &Matrix) -> Eigh {
    let n = m.nrows();
    debug_assert_eq!(n, m.ncols(), "eigh requires a square matrix");

    match n {
        0 => {
            return Eigh {
                values: Vec::new(),
                vectors: Matrix::zeros((0, 0)),
            }
        }
        1 => {
            return Eigh {
                values: vec![m[[0, 0]].re],
                vectors: identity(1),
            }
        }
        _ => {}
    }
    if m.iter().any(|z| !(z.re.is_finite() && z.im.is_finite())) {
        return Eigh::undefined(n);
    }

    let a = hermitian_part(m);
    let dense = DMatrix::from_fn(n, n, |i, j| a[[i, j]]);
    let Some(decomposition) = SymmetricEigen::try_new(dense, f64::EPSILON, MAX_ITERATIONS) else {
        return Eigh::undefined(n);
    };

    let mut order: Vec<(usize, f64)> = decomposition
        .eigenvalues
        .iter()
        .copied()
        .enumerate()
        .collect();
    order.sort_by(|x, y| x.1.total_cmp(&y.1));

    let values = order.iter().map(|&(_, e)| e).collect();
    let vectors = Matrix::from_shape_fn((n, n), |(i, j)| decomposition.eigenvectors[(i, order[j].0)]);

    Eigh { values, vectors }
}

/// Eigenvalues only, ascending.
pub fn eigvalsh(m: &Matrix) -> Vec<f64> {
    eigh(m).values
}
