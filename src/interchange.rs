// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! JSON interchange for complex matrices and vectors.
//!
//! A complex number is a `[re, im]` pair, a vector is an array of pairs and
//! a matrix is an array of rows:
//!
//! ```json
//! [[[1.0, 0.0], [0.0, 0.0]],
//!  [[0.0, 0.0], [-1.0, 0.0]]]
//! ```

use num_complex::Complex64;
use serde::Serializer;

use crate::error::{Result, ValidationError};
use crate::kernel::{Matrix, StateVector};

/// `[re, im]`
pub type ComplexPair = [f64; 2];

/// Rows of `[re, im]` pairs.
pub type MatrixRows = Vec<Vec<ComplexPair>>;

fn to_complex([re, im]: ComplexPair) -> Complex64 {
    Complex64::new(re, im)
}

fn to_pair(z: &Complex64) -> ComplexPair {
    [z.re, z.im]
}

/// Build a matrix from rows of pairs.
///
/// # Errors
/// - `Dimension` if there are no rows or the rows have unequal lengths
pub fn matrix_from_rows(rows: &[Vec<ComplexPair>], subject: &str) -> Result<Matrix> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if nrows == 0 || ncols == 0 {
        return Err(ValidationError::dimension(subject, "matrix is empty").into());
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        return Err(ValidationError::dimension(
            subject,
            format!("row {i} has {} entries, expected {ncols}", row.len()),
        )
        .into());
    }
    Ok(Matrix::from_shape_fn((nrows, ncols), |(i, j)| to_complex(rows[i][j])))
}

pub fn matrix_to_rows(m: &Matrix) -> MatrixRows {
    m.rows()
        .into_iter()
        .map(|row| row.iter().map(to_pair).collect())
        .collect()
}

/// Build a state vector from pairs.
pub fn vector_from_pairs(pairs: &[ComplexPair], subject: &str) -> Result<StateVector> {
    if pairs.is_empty() {
        return Err(ValidationError::dimension(subject, "vector is empty").into());
    }
    Ok(pairs.iter().copied().map(to_complex).collect())
}

pub fn vector_to_pairs(psi: &StateVector) -> Vec<ComplexPair> {
    psi.iter().map(to_pair).collect()
}

/// `serialize_with` adapter for matrix fields.
pub fn serialize_matrix<S: Serializer>(m: &Matrix, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(matrix_to_rows(m))
}

/// `serialize_with` adapter for optional matrix fields.
pub fn serialize_opt_matrix<S: Serializer>(
    m: &Option<Matrix>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match m {
        Some(m) => serialize_matrix(m, serializer),
        None => serializer.serialize_none(),
    }
}
