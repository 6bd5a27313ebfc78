// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense complex linear-algebra primitives shared by every physics module.
//!
//! Matrices are plain `ndarray` values; nothing in here mutates an argument
//! or keeps scratch state between calls, so all functions are reentrant.
//!
//! - [`eigh`]: Hermitian eigendecomposition (nalgebra `SymmetricEigen`)
//! - [`dagger`], [`trace`], [`commutator`]: operator algebra
//! - [`spectral_map`]: f(H) = Σ f(λₙ)|n⟩⟨n| from an eigendecomposition
//! - [`psd_sqrt`]: √ρ for positive semidefinite ρ

pub mod eigh;

pub use eigh::{eigh, eigvalsh, Eigh};

use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Dense square complex matrix.
pub type Matrix = Array2<Complex64>;

/// Dense complex state vector.
pub type StateVector = Array1<Complex64>;

/// 0 + 0i
pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);
/// 1 + 0i
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);
/// 0 + 1i
pub const I: Complex64 = Complex64::new(0.0, 1.0);

/// Real scalar as a complex number.
#[inline]
pub fn c(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

/// n × n identity.
pub fn identity(n: usize) -> Matrix {
    Array2::from_diag_elem(n, ONE)
}

/// Conjugate transpose M†.
pub fn dagger(m: &Matrix) -> Matrix {
    m.t().mapv(|z| z.conj())
}

/// Tr(M).
pub fn trace(m: &Matrix) -> Complex64 {
    m.diag().sum()
}

/// [A, B] = AB − BA
pub fn commutator(a: &Matrix, b: &Matrix) -> Matrix {
    a.dot(b) - b.dot(a)
}

/// {A, B} = AB + BA
pub fn anticommutator(a: &Matrix, b: &Matrix) -> Matrix {
    a.dot(b) + b.dot(a)
}

/// Frobenius norm sqrt(Σ|mᵢⱼ|²).
pub fn frobenius_norm(m: &Matrix) -> f64 {
    m.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Largest element modulus.
pub fn max_abs(m: &Matrix) -> f64 {
    m.iter().fold(0.0f64, |acc, z| acc.max(z.norm()))
}

/// (M + M†)/2
pub fn hermitian_part(m: &Matrix) -> Matrix {
    (m + &dagger(m)) * c(0.5)
}

/// |ψ⟩⟨ψ|
pub fn outer(psi: &StateVector) -> Matrix {
    let n = psi.len();
    Array2::from_shape_fn((n, n), |(i, j)| psi[i] * psi[j].conj())
}

/// ⟨ψ|ψ⟩
pub fn norm_sqr(psi: &StateVector) -> f64 {
    psi.iter().map(|z| z.norm_sqr()).sum()
}

/// Number of qubits for a 2ⁿ-dimensional space, `None` if `dim` is not a
/// power of two.
pub fn num_qubits(dim: usize) -> Option<usize> {
    if dim.is_power_of_two() {
        Some(dim.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Build Σₙ f(λₙ)|n⟩⟨n| from eigenvalues and matching eigenvector columns.
pub fn spectral_map<F>(values: &[f64], vectors: &Matrix, f: F) -> Matrix
where
    F: Fn(f64) -> Complex64,
{
    let mut scaled = vectors.clone();
    for (j, &lambda) in values.iter().enumerate() {
        let weight = f(lambda);
        scaled.column_mut(j).mapv_inplace(|z| z * weight);
    }
    scaled.dot(&dagger(vectors))
}

/// Principal square root of a positive semidefinite Hermitian matrix.
///
/// Eigenvalues within roundoff of zero (λ ≤ 8·d·ε·max|λ|) map to exactly
/// zero.
pub fn psd_sqrt(m: &Matrix) -> Matrix {
    let e = eigh(m);
    let scale = e.values.iter().fold(0.0f64, |acc, l| acc.max(l.abs()));
    let cutoff = 8.0 * e.values.len() as f64 * f64::EPSILON * scale;
    spectral_map(&e.values, &e.vectors, |l| {
        if l > cutoff {
            c(l.sqrt())
        } else {
            ZERO
        }
    })
}
