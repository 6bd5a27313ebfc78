// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for physics-core tests.

use ndarray::{array, Array1, Array2};
use num_complex::Complex64;
use proptest::prelude::*;

use crate::kernel::{c, dagger, outer, Matrix, StateVector, ONE, ZERO};

pub use crate::operators::{pauli_x, pauli_y, pauli_z};

/// Check matrix equality element-wise within `tol`.
pub fn assert_matrix_close(a: &Matrix, b: &Matrix, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff <= tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// Check vector equality element-wise within `tol`.
pub fn assert_vector_close(a: &StateVector, b: &StateVector, tol: f64) {
    assert_eq!(a.len(), b.len());
    for (k, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).norm();
        assert!(diff <= tol, "Mismatch at {}: {:?} vs {:?} (diff={})", k, x, y, diff);
    }
}

/// Computational basis state |index⟩ in dimension `dim`.
pub fn basis_state(dim: usize, index: usize) -> StateVector {
    let mut psi = Array1::zeros(dim);
    psi[index] = ONE;
    psi
}

/// Bell states |Φ±⟩ = (|00⟩ ± |11⟩)/√2, |Ψ±⟩ = (|01⟩ ± |10⟩)/√2.
pub fn bell_states() -> Vec<StateVector> {
    let s = c(std::f64::consts::FRAC_1_SQRT_2);
    vec![
        array![s, ZERO, ZERO, s],
        array![s, ZERO, ZERO, -s],
        array![ZERO, s, s, ZERO],
        array![ZERO, s, -s, ZERO],
    ]
}

/// |Φ+⟩⟨Φ+|
pub fn bell_density() -> Matrix {
    outer(&bell_states()[0])
}

/// |+⟩ ⊗ |0⟩, a product state.
pub fn product_state() -> StateVector {
    let s = c(std::f64::consts::FRAC_1_SQRT_2);
    array![s, ZERO, s, ZERO]
}

/// I/d
pub fn maximally_mixed(dim: usize) -> Matrix {
    Array2::from_diag_elem(dim, c(1.0 / dim as f64))
}

/// Deterministic pseudo-random Hermitian matrix (splitmix64 stream).
pub fn random_hermitian(dim: usize, seed: u64) -> Matrix {
    let mut rng = SplitMix(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));
    let m = Array2::from_shape_fn((dim, dim), |_| {
        Complex64::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5)
    });
    (&m + &dagger(&m)) * c(0.5)
}

/// Deterministic pseudo-random normalized state.
pub fn random_state(dim: usize, seed: u64) -> StateVector {
    let mut rng = SplitMix(seed.wrapping_mul(0xBF58_476D_1CE4_E5B9).wrapping_add(1));
    let psi = Array1::from_shape_fn(dim, |_| {
        Complex64::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5)
    });
    let norm = psi.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    psi.mapv(|z| z / norm)
}

/// Deterministic pseudo-random density matrix ρ = A A† / Tr(A A†).
pub fn random_density(dim: usize, seed: u64) -> Matrix {
    let mut rng = SplitMix(seed ^ 0x94D0_49BB_1331_11EB);
    let a = Array2::from_shape_fn((dim, dim), |_| {
        Complex64::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5)
    });
    let rho = a.dot(&dagger(&a));
    let tr = rho.diag().sum();
    rho.mapv(|z| z / tr)
}

/// Proptest strategy: (qubit count, random density matrix) for 1–3 qubits.
pub fn density_strategy() -> impl Strategy<Value = (usize, Matrix)> {
    (1usize..=3, any::<u64>()).prop_map(|(n, seed)| (n, random_density(1 << n, seed)))
}

/// Proptest strategy: (qubit count, random Hermitian matrix) for 1–3 qubits.
pub fn hermitian_strategy() -> impl Strategy<Value = (usize, Matrix)> {
    (1usize..=3, any::<u64>()).prop_map(|(n, seed)| (n, random_hermitian(1 << n, seed)))
}

struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}
