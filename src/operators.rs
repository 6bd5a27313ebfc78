// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Standard single-qubit operators.
//!
//! Basis convention: |0⟩ = (1, 0), |1⟩ = (0, 1), so σz|0⟩ = +|0⟩.

use ndarray::array;

use crate::kernel::{c, identity, Matrix, I, ONE, ZERO};

/// σx
pub fn pauli_x() -> Matrix {
    array![[ZERO, ONE], [ONE, ZERO]]
}

/// σy
pub fn pauli_y() -> Matrix {
    array![[ZERO, -I], [I, ZERO]]
}

/// σz
pub fn pauli_z() -> Matrix {
    array![[ONE, ZERO], [ZERO, c(-1.0)]]
}

/// σ⁺ = |1⟩⟨0| (raises |0⟩ → |1⟩)
pub fn sigma_plus() -> Matrix {
    array![[ZERO, ZERO], [ONE, ZERO]]
}

/// σ⁻ = |0⟩⟨1| (lowers |1⟩ → |0⟩)
pub fn sigma_minus() -> Matrix {
    array![[ZERO, ONE], [ZERO, ZERO]]
}

/// n = |1⟩⟨1| = (I − σz)/2
pub fn number() -> Matrix {
    array![[ZERO, ZERO], [ZERO, ONE]]
}

/// Hadamard gate.
pub fn hadamard() -> Matrix {
    let s = c(std::f64::consts::FRAC_1_SQRT_2);
    array![[s, s], [s, -s]]
}

/// Pauli matrix by label (`'I'`, `'X'`, `'Y'`, `'Z'`).
pub fn pauli(label: char) -> Option<Matrix> {
    match label.to_ascii_uppercase() {
        'I' => Some(identity(2)),
        'X' => Some(pauli_x()),
        'Y' => Some(pauli_y()),
        'Z' => Some(pauli_z()),
        _ => None,
    }
}
