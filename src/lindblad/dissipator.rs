// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad dissipator computation.
//!
//! Computes D[L](ρ) = γ (L ρ L† − ½{L†L, ρ}) for each collapse operator.
//! Operators must already act on the full Hilbert space; the solver rejects
//! mismatched dimensions before any of this runs.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use crate::kernel::{anticommutator, c, commutator, dagger, Matrix, I};

use super::types::CollapseOperator;

/// Dissipator contribution of a single collapse operator.
///
/// D[L](ρ) = γ (L ρ L† − ½ L†L ρ − ½ ρ L†L)
pub fn dissipator(op: &CollapseOperator, rho: &Matrix) -> Matrix {
    if op.rate == 0.0 {
        return Matrix::zeros(rho.raw_dim());
    }

    let l = &op.matrix;
    let l_dag = dagger(l);
    let l_dag_l = l_dag.dot(l);
    let jump = l.dot(rho).dot(&l_dag);

    (jump - anticommutator(&l_dag_l, rho) * c(0.5)) * c(op.rate)
}

/// Σ_k D[L_k](ρ)
pub fn total_dissipator(collapse_ops: &[CollapseOperator], rho: &Matrix) -> Matrix {
    collapse_ops
        .iter()
        .fold(Matrix::zeros(rho.raw_dim()), |acc, op| acc + dissipator(op, rho))
}

/// Full Lindblad generator: dρ/dt = −i[H, ρ] + Σ_k D[L_k](ρ).
pub fn lindblad_rhs(hamiltonian: &Matrix, collapse_ops: &[CollapseOperator], rho: &Matrix) -> Matrix {
    commutator(hamiltonian, rho) * (-I) + total_dissipator(collapse_ops, rho)
}
