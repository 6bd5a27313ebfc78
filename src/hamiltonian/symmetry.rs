// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Symmetry and conservation-law detection.
//!
//! An observable Q is conserved under H iff [H, Q] = 0. The check is the
//! Frobenius norm of the commutator against the analyzer tolerance.
//!
//! Built-in candidates for an n-qubit register:
//!
//! | name              | operator                 |
//! |-------------------|--------------------------|
//! | `particle_number` | N = Σᵢ nᵢ                |
//! | `z_parity`        | P = Πᵢ σᶻᵢ               |
//! | `spin_flip`       | X = Πᵢ σˣᵢ               |
//! | `total_sx`        | Sˣ = ½ Σᵢ σˣᵢ            |
//! | `total_sy`        | Sʸ = ½ Σᵢ σʸᵢ            |
//! | `total_sz`        | Sᶻ = ½ Σᵢ σᶻᵢ            |
//! | `sigma_z_{i}`     | σᶻᵢ (only for n > 1)     |

use serde::Serialize;
use tracing::debug;

use super::HamiltonianAnalyzer;
use crate::error::{Result, ValidationError};
use crate::kernel::{c, commutator, frobenius_norm, identity, Matrix};
use crate::operators::{number, pauli_x, pauli_y, pauli_z};
use crate::tensor::{apply_to_qubits, tensor_product_all};
use crate::validation::contract;

/// An observable to test for commutation with a Hamiltonian.
#[derive(Debug, Clone)]
pub struct SymmetryCandidate {
    pub name: String,
    /// What conservation of this observable means physically.
    pub meaning: String,
    pub operator: Matrix,
}

impl SymmetryCandidate {
    pub fn new(name: impl Into<String>, meaning: impl Into<String>, operator: Matrix) -> Self {
        Self {
            name: name.into(),
            meaning: meaning.into(),
            operator,
        }
    }
}

/// A candidate found to commute with H.
#[derive(Debug, Clone)]
pub struct Symmetry {
    pub name: String,
    pub meaning: String,
    pub operator: Matrix,
    /// ‖[H, Q]‖_F
    pub commutator_norm: f64,
}

/// Outcome of testing one candidate, conserved or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConservedQuantity {
    pub name: String,
    pub meaning: String,
    /// ‖[H, Q]‖_F
    pub commutator_norm: f64,
    pub conserved: bool,
}

/// Standard symmetry battery for an `n`-qubit register.
pub fn standard_candidates(n: usize) -> Result<Vec<SymmetryCandidate>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let dim = 1usize << n;
    let on_each = |op: &Matrix| -> Result<Vec<Matrix>> {
        (0..n).map(|q| apply_to_qubits(op, &[q], n)).collect()
    };
    let sum = |terms: Vec<Matrix>, scale: f64| -> Matrix {
        terms
            .into_iter()
            .fold(Matrix::zeros((dim, dim)), |acc, t| acc + t)
            * c(scale)
    };
    let product = |op: Matrix| -> Result<Matrix> { tensor_product_all(&vec![op; n]) };

    let local_z = on_each(&pauli_z())?;

    let mut candidates = vec![
        SymmetryCandidate::new(
            "particle_number",
            "total excitation number is conserved (U(1) symmetry)",
            sum(on_each(&number())?, 1.0),
        ),
        SymmetryCandidate::new(
            "z_parity",
            "excitation-number parity is conserved (Z₂ symmetry)",
            product(pauli_z())?,
        ),
        SymmetryCandidate::new(
            "spin_flip",
            "invariant under a global spin flip (X parity)",
            product(pauli_x())?,
        ),
        SymmetryCandidate::new(
            "total_sx",
            "total spin x-component is conserved",
            sum(on_each(&pauli_x())?, 0.5),
        ),
        SymmetryCandidate::new(
            "total_sy",
            "total spin y-component is conserved",
            sum(on_each(&pauli_y())?, 0.5),
        ),
        SymmetryCandidate::new(
            "total_sz",
            "total spin z-component is conserved",
            sum(local_z.clone(), 0.5),
        ),
    ];

    if n > 1 {
        for (q, z) in local_z.into_iter().enumerate() {
            candidates.push(SymmetryCandidate::new(
                format!("sigma_z_{q}"),
                format!("σz on qubit {q} is a local integral of motion"),
                z,
            ));
        }
    }
    Ok(candidates)
}

impl HamiltonianAnalyzer {
    /// Every observable, built-in or supplied, that commutes with `h`.
    ///
    /// Returns an empty list when no candidate commutes.
    pub fn detect_symmetries(&self, h: &Matrix, extra: &[SymmetryCandidate]) -> Result<Vec<Symmetry>> {
        let tol = self.tolerance().value();
        let found: Vec<Symmetry> = self
            .scan(h, extra)?
            .into_iter()
            .filter(|(_, norm)| *norm < tol)
            .map(|(cand, norm)| Symmetry {
                name: cand.name,
                meaning: cand.meaning,
                operator: cand.operator,
                commutator_norm: norm,
            })
            .collect();
        debug!(found = found.len(), "Symmetry scan complete");
        Ok(found)
    }

    /// Every candidate with its commutator norm and a conserved flag.
    pub fn find_conserved_quantities(
        &self,
        h: &Matrix,
        extra: &[SymmetryCandidate],
    ) -> Result<Vec<ConservedQuantity>> {
        let tol = self.tolerance().value();
        Ok(self
            .scan(h, extra)?
            .into_iter()
            .map(|(cand, norm)| ConservedQuantity {
                name: cand.name,
                meaning: cand.meaning,
                commutator_norm: norm,
                conserved: norm < tol,
            })
            .collect())
    }

    fn scan(&self, h: &Matrix, extra: &[SymmetryCandidate]) -> Result<Vec<(SymmetryCandidate, f64)>> {
        let v = self.validator;
        contract(
            "detect_symmetries",
            || {
                v.require_hamiltonian(h, "Hamiltonian")?;
                let n = v.require_qubit_operator(h, "Hamiltonian")?;
                let dim = h.nrows();
                for cand in extra {
                    v.require_square(&cand.operator, &cand.name)?;
                    if cand.operator.nrows() != dim {
                        return Err(ValidationError::SizeMismatch {
                            subject: format!("symmetry candidate '{}'", cand.name),
                            expected: dim,
                            actual: cand.operator.nrows(),
                        }
                        .into());
                    }
                }
                Ok(n)
            },
            |n| {
                let mut candidates = standard_candidates(n)?;
                candidates.extend(extra.iter().cloned());
                let eye = identity(h.nrows());
                Ok(candidates
                    .into_iter()
                    // H and I commute with H trivially and carry no information.
                    .filter(|cand| cand.operator != *h && cand.operator != eye)
                    .map(|cand| {
                        let norm = frobenius_norm(&commutator(h, &cand.operator));
                        (cand, norm)
                    })
                    .collect())
            },
            |_| Ok(()),
        )
    }
}
