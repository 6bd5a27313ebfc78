// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum information measures.
//!
//! Entropies are in bits (log₂). Subsystems are lists of qubit indices in
//! the register convention of [`crate::tensor`].
//!
//! | measure                    | pure Bell state | product state |
//! |----------------------------|-----------------|---------------|
//! | entanglement entropy       | 1               | 0             |
//! | concurrence                | 1               | 0             |
//! | negativity                 | ½               | 0             |
//!
//! Ref: Nielsen & Chuang, "Quantum Computation and Quantum Information" (2010), Ch. 11.
//! Ref: Wootters, Phys. Rev. Lett. 80, 2245 (1998).
//! Ref: Vidal & Werner, Phys. Rev. A 65, 032314 (2002).

use std::collections::HashSet;

use tracing::debug;

use crate::density::DensityOps;
use crate::error::{Result, ValidationError};
use crate::kernel::{eigvalsh, outer, psd_sqrt, Matrix, StateVector, ZERO};
use crate::operators::pauli_y;
use crate::tensor::{bit, complement, tensor_product};
use crate::validation::{contract, Tolerance, Validator};

/// Entropy and entanglement measures at a fixed tolerance.
#[derive(Debug, Clone, Default)]
pub struct QuantumInformation {
    validator: Validator,
    density: DensityOps,
}

impl QuantumInformation {
    pub fn new(tol: Tolerance) -> Self {
        Self {
            validator: Validator::new(tol),
            density: DensityOps::new(tol),
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.validator.tolerance()
    }

    /// S(ρ) = −Σ λ log₂ λ over eigenvalues λ > tol, in [0, log₂ d].
    pub fn von_neumann_entropy(&self, rho: &Matrix) -> Result<f64> {
        let v = self.validator;
        contract(
            "von_neumann_entropy",
            || v.require_density_matrix(rho, "density matrix"),
            |_| Ok(entropy_of_spectrum(&eigvalsh(rho), v.tolerance().value())),
            |&s| v.ensure_range(s, 0.0, (rho.nrows() as f64).log2(), "von Neumann entropy"),
        )
    }

    /// 1 − Tr(ρ²)
    pub fn linear_entropy(&self, rho: &Matrix) -> Result<f64> {
        Ok(1.0 - self.density.purity(rho)?)
    }

    /// Entropy of the reduced state of `subsystem` for a pure state ψ.
    ///
    /// # Errors
    /// - `InvalidQuantumState` if ψ is not normalized
    /// - `InvalidSubsystem` for an empty, out-of-range or repeated subsystem
    pub fn entanglement_entropy(&self, psi: &StateVector, subsystem: &[usize]) -> Result<f64> {
        let n = self.validator.require_state_vector(psi, "state")?;
        require_subsystem(subsystem, n, "subsystem")?;
        let rho = outer(psi);
        let reduced = self.density.partial_trace(&rho, &complement(subsystem, n))?;
        let s = self.von_neumann_entropy(&reduced)?;
        debug!(n, subsystem = ?subsystem, entropy = s, "Entanglement entropy");
        Ok(s)
    }

    /// I(A:B) = S(ρ_A) + S(ρ_B) − S(ρ_AB).
    ///
    /// # Errors
    /// - `InvalidSubsystem` for an invalid A or B
    /// - `OverlappingSubsystem` when A and B share qubits
    pub fn mutual_information(&self, rho: &Matrix, a: &[usize], b: &[usize]) -> Result<f64> {
        let v = self.validator;
        let n = v.require_density_matrix(rho, "density matrix")?;
        require_subsystem(a, n, "subsystem A")?;
        require_subsystem(b, n, "subsystem B")?;

        let a_set: HashSet<usize> = a.iter().copied().collect();
        let mut shared: Vec<usize> = b.iter().copied().filter(|q| a_set.contains(q)).collect();
        if !shared.is_empty() {
            shared.sort_unstable();
            return Err(ValidationError::OverlappingSubsystem { shared }.into());
        }

        let mut ab: Vec<usize> = a.iter().chain(b).copied().collect();
        ab.sort_unstable();

        let s_a = self.von_neumann_entropy(&self.density.reduced_state(rho, a)?)?;
        let s_b = self.von_neumann_entropy(&self.density.reduced_state(rho, b)?)?;
        let s_ab = self.von_neumann_entropy(&self.density.reduced_state(rho, &ab)?)?;

        let info = s_a + s_b - s_ab;
        let bound = 2.0 * a.len().min(b.len()) as f64;
        v.ensure_range(info, 0.0, bound, "mutual information")?;
        Ok(info.max(0.0))
    }

    /// Negativity N = (‖ρ^{T_A}‖₁ − 1)/2 for the bipartition `partition` | rest.
    ///
    /// Values below tolerance are reported as exactly 0.
    pub fn negativity(&self, rho: &Matrix, partition: &[usize]) -> Result<f64> {
        let v = self.validator;
        contract(
            "negativity",
            || {
                let n = v.require_density_matrix(rho, "density matrix")?;
                require_subsystem(partition, n, "partition")?;
                Ok(n)
            },
            |n| {
                let transposed = partial_transpose(rho, partition, n);
                let trace_norm: f64 = eigvalsh(&transposed).iter().map(|l| l.abs()).sum();
                let neg = (trace_norm - 1.0) / 2.0;
                Ok(if neg < v.tolerance().value() { 0.0 } else { neg })
            },
            |&neg| {
                let n = rho.nrows().trailing_zeros() as usize;
                let smaller = partition.len().min(n - partition.len());
                let bound = ((1usize << smaller) as f64 - 1.0) / 2.0;
                v.ensure_range(neg, 0.0, bound, "negativity")
            },
        )
    }

    /// E_N = log₂(2N + 1)
    pub fn logarithmic_negativity(&self, rho: &Matrix, partition: &[usize]) -> Result<f64> {
        Ok((2.0 * self.negativity(rho, partition)? + 1.0).log2())
    }

    /// Wootters concurrence of a two-qubit state.
    ///
    /// C = max(0, √λ₁ − √λ₂ − √λ₃ − √λ₄) with λᵢ the descending eigenvalues
    /// of √ρ ρ̃ √ρ, ρ̃ = (σy⊗σy) ρ* (σy⊗σy).
    ///
    /// # Errors
    /// - `Dimension` unless ρ is 4 × 4
    pub fn concurrence(&self, rho: &Matrix) -> Result<f64> {
        let v = self.validator;
        contract(
            "concurrence",
            || {
                v.require_density_matrix(rho, "density matrix")?;
                if rho.nrows() != 4 {
                    return Err(ValidationError::dimension(
                        "density matrix",
                        format!("concurrence requires a two-qubit (4 × 4) state, got {0} × {0}", rho.nrows()),
                    )
                    .into());
                }
                Ok(())
            },
            |()| {
                let yy = tensor_product(&pauli_y(), &pauli_y())?;
                let flipped = yy.dot(&rho.mapv(|z| z.conj())).dot(&yy);
                let root = psd_sqrt(rho);
                let r = root.dot(&flipped).dot(&root);

                let cutoff = 8.0 * 4.0 * f64::EPSILON;
                let mut roots: Vec<f64> = eigvalsh(&r)
                    .into_iter()
                    .map(|l| if l > cutoff { l.sqrt() } else { 0.0 })
                    .collect();
                roots.sort_by(|x, y| y.total_cmp(x));

                let c = roots[0] - roots[1] - roots[2] - roots[3];
                Ok(if c < v.tolerance().value() { 0.0 } else { c })
            },
            |&c| v.ensure_range(c, 0.0, 1.0, "concurrence"),
        )
    }

    /// Entanglement of formation of a two-qubit state from its concurrence.
    pub fn entanglement_of_formation(&self, rho: &Matrix) -> Result<f64> {
        let c = self.concurrence(rho)?.min(1.0);
        let x = (1.0 + (1.0 - c * c).sqrt()) / 2.0;
        Ok(binary_entropy(x))
    }
}

/// −Σ λ log₂ λ over λ > cutoff.
pub fn entropy_of_spectrum(eigenvalues: &[f64], cutoff: f64) -> f64 {
    let s: f64 = eigenvalues
        .iter()
        .filter(|&&l| l > cutoff)
        .map(|&l| -l * l.log2())
        .sum();
    s.max(0.0)
}

/// h(x) = −x log₂ x − (1 − x) log₂(1 − x)
fn binary_entropy(x: f64) -> f64 {
    [x, 1.0 - x]
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// ρ^{T_A}: transpose the qubits in `partition`, leave the rest.
pub fn partial_transpose(rho: &Matrix, partition: &[usize], n: usize) -> Matrix {
    let mask = partition.iter().fold(0usize, |m, &q| m | bit(q, n));
    let d = rho.nrows();
    let mut out = Matrix::from_elem((d, d), ZERO);
    for i in 0..d {
        for j in 0..d {
            let src_row = (i & !mask) | (j & mask);
            let src_col = (j & !mask) | (i & mask);
            out[[i, j]] = rho[[src_row, src_col]];
        }
    }
    out
}

fn require_subsystem(qubits: &[usize], n: usize, name: &str) -> Result<()> {
    if qubits.is_empty() {
        return Err(ValidationError::InvalidSubsystem(format!("{name} is empty")).into());
    }
    let mut seen = HashSet::with_capacity(qubits.len());
    for &q in qubits {
        if q >= n {
            return Err(ValidationError::InvalidSubsystem(format!(
                "{name}: qubit {q} out of range for {n} qubit(s)"
            ))
            .into());
        }
        if !seen.insert(q) {
            return Err(ValidationError::InvalidSubsystem(format!("{name}: qubit {q} repeated")).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::kernel::{c, outer};
    use crate::test_utils::{
        assert_matrix_close, basis_state, bell_density, bell_states, density_strategy,
        maximally_mixed, product_state, random_state,
    };
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn info() -> QuantumInformation {
        QuantumInformation::new(Tolerance::default())
    }

    /// p |Φ+⟩⟨Φ+| + (1 − p) I/4
    fn werner(p: f64) -> Matrix {
        bell_density() * c(p) + maximally_mixed(4) * c(1.0 - p)
    }

    #[test]
    fn test_von_neumann_entropy_extremes() {
        assert_relative_eq!(info().von_neumann_entropy(&bell_density()).unwrap(), 0.0, epsilon = 1e-10);
        assert_relative_eq!(info().von_neumann_entropy(&maximally_mixed(8)).unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_von_neumann_rejects_invalid_state() {
        let not_rho = maximally_mixed(2) * c(2.0);
        assert!(matches!(
            info().von_neumann_entropy(&not_rho),
            Err(Error::Validation(ValidationError::InvalidQuantumState(_)))
        ));
    }

    #[test]
    fn test_entanglement_entropy_bell_states() {
        for psi in bell_states() {
            assert_relative_eq!(info().entanglement_entropy(&psi, &[0]).unwrap(), 1.0, epsilon = 1e-10);
            assert_relative_eq!(info().entanglement_entropy(&psi, &[1]).unwrap(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_entanglement_entropy_product_state() {
        assert_relative_eq!(
            info().entanglement_entropy(&product_state(), &[0]).unwrap(),
            0.0,
            epsilon = 1e-10
        );
        // Whole system of a pure state
        assert_relative_eq!(
            info().entanglement_entropy(&bell_states()[0], &[0, 1]).unwrap(),
            0.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_entanglement_entropy_is_symmetric_across_cut() {
        let psi = random_state(8, 4);
        let s_a = info().entanglement_entropy(&psi, &[0]).unwrap();
        let s_b = info().entanglement_entropy(&psi, &[1, 2]).unwrap();
        assert_relative_eq!(s_a, s_b, epsilon = 1e-9);
    }

    #[test]
    fn test_entanglement_entropy_invalid_subsystems() {
        let psi = bell_states()[0].clone();
        for bad in [&[][..], &[2][..], &[0, 0][..]] {
            assert!(matches!(
                info().entanglement_entropy(&psi, bad),
                Err(Error::Validation(ValidationError::InvalidSubsystem(_)))
            ));
        }
        let unnormalized = psi.mapv(|z| z * c(2.0));
        assert!(matches!(
            info().entanglement_entropy(&unnormalized, &[0]),
            Err(Error::Validation(ValidationError::InvalidQuantumState(_)))
        ));
    }

    #[test]
    fn test_mutual_information() {
        assert_relative_eq!(
            info().mutual_information(&bell_density(), &[0], &[1]).unwrap(),
            2.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            info().mutual_information(&outer(&product_state()), &[0], &[1]).unwrap(),
            0.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_mutual_information_overlap() {
        let rho = maximally_mixed(8);
        let err = info().mutual_information(&rho, &[0, 1], &[1, 2]).unwrap_err();
        match err {
            Error::Validation(ValidationError::OverlappingSubsystem { shared }) => {
                assert_eq!(shared, vec![1])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negativity() {
        for psi in bell_states() {
            let rho = outer(&psi);
            assert_relative_eq!(info().negativity(&rho, &[0]).unwrap(), 0.5, epsilon = 1e-10);
            assert_relative_eq!(info().negativity(&rho, &[1]).unwrap(), 0.5, epsilon = 1e-10);
        }
        assert_eq!(info().negativity(&outer(&product_state()), &[0]).unwrap(), 0.0);
        assert_eq!(info().negativity(&maximally_mixed(4), &[1]).unwrap(), 0.0);
        assert_relative_eq!(
            info().logarithmic_negativity(&bell_density(), &[0]).unwrap(),
            1.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_negativity_rejects_empty_partition() {
        assert!(matches!(
            info().negativity(&bell_density(), &[]),
            Err(Error::Validation(ValidationError::InvalidSubsystem(_)))
        ));
    }

    #[test]
    fn test_partial_transpose_involution() {
        let rho = werner(0.6);
        let once = partial_transpose(&rho, &[0], 2);
        let twice = partial_transpose(&once, &[0], 2);
        assert_matrix_close(&twice, &rho, 0.0);
        // Transposing both qubits is the full transpose
        let full = partial_transpose(&rho, &[0, 1], 2);
        assert_matrix_close(&full, &rho.t().to_owned(), 0.0);
    }

    #[test]
    fn test_concurrence() {
        for psi in bell_states() {
            assert_relative_eq!(info().concurrence(&outer(&psi)).unwrap(), 1.0, epsilon = 1e-10);
        }
        assert_eq!(info().concurrence(&outer(&product_state())).unwrap(), 0.0);
        assert_eq!(info().concurrence(&outer(&basis_state(4, 2))).unwrap(), 0.0);
    }

    #[test]
    fn test_werner_state_entanglement() {
        // C = (3p − 1)/2, N = (3p − 1)/4 above the separability threshold p = 1/3
        let rho = werner(0.8);
        assert_relative_eq!(info().concurrence(&rho).unwrap(), 0.7, epsilon = 1e-10);
        assert_relative_eq!(info().negativity(&rho, &[0]).unwrap(), 0.35, epsilon = 1e-10);

        let separable = werner(0.3);
        assert_eq!(info().concurrence(&separable).unwrap(), 0.0);
        assert_eq!(info().negativity(&separable, &[1]).unwrap(), 0.0);
    }

    #[test]
    fn test_concurrence_requires_two_qubits() {
        assert!(matches!(
            info().concurrence(&maximally_mixed(8)),
            Err(Error::Validation(ValidationError::Dimension { .. }))
        ));
    }

    #[test]
    fn test_entanglement_of_formation() {
        assert_relative_eq!(info().entanglement_of_formation(&bell_density()).unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(info().entanglement_of_formation(&outer(&product_state())).unwrap(), 0.0);
    }

    #[test]
    fn test_linear_entropy() {
        assert_relative_eq!(info().linear_entropy(&maximally_mixed(4)).unwrap(), 0.75, epsilon = 1e-15);
        assert_relative_eq!(info().linear_entropy(&bell_density()).unwrap(), 0.0, epsilon = 1e-14);
    }

    proptest! {
        #[test]
        fn prop_entropy_within_bounds((n, rho) in density_strategy()) {
            let s = info().von_neumann_entropy(&rho).unwrap();
            prop_assert!(s >= 0.0);
            prop_assert!(s <= n as f64 + 1e-10);
        }
    }
}
