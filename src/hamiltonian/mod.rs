// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hamiltonian analysis: spectrum, degeneracies, symmetries.
//!
//! [`HamiltonianAnalyzer`] diagonalizes a Hermitian operator and reports
//! the ordered spectrum together with its eigenbasis, ground energy,
//! spectral gap and degeneracy structure. The symmetry scan in
//! [`symmetry`] tests a battery of standard many-qubit observables plus
//! caller-supplied candidates for commutation with H.
//!
//! An analyzer may share a [`SpectralCache`] with other analyzers; repeated
//! analysis of the same matrix then skips the diagonalization.

pub mod symmetry;

pub use symmetry::{ConservedQuantity, Symmetry, SymmetryCandidate};

use std::sync::Arc;

use num_complex::Complex64;
use serde::Serialize;
use tracing::debug;

use crate::cache::SpectralCache;
use crate::error::{Result, ValidationError};
use crate::kernel::{eigh, spectral_map, Matrix, StateVector};
use crate::validation::{contract, Tolerance, Validator};

/// A run of eigenvalues equal to within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegeneracyGroup {
    /// First (lowest) eigenvalue of the group.
    pub energy: f64,
    /// Number of eigenvalues in the group.
    pub multiplicity: usize,
    /// Index of the first eigenvalue of the group in the sorted spectrum.
    pub start: usize,
}

impl DegeneracyGroup {
    /// Indices of the eigenvalues in this group.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.multiplicity
    }
}

/// Spectral decomposition of a Hamiltonian.
#[derive(Debug, Clone)]
pub struct SpectralAnalysis {
    /// Eigenvalues in ascending order.
    pub eigenvalues: Vec<f64>,
    /// Orthonormal eigenvectors as columns, matching `eigenvalues`.
    pub eigenvectors: Matrix,
    /// E₀
    pub ground_state_energy: f64,
    /// E₁ − E₀, or 0 for a one-dimensional space.
    pub spectral_gap: f64,
    /// Degeneracy groups in ascending energy order.
    pub degeneracies: Vec<DegeneracyGroup>,
}

impl SpectralAnalysis {
    pub fn dimension(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Eigenvector of the n-th eigenvalue.
    pub fn eigenvector(&self, n: usize) -> Option<StateVector> {
        (n < self.dimension()).then(|| self.eigenvectors.column(n).to_owned())
    }

    /// Lowest-energy eigenvector.
    pub fn ground_state(&self) -> StateVector {
        self.eigenvectors.column(0).to_owned()
    }

    /// Multiplicity of the ground level.
    pub fn ground_degeneracy(&self) -> usize {
        self.degeneracies.first().map_or(0, |g| g.multiplicity)
    }

    /// Gap from the ground level to the first distinct excited level, or
    /// `None` when the spectrum has a single level.
    pub fn excitation_gap(&self) -> Option<f64> {
        match self.degeneracies.as_slice() {
            [ground, excited, ..] => Some(excited.energy - ground.energy),
            _ => None,
        }
    }

    /// True when any level is degenerate.
    pub fn is_degenerate(&self) -> bool {
        self.degeneracies.iter().any(|g| g.multiplicity > 1)
    }

    /// f(H) = Σ f(Eₙ)|n⟩⟨n| in the original basis.
    pub fn apply_function<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> Complex64,
    {
        spectral_map(&self.eigenvalues, &self.eigenvectors, f)
    }

    /// Projector onto the eigenspace of a degeneracy group.
    pub fn projector(&self, group: &DegeneracyGroup) -> Matrix {
        let d = self.dimension();
        let mut p = Matrix::zeros((d, d));
        for k in group.indices() {
            let v = self.eigenvectors.column(k);
            for i in 0..d {
                for j in 0..d {
                    p[[i, j]] += v[i] * v[j].conj();
                }
            }
        }
        p
    }
}

/// Group sorted eigenvalues into degeneracy classes.
///
/// Single stable pass: an eigenvalue joins the current group iff it lies
/// within `tol` of the group's first eigenvalue, so no group is wider than
/// `tol`.
pub fn group_degeneracies(sorted: &[f64], tol: f64) -> Vec<DegeneracyGroup> {
    let mut groups: Vec<DegeneracyGroup> = Vec::new();
    for (k, &e) in sorted.iter().enumerate() {
        match groups.last_mut() {
            Some(g) if (e - g.energy).abs() < tol => g.multiplicity += 1,
            _ => groups.push(DegeneracyGroup {
                energy: e,
                multiplicity: 1,
                start: k,
            }),
        }
    }
    groups
}

/// Spectral and symmetry analysis of Hamiltonians at a fixed tolerance.
#[derive(Debug, Clone, Default)]
pub struct HamiltonianAnalyzer {
    validator: Validator,
    cache: Option<Arc<SpectralCache>>,
}

impl HamiltonianAnalyzer {
    pub fn new(tol: Tolerance) -> Self {
        Self {
            validator: Validator::new(tol),
            cache: None,
        }
    }

    /// Share a spectral cache with this analyzer.
    pub fn with_cache(mut self, cache: Arc<SpectralCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.validator.tolerance()
    }

    pub fn cache(&self) -> Option<&Arc<SpectralCache>> {
        self.cache.as_ref()
    }

    /// Diagonalize a Hermitian operator.
    ///
    /// # Errors
    /// - `PhysicsConstraint` if `h` is not Hermitian
    /// - `Dimension` / `NonFinite` for malformed input
    /// - a precision error if the computed eigenbasis is not orthonormal
    pub fn analyze_spectrum(&self, h: &Matrix) -> Result<SpectralAnalysis> {
        let tol = self.tolerance();
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(h, tol)) {
            return Ok((*hit).clone());
        }

        let v = self.validator;
        let analysis = contract(
            "analyze_spectrum",
            || v.require_hamiltonian(h, "Hamiltonian"),
            |dim| {
                let decomposition = eigh(h);
                debug!(dim, "Diagonalized Hamiltonian");

                let values = decomposition.values;
                let ground_state_energy = values[0];
                let spectral_gap = if dim > 1 { values[1] - values[0] } else { 0.0 };
                let degeneracies = group_degeneracies(&values, tol.value());

                Ok(SpectralAnalysis {
                    eigenvalues: values,
                    eigenvectors: decomposition.vectors,
                    ground_state_energy,
                    spectral_gap,
                    degeneracies,
                })
            },
            |a| v.ensure_orthonormal(&a.eigenvectors, "Hamiltonian eigenbasis"),
        )?;

        if let Some(cache) = &self.cache {
            cache.insert(h, tol, Arc::new(analysis.clone()));
        }
        Ok(analysis)
    }

    /// Ground-state energy and vector.
    pub fn ground_state(&self, h: &Matrix) -> Result<(f64, StateVector)> {
        let a = self.analyze_spectrum(h)?;
        Ok((a.ground_state_energy, a.ground_state()))
    }

    /// Expectation value ⟨ψ|O|ψ⟩ of a Hermitian observable.
    pub fn expectation_value(&self, observable: &Matrix, psi: &StateVector) -> Result<f64> {
        let v = self.validator;
        contract(
            "expectation_value",
            || {
                let dim = v.require_hamiltonian(observable, "observable")?;
                v.require_state_vector(psi, "state")?;
                if psi.len() != dim {
                    return Err(ValidationError::SizeMismatch {
                        subject: "state".into(),
                        expected: dim,
                        actual: psi.len(),
                    }
                    .into());
                }
                Ok(())
            },
            |()| {
                let o_psi = observable.dot(psi);
                Ok(psi
                    .iter()
                    .zip(o_psi.iter())
                    .map(|(a, b)| a.conj() * b)
                    .sum::<Complex64>()
                    .re)
            },
            |_| Ok(()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use crate::kernel::{c, dagger, identity, I, ZERO};
    use crate::operators::{pauli_x, pauli_z};
    use crate::tensor::{kronecker_sum, tensor_product};
    use crate::test_utils::{assert_matrix_close, random_hermitian};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn analyzer() -> HamiltonianAnalyzer {
        HamiltonianAnalyzer::new(Tolerance::default())
    }

    #[test]
    fn test_pauli_z_spectrum() {
        let a = analyzer().analyze_spectrum(&pauli_z()).unwrap();
        assert_relative_eq!(a.eigenvalues[0], -1.0, epsilon = 1e-15);
        assert_relative_eq!(a.eigenvalues[1], 1.0, epsilon = 1e-15);
        assert_relative_eq!(a.ground_state_energy, -1.0, epsilon = 1e-15);
        assert_relative_eq!(a.spectral_gap, 2.0, epsilon = 1e-14);
        assert_eq!(a.degeneracies.len(), 2);
        assert!(!a.is_degenerate());
        // Ground state of σz is |1⟩
        assert_relative_eq!(a.ground_state()[1].norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_identity_single_degeneracy_group() {
        let a = analyzer().analyze_spectrum(&identity(8)).unwrap();
        assert_eq!(a.degeneracies.len(), 1);
        assert_eq!(a.degeneracies[0].multiplicity, 8);
        assert_relative_eq!(a.spectral_gap, 0.0, epsilon = 1e-14);
        assert_eq!(a.excitation_gap(), None);
        assert_eq!(a.ground_degeneracy(), 8);
        assert_matrix_close(&a.projector(&a.degeneracies[0]), &identity(8), 1e-14);
    }

    #[test]
    fn test_one_dimensional_space() {
        let h = array![[c(2.5)]];
        let a = analyzer().analyze_spectrum(&h).unwrap();
        assert_eq!(a.eigenvalues, vec![2.5]);
        assert_eq!(a.spectral_gap, 0.0);
    }

    #[test]
    fn test_degenerate_middle_level() {
        // Z ⊕ Z: {-2, 0, 0, 2}
        let h = kronecker_sum(&pauli_z(), &pauli_z()).unwrap();
        let a = analyzer().analyze_spectrum(&h).unwrap();
        let mults: Vec<usize> = a.degeneracies.iter().map(|g| g.multiplicity).collect();
        assert_eq!(mults, vec![1, 2, 1]);
        assert_eq!(a.degeneracies[1].indices(), 1..3);
        assert_relative_eq!(a.excitation_gap().unwrap(), 2.0, epsilon = 1e-14);
        assert_eq!(a.ground_degeneracy(), 1);
    }

    #[test]
    fn test_large_magnitude_spectrum() {
        let h = array![[c(0.0), c(1e200)], [c(1e200), c(0.0)]];
        let a = analyzer().analyze_spectrum(&h).unwrap();
        assert_relative_eq!(a.eigenvalues[0], -1e200, max_relative = 1e-12);
        assert_relative_eq!(a.eigenvalues[1], 1e200, max_relative = 1e-12);
        assert_relative_eq!(a.spectral_gap, 2e200, max_relative = 1e-12);
        assert_eq!(a.degeneracies.len(), 2);
    }

    #[test]
    fn test_grouping_does_not_chain() {
        let tol = 1e-10;
        let values = [0.0, 0.6e-10, 1.2e-10, 1.8e-10];
        let groups = group_degeneracies(&values, tol);
        // 0.6e-10 joins the anchor 0, 1.2e-10 starts a new group
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].multiplicity, 2);
        assert_eq!(groups[1].start, 2);
        assert!(group_degeneracies(&[], tol).is_empty());
    }

    #[test]
    fn test_reconstruction_and_orthonormality() {
        let h = random_hermitian(8, 11);
        let a = analyzer().analyze_spectrum(&h).unwrap();
        let gram = dagger(&a.eigenvectors).dot(&a.eigenvectors);
        assert_matrix_close(&gram, &identity(8), 1e-10);
        assert_matrix_close(&a.apply_function(c), &h, 1e-10);
        assert!(a.eigenvalues.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_non_hermitian_rejected() {
        let h = array![[ZERO, I], [I, ZERO]];
        let err = analyzer().analyze_spectrum(&h).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::PhysicsConstraint(_))
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let h = array![[c(f64::NAN), ZERO], [ZERO, c(1.0)]];
        assert!(matches!(
            analyzer().analyze_spectrum(&h),
            Err(Error::Validation(ValidationError::NonFinite { .. }))
        ));
    }

    #[test]
    fn test_transverse_field_ising_gap() {
        // H = -Z⊗Z - g(X⊗I + I⊗X), g = 0.5
        let zz = tensor_product(&pauli_z(), &pauli_z()).unwrap();
        let x_sum = kronecker_sum(&pauli_x(), &pauli_x()).unwrap();
        let h = zz * c(-1.0) - x_sum * c(0.5);
        let a = analyzer().analyze_spectrum(&h).unwrap();
        // E₀ = -sqrt(1 + 4g²) = -sqrt(2) for this two-site chain
        assert_relative_eq!(a.ground_state_energy, -(2.0f64).sqrt(), epsilon = 1e-12);
        assert!(a.spectral_gap > 0.0);
    }

    #[test]
    fn test_expectation_value() {
        let plus = array![c(std::f64::consts::FRAC_1_SQRT_2), c(std::f64::consts::FRAC_1_SQRT_2)];
        let az = analyzer();
        assert_relative_eq!(az.expectation_value(&pauli_x(), &plus).unwrap(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(az.expectation_value(&pauli_z(), &plus).unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_cache_hit_returns_same_spectrum() {
        let cache = Arc::new(SpectralCache::new());
        let az = analyzer().with_cache(Arc::clone(&cache));
        let h = random_hermitian(4, 3);
        let first = az.analyze_spectrum(&h).unwrap();
        let second = az.analyze_spectrum(&h).unwrap();
        assert_eq!(first.eigenvalues, second.eigenvalues);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
    }
}
