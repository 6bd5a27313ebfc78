// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Physical-invariant validation.
//!
//! One matrix type, many independent predicates: a matrix is "a
//! Hamiltonian" or "a density matrix" only by virtue of passing the
//! corresponding checks, and a single matrix may pass several at once.
//!
//! - Deviation measures ([`hermiticity_deviation`], [`unitarity_deviation`],
//!   ...) return the raw number a check compares against the tolerance.
//! - Predicates ([`is_hermitian`], [`is_unitary`], ...) answer yes/no.
//! - [`Validator`] turns failed checks into typed errors: `require_*` for
//!   caller input (validation errors), `ensure_*` for computed results
//!   (precision errors).
//! - [`contract`] composes validate → compute → validate-result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Check, CheckFailure, Error, Result, ValidationError};
use crate::kernel::{dagger, eigvalsh, identity, norm_sqr, num_qubits, trace, ONE};
use crate::kernel::{Matrix, StateVector};

/// Default precision threshold applied by every check.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Numerical tolerance threaded through every component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    /// Create a tolerance; must be finite and strictly positive.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::field(
                "tolerance",
                format!("must be finite and > 0, got {value}"),
            )
            .into());
        }
        Ok(Self(value))
    }

    /// The threshold value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

// =============================================================================
// Deviation measures
// =============================================================================

/// Running maximum that keeps NaN once seen, unlike `f64::max`.
fn worst(acc: f64, x: f64) -> f64 {
    if x > acc || x.is_nan() {
        x
    } else {
        acc
    }
}

/// max |M − M†|. NaN if any element is NaN.
pub fn hermiticity_deviation(m: &Matrix) -> f64 {
    let n = m.nrows();
    let mut acc = 0.0f64;
    for i in 0..n {
        for j in i..n {
            acc = worst(acc, (m[[i, j]] - m[[j, i]].conj()).norm());
        }
    }
    acc
}

/// max |U†U − I|. NaN if any element is NaN.
pub fn unitarity_deviation(u: &Matrix) -> f64 {
    let gram = dagger(u).dot(u);
    let eye = identity(u.nrows());
    gram.iter()
        .zip(eye.iter())
        .fold(0.0f64, |acc, (a, b)| worst(acc, (a - b).norm()))
}

/// |Tr(M) − 1|
pub fn trace_deviation(m: &Matrix) -> f64 {
    (trace(m) - ONE).norm()
}

/// Smallest eigenvalue of the Hermitian part of `m`. NaN if the spectrum is undefined.
pub fn min_eigenvalue(m: &Matrix) -> f64 {
    let eigs = eigvalsh(m);
    if eigs.iter().any(|e| e.is_nan()) {
        return f64::NAN;
    }
    eigs.first().copied().unwrap_or(0.0)
}

/// |⟨ψ|ψ⟩ − 1|
pub fn normalization_deviation(psi: &StateVector) -> f64 {
    (norm_sqr(psi) - 1.0).abs()
}

// =============================================================================
// Predicates
// =============================================================================

pub fn is_hermitian(m: &Matrix, tol: Tolerance) -> bool {
    m.is_square() && hermiticity_deviation(m) <= tol.value()
}

pub fn is_unitary(u: &Matrix, tol: Tolerance) -> bool {
    u.is_square() && unitarity_deviation(u) <= tol.value()
}

pub fn has_unit_trace(m: &Matrix, tol: Tolerance) -> bool {
    m.is_square() && trace_deviation(m) <= tol.value()
}

/// Eigenvalues of the Hermitian part all ≥ −tol.
pub fn is_positive_semidefinite(m: &Matrix, tol: Tolerance) -> bool {
    m.is_square() && min_eigenvalue(m) >= -tol.value()
}

pub fn is_normalized(psi: &StateVector, tol: Tolerance) -> bool {
    normalization_deviation(psi) <= tol.value()
}

/// Hermitian, trace one, positive semidefinite.
pub fn is_density_matrix(m: &Matrix, tol: Tolerance) -> bool {
    is_hermitian(m, tol) && has_unit_trace(m, tol) && is_positive_semidefinite(m, tol)
}

// =============================================================================
// Validator
// =============================================================================

/// Turns failed checks into typed errors at a fixed tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    tol: Tolerance,
}

impl Validator {
    pub fn new(tol: Tolerance) -> Self {
        Self { tol }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tol
    }

    fn failure(&self, check: Check, subject: &str, expected: &str, observed: f64) -> CheckFailure {
        CheckFailure {
            check,
            subject: subject.into(),
            expected: expected.into(),
            observed,
            tolerance: self.tol.value(),
        }
    }

    /// Every element finite.
    pub fn require_finite(&self, m: &Matrix, subject: &str) -> Result<()> {
        if let Some(((i, j), _)) = m
            .indexed_iter()
            .find(|(_, z)| !(z.re.is_finite() && z.im.is_finite()))
        {
            return Err(ValidationError::NonFinite {
                subject: subject.into(),
                index: vec![i, j],
            }
            .into());
        }
        Ok(())
    }

    /// Every amplitude finite.
    pub fn require_finite_vector(&self, psi: &StateVector, subject: &str) -> Result<()> {
        if let Some((k, _)) = psi
            .iter()
            .enumerate()
            .find(|(_, z)| !(z.re.is_finite() && z.im.is_finite()))
        {
            return Err(ValidationError::NonFinite {
                subject: subject.into(),
                index: vec![k],
            }
            .into());
        }
        Ok(())
    }

    /// Finite scalar parameter.
    pub fn require_finite_scalar(&self, field: &str, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(ValidationError::field(field, format!("must be finite, got {value}")).into());
        }
        Ok(())
    }

    /// Non-empty, square, finite. Returns the dimension.
    pub fn require_square(&self, m: &Matrix, subject: &str) -> Result<usize> {
        if m.is_empty() {
            return Err(ValidationError::dimension(subject, "matrix is empty").into());
        }
        if !m.is_square() {
            return Err(ValidationError::dimension(
                subject,
                format!("matrix must be square, got {} × {}", m.nrows(), m.ncols()),
            )
            .into());
        }
        self.require_finite(m, subject)?;
        Ok(m.nrows())
    }

    /// Square 2ⁿ × 2ⁿ. Returns n.
    pub fn require_qubit_operator(&self, m: &Matrix, subject: &str) -> Result<usize> {
        let dim = self.require_square(m, subject)?;
        num_qubits(dim).ok_or_else(|| {
            ValidationError::dimension(
                subject,
                format!("dimension {dim} is not a power of two"),
            )
            .into()
        })
    }

    /// Square, finite, Hermitian. Returns the dimension.
    pub fn require_hamiltonian(&self, h: &Matrix, subject: &str) -> Result<usize> {
        let dim = self.require_square(h, subject)?;
        let dev = hermiticity_deviation(h);
        if !(dev <= self.tol.value()) {
            return Err(ValidationError::PhysicsConstraint(self.failure(
                Check::Hermiticity,
                subject,
                "max|H − H†| = 0",
                dev,
            ))
            .into());
        }
        Ok(dim)
    }

    /// 2ⁿ-dimensional, Hermitian, trace one, positive semidefinite.
    /// Returns n.
    pub fn require_density_matrix(&self, rho: &Matrix, subject: &str) -> Result<usize> {
        let n = self.require_qubit_operator(rho, subject)?;
        self.density_failure(rho, subject)
            .map_or(Ok(n), |f| Err(ValidationError::InvalidQuantumState(f).into()))
    }

    /// Finite, length 2ⁿ, normalized. Returns n.
    pub fn require_state_vector(&self, psi: &StateVector, subject: &str) -> Result<usize> {
        self.require_finite_vector(psi, subject)?;
        let n = num_qubits(psi.len()).ok_or_else(|| {
            Error::from(ValidationError::dimension(
                subject,
                format!("length {} is not a power of two", psi.len()),
            ))
        })?;
        let dev = normalization_deviation(psi);
        if !(dev <= self.tol.value()) {
            return Err(ValidationError::InvalidQuantumState(self.failure(
                Check::Normalization,
                subject,
                "⟨ψ|ψ⟩ = 1",
                norm_sqr(psi),
            ))
            .into());
        }
        Ok(n)
    }

    /// Computed operator must be unitary within `tol` (defaults to the
    /// validator tolerance).
    pub fn ensure_unitary(&self, u: &Matrix, subject: &str, tol: Option<f64>) -> Result<()> {
        let tol = tol.unwrap_or(self.tol.value());
        let dev = unitarity_deviation(u);
        if !(dev <= tol) {
            return Err(Error::Precision(CheckFailure {
                check: Check::Unitarity,
                subject: subject.into(),
                expected: "max|U†U − I| = 0".into(),
                observed: dev,
                tolerance: tol,
            }));
        }
        Ok(())
    }

    /// Computed eigenbasis must be orthonormal.
    pub fn ensure_orthonormal(&self, v: &Matrix, subject: &str) -> Result<()> {
        let dev = unitarity_deviation(v);
        if !(dev <= self.tol.value()) {
            return Err(Error::Precision(self.failure(
                Check::Orthonormality,
                subject,
                "max|V†V − I| = 0",
                dev,
            )));
        }
        Ok(())
    }

    /// Computed state must be a density matrix.
    pub fn ensure_density_matrix(&self, rho: &Matrix, subject: &str) -> Result<()> {
        self.density_failure(rho, subject)
            .map_or(Ok(()), |f| Err(Error::Precision(f)))
    }

    /// Computed state vector must be normalized.
    pub fn ensure_normalized(&self, psi: &StateVector, subject: &str) -> Result<()> {
        let dev = normalization_deviation(psi);
        if !(dev <= self.tol.value()) {
            return Err(Error::Precision(self.failure(
                Check::Normalization,
                subject,
                "⟨ψ|ψ⟩ = 1",
                norm_sqr(psi),
            )));
        }
        Ok(())
    }

    /// Computed scalar must lie in [lo − tol, hi + tol].
    pub fn ensure_range(&self, value: f64, lo: f64, hi: f64, subject: &str) -> Result<()> {
        let tol = self.tol.value();
        if !(value >= lo - tol && value <= hi + tol) {
            return Err(Error::Precision(self.failure(
                Check::Range,
                subject,
                &format!("[{lo}, {hi}]"),
                value,
            )));
        }
        Ok(())
    }

    fn density_failure(&self, rho: &Matrix, subject: &str) -> Option<CheckFailure> {
        let tol = self.tol.value();
        let herm = hermiticity_deviation(rho);
        if !(herm <= tol) {
            return Some(self.failure(Check::Hermiticity, subject, "max|ρ − ρ†| = 0", herm));
        }
        let tr = trace(rho);
        if !(trace_deviation(rho) <= tol) {
            return Some(self.failure(Check::UnitTrace, subject, "Tr(ρ) = 1", tr.re));
        }
        let min_eig = min_eigenvalue(rho);
        if !(min_eig >= -tol) {
            return Some(self.failure(
                Check::PositiveSemidefinite,
                subject,
                "min eigenvalue ≥ 0",
                min_eig,
            ));
        }
        None
    }
}

// =============================================================================
// Contract wrapper
// =============================================================================

/// Run `require → compute → ensure` as one unit.
///
/// `require` validates the input and may hand derived facts (qubit count,
/// dimension) to `compute`; `ensure` checks the result before it is
/// returned. Any failure aborts without a partial result.
pub fn contract<P, T, R, C, E>(operation: &'static str, require: R, compute: C, ensure: E) -> Result<T>
where
    R: FnOnce() -> Result<P>,
    C: FnOnce(P) -> Result<T>,
    E: FnOnce(&T) -> Result<()>,
{
    let _span = tracing::debug_span!("contract", operation).entered();

    let prepared = require().map_err(|e| {
        debug!(operation, error = %e, "Input rejected");
        e
    })?;
    let output = compute(prepared)?;
    ensure(&output).map_err(|e| {
        warn!(operation, error = %e, "Result failed post-condition");
        e
    })?;
    Ok(output)
}
