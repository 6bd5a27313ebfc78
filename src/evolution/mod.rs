// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Unitary time evolution.
//!
//! Exact propagators come from the spectral decomposition
//! U(t) = Σₙ e^{−iEₙt/ħ} |n⟩⟨n|. Product formulas approximate
//! e^{−i(H₁ + … + Hₘ)t} by short exact steps of the individual terms:
//!
//! - first order (Lie–Trotter): error O(t²/N)
//! - second order (Strang): error O(t³/N²)
//!
//! Ref: Suzuki, Phys. Lett. A 146, 319 (1990).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::hamiltonian::{HamiltonianAnalyzer, SpectralAnalysis};
use crate::kernel::{c, frobenius_norm, identity, Matrix, StateVector, I};
use crate::validation::{contract, Tolerance, Validator};

/// Default slope of the Trotter unitarity tolerance in |Δt|.
pub const DEFAULT_TROTTER_SCALE: f64 = 1e-8;

/// Product-formula order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrotterOrder {
    #[default]
    First,
    /// Symmetric Strang splitting
    Second,
}

/// Trotter error at one step count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrotterPoint {
    pub steps: usize,
    /// ‖U_trotter − U_exact‖_F
    pub error: f64,
}

/// Time-evolution operators at a fixed tolerance.
#[derive(Debug, Clone)]
pub struct TimeEvolution {
    validator: Validator,
    analyzer: HamiltonianAnalyzer,
    hbar: f64,
    trotter_scale: f64,
    order: TrotterOrder,
}

impl Default for TimeEvolution {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

impl TimeEvolution {
    pub fn new(tol: Tolerance) -> Self {
        Self::with_analyzer(HamiltonianAnalyzer::new(tol))
    }

    /// Share an analyzer (and its cache) with other components.
    pub fn with_analyzer(analyzer: HamiltonianAnalyzer) -> Self {
        Self {
            validator: Validator::new(analyzer.tolerance()),
            analyzer,
            hbar: 1.0,
            trotter_scale: DEFAULT_TROTTER_SCALE,
            order: TrotterOrder::default(),
        }
    }

    /// Set ħ used by [`evolve_exact`](Self::evolve_exact).
    pub fn with_hbar(mut self, hbar: f64) -> Result<Self> {
        require_positive("hbar", hbar)?;
        self.hbar = hbar;
        Ok(self)
    }

    pub fn with_trotter_scale(mut self, scale: f64) -> Result<Self> {
        require_positive("trotter_scale", scale)?;
        self.trotter_scale = scale;
        Ok(self)
    }

    pub fn with_order(mut self, order: TrotterOrder) -> Self {
        self.order = order;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.validator.tolerance()
    }

    pub fn hbar(&self) -> f64 {
        self.hbar
    }

    pub fn order(&self) -> TrotterOrder {
        self.order
    }

    /// U(t) = e^{−iHt/ħ} with the configured ħ.
    pub fn evolve_exact(&self, h: &Matrix, t: f64) -> Result<Matrix> {
        self.evolve_exact_with_hbar(h, t, self.hbar)
    }

    /// U(t) = e^{−iHt/ħ}.
    ///
    /// `t = 0` returns the identity exactly. Negative times evolve backward.
    ///
    /// # Errors
    /// - `PhysicsConstraint` if `h` is not Hermitian
    /// - `Field` for a non-finite time or a non-positive ħ
    /// - a precision error if U is not unitary within tolerance
    pub fn evolve_exact_with_hbar(&self, h: &Matrix, t: f64, hbar: f64) -> Result<Matrix> {
        let v = self.validator;
        contract(
            "evolve_exact",
            || {
                require_finite_time(t)?;
                require_positive("hbar", hbar)?;
                v.require_hamiltonian(h, "Hamiltonian")
            },
            |dim| {
                if t == 0.0 {
                    return Ok(identity(dim));
                }
                let spectrum = self.analyzer.analyze_spectrum(h)?;
                Ok(propagator(&spectrum, t / hbar))
            },
            |u| v.ensure_unitary(u, "time-evolution operator", None),
        )
    }

    /// Product-formula approximation of e^{−i(Σₖ Hₖ)t} with `steps` slices.
    ///
    /// Each slice multiplies exact factors e^{−iHₖΔt}, Δt = t/steps. The
    /// result must be unitary within max(tol, trotter_scale·|Δt|).
    ///
    /// # Errors
    /// - `Field` for zero steps, no terms, or a non-finite time
    /// - `PhysicsConstraint` if a term is not Hermitian
    /// - `SizeMismatch` if the terms differ in dimension
    pub fn evolve_trotter(&self, terms: &[Matrix], t: f64, steps: usize) -> Result<Matrix> {
        let v = self.validator;
        let dt = t / steps.max(1) as f64;
        contract(
            "evolve_trotter",
            || self.require_terms(terms, t, steps),
            |dim| {
                if t == 0.0 {
                    return Ok(identity(dim));
                }
                let spectra = terms
                    .iter()
                    .map(|h| self.analyzer.analyze_spectrum(h))
                    .collect::<Result<Vec<_>>>()?;
                let slice = trotter_slice(&spectra, dt / self.hbar, self.order, dim);
                debug!(terms = terms.len(), steps, dt, order = ?self.order, "Trotter product");
                Ok(matrix_power(&slice, steps))
            },
            |u| {
                let tol = self.tolerance().value().max(self.trotter_scale * dt.abs());
                v.ensure_unitary(u, "Trotter operator", Some(tol))
            },
        )
    }

    /// ‖U_trotter(t, steps) − U_exact(t)‖_F for H = Σₖ Hₖ.
    pub fn trotter_error(&self, terms: &[Matrix], t: f64, steps: usize) -> Result<f64> {
        let approx = self.evolve_trotter(terms, t, steps)?;
        let exact = self.evolve_exact(&sum_terms(terms), t)?;
        Ok(frobenius_norm(&(approx - exact)))
    }

    /// Trotter error at each of `step_counts`, in the order given.
    pub fn trotter_convergence(
        &self,
        terms: &[Matrix],
        t: f64,
        step_counts: &[usize],
    ) -> Result<Vec<TrotterPoint>> {
        self.require_terms(terms, t, 1)?;
        let exact = self.evolve_exact(&sum_terms(terms), t)?;
        step_counts
            .iter()
            .map(|&steps| {
                let approx = self.evolve_trotter(terms, t, steps)?;
                Ok(TrotterPoint {
                    steps,
                    error: frobenius_norm(&(approx - &exact)),
                })
            })
            .collect()
    }

    /// ψ(t) = U(t) ψ₀.
    ///
    /// `t = 0` returns ψ₀ unchanged. The result is checked for
    /// normalization.
    pub fn apply_to_state(&self, h: &Matrix, psi0: &StateVector, t: f64) -> Result<StateVector> {
        let v = self.validator;
        contract(
            "apply_to_state",
            || {
                let dim = v.require_hamiltonian(h, "Hamiltonian")?;
                v.require_state_vector(psi0, "initial state")?;
                if psi0.len() != dim {
                    return Err(ValidationError::SizeMismatch {
                        subject: "initial state".into(),
                        expected: dim,
                        actual: psi0.len(),
                    }
                    .into());
                }
                require_finite_time(t)
            },
            |()| {
                if t == 0.0 {
                    return Ok(psi0.clone());
                }
                Ok(self.evolve_exact(h, t)?.dot(psi0))
            },
            |psi| v.ensure_normalized(psi, "evolved state"),
        )
    }

    fn require_terms(&self, terms: &[Matrix], t: f64, steps: usize) -> Result<usize> {
        if steps == 0 {
            return Err(ValidationError::field("steps", "must be at least 1").into());
        }
        require_finite_time(t)?;
        let (first, rest) = terms
            .split_first()
            .ok_or_else(|| ValidationError::field("terms", "at least one Hamiltonian term is required"))?;

        let v = self.validator;
        let dim = v.require_hamiltonian(first, "Hamiltonian term 0")?;
        for (k, term) in rest.iter().enumerate() {
            let subject = format!("Hamiltonian term {}", k + 1);
            let d = v.require_hamiltonian(term, &subject)?;
            if d != dim {
                return Err(ValidationError::SizeMismatch {
                    subject,
                    expected: dim,
                    actual: d,
                }
                .into());
            }
        }
        Ok(dim)
    }
}

/// e^{−iHτ} from a precomputed spectrum, τ = t/ħ.
fn propagator(spectrum: &SpectralAnalysis, tau: f64) -> Matrix {
    spectrum.apply_function(|e| (-I * c(e * tau)).exp())
}

/// One product-formula slice. The first term acts first.
fn trotter_slice(spectra: &[SpectralAnalysis], tau: f64, order: TrotterOrder, dim: usize) -> Matrix {
    match order {
        TrotterOrder::First => spectra
            .iter()
            .fold(identity(dim), |acc, s| propagator(s, tau).dot(&acc)),
        TrotterOrder::Second => {
            let Some((last, init)) = spectra.split_last() else {
                return identity(dim);
            };
            let halves: Vec<Matrix> = init.iter().map(|s| propagator(s, tau / 2.0)).collect();
            let forward = halves.iter().fold(identity(dim), |acc, u| u.dot(&acc));
            let middle = propagator(last, tau).dot(&forward);
            halves.iter().rev().fold(middle, |acc, u| u.dot(&acc))
        }
    }
}

/// Uᵏ by repeated squaring.
fn matrix_power(u: &Matrix, mut k: usize) -> Matrix {
    let mut result = identity(u.nrows());
    let mut base = u.clone();
    while k > 0 {
        if k & 1 == 1 {
            result = result.dot(&base);
        }
        k >>= 1;
        if k > 0 {
            base = base.dot(&base);
        }
    }
    result
}

fn sum_terms(terms: &[Matrix]) -> Matrix {
    let mut total = terms[0].clone();
    for term in &terms[1..] {
        total = total + term;
    }
    total
}

fn require_finite_time(t: f64) -> Result<()> {
    if !t.is_finite() {
        return Err(ValidationError::field("time", format!("must be finite, got {t}")).into());
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ValidationError::field(field, format!("must be positive and finite, got {value}")).into());
    }
    Ok(())
}
