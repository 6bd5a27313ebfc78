// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Density-matrix operations.
//!
//! - [`DensityOps::partial_trace`]: reduced states of multi-qubit systems
//! - [`DensityOps::purity`]: Tr(ρ²)
//! - [`DensityOps::thermal_state`]: Gibbs states e^{−βH}/Z
//! - [`DensityOps::lindblad_evolution`]: open-system dynamics
//! - [`metrics`]: fidelity and distances between states

pub mod metrics;

pub use metrics::{hellinger_distance, state_fidelity, trace_distance};

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::SpectralCache;
use crate::error::{Result, ValidationError};
use crate::hamiltonian::HamiltonianAnalyzer;
use crate::kernel::{c, Matrix, ZERO};
use crate::lindblad::{solve_lindblad, CollapseOperator, Drive, HygieneMode, LindbladConfig, LindbladResult};
use crate::tensor::{check_qubit_list, complement, scatter_bits};
use crate::validation::{contract, Tolerance, Validator};

/// Gibbs state together with its normalization.
#[derive(Debug, Clone, Serialize)]
pub struct ThermalState {
    #[serde(skip)]
    pub density_matrix: Matrix,
    /// 1 / (k_B T)
    pub beta: f64,
    /// Σₙ e^{−β(Eₙ − E₀)}, the partition function measured from the ground
    /// energy.
    pub partition_function: f64,
    /// ln Z = ln Σₙ e^{−βEₙ}
    pub log_partition_function: f64,
    /// Σₙ pₙ Eₙ
    pub mean_energy: f64,
}

/// Density-matrix operations at a fixed tolerance.
#[derive(Debug, Clone, Default)]
pub struct DensityOps {
    validator: Validator,
    analyzer: HamiltonianAnalyzer,
    hygiene: HygieneMode,
    store_trajectory: bool,
}

impl DensityOps {
    pub fn new(tol: Tolerance) -> Self {
        Self {
            validator: Validator::new(tol),
            analyzer: HamiltonianAnalyzer::new(tol),
            hygiene: HygieneMode::default(),
            store_trajectory: false,
        }
    }

    /// Reuse spectral decompositions for thermal states.
    pub fn with_cache(mut self, cache: Arc<SpectralCache>) -> Self {
        self.analyzer = self.analyzer.with_cache(cache);
        self
    }

    pub fn with_hygiene(mut self, hygiene: HygieneMode) -> Self {
        self.hygiene = hygiene;
        self
    }

    pub fn with_trajectory(mut self, store: bool) -> Self {
        self.store_trajectory = store;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.validator.tolerance()
    }

    /// Trace out the listed qubits.
    ///
    /// The kept qubits stay in ascending order. Tracing out every qubit
    /// yields the 1 × 1 matrix [Tr ρ]; an empty list returns a copy.
    ///
    /// # Errors
    /// - `InvalidQuantumState` if `rho` is not a density matrix
    /// - `InvalidQubitIndex` for out-of-range or repeated qubits
    /// - a precision error if the reduced state fails re-validation
    pub fn partial_trace(&self, rho: &Matrix, trace_out: &[usize]) -> Result<Matrix> {
        let v = self.validator;
        contract(
            "partial_trace",
            || {
                let n = v.require_density_matrix(rho, "density matrix")?;
                check_qubit_list(trace_out, n)?;
                Ok(n)
            },
            |n| Ok(reduce(rho, trace_out, n)),
            |reduced| v.ensure_density_matrix(reduced, "reduced density matrix"),
        )
    }

    /// Reduced state on `keep` (ascending order of the listed qubits is not
    /// required; the result follows ascending qubit order).
    pub fn reduced_state(&self, rho: &Matrix, keep: &[usize]) -> Result<Matrix> {
        let n = self.validator.require_density_matrix(rho, "density matrix")?;
        check_qubit_list(keep, n)?;
        self.partial_trace(rho, &complement(keep, n))
    }

    /// Tr(ρ²), in [1/d, 1].
    pub fn purity(&self, rho: &Matrix) -> Result<f64> {
        let v = self.validator;
        contract(
            "purity",
            || v.require_density_matrix(rho, "density matrix"),
            |_| Ok(purity_unchecked(rho)),
            |&p| v.ensure_range(p, 1.0 / rho.nrows() as f64, 1.0, "purity"),
        )
    }

    /// True when Tr(ρ²) = 1 within tolerance.
    pub fn is_pure(&self, rho: &Matrix) -> Result<bool> {
        Ok((1.0 - self.purity(rho)?).abs() <= self.tolerance().value())
    }

    /// Gibbs state ρ = e^{−H/T}/Z with k_B = 1.
    pub fn thermal_state(&self, h: &Matrix, temperature: f64) -> Result<Matrix> {
        Ok(self.thermal_state_with_partition(h, temperature, 1.0)?.density_matrix)
    }

    /// Gibbs state e^{−βH}/Z with β = 1/(k_B T), plus its normalization.
    ///
    /// Weights are e^{−β(Eₙ − E₀)}, so the exponent is never positive and
    /// the low-temperature limit does not overflow.
    ///
    /// # Errors
    /// - `Field` if T or k_B is non-positive or non-finite, or if β = 1/(k_B T)
    ///   is not finite
    /// - `PhysicsConstraint` if `h` is not Hermitian
    pub fn thermal_state_with_partition(
        &self,
        h: &Matrix,
        temperature: f64,
        boltzmann: f64,
    ) -> Result<ThermalState> {
        let v = self.validator;
        contract(
            "thermal_state",
            || {
                require_positive("temperature", temperature)?;
                require_positive("boltzmann", boltzmann)?;
                let beta = 1.0 / (boltzmann * temperature);
                if !beta.is_finite() {
                    return Err(ValidationError::field(
                        "temperature",
                        format!("k_B·T = {boltzmann:e}·{temperature:e} underflows; β is not finite"),
                    )
                    .into());
                }
                v.require_hamiltonian(h, "Hamiltonian")?;
                Ok(beta)
            },
            |beta| {
                let spectrum = self.analyzer.analyze_spectrum(h)?;
                let e0 = spectrum.ground_state_energy;

                let weights: Vec<f64> = spectrum
                    .eigenvalues
                    .iter()
                    .map(|&e| (-beta * (e - e0)).exp())
                    .collect();
                let z: f64 = weights.iter().sum();
                let mean_energy = spectrum
                    .eigenvalues
                    .iter()
                    .zip(&weights)
                    .map(|(e, w)| e * w / z)
                    .sum();

                debug!(beta, partition_function = z, "Thermal state");

                let density_matrix = spectrum.apply_function(|e| c((-beta * (e - e0)).exp() / z));
                Ok(ThermalState {
                    density_matrix,
                    beta,
                    partition_function: z,
                    log_partition_function: z.ln() - beta * e0,
                    mean_energy,
                })
            },
            |state| v.ensure_density_matrix(&state.density_matrix, "thermal state"),
        )
    }

    /// Evolve ρ₀ under H and the given jump operators for time `t` in
    /// `steps` RK4 steps.
    pub fn lindblad_evolution(
        &self,
        rho0: &Matrix,
        h: &Matrix,
        jump_ops: &[CollapseOperator],
        t: f64,
        steps: usize,
    ) -> Result<LindbladResult> {
        let config = LindbladConfig {
            num_time_steps: steps,
            duration: t,
            collapse_ops: jump_ops.to_vec(),
            store_trajectory: self.store_trajectory,
            hygiene: self.hygiene,
        };
        solve_lindblad(rho0, Drive::Constant(h), &config, &self.validator)
    }

    /// Uhlmann fidelity between two density matrices.
    pub fn state_fidelity(&self, rho: &Matrix, sigma: &Matrix) -> Result<f64> {
        self.require_pair(rho, sigma)?;
        let f = state_fidelity(rho, sigma);
        self.validator.ensure_range(f, 0.0, 1.0, "fidelity")?;
        Ok(f.clamp(0.0, 1.0))
    }

    /// Trace distance ½‖ρ − σ‖₁ between two density matrices.
    pub fn trace_distance(&self, rho: &Matrix, sigma: &Matrix) -> Result<f64> {
        self.require_pair(rho, sigma)?;
        let d = trace_distance(rho, sigma);
        self.validator.ensure_range(d, 0.0, 1.0, "trace distance")?;
        Ok(d)
    }

    fn require_pair(&self, rho: &Matrix, sigma: &Matrix) -> Result<()> {
        let v = self.validator;
        v.require_density_matrix(rho, "first state")?;
        v.require_density_matrix(sigma, "second state")?;
        if rho.nrows() != sigma.nrows() {
            return Err(ValidationError::SizeMismatch {
                subject: "second state".into(),
                expected: rho.nrows(),
                actual: sigma.nrows(),
            }
            .into());
        }
        Ok(())
    }
}

/// Σᵢⱼ ρᵢⱼ ρⱼᵢ for an already validated ρ.
pub(crate) fn purity_unchecked(rho: &Matrix) -> f64 {
    rho.indexed_iter()
        .map(|((i, j), &z)| (z * rho[[j, i]]).re)
        .sum()
}

/// Partial trace without validation. The kept qubits are the complement of
/// `trace_out`, in ascending order.
pub(crate) fn reduce(rho: &Matrix, trace_out: &[usize], n: usize) -> Matrix {
    if trace_out.is_empty() {
        return rho.clone();
    }
    let keep = complement(trace_out, n);
    let d_keep = 1usize << keep.len();
    let d_out = 1usize << trace_out.len();

    let mut out = Matrix::from_elem((d_keep, d_keep), ZERO);
    for a in 0..d_keep {
        let row_base = scatter_bits(a, &keep, n);
        for b in 0..d_keep {
            let col_base = scatter_bits(b, &keep, n);
            let mut acc = ZERO;
            for t in 0..d_out {
                let env = scatter_bits(t, trace_out, n);
                acc += rho[[row_base | env, col_base | env]];
            }
            out[[a, b]] = acc;
        }
    }
    out
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::field(field, format!("must be finite and > 0, got {value}")).into());
    }
    Ok(())
}
