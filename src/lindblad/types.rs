// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation types.
//!
//! Times and rates are dimensionless (ħ = 1): a rate γ is the inverse of a
//! time measured in the same units as the evolution duration.
//!
//! Ref: Lindblad (1976), Commun. Math. Phys. 48, 119.
//! Ref: Gorini, Kossakowski, Sudarshan (1976), J. Math. Phys. 17, 821.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::kernel::{c, Matrix};
use crate::operators::{pauli_z, sigma_minus};
use crate::tensor::apply_to_qubits;

/// A Lindblad collapse (jump) operator with its rate.
///
/// Represents a single dissipation channel:
///   D[L](ρ) = γ (L ρ L† − ½{L†L, ρ})
///
/// Common single-qubit channels:
///   - Amplitude damping (T1): L = σ⁻, γ = 1/T1
///   - Pure dephasing (T_φ):   L = σz/2, γ = 1/T_φ
///     where 1/T_φ = 1/T2 − 1/(2T1)
#[derive(Debug, Clone)]
pub struct CollapseOperator {
    /// Operator matrix (d × d).
    pub matrix: Matrix,
    /// Non-negative rate γ.
    pub rate: f64,
    /// Human-readable label (e.g., "T1_q0", "Tphi_q1").
    pub label: String,
}

impl CollapseOperator {
    pub fn new(matrix: Matrix, rate: f64, label: impl Into<String>) -> Self {
        Self {
            matrix,
            rate,
            label: label.into(),
        }
    }

    /// T1 channel: L = σ⁻ = |0⟩⟨1|, γ = 1/T1.
    pub fn amplitude_damping(t1: f64, qubit_label: &str) -> Result<Self> {
        require_positive_time("t1", t1)?;
        Ok(Self::new(sigma_minus(), 1.0 / t1, format!("T1_{qubit_label}")))
    }

    /// Pure dephasing channel: L = σz/2, γ = 1/T2 − 1/(2T1).
    ///
    /// Requires T2 ≤ 2·T1; T2 = 2·T1 yields a zero rate (T1-limited).
    pub fn pure_dephasing(t1: f64, t2: f64, qubit_label: &str) -> Result<Self> {
        require_positive_time("t1", t1)?;
        require_positive_time("t2", t2)?;
        if t2 > 2.0 * t1 {
            return Err(ValidationError::field(
                "t2",
                format!("T2 ({t2}) must be ≤ 2·T1 ({})", 2.0 * t1),
            )
            .into());
        }

        let gamma_phi = (1.0 / t2 - 1.0 / (2.0 * t1)).max(0.0);
        Ok(Self::new(
            pauli_z() * c(0.5),
            gamma_phi,
            format!("Tphi_{qubit_label}"),
        ))
    }

    /// Both T1 and T_φ channels for a single qubit.
    pub fn from_t1_t2(t1: f64, t2: f64, qubit_label: &str) -> Result<Vec<Self>> {
        let t1_op = Self::amplitude_damping(t1, qubit_label)?;
        let tphi_op = Self::pure_dephasing(t1, t2, qubit_label)?;
        Ok(vec![t1_op, tphi_op])
    }

    /// Lift a single-qubit channel onto `qubit` of a `total_qubits` register.
    pub fn on_qubit(&self, qubit: usize, total_qubits: usize) -> Result<Self> {
        Ok(Self {
            matrix: apply_to_qubits(&self.matrix, &[qubit], total_qubits)?,
            rate: self.rate,
            label: self.label.clone(),
        })
    }

    /// A channel contributes only with a positive rate and a nonzero operator.
    pub fn is_active(&self) -> bool {
        self.rate > 0.0 && self.matrix.iter().any(|z| z.norm() > 0.0)
    }
}

fn require_positive_time(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::field(field, format!("must be finite and > 0, got {value}")).into());
    }
    Ok(())
}

/// When the density-matrix repair (re-Hermitize, clip, renormalize) runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HygieneMode {
    /// After every completed step.
    #[default]
    StepBoundary,
    /// After every step and every intermediate RK4 stage.
    EverySubstep,
}

/// Configuration for the Lindblad master equation solver.
#[derive(Debug, Clone)]
pub struct LindbladConfig {
    /// Number of integration steps.
    pub num_time_steps: usize,
    /// Total evolution time.
    pub duration: f64,
    /// Collapse operators.
    pub collapse_ops: Vec<CollapseOperator>,
    /// Whether to store intermediate density matrices.
    pub store_trajectory: bool,
    pub hygiene: HygieneMode,
}

impl LindbladConfig {
    pub fn new(duration: f64, num_time_steps: usize, collapse_ops: Vec<CollapseOperator>) -> Self {
        Self {
            num_time_steps,
            duration,
            collapse_ops,
            store_trajectory: false,
            hygiene: HygieneMode::default(),
        }
    }

    /// Time step.
    pub fn dt(&self) -> f64 {
        self.duration / self.num_time_steps as f64
    }

    /// Validate configuration (shape checks against the state happen in
    /// the solver).
    pub fn validate(&self) -> Result<()> {
        if self.num_time_steps == 0 {
            return Err(ValidationError::field("steps", "must be > 0").into());
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ValidationError::field(
                "duration",
                format!("must be finite and ≥ 0, got {}", self.duration),
            )
            .into());
        }
        for op in &self.collapse_ops {
            if !op.rate.is_finite() || op.rate < 0.0 {
                return Err(ValidationError::field(
                    "rate",
                    format!("collapse operator '{}' has invalid rate {:e}", op.label, op.rate),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Result of a Lindblad master equation evolution.
#[derive(Debug, Clone)]
pub struct LindbladResult {
    /// Final density matrix.
    pub final_density_matrix: Matrix,
    /// Tr(ρ) of the final state.
    pub final_trace: f64,
    /// Purity Tr(ρ²) of the final state (< 1.0 for mixed states).
    pub final_purity: f64,
    /// Density matrix after every step, starting with ρ₀ (if requested).
    pub trajectory: Option<Vec<Matrix>>,
    /// Number of integration steps taken.
    pub steps: usize,
    /// Total negative eigenvalue weight removed by hygiene.
    pub clipped_weight: f64,
}
