// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the Lindblad master equation.
//!
//! Integrates dρ/dt = −i[H(t), ρ] + Σ D[L](ρ) using classical 4th-order
//! Runge–Kutta. The Hamiltonian may be constant or piecewise-constant
//! (one matrix per step).
//!
//! After each step the state is repaired: re-Hermitized, negative
//! eigenvalues clipped to zero and the trace renormalized to one. The same
//! repair runs at every step boundary so that long runs do not drift out of
//! the density-matrix set. When no collapse operator is active the step is
//! the exact conjugation ρ ← U ρ U† with U = exp(−iHΔt).
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use num_complex::Complex64;
use tracing::debug;

use super::dissipator::lindblad_rhs;
use super::types::{CollapseOperator, HygieneMode, LindbladConfig, LindbladResult};
use crate::error::{Check, CheckFailure, Error, Result, ValidationError};
use crate::kernel::{c, dagger, eigh, hermitian_part, spectral_map, trace, Matrix};
use crate::validation::{contract, Validator};

/// Hamiltonian schedule for one solve.
#[derive(Debug, Clone, Copy)]
pub enum Drive<'a> {
    /// Same H for every step.
    Constant(&'a Matrix),
    /// H for step k at index k; length must equal the step count.
    Piecewise(&'a [Matrix]),
}

impl<'a> Drive<'a> {
    fn at(&self, step: usize) -> &'a Matrix {
        match *self {
            Drive::Constant(h) => h,
            Drive::Piecewise(hs) => &hs[step],
        }
    }
}

/// Solve the Lindblad master equation.
///
/// # Errors
/// - `InvalidQuantumState` if `initial_rho` is not a density matrix
/// - `PhysicsConstraint` if a Hamiltonian is not Hermitian
/// - `SizeMismatch` for operators of the wrong dimension or a piecewise
///   schedule of the wrong length
/// - `Field` for a non-positive step count, negative duration or rate
/// - a precision error if the final state is not a density matrix
pub fn solve_lindblad(
    initial_rho: &Matrix,
    drive: Drive<'_>,
    config: &LindbladConfig,
    validator: &Validator,
) -> Result<LindbladResult> {
    let v = *validator;
    contract(
        "lindblad_evolution",
        || require_inputs(&v, initial_rho, drive, config),
        |()| integrate(initial_rho, drive, config, &v),
        |result| v.ensure_density_matrix(&result.final_density_matrix, "evolved density matrix"),
    )
}

fn require_inputs(v: &Validator, rho: &Matrix, drive: Drive<'_>, config: &LindbladConfig) -> Result<()> {
    config.validate()?;
    v.require_density_matrix(rho, "initial density matrix")?;
    let dim = rho.nrows();

    let check_dim = |m: &Matrix, subject: String| -> Result<()> {
        if m.nrows() != dim {
            return Err(ValidationError::SizeMismatch {
                subject,
                expected: dim,
                actual: m.nrows(),
            }
            .into());
        }
        Ok(())
    };

    match drive {
        Drive::Constant(h) => {
            v.require_hamiltonian(h, "Hamiltonian")?;
            check_dim(h, "Hamiltonian".into())?;
        }
        Drive::Piecewise(hs) => {
            if hs.len() != config.num_time_steps {
                return Err(ValidationError::SizeMismatch {
                    subject: "Hamiltonian schedule".into(),
                    expected: config.num_time_steps,
                    actual: hs.len(),
                }
                .into());
            }
            for (k, h) in hs.iter().enumerate() {
                let subject = format!("Hamiltonian at step {k}");
                v.require_hamiltonian(h, &subject)?;
                check_dim(h, subject)?;
            }
        }
    }

    for op in &config.collapse_ops {
        let subject = format!("collapse operator '{}'", op.label);
        v.require_square(&op.matrix, &subject)?;
        check_dim(&op.matrix, subject)?;
    }
    Ok(())
}

fn integrate(
    initial_rho: &Matrix,
    drive: Drive<'_>,
    config: &LindbladConfig,
    v: &Validator,
) -> Result<LindbladResult> {
    let mut trajectory = config.store_trajectory.then(|| vec![initial_rho.clone()]);

    if config.duration == 0.0 {
        return Ok(finish(initial_rho.clone(), trajectory, 0, 0.0));
    }

    let n_steps = config.num_time_steps;
    let dt = config.dt();
    let active: Vec<CollapseOperator> = config
        .collapse_ops
        .iter()
        .filter(|op| op.is_active())
        .cloned()
        .collect();
    let tol = v.tolerance().value();
    let every_substep = config.hygiene == HygieneMode::EverySubstep;

    debug!(
        dim = initial_rho.nrows(),
        n_steps,
        dt,
        active_channels = active.len(),
        hygiene = ?config.hygiene,
        "Integrating Lindblad equation"
    );

    let mut rho = initial_rho.clone();
    let mut clipped_weight = 0.0;
    let mut propagator: Option<Matrix> = None;

    for step in 0..n_steps {
        let h = drive.at(step);
        let stepped = if active.is_empty() {
            // A constant drive reuses the first propagator.
            if matches!(drive, Drive::Piecewise(_)) {
                propagator = None;
            }
            let u = propagator.get_or_insert_with(|| step_propagator(h, dt));
            u.dot(&rho).dot(&dagger(u))
        } else {
            rk4_step(&rho, h, &active, dt, every_substep.then_some(tol))?
        };

        let (repaired, clipped) = repair(&stepped, tol)?;
        clipped_weight += clipped;
        rho = repaired;

        if let Some(traj) = trajectory.as_mut() {
            traj.push(rho.clone());
        }
    }

    if clipped_weight > 0.0 {
        debug!(clipped_weight, "Hygiene clipped negative eigenvalue weight");
    }
    Ok(finish(rho, trajectory, n_steps, clipped_weight))
}

fn finish(rho: Matrix, trajectory: Option<Vec<Matrix>>, steps: usize, clipped_weight: f64) -> LindbladResult {
    let final_trace = trace(&rho).re;
    let final_purity = trace(&rho.dot(&rho)).re;
    LindbladResult {
        final_density_matrix: rho,
        final_trace,
        final_purity,
        trajectory,
        steps,
        clipped_weight,
    }
}

/// exp(−iHΔt) from the eigendecomposition of H.
fn step_propagator(h: &Matrix, dt: f64) -> Matrix {
    let e = eigh(h);
    spectral_map(&e.values, &e.vectors, |energy| Complex64::from_polar(1.0, -energy * dt))
}

/// Single RK4 step with the same H for all four stages. With
/// `substep_tol` set, every intermediate stage is repaired as well.
fn rk4_step(
    rho: &Matrix,
    hamiltonian: &Matrix,
    collapse_ops: &[CollapseOperator],
    dt: f64,
    substep_tol: Option<f64>,
) -> Result<Matrix> {
    let stage = |m: Matrix| -> Result<Matrix> {
        match substep_tol {
            Some(tol) => repair(&m, tol).map(|(r, _)| r),
            None => Ok(m),
        }
    };
    let half_dt = c(0.5 * dt);
    let dt_c = c(dt);

    let k1 = lindblad_rhs(hamiltonian, collapse_ops, rho);
    let rho2 = stage(rho + &(&k1 * half_dt))?;
    let k2 = lindblad_rhs(hamiltonian, collapse_ops, &rho2);
    let rho3 = stage(rho + &(&k2 * half_dt))?;
    let k3 = lindblad_rhs(hamiltonian, collapse_ops, &rho3);
    let rho4 = stage(rho + &(&k3 * dt_c))?;
    let k4 = lindblad_rhs(hamiltonian, collapse_ops, &rho4);

    Ok(rho + &((k1 + (k2 + k3) * c(2.0) + k4) * c(dt / 6.0)))
}

/// Project onto the density-matrix set: Hermitian part, negative
/// eigenvalues clipped to zero, trace renormalized. Returns the repaired
/// state and the clipped weight Σ|λ₋|.
pub fn repair(rho: &Matrix, tol: f64) -> Result<(Matrix, f64)> {
    let herm = hermitian_part(rho);
    let e = eigh(&herm);
    let clipped: f64 = e.values.iter().filter(|&&l| l < 0.0).map(|l| -l).sum();
    let kept: f64 = e.values.iter().filter(|&&l| l > 0.0).sum();
    if kept <= 0.0 {
        return Err(Error::Precision(CheckFailure {
            check: Check::UnitTrace,
            subject: "integrated density matrix".into(),
            expected: "positive spectral weight".into(),
            observed: kept,
            tolerance: tol,
        }));
    }

    if clipped == 0.0 {
        let tr = trace(&herm).re;
        return Ok((herm.mapv(|z| z / tr), 0.0));
    }

    if clipped > tol {
        tracing::trace!(clipped, "Clipping negative eigenvalues");
    }
    let repaired = spectral_map(&e.values, &e.vectors, |l| c(l.max(0.0) / kept));
    Ok((repaired, clipped))
}
