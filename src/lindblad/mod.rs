// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation solver for open quantum systems.
//!
//! Implements the Gorini–Kossakowski–Sudarshan–Lindblad (GKSL) master equation:
//!
//!   dρ/dt = -i[H(t), ρ] + Σ_k γ_k (L_k ρ L_k† − ½{L_k†L_k, ρ})
//!
//! in dimensionless units (ħ = 1). This module provides:
//! - Collapse operators for T1 (amplitude damping) and T2 (dephasing)
//! - RK4 integrator for constant or piecewise-constant Hamiltonians
//! - Density-matrix repair after each step ([`HygieneMode`])
//!
//! # Example
//!
//! ```ignore
//! use qubit_os_physics::lindblad::{solve_lindblad, CollapseOperator, Drive, LindbladConfig};
//! use qubit_os_physics::validation::Validator;
//!
//! let ops = CollapseOperator::from_t1_t2(50.0, 30.0, "q0")?;
//! let config = LindbladConfig::new(20.0, 200, ops);
//! let result = solve_lindblad(&rho0, Drive::Constant(&h), &config, &Validator::default())?;
//! println!("Purity: {:.4}", result.final_purity);
//! ```
//!
//! # References
//!
//! - Lindblad, G. (1976). Commun. Math. Phys. 48, 119.
//!   DOI: 10.1007/BF01608499
//! - Gorini, V., Kossakowski, A., & Sudarshan, E. C. G. (1976). J. Math. Phys. 17, 821.
//!   DOI: 10.1063/1.522979
//! - Breuer, H.-P. & Petruccione, F. (2002). "The Theory of Open Quantum Systems." Oxford.

pub mod dissipator;
pub mod integrate;
pub mod types;

pub use integrate::{repair, solve_lindblad, Drive};
pub use types::{CollapseOperator, HygieneMode, LindbladConfig, LindbladResult};
