// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Physics Core
//!
//! Validated numerics for small quantum systems: every operation checks its
//! input against the physical invariants it relies on and checks its result
//! against the invariants it promises, at one explicit tolerance.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              PhysicsCore                 │
//! ├──────────────┬─────────────┬────────────┤
//! │ Information  │  Evolution  │  Density   │
//! │ (entropy,    │  (exact,    │  (partial  │
//! │  negativity) │   Trotter)  │   trace,   │
//! │              │             │  Lindblad) │
//! ├──────────────┴─────────────┴────────────┤
//! │     HamiltonianAnalyzer + SpectralCache  │
//! ├─────────────────────────────────────────┤
//! │  Tensor  │  Validation  │  Kernel (eigh) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`kernel`]: matrix primitives and the Hermitian eigensolver
//! - [`validation`]: tolerance, invariant predicates, contracts
//! - [`tensor`]: tensor products and qubit embedding
//! - [`hamiltonian`]: spectra, degeneracies, symmetries
//! - [`density`]: partial trace, purity, thermal states, open dynamics
//! - [`information`]: entropies and entanglement measures
//! - [`evolution`]: exact and Trotterized time evolution
//! - [`lindblad`]: GKSL master-equation solver
//! - [`analysis`]: one-call analysis reports
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod analysis;
pub mod cache;
pub mod config;
pub mod density;
pub mod error;
pub mod evolution;
pub mod hamiltonian;
pub mod information;
pub mod interchange;
pub mod kernel;
pub mod lindblad;
pub mod operators;
pub mod tensor;
pub mod validation;

pub use analysis::{AnalysisRequest, PhysicsCore, PhysicsReport};
pub use cache::SpectralCache;
pub use config::Config;
pub use density::DensityOps;
pub use error::{Error, Result};
pub use evolution::{TimeEvolution, TrotterOrder};
pub use hamiltonian::{HamiltonianAnalyzer, SpectralAnalysis};
pub use information::QuantumInformation;
pub use kernel::{Matrix, StateVector};
pub use validation::Tolerance;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
