// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! One-call analysis of a quantum state and an optional Hamiltonian.
//!
//! [`PhysicsCore`] wires the individual engines together around a shared
//! tolerance and spectral cache. Given a state (pure or mixed) it always
//! reports purity and entropy; bipartite entanglement is added for two or
//! more qubits, and spectral, symmetry, evolution and thermal sections when
//! a Hamiltonian (and a time or temperature) is supplied.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{CacheStats, SpectralCache};
use crate::config::Config;
use crate::density::{DensityOps, ThermalState};
use crate::error::{Error, Result, ValidationError};
use crate::evolution::TimeEvolution;
use crate::hamiltonian::{ConservedQuantity, DegeneracyGroup, HamiltonianAnalyzer};
use crate::information::QuantumInformation;
use crate::interchange::{matrix_from_rows, serialize_opt_matrix, vector_from_pairs, ComplexPair, MatrixRows};
use crate::kernel::{dagger, outer, trace, Matrix, StateVector};
use crate::tensor::complement;
use crate::validation::{Tolerance, Validator};

/// Input to [`PhysicsCore::analyze`]. Exactly one of `state_vector` and
/// `density_matrix` must be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub state_vector: Option<Vec<ComplexPair>>,
    #[serde(default)]
    pub density_matrix: Option<MatrixRows>,
    #[serde(default)]
    pub hamiltonian: Option<MatrixRows>,
    /// Qubits on one side of the entanglement cut; defaults to `[0]`.
    #[serde(default)]
    pub subsystem: Option<Vec<usize>>,
    /// Evolve the state under the Hamiltonian for this time.
    #[serde(default)]
    pub evolution_time: Option<f64>,
    /// Compare against the Gibbs state at this temperature.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Structured analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicsReport {
    pub num_qubits: usize,
    pub dimension: usize,
    pub state: StateReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entanglement: Option<EntanglementReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<SpectrumReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution: Option<EvolutionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermal: Option<ThermalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub is_pure: bool,
    pub purity: f64,
    pub linear_entropy: f64,
    pub von_neumann_entropy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntanglementReport {
    pub subsystem: Vec<usize>,
    /// Entropy of the reduced state; entanglement entropy for pure input.
    pub subsystem_entropy: f64,
    pub mutual_information: f64,
    pub negativity: f64,
    pub logarithmic_negativity: f64,
    /// Two-qubit states only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entanglement_of_formation: Option<f64>,
    #[serde(serialize_with = "serialize_opt_matrix")]
    pub reduced_state: Option<Matrix>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpectrumReport {
    pub eigenvalues: Vec<f64>,
    pub ground_state_energy: f64,
    pub spectral_gap: f64,
    /// Multiplicity of the ground level.
    pub ground_degeneracy: usize,
    pub degeneracies: Vec<DegeneracyGroup>,
    /// Tr(Hρ)
    pub energy_expectation: f64,
    pub conserved_quantities: Vec<ConservedQuantity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionReport {
    pub time: f64,
    /// F(ρ₀, ρ(t))
    pub fidelity_with_initial: f64,
    pub purity: f64,
    pub energy_expectation: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThermalReport {
    pub temperature: f64,
    #[serde(flatten)]
    pub state: ThermalState,
    /// F(ρ, ρ_thermal)
    pub fidelity_with_state: f64,
    pub trace_distance_to_state: f64,
}

/// Orchestrates the physics engines at one tolerance.
#[derive(Debug, Clone)]
pub struct PhysicsCore {
    validator: Validator,
    analyzer: HamiltonianAnalyzer,
    density: DensityOps,
    information: QuantumInformation,
    evolution: TimeEvolution,
    boltzmann: f64,
    cache: Option<Arc<SpectralCache>>,
}

impl Default for PhysicsCore {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

impl PhysicsCore {
    /// Core with no spectral cache and unit constants.
    pub fn new(tol: Tolerance) -> Self {
        let analyzer = HamiltonianAnalyzer::new(tol);
        Self {
            validator: Validator::new(tol),
            density: DensityOps::new(tol),
            information: QuantumInformation::new(tol),
            evolution: TimeEvolution::with_analyzer(analyzer.clone()),
            analyzer,
            boltzmann: 1.0,
            cache: None,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let tol = config.tolerance()?;
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(SpectralCache::with_capacity(config.cache.capacity)));

        let mut analyzer = HamiltonianAnalyzer::new(tol);
        let mut density = DensityOps::new(tol)
            .with_hygiene(config.lindblad.hygiene)
            .with_trajectory(config.lindblad.store_trajectory);
        if let Some(cache) = &cache {
            analyzer = analyzer.with_cache(Arc::clone(cache));
            density = density.with_cache(Arc::clone(cache));
        }
        let evolution = TimeEvolution::with_analyzer(analyzer.clone())
            .with_hbar(config.evolution.hbar)?
            .with_trotter_scale(config.precision.trotter_scale)?
            .with_order(config.evolution.trotter_order);

        Ok(Self {
            validator: Validator::new(tol),
            analyzer,
            density,
            information: QuantumInformation::new(tol),
            evolution,
            boltzmann: config.evolution.boltzmann,
            cache,
        })
    }

    pub fn tolerance(&self) -> Tolerance {
        self.validator.tolerance()
    }

    pub fn analyzer(&self) -> &HamiltonianAnalyzer {
        &self.analyzer
    }

    pub fn density(&self) -> &DensityOps {
        &self.density
    }

    pub fn information(&self) -> &QuantumInformation {
        &self.information
    }

    pub fn evolution(&self) -> &TimeEvolution {
        &self.evolution
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    /// Run every analysis the request supports.
    ///
    /// # Errors
    /// Any validation or precision failure of an individual step aborts
    /// the whole analysis.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<PhysicsReport> {
        let input = self.parse_state(request)?;
        let rho = input.density_matrix();
        let n = self.validator.require_density_matrix(&rho, "state")?;
        let dimension = rho.nrows();
        let _span = tracing::info_span!("analyze", num_qubits = n).entered();

        let hamiltonian = request
            .hamiltonian
            .as_deref()
            .map(|rows| matrix_from_rows(rows, "hamiltonian"))
            .transpose()?;
        if let Some(h) = &hamiltonian {
            if h.nrows() != dimension {
                return Err(ValidationError::SizeMismatch {
                    subject: "hamiltonian".into(),
                    expected: dimension,
                    actual: h.nrows(),
                }
                .into());
            }
        }

        let purity = self.density.purity(&rho)?;
        let state = StateReport {
            is_pure: (1.0 - purity).abs() <= self.tolerance().value(),
            purity,
            linear_entropy: 1.0 - purity,
            von_neumann_entropy: self.information.von_neumann_entropy(&rho)?,
        };

        let entanglement = if n >= 2 {
            let subsystem = request.subsystem.clone().unwrap_or_else(|| vec![0]);
            Some(self.entanglement(&input, &rho, n, subsystem)?)
        } else {
            None
        };

        let spectrum = hamiltonian.as_ref().map(|h| self.spectrum(h, &rho)).transpose()?;

        let evolution = match (&hamiltonian, request.evolution_time) {
            (Some(h), Some(t)) => Some(self.evolve(h, &input, &rho, t)?),
            (None, Some(_)) => return Err(missing_hamiltonian("evolution_time")),
            _ => None,
        };

        let thermal = match (&hamiltonian, request.temperature) {
            (Some(h), Some(temperature)) => {
                let gibbs = self
                    .density
                    .thermal_state_with_partition(h, temperature, self.boltzmann)?;
                Some(ThermalReport {
                    temperature,
                    fidelity_with_state: self.density.state_fidelity(&rho, &gibbs.density_matrix)?,
                    trace_distance_to_state: self.density.trace_distance(&rho, &gibbs.density_matrix)?,
                    state: gibbs,
                })
            }
            (None, Some(_)) => return Err(missing_hamiltonian("temperature")),
            _ => None,
        };

        info!(
            num_qubits = n,
            purity,
            hamiltonian = hamiltonian.is_some(),
            "Analysis complete"
        );

        Ok(PhysicsReport {
            num_qubits: n,
            dimension,
            state,
            entanglement,
            spectrum,
            evolution,
            thermal,
            cache: self.cache_stats(),
        })
    }

    fn parse_state(&self, request: &AnalysisRequest) -> Result<StateInput> {
        match (&request.state_vector, &request.density_matrix) {
            (Some(pairs), None) => {
                let psi = vector_from_pairs(pairs, "state_vector")?;
                self.validator.require_state_vector(&psi, "state_vector")?;
                Ok(StateInput::Pure(psi))
            }
            (None, Some(rows)) => Ok(StateInput::Mixed(matrix_from_rows(rows, "density_matrix")?)),
            (Some(_), Some(_)) => Err(ValidationError::field(
                "state",
                "give either state_vector or density_matrix, not both",
            )
            .into()),
            (None, None) => Err(ValidationError::field("state", "state_vector or density_matrix is required").into()),
        }
    }

    fn entanglement(
        &self,
        input: &StateInput,
        rho: &Matrix,
        n: usize,
        mut subsystem: Vec<usize>,
    ) -> Result<EntanglementReport> {
        let subsystem_entropy = match input {
            StateInput::Pure(psi) => self.information.entanglement_entropy(psi, &subsystem)?,
            StateInput::Mixed(_) => {
                let reduced = self.density.reduced_state(rho, &subsystem)?;
                self.information.von_neumann_entropy(&reduced)?
            }
        };
        subsystem.sort_unstable();
        let rest = complement(&subsystem, n);

        let reduced = self.density.reduced_state(rho, &subsystem)?;
        let mutual_information = if rest.is_empty() {
            0.0
        } else {
            self.information.mutual_information(rho, &subsystem, &rest)?
        };
        let negativity = self.information.negativity(rho, &subsystem)?;
        let (concurrence, entanglement_of_formation) = if n == 2 {
            (
                Some(self.information.concurrence(rho)?),
                Some(self.information.entanglement_of_formation(rho)?),
            )
        } else {
            (None, None)
        };
        debug!(subsystem = ?subsystem, negativity, "Entanglement measures");

        Ok(EntanglementReport {
            subsystem,
            subsystem_entropy,
            mutual_information,
            negativity,
            logarithmic_negativity: (2.0 * negativity + 1.0).log2(),
            concurrence,
            entanglement_of_formation,
            reduced_state: Some(reduced),
        })
    }

    fn spectrum(&self, h: &Matrix, rho: &Matrix) -> Result<SpectrumReport> {
        let analysis = self.analyzer.analyze_spectrum(h)?;
        let conserved_quantities = self.analyzer.find_conserved_quantities(h, &[])?;
        Ok(SpectrumReport {
            energy_expectation: energy(h, rho),
            ground_degeneracy: analysis.ground_degeneracy(),
            eigenvalues: analysis.eigenvalues,
            ground_state_energy: analysis.ground_state_energy,
            spectral_gap: analysis.spectral_gap,
            degeneracies: analysis.degeneracies,
            conserved_quantities,
        })
    }

    fn evolve(&self, h: &Matrix, input: &StateInput, rho: &Matrix, t: f64) -> Result<EvolutionReport> {
        let evolved = match input {
            StateInput::Pure(psi) => outer(&self.evolution.apply_to_state(h, psi, t)?),
            StateInput::Mixed(_) => {
                let u = self.evolution.evolve_exact(h, t)?;
                u.dot(rho).dot(&dagger(&u))
            }
        };
        Ok(EvolutionReport {
            time: t,
            fidelity_with_initial: self.density.state_fidelity(rho, &evolved)?,
            purity: self.density.purity(&evolved)?,
            energy_expectation: energy(h, &evolved),
        })
    }
}

enum StateInput {
    Pure(StateVector),
    Mixed(Matrix),
}

impl StateInput {
    fn density_matrix(&self) -> Matrix {
        match self {
            StateInput::Pure(psi) => outer(psi),
            StateInput::Mixed(rho) => rho.clone(),
        }
    }
}

/// Tr(Hρ)
fn energy(h: &Matrix, rho: &Matrix) -> f64 {
    trace(&h.dot(rho)).re
}

fn missing_hamiltonian(field: &str) -> Error {
    ValidationError::field(field, "requires a hamiltonian").into()
}
