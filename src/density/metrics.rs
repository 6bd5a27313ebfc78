// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distance measures between quantum states.
//!
//! These functions assume validated density matrices of equal dimension;
//! [`DensityOps`](super::DensityOps) wraps them with input checks.

use crate::kernel::{eigvalsh, psd_sqrt, trace, Matrix};

/// Uhlmann fidelity F(ρ, σ) = (Tr √(√ρ σ √ρ))².
///
/// Reduces to ⟨ψ|σ|ψ⟩ when ρ = |ψ⟩⟨ψ| is pure.
pub fn state_fidelity(rho: &Matrix, sigma: &Matrix) -> f64 {
    let sqrt_rho = psd_sqrt(rho);
    let inner = sqrt_rho.dot(sigma).dot(&sqrt_rho);
    let root_trace = trace(&psd_sqrt(&inner)).re;
    root_trace * root_trace
}

/// Trace distance D(ρ, σ) = ½ ‖ρ − σ‖₁ = ½ Σ|λᵢ(ρ − σ)|.
pub fn trace_distance(rho: &Matrix, sigma: &Matrix) -> f64 {
    let diff = rho - sigma;
    0.5 * eigvalsh(&diff).iter().map(|l| l.abs()).sum::<f64>()
}

/// Hellinger-type distance from a fidelity: √(1 − F).
pub fn hellinger_distance(fidelity: f64) -> f64 {
    let f_clamped = fidelity.clamp(0.0, 1.0);
    (1.0 - f_clamped).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{outer, ONE, ZERO};
    use crate::test_utils::{bell_states, maximally_mixed, random_density};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn ground_state_rho() -> Matrix {
        array![[ONE, ZERO], [ZERO, ZERO]]
    }

    fn excited_state_rho() -> Matrix {
        array![[ZERO, ZERO], [ZERO, ONE]]
    }

    #[test]
    fn test_state_fidelity_identity() {
        let rho = random_density(4, 1);
        assert_relative_eq!(state_fidelity(&rho, &rho), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_state_fidelity_orthogonal() {
        assert_relative_eq!(
            state_fidelity(&ground_state_rho(), &excited_state_rho()),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_fidelity_is_symmetric() {
        let a = random_density(4, 2);
        let b = random_density(4, 3);
        assert_relative_eq!(state_fidelity(&a, &b), state_fidelity(&b, &a), epsilon = 1e-10);
    }

    #[test]
    fn test_pure_state_fidelity_is_overlap() {
        let bells = bell_states();
        let psi = &bells[0];
        let sigma = random_density(4, 8);
        let sigma_psi = sigma.dot(psi);
        let overlap: f64 = psi
            .iter()
            .zip(sigma_psi.iter())
            .map(|(a, b)| (a.conj() * b).re)
            .sum();
        assert_relative_eq!(state_fidelity(&outer(psi), &sigma), overlap, epsilon = 1e-10);
    }

    #[test]
    fn test_trace_distance_identical() {
        let rho = ground_state_rho();
        assert_relative_eq!(trace_distance(&rho, &rho), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trace_distance_orthogonal() {
        assert_relative_eq!(
            trace_distance(&ground_state_rho(), &excited_state_rho()),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_trace_distance_exact_beyond_qubits() {
        // Orthogonal Bell states are perfectly distinguishable
        let bells = bell_states();
        let d = trace_distance(&outer(&bells[0]), &outer(&bells[3]));
        assert_relative_eq!(d, 1.0, epsilon = 1e-12);
        // Pure vs maximally mixed in d = 4: 1 − 1/d
        let d = trace_distance(&outer(&bells[1]), &maximally_mixed(4));
        assert_relative_eq!(d, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_hellinger_from_fidelity() {
        assert_relative_eq!(hellinger_distance(1.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(hellinger_distance(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(hellinger_distance(0.5), (0.5_f64).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(hellinger_distance(1.2), 0.0, epsilon = 1e-12);
    }
}
