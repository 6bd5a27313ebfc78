// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tensor composition of operators.
//!
//! Qubit 0 is the most significant bit of a basis index, i.e. the
//! left-most factor of a tensor product: |q₀ q₁ … qₙ₋₁⟩.
//!
//! - [`tensor_product`]: A ⊗ B
//! - [`kronecker_sum`]: A ⊗ I + I ⊗ B (non-interacting composite Hamiltonians)
//! - [`apply_to_qubits`]: embed a k-qubit operator on arbitrary target qubits
//!
//! The bit-level helpers [`gather_bits`] and [`scatter_bits`] are the index
//! reshaping used by the partial trace and partial transpose.

use std::collections::HashSet;

use ndarray::linalg::kron;
use tracing::trace;

use crate::error::{Result, ValidationError};
use crate::kernel::{identity, Matrix};
use crate::validation::Validator;

/// Largest register that may be expanded into a dense operator.
pub const MAX_DENSE_QUBITS: usize = 14;

/// A ⊗ B, with (A⊗B)[i·n+j, k·n+l] = A[i,k]·B[j,l].
///
/// Fails with a dimension error if either factor is empty or non-square.
pub fn tensor_product(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let v = Validator::default();
    v.require_square(a, "left factor")?;
    v.require_square(b, "right factor")?;
    Ok(kron(a, b))
}

/// F₀ ⊗ F₁ ⊗ … ⊗ Fₖ₋₁
pub fn tensor_product_all(factors: &[Matrix]) -> Result<Matrix> {
    let (first, rest) = factors
        .split_first()
        .ok_or_else(|| ValidationError::dimension("factors", "at least one factor is required"))?;
    let v = Validator::default();
    v.require_square(first, "factor 0")?;
    rest.iter().enumerate().try_fold(first.clone(), |acc, (k, f)| {
        v.require_square(f, &format!("factor {}", k + 1))?;
        Ok::<_, crate::error::Error>(kron(&acc, f))
    })
}

/// A ⊕ B = A ⊗ I_B + I_A ⊗ B.
///
/// The spectrum is {aᵢ + bⱼ}: the Hamiltonian of two non-interacting
/// subsystems.
pub fn kronecker_sum(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let v = Validator::default();
    let da = v.require_square(a, "left operand")?;
    let db = v.require_square(b, "right operand")?;
    Ok(kron(a, &identity(db)) + kron(&identity(da), b))
}

/// Embed `operator` acting on `targets` into a `total_qubits` register.
///
/// `targets[0]` corresponds to the most significant qubit of the operator,
/// so `apply_to_qubits(CNOT, &[2, 0], 3)` has qubit 2 as control. Targets
/// need not be contiguous or sorted.
///
/// # Errors
/// - `InvalidQubitIndex` for out-of-range or repeated targets
/// - `SizeMismatch` when dim(operator) ≠ 2^|targets|
pub fn apply_to_qubits(operator: &Matrix, targets: &[usize], total_qubits: usize) -> Result<Matrix> {
    let v = Validator::default();
    let op_dim = v.require_square(operator, "operator")?;
    check_register_size(total_qubits)?;
    check_qubit_list(targets, total_qubits)?;

    let expected = 1usize << targets.len();
    if op_dim != expected {
        return Err(ValidationError::SizeMismatch {
            subject: format!("operator on {} qubit(s)", targets.len()),
            expected,
            actual: op_dim,
        }
        .into());
    }

    let dim = 1usize << total_qubits;
    let target_mask = targets
        .iter()
        .fold(0usize, |m, &q| m | bit(q, total_qubits));

    trace!(?targets, total_qubits, "Embedding operator");

    let mut out = Matrix::zeros((dim, dim));
    for row in 0..dim {
        let rest = row & !target_mask;
        let a = gather_bits(row, targets, total_qubits);
        for b in 0..op_dim {
            let col = rest | scatter_bits(b, targets, total_qubits);
            out[[row, col]] = operator[[a, b]];
        }
    }
    Ok(out)
}

/// Validate a list of distinct in-range qubit indices.
pub(crate) fn check_qubit_list(qubits: &[usize], total_qubits: usize) -> Result<()> {
    let mut seen = HashSet::with_capacity(qubits.len());
    for &q in qubits {
        if q >= total_qubits {
            return Err(ValidationError::InvalidQubitIndex {
                index: q,
                num_qubits: total_qubits,
                reason: "out of range".into(),
            }
            .into());
        }
        if !seen.insert(q) {
            return Err(ValidationError::InvalidQubitIndex {
                index: q,
                num_qubits: total_qubits,
                reason: "duplicate index".into(),
            }
            .into());
        }
    }
    Ok(())
}

pub(crate) fn check_register_size(total_qubits: usize) -> Result<()> {
    if total_qubits > MAX_DENSE_QUBITS {
        return Err(ValidationError::field(
            "total_qubits",
            format!("{total_qubits} exceeds the dense limit of {MAX_DENSE_QUBITS}"),
        )
        .into());
    }
    Ok(())
}

/// Mask of qubit `q` in an `n`-qubit basis index.
#[inline]
pub(crate) fn bit(q: usize, n: usize) -> usize {
    1 << (n - 1 - q)
}

/// Collect the bits of `index` at `qubits` into a compact integer, with
/// `qubits[0]` as the most significant bit.
pub fn gather_bits(index: usize, qubits: &[usize], n: usize) -> usize {
    qubits
        .iter()
        .fold(0, |acc, &q| (acc << 1) | usize::from(index & bit(q, n) != 0))
}

/// Inverse of [`gather_bits`]: spread the low bits of `value` onto `qubits`.
pub fn scatter_bits(value: usize, qubits: &[usize], n: usize) -> usize {
    let k = qubits.len();
    qubits.iter().enumerate().fold(0, |acc, (pos, &q)| {
        if value & (1 << (k - 1 - pos)) != 0 {
            acc | bit(q, n)
        } else {
            acc
        }
    })
}

/// Qubits of an `n`-qubit register not listed in `qubits`, ascending.
pub fn complement(qubits: &[usize], n: usize) -> Vec<usize> {
    (0..n).filter(|q| !qubits.contains(q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::kernel::{c, eigvalsh, ONE, ZERO};
    use crate::operators::{hadamard, pauli_x, pauli_z};
    use crate::test_utils::assert_matrix_close;
    use crate::validation::{is_hermitian, is_unitary, Tolerance};
    use ndarray::{array, Array2};
    use num_complex::Complex64;

    fn cnot() -> Matrix {
        array![
            [ONE, ZERO, ZERO, ZERO],
            [ZERO, ONE, ZERO, ZERO],
            [ZERO, ZERO, ZERO, ONE],
            [ZERO, ZERO, ONE, ZERO]
        ]
    }

    #[test]
    fn test_identity_tensor_identity() {
        let out = tensor_product(&identity(2), &identity(4)).unwrap();
        assert_matrix_close(&out, &identity(8), 0.0);
    }

    #[test]
    fn test_tensor_product_element_layout() {
        let a = array![[c(1.0), c(2.0)], [c(3.0), c(4.0)]];
        let b = array![[c(0.0), c(5.0)], [c(6.0), c(7.0)]];
        let out = tensor_product(&a, &b).unwrap();
        // (A⊗B)[i·2+j, k·2+l] = A[i,k]·B[j,l]
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    for l in 0..2 {
                        assert_eq!(out[[i * 2 + j, k * 2 + l]], a[[i, k]] * b[[j, l]]);
                    }
                }
            }
        }
    }

    #[test]
    fn test_tensor_product_preserves_properties() {
        let tol = Tolerance::default();
        let out = tensor_product(&hadamard(), &pauli_x()).unwrap();
        assert!(is_unitary(&out, tol));
        assert!(is_hermitian(&out, tol));
    }

    #[test]
    fn test_tensor_product_rejects_bad_shapes() {
        let empty = Array2::<Complex64>::zeros((0, 0));
        let rect = Array2::<Complex64>::zeros((2, 1));
        assert!(matches!(
            tensor_product(&empty, &pauli_x()),
            Err(Error::Validation(ValidationError::Dimension { .. }))
        ));
        assert!(matches!(
            tensor_product(&pauli_x(), &rect),
            Err(Error::Validation(ValidationError::Dimension { .. }))
        ));
    }

    #[test]
    fn test_tensor_product_all() {
        let zzz = tensor_product_all(&[pauli_z(), pauli_z(), pauli_z()]).unwrap();
        assert_eq!(zzz.nrows(), 8);
        assert_eq!(zzz[[7, 7]], c(-1.0));
        assert!(tensor_product_all(&[]).is_err());
    }

    #[test]
    fn test_kronecker_sum_spectrum() {
        // Z ⊕ Z has eigenvalues {-2, 0, 0, 2}
        let h = kronecker_sum(&pauli_z(), &pauli_z()).unwrap();
        assert!(is_hermitian(&h, Tolerance::default()));
        assert_eq!(eigvalsh(&h), vec![-2.0, 0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_apply_single_qubit_matches_tensor_product() {
        let embedded = apply_to_qubits(&pauli_x(), &[1], 3).unwrap();
        let expected = tensor_product_all(&[identity(2), pauli_x(), identity(2)]).unwrap();
        assert_matrix_close(&embedded, &expected, 0.0);
    }

    #[test]
    fn test_apply_contiguous_matches_tensor_product() {
        let embedded = apply_to_qubits(&cnot(), &[0, 1], 3).unwrap();
        let expected = tensor_product(&cnot(), &identity(2)).unwrap();
        assert_matrix_close(&embedded, &expected, 0.0);
    }

    #[test]
    fn test_apply_reversed_targets() {
        // CNOT with control on qubit 1 and target on qubit 0:
        // |01⟩ → |11⟩, |11⟩ → |01⟩
        let embedded = apply_to_qubits(&cnot(), &[1, 0], 2).unwrap();
        assert_eq!(embedded[[3, 1]], ONE);
        assert_eq!(embedded[[1, 3]], ONE);
        assert_eq!(embedded[[0, 0]], ONE);
        assert_eq!(embedded[[2, 2]], ONE);
    }

    #[test]
    fn test_apply_non_contiguous_targets() {
        // CNOT on qubits (0, 2) of 3: |100⟩ → |101⟩
        let embedded = apply_to_qubits(&cnot(), &[0, 2], 3).unwrap();
        assert_eq!(embedded[[0b101, 0b100]], ONE);
        assert_eq!(embedded[[0b111, 0b110]], ONE);
        assert_eq!(embedded[[0b010, 0b010]], ONE);
        assert!(is_unitary(&embedded, Tolerance::default()));
    }

    #[test]
    fn test_apply_invalid_indices() {
        assert!(matches!(
            apply_to_qubits(&pauli_x(), &[3], 3),
            Err(Error::Validation(ValidationError::InvalidQubitIndex { index: 3, .. }))
        ));
        assert!(matches!(
            apply_to_qubits(&cnot(), &[1, 1], 3),
            Err(Error::Validation(ValidationError::InvalidQubitIndex { index: 1, .. }))
        ));
    }

    #[test]
    fn test_apply_size_mismatch() {
        assert!(matches!(
            apply_to_qubits(&cnot(), &[0], 2),
            Err(Error::Validation(ValidationError::SizeMismatch {
                expected: 2,
                actual: 4,
                ..
            }))
        ));
    }

    #[test]
    fn test_gather_scatter_roundtrip() {
        let qubits = [3, 0, 2];
        for value in 0..8 {
            let index = scatter_bits(value, &qubits, 4);
            assert_eq!(gather_bits(index, &qubits, 4), value);
        }
        assert_eq!(complement(&[0, 2], 4), vec![1, 3]);
    }
}
