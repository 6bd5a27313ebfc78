// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the physics core.
//!
//! Failures fall into two families that callers must be able to tell apart:
//!
//! - [`Error::Validation`]: the input does not satisfy a required invariant
//!   (bad input).
//! - [`Error::Precision`]: a computed result misses the tolerance it was
//!   supposed to satisfy (numerical instability).
//!
//! Every physics check carries a [`CheckFailure`] with the check name, the
//! subject, the expected and observed values, and the tolerance in force.

use std::fmt;

/// Result type alias for physics-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Physics-core error types.
#[derive(Debug)]
pub enum Error {
    /// Input failed validation
    Validation(ValidationError),
    /// Computed result violated its tolerance
    Precision(CheckFailure),
    /// Configuration error
    Config(String),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl Error {
    /// True when the failure was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// True when the failure was a numerical precision violation.
    pub fn is_precision(&self) -> bool {
        matches!(self, Error::Precision(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Precision(e) => write!(f, "Precision error: {}", e),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Precision(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Physical invariant that a check verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// M = M†
    Hermiticity,
    /// U†U = I
    Unitarity,
    /// Tr(ρ) = 1
    UnitTrace,
    /// All eigenvalues ≥ −tol
    PositiveSemidefinite,
    /// ⟨ψ|ψ⟩ = 1
    Normalization,
    /// V†V = I for an eigenbasis
    Orthonormality,
    /// Scalar result inside its physical range
    Range,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Hermiticity => "hermiticity",
            Check::Unitarity => "unitarity",
            Check::UnitTrace => "unit trace",
            Check::PositiveSemidefinite => "positive semidefiniteness",
            Check::Normalization => "normalization",
            Check::Orthonormality => "orthonormality",
            Check::Range => "range",
        };
        f.write_str(name)
    }
}

/// Details of a failed physics check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckFailure {
    /// Which invariant was checked.
    pub check: Check,
    /// What was checked (e.g. "hamiltonian", "U(t)").
    pub subject: String,
    /// Expected value or range.
    pub expected: String,
    /// Observed value (deviation, trace, minimum eigenvalue, ...).
    pub observed: f64,
    /// Tolerance used by the check.
    pub tolerance: f64,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} check failed for {}: expected {}, observed {:e} (tolerance {:e})",
            self.check, self.subject, self.expected, self.observed, self.tolerance
        )
    }
}

impl std::error::Error for CheckFailure {}

/// Validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Matrix is empty, non-square, or not 2ⁿ-dimensional
    Dimension { subject: String, message: String },
    /// Operand sizes do not agree
    SizeMismatch {
        subject: String,
        expected: usize,
        actual: usize,
    },
    /// Qubit index out of range or repeated
    InvalidQubitIndex {
        index: usize,
        num_qubits: usize,
        reason: String,
    },
    /// Subsystem qubit list is empty, out of range, or repeats a qubit
    InvalidSubsystem(String),
    /// Two subsystems that must be disjoint share qubits
    OverlappingSubsystem { shared: Vec<usize> },
    /// NaN or infinite element
    NonFinite { subject: String, index: Vec<usize> },
    /// Operator violates a physics constraint (e.g. non-Hermitian Hamiltonian)
    PhysicsConstraint(CheckFailure),
    /// State is not a valid quantum state
    InvalidQuantumState(CheckFailure),
    /// Scalar parameter validation failed
    Field { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn dimension(subject: &str, message: impl Into<String>) -> Self {
        ValidationError::Dimension {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Dimension { subject, message } => {
                write!(f, "Dimension error for {}: {}", subject, message)
            }
            ValidationError::SizeMismatch {
                subject,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Size mismatch for {}: expected {}, got {}",
                    subject, expected, actual
                )
            }
            ValidationError::InvalidQubitIndex {
                index,
                num_qubits,
                reason,
            } => {
                write!(
                    f,
                    "Invalid qubit index {} for {}-qubit system: {}",
                    index, num_qubits, reason
                )
            }
            ValidationError::InvalidSubsystem(msg) => write!(f, "Invalid subsystem: {}", msg),
            ValidationError::OverlappingSubsystem { shared } => {
                write!(f, "Subsystems overlap on qubits {:?}", shared)
            }
            ValidationError::NonFinite { subject, index } => {
                write!(f, "Non-finite element in {} at {:?}", subject, index)
            }
            ValidationError::PhysicsConstraint(e) => {
                write!(f, "Physics constraint violated: {}", e)
            }
            ValidationError::InvalidQuantumState(e) => write!(f, "Invalid quantum state: {}", e),
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
