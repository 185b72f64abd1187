//! Error types for tensor kernel operations
//!
//! Kernels fail either because their operands do not fit together (checked
//! here) or because a core expression could not be built (wrapped as
//! [`KernelError::Tensor`]).

use std::fmt;

use tenx_core::TensorError;

/// Error type for tensor kernel operations
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Dimension mismatch between operands
    DimensionMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// Axis outside the operand's rank
    InvalidAxis {
        axis: usize,
        rank: usize,
        context: String,
    },

    /// Empty input not allowed
    EmptyInput {
        operation: String,
        parameter: String,
    },

    /// Shape incompatibility
    IncompatibleShapes {
        operation: String,
        shape_a: Vec<usize>,
        shape_b: Vec<usize>,
        reason: String,
    },

    /// Failure inside a core expression constructor
    Tensor(TensorError),

    /// Generic operation error with context
    OperationError { operation: String, message: String },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::DimensionMismatch {
                operation,
                expected,
                actual,
                context,
            } => write!(
                f,
                "{}: dimension mismatch - expected {:?}, got {:?}. {}",
                operation, expected, actual, context
            ),

            KernelError::InvalidAxis {
                axis,
                rank,
                context,
            } => write!(f, "Invalid axis {}: must be < {}. {}", axis, rank, context),

            KernelError::EmptyInput {
                operation,
                parameter,
            } => write!(
                f,
                "{}: empty input not allowed for parameter '{}'",
                operation, parameter
            ),

            KernelError::IncompatibleShapes {
                operation,
                shape_a,
                shape_b,
                reason,
            } => write!(
                f,
                "{}: incompatible shapes {:?} and {:?}: {}",
                operation, shape_a, shape_b, reason
            ),

            KernelError::Tensor(err) => write!(f, "tensor error: {}", err),

            KernelError::OperationError { operation, message } => {
                write!(f, "{}: {}", operation, message)
            }
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Tensor(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TensorError> for KernelError {
    fn from(err: TensorError) -> Self {
        KernelError::Tensor(err)
    }
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create an invalid axis error
    pub fn invalid_axis(axis: usize, rank: usize, context: impl Into<String>) -> Self {
        KernelError::InvalidAxis {
            axis,
            rank,
            context: context.into(),
        }
    }

    /// Create an empty input error
    pub fn empty_input(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        KernelError::EmptyInput {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an incompatible shapes error
    pub fn incompatible_shapes(
        operation: impl Into<String>,
        shape_a: &[usize],
        shape_b: &[usize],
        reason: impl Into<String>,
    ) -> Self {
        KernelError::IncompatibleShapes {
            operation: operation.into(),
            shape_a: shape_a.to_vec(),
            shape_b: shape_b.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create a generic operation error
    pub fn operation_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        KernelError::OperationError {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
