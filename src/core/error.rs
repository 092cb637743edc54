// Copyright @yucwang 2026

use std::fmt;

/// Failures of the frame buffer management. The tracer itself never fails,
/// these only decide whether a frame can be accumulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Allocation { width: usize, height: usize },
    DimensionMismatch { expected: (usize, usize), found: (usize, usize) },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Allocation { width, height } => {
                write!(f, "failed to allocate a {}x{} frame", width, height)
            }
            RenderError::DimensionMismatch { expected, found } => {
                write!(f, "frame size mismatch: expected {}x{}, found {}x{}",
                       expected.0, expected.1, found.0, found.1)
            }
        }
    }
}

impl std::error::Error for RenderError {}
