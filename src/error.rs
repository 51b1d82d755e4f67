// Allocation errors
// Typed failures for the calculator; I/O boundaries wrap these in anyhow

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    /// A priced or break-even event was given no attendees
    #[error("{event} attendance must be at least 1")]
    ZeroAttendance { event: &'static str },

    /// An input that feeds the derivation is NaN or infinite
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// The catalog cannot drive a derivation
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

pub type AllocationResult<T> = std::result::Result<T, AllocationError>;
