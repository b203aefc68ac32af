//! Error types for container operations.

/// Error type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors that can occur during container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// Pop attempted on an empty container
    #[error("Can't pop from empty container")]
    Empty,
}
