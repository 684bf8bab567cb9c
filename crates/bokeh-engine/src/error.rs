//! Engine construction errors.

use thiserror::Error;

/// Errors raised while building an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The pool would be empty.
    #[error("particle count must be greater than zero")]
    NoParticles,

    /// There is no color to assign to particles.
    #[error("color palette must contain at least one color")]
    EmptyPalette,
}
