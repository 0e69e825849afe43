//! Repository error taxonomy.
//!
//! Every fallible repository and store operation reports one of these
//! kinds. Kind mismatches during traversal (a list position under a named
//! container, a name under a list, any descent below a leaf) are reported
//! as [`RepoError::ElementNotFound`] rather than as a distinct kind, so
//! callers learn nothing about the shape of a tree they misaddressed.

use thiserror::Error;
use twinrepo_path::PathParseError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepoError {
    /// The path string does not conform to the idShort path grammar.
    #[error("INVALID_PATH: {0}")]
    InvalidPath(#[from] PathParseError),

    /// No submodel with the given id exists in the repository.
    #[error("SUBMODEL_NOT_FOUND: {0}")]
    SubmodelNotFound(String),

    /// The path does not resolve to an element inside the submodel.
    #[error("ELEMENT_NOT_FOUND: {0}")]
    ElementNotFound(String),

    /// A sibling with the same identifier already exists.
    #[error("COLLIDING_IDENTIFIER: {0}")]
    CollidingIdentifier(String),

    /// A submodel was handed in without an id.
    #[error("MISSING_IDENTIFIER")]
    MissingIdentifier,

    /// The identifier in the payload does not match the addressed one.
    #[error("IDENTIFICATION_MISMATCH: expected {expected:?}, got {actual:?}")]
    IdentificationMismatch { expected: String, actual: String },

    /// A value-only payload does not fit the shape of the addressed element.
    #[error("VALUE_MISMATCH: {0}")]
    ValueMismatch(String),

    /// The submodel was stored but linking it to the registry failed.
    #[error("REGISTRY_LINK_FAILED: {0}")]
    RegistryLink(String),

    /// The submodel was deleted but unlinking it from the registry failed.
    #[error("REGISTRY_UNLINK_FAILED: {0}")]
    RegistryUnlink(String),

    /// A stored document could not be mapped to or from the model.
    #[error("STORAGE: {0}")]
    Storage(String),
}

impl RepoError {
    pub fn submodel_not_found(id: impl Into<String>) -> Self {
        RepoError::SubmodelNotFound(id.into())
    }

    pub fn element_not_found(path: impl std::fmt::Display) -> Self {
        RepoError::ElementNotFound(path.to_string())
    }

    pub fn colliding(id: impl std::fmt::Display) -> Self {
        RepoError::CollidingIdentifier(id.to_string())
    }

    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        RepoError::IdentificationMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn value_mismatch(reason: impl Into<String>) -> Self {
        RepoError::ValueMismatch(reason.into())
    }

    pub fn storage(cause: impl std::fmt::Display) -> Self {
        RepoError::Storage(cause.to_string())
    }
}
