//! Shared kernel for the twinrepo workspace: the repository error taxonomy
//! and cursor pagination over sorted key domains.

pub mod error;
pub mod pagination;

pub use error::RepoError;
pub use pagination::{cursor_position, CursorResult, PaginationInfo, PaginationSupport};
