//! Typed document-store seam: a locator expression language, the
//! interpreter that applies it to JSON documents, and the in-process
//! collection backing the document-backed submodel store.
//!
//! A remote document database driver would implement [`DocumentStore`]
//! against the same document layout; everything above the trait is unaware
//! of which implementation it talks to.

pub mod apply;
pub mod expr;
pub mod store;

pub use expr::{ArrayFilter, Step, TargetPath, UpdateOp};
pub use store::{
    DocStoreError, Document, DocumentStore, FieldEquals, MemoryDocumentStore, UpdateOutcome,
    ID_FIELD,
};
