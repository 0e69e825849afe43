//! Keyed document storage with locator-addressed reads and writes.
//!
//! [`MemoryDocumentStore`] is the in-process implementation; a driver for an
//! external document database implements the same [`DocumentStore`] trait and
//! maps [`TargetPath`] / [`UpdateOp`] onto its native query language.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::apply::{find_in, update_in};
use crate::expr::{TargetPath, UpdateOp};

/// Field every stored document is keyed by.
pub const ID_FIELD: &str = "id";

/// A stored document. Documents are plain JSON objects carrying a string
/// [`ID_FIELD`].
pub type Document = Value;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocStoreError {
    /// The document has no string value under [`ID_FIELD`].
    #[error("MISSING_DOCUMENT_ID")]
    MissingId,
    /// A document with the same id is already stored.
    #[error("DUPLICATE_DOCUMENT_ID: {0}")]
    DuplicateId(String),
}

/// Result of a locator-addressed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Whether a document with the requested id exists.
    pub matched: bool,
    /// How many locator targets were written.
    pub modified: usize,
}

impl UpdateOutcome {
    pub const MISSED: UpdateOutcome = UpdateOutcome {
        matched: false,
        modified: 0,
    };
}

/// Top-level equality filter for [`DocumentStore::find_sorted`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEquals {
    pub field: String,
    pub equals: Value,
}

impl FieldEquals {
    pub fn new(field: impl Into<String>, equals: Value) -> Self {
        FieldEquals {
            field: field.into(),
            equals,
        }
    }

    fn matches(&self, doc: &Document) -> bool {
        doc.get(self.field.as_str()) == Some(&self.equals)
    }
}

// ── Store contract ────────────────────────────────────────────────────────

pub trait DocumentStore: Send + Sync {
    /// Stores a new document keyed by its [`ID_FIELD`].
    fn insert(&self, doc: Document) -> Result<(), DocStoreError>;

    /// Full copy of the document with the given id.
    fn find_by_id(&self, id: &str) -> Option<Document>;

    fn exists(&self, id: &str) -> bool;

    /// Replaces the whole document with the given id. Returns `false` when no
    /// such document is stored.
    fn replace(&self, id: &str, doc: Document) -> bool;

    /// Removes the document with the given id. Returns `false` when no such
    /// document is stored.
    fn remove(&self, id: &str) -> bool;

    /// All documents in ascending id order, optionally restricted to those
    /// matching a top-level field filter.
    fn find_sorted(&self, filter: Option<&FieldEquals>) -> Vec<Document>;

    /// Copies of every value the locator resolves to inside one document.
    /// Empty both when the document is absent and when the locator misses.
    fn find_at(&self, id: &str, target: &TargetPath) -> Vec<Value>;

    /// Applies `op` at every locator target inside one document.
    fn update(&self, id: &str, target: &TargetPath, op: &UpdateOp) -> UpdateOutcome;
}

// ── In-process store ──────────────────────────────────────────────────────

/// [`DocumentStore`] backed by a sorted in-process map.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_of(doc: &Document) -> Result<String, DocStoreError> {
        match doc.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(DocStoreError::MissingId),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn insert(&self, doc: Document) -> Result<(), DocStoreError> {
        let id = Self::id_of(&doc)?;
        let mut documents = self.documents.write().unwrap();
        if documents.contains_key(&id) {
            return Err(DocStoreError::DuplicateId(id));
        }
        debug!(target: "twinrepo::docstore", %id, "insert document");
        documents.insert(id, doc);
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Option<Document> {
        self.documents.read().unwrap().get(id).cloned()
    }

    fn exists(&self, id: &str) -> bool {
        self.documents.read().unwrap().contains_key(id)
    }

    fn replace(&self, id: &str, doc: Document) -> bool {
        let mut documents = self.documents.write().unwrap();
        match documents.get_mut(id) {
            Some(slot) => {
                debug!(target: "twinrepo::docstore", %id, "replace document");
                *slot = doc;
                true
            }
            None => false,
        }
    }

    fn remove(&self, id: &str) -> bool {
        let removed = self.documents.write().unwrap().remove(id).is_some();
        if removed {
            debug!(target: "twinrepo::docstore", %id, "remove document");
        }
        removed
    }

    fn find_sorted(&self, filter: Option<&FieldEquals>) -> Vec<Document> {
        let documents = self.documents.read().unwrap();
        documents
            .values()
            .filter(|doc| filter.map_or(true, |f| f.matches(doc)))
            .cloned()
            .collect()
    }

    fn find_at(&self, id: &str, target: &TargetPath) -> Vec<Value> {
        let documents = self.documents.read().unwrap();
        match documents.get(id) {
            Some(doc) => find_in(doc, target).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    fn update(&self, id: &str, target: &TargetPath, op: &UpdateOp) -> UpdateOutcome {
        let mut documents = self.documents.write().unwrap();
        let Some(doc) = documents.get_mut(id) else {
            return UpdateOutcome::MISSED;
        };
        let modified = update_in(doc, target, op);
        debug!(
            target: "twinrepo::docstore",
            %id,
            op = op.name(),
            locator = %target,
            modified,
            "update document"
        );
        UpdateOutcome {
            matched: true,
            modified,
        }
    }
}
