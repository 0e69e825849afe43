//! Storage backends for submodels.
//!
//! [`SubmodelStore`] is the persistence seam: [`MemorySubmodelStore`] keeps
//! submodels in process, [`DocumentSubmodelStore`] keeps one JSON document
//! per submodel in a [`twinrepo_docstore::DocumentStore`]. Both present the
//! same semantics, down to error kinds and page cuts, so a repository can
//! swap backends without observable difference.

mod document;
mod memory;
mod translate;

pub use document::DocumentSubmodelStore;
pub use memory::MemorySubmodelStore;

use std::collections::BTreeMap;

use twinrepo_core::{CursorResult, PaginationInfo, PaginationSupport, RepoError};
use twinrepo_model::{Element, ElementValue, Submodel};
use twinrepo_path::IdShortPath;

use crate::tree::Children;

pub trait SubmodelStore: Send + Sync {
    /// All submodels in ascending id order, optionally restricted to one
    /// semantic id, one page at a time.
    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError>;

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError>;

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError>;

    /// Replaces the whole submodel keyed by the payload's id.
    fn update_submodel(&self, submodel: Submodel) -> Result<(), RepoError>;

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError>;

    /// One page of the children under `parent`, in ascending key order:
    /// idShort for named containers, stringified position for lists.
    fn elements(
        &self,
        id: &str,
        parent: &IdShortPath,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError>;

    fn element(&self, id: &str, path: &IdShortPath) -> Result<Element, RepoError>;

    /// Appends a new element under `parent`.
    fn create_element(
        &self,
        id: &str,
        parent: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError>;

    /// Replaces the element at `path`, relocating it to the end of its
    /// sibling array.
    fn update_element(
        &self,
        id: &str,
        path: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError>;

    fn delete_element(&self, id: &str, path: &IdShortPath) -> Result<(), RepoError>;

    /// Replaces top-level elements in place by idShort; payload entries
    /// without a matching top-level element are skipped.
    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError>;

    fn element_value(&self, id: &str, path: &IdShortPath) -> Result<ElementValue, RepoError>;

    /// Writes a value-only payload into the element at `path`, in place.
    /// Unlike [`SubmodelStore::update_element`] this does not relocate the
    /// element.
    fn set_element_value(
        &self,
        id: &str,
        path: &IdShortPath,
        value: ElementValue,
    ) -> Result<(), RepoError>;
}

// ── Shared page cutting ───────────────────────────────────────────────────

pub(crate) fn paged_submodels(
    submodels: Vec<Submodel>,
    page: &PaginationInfo,
) -> CursorResult<Vec<Submodel>> {
    let sorted: BTreeMap<String, Submodel> = submodels
        .into_iter()
        .map(|submodel| (submodel.id.clone(), submodel))
        .collect();
    PaginationSupport::new(sorted).paged(page)
}

/// Cuts one page out of a container's children. List children are keyed by
/// stringified position, so their pages follow lexicographic key order
/// ("10" before "2").
pub(crate) fn paged_children(
    children: Children<'_>,
    page: &PaginationInfo,
) -> CursorResult<Vec<Element>> {
    let sorted: BTreeMap<String, Element> = children
        .items
        .iter()
        .enumerate()
        .map(|(position, element)| {
            let key = if children.indexed {
                position.to_string()
            } else {
                element.id_short().to_string()
            };
            (key, element.clone())
        })
        .collect();
    PaginationSupport::new(sorted).paged(page)
}
