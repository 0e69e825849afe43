//! Submodel storage over a document store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
use twinrepo_docstore::{DocStoreError, Document, DocumentStore, FieldEquals, UpdateOp};
use twinrepo_model::{apply_value, element_value, fields, Element, ElementValue, Submodel};
use twinrepo_path::{IdShortPath, Segment};

use crate::store::{paged_children, paged_submodels, translate, SubmodelStore};
use crate::tree::{self, Children};

/// [`SubmodelStore`] keeping one document per submodel in a
/// [`DocumentStore`].
///
/// Element reads and writes address into the document through locators
/// instead of fetching whole submodels. Two operations are exceptions and
/// decompose into more than one store call: a nested create reads the
/// parent element, validates against it and writes it back in one piece,
/// and an element update removes at the old slot and appends at the end.
/// Neither pair is atomic; a concurrent reader can observe the state
/// between the two writes.
pub struct DocumentSubmodelStore<D> {
    documents: D,
}

impl<D: DocumentStore> DocumentSubmodelStore<D> {
    pub fn new(documents: D) -> Self {
        DocumentSubmodelStore { documents }
    }

    /// Whether the miss was the submodel or the element. Locator reads
    /// return nothing in both cases, so the store is probed once more.
    fn missing(&self, id: &str, path: &IdShortPath) -> RepoError {
        if self.documents.exists(id) {
            RepoError::element_not_found(path)
        } else {
            RepoError::submodel_not_found(id)
        }
    }

    fn fetch_element(&self, id: &str, path: &IdShortPath) -> Result<Element, RepoError> {
        let Some(target) = translate::element(path) else {
            return Err(self.missing(id, path));
        };
        let mut found = self.documents.find_at(id, &target);
        if found.len() != 1 {
            return Err(self.missing(id, path));
        }
        decode(found.remove(0))
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Document, RepoError> {
    serde_json::to_value(value).map_err(RepoError::storage)
}

fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, RepoError> {
    serde_json::from_value(doc).map_err(RepoError::storage)
}

fn removal_of(last: &Segment) -> UpdateOp {
    match last {
        Segment::Named(name) => UpdateOp::Pull {
            field: fields::ID_SHORT.to_string(),
            equals: json!(name),
        },
        Segment::Indexed(index) => UpdateOp::RemoveAt(*index),
    }
}

impl<D: DocumentStore> SubmodelStore for DocumentSubmodelStore<D> {
    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError> {
        let filter = semantic_id.map(|sid| FieldEquals::new(fields::SEMANTIC_ID, json!(sid)));
        let mut submodels = Vec::new();
        for doc in self.documents.find_sorted(filter.as_ref()) {
            submodels.push(decode(doc)?);
        }
        Ok(paged_submodels(submodels, page))
    }

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError> {
        let doc = self
            .documents
            .find_by_id(id)
            .ok_or_else(|| RepoError::submodel_not_found(id))?;
        decode(doc)
    }

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        match self.documents.insert(encode(&submodel)?) {
            Ok(()) => Ok(()),
            Err(DocStoreError::DuplicateId(id)) => Err(RepoError::colliding(id)),
            Err(DocStoreError::MissingId) => Err(RepoError::MissingIdentifier),
        }
    }

    fn update_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        let id = submodel.id.clone();
        if self.documents.replace(&id, encode(&submodel)?) {
            Ok(())
        } else {
            Err(RepoError::submodel_not_found(id))
        }
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        if self.documents.remove(id) {
            Ok(())
        } else {
            Err(RepoError::submodel_not_found(id))
        }
    }

    fn elements(
        &self,
        id: &str,
        parent: &IdShortPath,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError> {
        if parent.is_root() {
            let submodel = self.submodel(id)?;
            return Ok(paged_children(
                Children {
                    items: &submodel.submodel_elements,
                    indexed: false,
                },
                page,
            ));
        }
        let container = self.fetch_element(id, parent)?;
        let items = container
            .children()
            .ok_or_else(|| RepoError::element_not_found(parent))?;
        Ok(paged_children(
            Children {
                items,
                indexed: container.accepts_indexed_children(),
            },
            page,
        ))
    }

    fn element(&self, id: &str, path: &IdShortPath) -> Result<Element, RepoError> {
        self.fetch_element(id, path)
    }

    fn create_element(
        &self,
        id: &str,
        parent: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError> {
        if parent.is_root() {
            if !self.documents.exists(id) {
                return Err(RepoError::submodel_not_found(id));
            }
            let probe = translate::root_named(element.id_short());
            if !self.documents.find_at(id, &probe).is_empty() {
                return Err(RepoError::colliding(element.id_short()));
            }
            let outcome =
                self.documents
                    .update(id, &translate::roots(), &UpdateOp::Push(encode(&element)?));
            if !outcome.matched || outcome.modified == 0 {
                return Err(RepoError::submodel_not_found(id));
            }
            return Ok(());
        }

        let mut container = self.fetch_element(id, parent)?;
        tree::append_child(&mut container, parent, element)?;
        let Some(target) = translate::element(parent) else {
            return Err(self.missing(id, parent));
        };
        debug!(target: "twinrepo::store", %id, parent = %parent, "write back parent after create");
        let outcome = self
            .documents
            .update(id, &target, &UpdateOp::Set(encode(&container)?));
        if !outcome.matched || outcome.modified == 0 {
            return Err(self.missing(id, parent));
        }
        Ok(())
    }

    fn update_element(
        &self,
        id: &str,
        path: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError> {
        let (parent, last) = match (path.parent(), path.last()) {
            (Some(parent), Some(last)) => (parent, last),
            _ => return Err(self.missing(id, path)),
        };
        let existing = self.fetch_element(id, path)?;

        // A rename under a named container must not collide with a
        // sibling; checked before the removal so a rejected update changes
        // nothing.
        if matches!(last, Segment::Named(_)) && element.id_short() != existing.id_short() {
            let Some(array) = translate::siblings(&parent, last) else {
                return Err(self.missing(id, path));
            };
            let probe = array.filtered(fields::ID_SHORT, json!(element.id_short()));
            if !self.documents.find_at(id, &probe).is_empty() {
                return Err(RepoError::colliding(
                    parent.join(Segment::named(element.id_short())),
                ));
            }
        }

        let Some(target) = translate::siblings(&parent, last) else {
            return Err(self.missing(id, path));
        };
        let outcome = self.documents.update(id, &target, &removal_of(last));
        if !outcome.matched || outcome.modified == 0 {
            return Err(self.missing(id, path));
        }
        let outcome = self
            .documents
            .update(id, &target, &UpdateOp::Push(encode(&element)?));
        if !outcome.matched || outcome.modified == 0 {
            return Err(self.missing(id, path));
        }
        Ok(())
    }

    fn delete_element(&self, id: &str, path: &IdShortPath) -> Result<(), RepoError> {
        let (parent, last) = match (path.parent(), path.last()) {
            (Some(parent), Some(last)) => (parent, last),
            _ => return Err(self.missing(id, path)),
        };
        let Some(target) = translate::siblings(&parent, last) else {
            return Err(self.missing(id, path));
        };
        let outcome = self.documents.update(id, &target, &removal_of(last));
        if !outcome.matched {
            return Err(RepoError::submodel_not_found(id));
        }
        if outcome.modified == 0 {
            return Err(self.missing(id, path));
        }
        Ok(())
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        if !self.documents.exists(id) {
            return Err(RepoError::submodel_not_found(id));
        }
        for element in elements {
            let target = translate::root_named(element.id_short());
            let outcome = self
                .documents
                .update(id, &target, &UpdateOp::Set(encode(&element)?));
            if !outcome.matched {
                return Err(RepoError::submodel_not_found(id));
            }
            // modified == 0: no top-level element with that idShort, the
            // entry is skipped.
        }
        Ok(())
    }

    fn element_value(&self, id: &str, path: &IdShortPath) -> Result<ElementValue, RepoError> {
        let element = self.fetch_element(id, path)?;
        Ok(element_value(&element))
    }

    fn set_element_value(
        &self,
        id: &str,
        path: &IdShortPath,
        value: ElementValue,
    ) -> Result<(), RepoError> {
        let mut element = self.fetch_element(id, path)?;
        apply_value(&mut element, value)?;
        let Some(target) = translate::element(path) else {
            return Err(self.missing(id, path));
        };
        let outcome = self
            .documents
            .update(id, &target, &UpdateOp::Set(encode(&element)?));
        if !outcome.matched || outcome.modified == 0 {
            return Err(self.missing(id, path));
        }
        Ok(())
    }
}
