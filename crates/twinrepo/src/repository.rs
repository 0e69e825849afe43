//! The repository layer: identity validation on top of a store.

use std::fmt;

use tracing::debug;

use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
use twinrepo_model::{Element, ElementValue, Submodel, SubmodelValueOnly};
use twinrepo_path::IdShortPath;

use crate::store::SubmodelStore;

/// The operations a submodel repository offers.
///
/// Element-addressing methods take the path as text and parse it at this
/// boundary, so a malformed path reports `INVALID_PATH` before any storage
/// is touched. `parent` may be empty to name the top level.
pub trait SubmodelRepository: Send + Sync {
    /// The repository's name, carried into logs and registry descriptors.
    fn name(&self) -> &str;

    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError>;

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError>;

    /// The submodel's element tree flattened to values only.
    fn submodel_value_only(&self, id: &str) -> Result<SubmodelValueOnly, RepoError>;

    /// The submodel with its element tree stripped.
    fn submodel_metadata(&self, id: &str) -> Result<Submodel, RepoError>;

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError>;

    /// Replaces the submodel stored under `id`. The payload must carry the
    /// same id.
    fn update_submodel(&self, id: &str, submodel: Submodel) -> Result<(), RepoError>;

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError>;

    fn elements(
        &self,
        id: &str,
        parent: &str,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError>;

    fn element(&self, id: &str, path: &str) -> Result<Element, RepoError>;

    fn create_element(&self, id: &str, parent: &str, element: Element) -> Result<(), RepoError>;

    /// Replaces the element at `path`. The payload must keep the element's
    /// idShort; renaming goes through delete and create.
    fn update_element(&self, id: &str, path: &str, element: Element) -> Result<(), RepoError>;

    fn delete_element(&self, id: &str, path: &str) -> Result<(), RepoError>;

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError>;

    fn element_value(&self, id: &str, path: &str) -> Result<ElementValue, RepoError>;

    fn set_element_value(&self, id: &str, path: &str, value: ElementValue)
        -> Result<(), RepoError>;
}

impl fmt::Debug for dyn SubmodelRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmodelRepository")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

impl<R: SubmodelRepository + ?Sized> SubmodelRepository for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError> {
        (**self).submodels(semantic_id, page)
    }

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError> {
        (**self).submodel(id)
    }

    fn submodel_value_only(&self, id: &str) -> Result<SubmodelValueOnly, RepoError> {
        (**self).submodel_value_only(id)
    }

    fn submodel_metadata(&self, id: &str) -> Result<Submodel, RepoError> {
        (**self).submodel_metadata(id)
    }

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        (**self).create_submodel(submodel)
    }

    fn update_submodel(&self, id: &str, submodel: Submodel) -> Result<(), RepoError> {
        (**self).update_submodel(id, submodel)
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        (**self).delete_submodel(id)
    }

    fn elements(
        &self,
        id: &str,
        parent: &str,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError> {
        (**self).elements(id, parent, page)
    }

    fn element(&self, id: &str, path: &str) -> Result<Element, RepoError> {
        (**self).element(id, path)
    }

    fn create_element(&self, id: &str, parent: &str, element: Element) -> Result<(), RepoError> {
        (**self).create_element(id, parent, element)
    }

    fn update_element(&self, id: &str, path: &str, element: Element) -> Result<(), RepoError> {
        (**self).update_element(id, path, element)
    }

    fn delete_element(&self, id: &str, path: &str) -> Result<(), RepoError> {
        (**self).delete_element(id, path)
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        (**self).patch_elements(id, elements)
    }

    fn element_value(&self, id: &str, path: &str) -> Result<ElementValue, RepoError> {
        (**self).element_value(id, path)
    }

    fn set_element_value(
        &self,
        id: &str,
        path: &str,
        value: ElementValue,
    ) -> Result<(), RepoError> {
        (**self).set_element_value(id, path, value)
    }
}

pub const DEFAULT_REPOSITORY_NAME: &str = "submodel-repo";

/// [`SubmodelRepository`] over a [`SubmodelStore`].
///
/// The store owns structural semantics: addressing, collisions, paging.
/// This layer adds identity validation on top: a submodel needs an id, a
/// payload's id must match the addressed one, and an element update must
/// keep the element's idShort.
pub struct CrudSubmodelRepository<S> {
    store: S,
    name: String,
}

impl<S: SubmodelStore> CrudSubmodelRepository<S> {
    pub fn new(store: S) -> Self {
        Self::named(store, DEFAULT_REPOSITORY_NAME)
    }

    pub fn named(store: S, name: impl Into<String>) -> Self {
        CrudSubmodelRepository {
            store,
            name: name.into(),
        }
    }

    /// Builds a repository preloaded with `submodels`.
    pub fn seeded(store: S, submodels: Vec<Submodel>) -> Result<Self, RepoError> {
        let repository = Self::new(store);
        repository.seed(submodels)?;
        Ok(repository)
    }

    /// Loads a batch of submodels. The whole batch is validated first:
    /// every submodel needs an id and no two may share one, so a bad batch
    /// stores nothing.
    pub fn seed(&self, submodels: Vec<Submodel>) -> Result<(), RepoError> {
        let mut seen = std::collections::BTreeSet::new();
        for submodel in &submodels {
            if submodel.id.is_empty() {
                return Err(RepoError::MissingIdentifier);
            }
            if !seen.insert(submodel.id.as_str()) {
                return Err(RepoError::colliding(&submodel.id));
            }
        }
        for submodel in submodels {
            self.store.create_submodel(submodel)?;
        }
        Ok(())
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn parse(path: &str) -> Result<IdShortPath, RepoError> {
    Ok(IdShortPath::parse(path)?)
}

impl<S: SubmodelStore> SubmodelRepository for CrudSubmodelRepository<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError> {
        self.store.submodels(semantic_id, page)
    }

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError> {
        self.store.submodel(id)
    }

    fn submodel_value_only(&self, id: &str) -> Result<SubmodelValueOnly, RepoError> {
        let submodel = self.store.submodel(id)?;
        Ok(twinrepo_model::submodel_value_only(&submodel))
    }

    fn submodel_metadata(&self, id: &str) -> Result<Submodel, RepoError> {
        let submodel = self.store.submodel(id)?;
        Ok(twinrepo_model::submodel_metadata(&submodel))
    }

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        if submodel.id.is_empty() {
            return Err(RepoError::MissingIdentifier);
        }
        let id = submodel.id.clone();
        self.store.create_submodel(submodel)?;
        debug!(target: "twinrepo::repository", repo = %self.name, %id, "submodel created");
        Ok(())
    }

    fn update_submodel(&self, id: &str, submodel: Submodel) -> Result<(), RepoError> {
        self.store.submodel(id)?;
        if submodel.id != id {
            return Err(RepoError::mismatch(id, &submodel.id));
        }
        self.store.update_submodel(submodel)?;
        debug!(target: "twinrepo::repository", repo = %self.name, %id, "submodel updated");
        Ok(())
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        self.store.delete_submodel(id)?;
        debug!(target: "twinrepo::repository", repo = %self.name, %id, "submodel deleted");
        Ok(())
    }

    fn elements(
        &self,
        id: &str,
        parent: &str,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError> {
        self.store.elements(id, &parse(parent)?, page)
    }

    fn element(&self, id: &str, path: &str) -> Result<Element, RepoError> {
        self.store.element(id, &parse(path)?)
    }

    fn create_element(&self, id: &str, parent: &str, element: Element) -> Result<(), RepoError> {
        self.store.create_element(id, &parse(parent)?, element)
    }

    fn update_element(&self, id: &str, path: &str, element: Element) -> Result<(), RepoError> {
        let path = parse(path)?;
        let existing = self.store.element(id, &path)?;
        if existing.id_short() != element.id_short() {
            return Err(RepoError::mismatch(existing.id_short(), element.id_short()));
        }
        self.store.update_element(id, &path, element)
    }

    fn delete_element(&self, id: &str, path: &str) -> Result<(), RepoError> {
        self.store.delete_element(id, &parse(path)?)
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        self.store.patch_elements(id, elements)
    }

    fn element_value(&self, id: &str, path: &str) -> Result<ElementValue, RepoError> {
        self.store.element_value(id, &parse(path)?)
    }

    fn set_element_value(
        &self,
        id: &str,
        path: &str,
        value: ElementValue,
    ) -> Result<(), RepoError> {
        self.store.set_element_value(id, &parse(path)?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySubmodelStore;

    fn repository() -> CrudSubmodelRepository<MemorySubmodelStore> {
        CrudSubmodelRepository::new(MemorySubmodelStore::new())
    }

    #[test]
    fn create_requires_an_id() {
        let repository = repository();
        assert_eq!(
            repository.create_submodel(Submodel::new("", "Nameless")),
            Err(RepoError::MissingIdentifier)
        );
    }

    #[test]
    fn update_checks_existence_before_identity() {
        let repository = repository();
        // A missing submodel is reported as missing even when the payload
        // id would not match either.
        assert_eq!(
            repository.update_submodel("urn:sm:a", Submodel::new("urn:sm:b", "B")),
            Err(RepoError::submodel_not_found("urn:sm:a"))
        );

        repository
            .create_submodel(Submodel::new("urn:sm:a", "A"))
            .unwrap();
        assert_eq!(
            repository.update_submodel("urn:sm:a", Submodel::new("urn:sm:b", "B")),
            Err(RepoError::mismatch("urn:sm:a", "urn:sm:b"))
        );
    }

    #[test]
    fn element_update_may_not_rename() {
        let repository = repository();
        repository
            .create_submodel(Submodel::with_elements(
                "urn:sm:a",
                "A",
                vec![Element::property("speed", 1i64)],
            ))
            .unwrap();
        assert_eq!(
            repository.update_element("urn:sm:a", "speed", Element::property("velocity", 2i64)),
            Err(RepoError::mismatch("speed", "velocity"))
        );
        repository
            .update_element("urn:sm:a", "speed", Element::property("speed", 2i64))
            .unwrap();
    }

    #[test]
    fn malformed_paths_fail_before_storage() {
        let repository = repository();
        let err = repository.element("urn:sm:a", "a..b").unwrap_err();
        assert!(matches!(err, RepoError::InvalidPath(_)));
    }

    #[test]
    fn seeding_validates_the_whole_batch_first() {
        let store = MemorySubmodelStore::new();
        let result = CrudSubmodelRepository::seeded(
            store,
            vec![
                Submodel::new("urn:sm:a", "A"),
                Submodel::new("urn:sm:a", "Duplicate"),
            ],
        );
        assert!(matches!(
            result,
            Err(RepoError::CollidingIdentifier(id)) if id == "urn:sm:a"
        ));

        let repository = CrudSubmodelRepository::seeded(
            MemorySubmodelStore::new(),
            vec![
                Submodel::new("urn:sm:a", "A"),
                Submodel::new("urn:sm:b", "B"),
            ],
        )
        .unwrap();
        assert_eq!(
            repository
                .submodels(None, &PaginationInfo::NO_LIMIT)
                .unwrap()
                .result
                .len(),
            2
        );
    }
}
