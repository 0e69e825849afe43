//! In-process submodel storage.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
use twinrepo_model::{apply_value, element_value, Element, ElementValue, Submodel};
use twinrepo_path::IdShortPath;

use crate::store::{paged_children, paged_submodels, SubmodelStore};
use crate::tree;

/// [`SubmodelStore`] over a sorted in-process map.
///
/// The outer lock guards the map only. Each submodel carries its own lock,
/// so operations on different submodels do not serialize against each
/// other; an operation on one submodel sees it either before or after any
/// concurrent operation, never mid-mutation.
#[derive(Debug, Default)]
pub struct MemorySubmodelStore {
    submodels: RwLock<BTreeMap<String, Arc<RwLock<Submodel>>>>,
}

impl MemorySubmodelStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: &str) -> Result<Arc<RwLock<Submodel>>, RepoError> {
        self.submodels
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::submodel_not_found(id))
    }

    fn read<R>(
        &self,
        id: &str,
        op: impl FnOnce(&Submodel) -> Result<R, RepoError>,
    ) -> Result<R, RepoError> {
        let entry = self.entry(id)?;
        let guard = entry.read().unwrap();
        op(&guard)
    }

    fn write<R>(
        &self,
        id: &str,
        op: impl FnOnce(&mut Submodel) -> Result<R, RepoError>,
    ) -> Result<R, RepoError> {
        let entry = self.entry(id)?;
        let mut guard = entry.write().unwrap();
        op(&mut guard)
    }
}

impl SubmodelStore for MemorySubmodelStore {
    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError> {
        let entries: Vec<Arc<RwLock<Submodel>>> =
            self.submodels.read().unwrap().values().cloned().collect();
        let mut matching = Vec::new();
        for entry in entries {
            let guard = entry.read().unwrap();
            if semantic_id.map_or(true, |sid| guard.semantic_id.as_deref() == Some(sid)) {
                matching.push(guard.clone());
            }
        }
        Ok(paged_submodels(matching, page))
    }

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError> {
        self.read(id, |submodel| Ok(submodel.clone()))
    }

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        let mut submodels = self.submodels.write().unwrap();
        if submodels.contains_key(&submodel.id) {
            return Err(RepoError::colliding(&submodel.id));
        }
        submodels.insert(submodel.id.clone(), Arc::new(RwLock::new(submodel)));
        Ok(())
    }

    fn update_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        let entry = self.entry(&submodel.id)?;
        let mut guard = entry.write().unwrap();
        *guard = submodel;
        Ok(())
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        self.submodels
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepoError::submodel_not_found(id))
    }

    fn elements(
        &self,
        id: &str,
        parent: &IdShortPath,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError> {
        self.read(id, |submodel| {
            let children = tree::children(&submodel.submodel_elements, parent)?;
            Ok(paged_children(children, page))
        })
    }

    fn element(&self, id: &str, path: &IdShortPath) -> Result<Element, RepoError> {
        self.read(id, |submodel| {
            tree::resolve(&submodel.submodel_elements, path).cloned()
        })
    }

    fn create_element(
        &self,
        id: &str,
        parent: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError> {
        self.write(id, |submodel| {
            tree::insert_child(&mut submodel.submodel_elements, parent, element)
        })
    }

    fn update_element(
        &self,
        id: &str,
        path: &IdShortPath,
        element: Element,
    ) -> Result<(), RepoError> {
        self.write(id, |submodel| {
            tree::update(&mut submodel.submodel_elements, path, element)
        })
    }

    fn delete_element(&self, id: &str, path: &IdShortPath) -> Result<(), RepoError> {
        self.write(id, |submodel| {
            tree::remove(&mut submodel.submodel_elements, path).map(|_| ())
        })
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        self.write(id, |submodel| {
            for element in elements {
                let slot = submodel
                    .submodel_elements
                    .iter_mut()
                    .find(|existing| existing.id_short() == element.id_short());
                if let Some(slot) = slot {
                    *slot = element;
                }
            }
            Ok(())
        })
    }

    fn element_value(&self, id: &str, path: &IdShortPath) -> Result<ElementValue, RepoError> {
        self.read(id, |submodel| {
            let element = tree::resolve(&submodel.submodel_elements, path)?;
            Ok(element_value(element))
        })
    }

    fn set_element_value(
        &self,
        id: &str,
        path: &IdShortPath,
        value: ElementValue,
    ) -> Result<(), RepoError> {
        self.write(id, |submodel| {
            let slot = tree::resolve_mut(&mut submodel.submodel_elements, path)?;
            // Applied to a copy first so a rejected payload leaves the
            // element untouched.
            let mut updated = slot.clone();
            apply_value(&mut updated, value)?;
            *slot = updated;
            Ok(())
        })
    }
}
