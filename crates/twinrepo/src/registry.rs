//! Registry linking: submodel descriptors and the decorator that keeps a
//! registry in step with the repository.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
use twinrepo_model::{Element, ElementValue, Submodel, SubmodelValueOnly};

use crate::repository::SubmodelRepository;

/// What a registry learns about a submodel: its identity plus the endpoint
/// it is served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmodelDescriptor {
    pub id: String,
    pub id_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    pub endpoint: String,
}

impl SubmodelDescriptor {
    /// Descriptor for a submodel served under `base_url`. The id travels
    /// base64url-encoded in the endpoint, since URL segments cannot carry
    /// arbitrary IRIs.
    pub fn for_submodel(submodel: &Submodel, base_url: &str) -> Self {
        let encoded = URL_SAFE_NO_PAD.encode(submodel.id.as_bytes());
        SubmodelDescriptor {
            id: submodel.id.clone(),
            id_short: submodel.id_short.clone(),
            semantic_id: submodel.semantic_id.clone(),
            endpoint: format!("{}/submodels/{}", base_url.trim_end_matches('/'), encoded),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("REGISTRY_UNREACHABLE: {0}")]
pub struct RegistryError(pub String);

/// The part of a registry this crate talks to.
pub trait RegistryGateway: Send + Sync {
    fn register(&self, descriptor: &SubmodelDescriptor) -> Result<(), RegistryError>;
    fn deregister(&self, submodel_id: &str) -> Result<(), RegistryError>;
}

impl<G: RegistryGateway + ?Sized> RegistryGateway for Arc<G> {
    fn register(&self, descriptor: &SubmodelDescriptor) -> Result<(), RegistryError> {
        (**self).register(descriptor)
    }

    fn deregister(&self, submodel_id: &str) -> Result<(), RegistryError> {
        (**self).deregister(submodel_id)
    }
}

impl<G: RegistryGateway + ?Sized> RegistryGateway for Box<G> {
    fn register(&self, descriptor: &SubmodelDescriptor) -> Result<(), RegistryError> {
        (**self).register(descriptor)
    }

    fn deregister(&self, submodel_id: &str) -> Result<(), RegistryError> {
        (**self).deregister(submodel_id)
    }
}

/// In-process [`RegistryGateway`] for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    descriptors: Mutex<BTreeMap<String, SubmodelDescriptor>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        MemoryRegistry::default()
    }

    pub fn descriptor(&self, submodel_id: &str) -> Option<SubmodelDescriptor> {
        self.descriptors.lock().unwrap().get(submodel_id).cloned()
    }

    /// Registered submodel ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.descriptors.lock().unwrap().keys().cloned().collect()
    }
}

impl RegistryGateway for MemoryRegistry {
    fn register(&self, descriptor: &SubmodelDescriptor) -> Result<(), RegistryError> {
        self.descriptors
            .lock()
            .unwrap()
            .insert(descriptor.id.clone(), descriptor.clone());
        Ok(())
    }

    fn deregister(&self, submodel_id: &str) -> Result<(), RegistryError> {
        self.descriptors.lock().unwrap().remove(submodel_id);
        Ok(())
    }
}

/// Decorator that registers created submodels and deregisters deleted ones.
///
/// The gateway is called after the local change has been applied. A gateway
/// failure surfaces as `REGISTRY_LINK_FAILED` or `REGISTRY_UNLINK_FAILED`
/// while the local change stays in place; repeating the operation is the
/// caller's recovery path.
pub struct RegistryLinkedRepository<R, G> {
    inner: R,
    gateway: G,
    base_url: String,
}

impl<R: SubmodelRepository, G: RegistryGateway> RegistryLinkedRepository<R, G> {
    pub fn new(inner: R, gateway: G, base_url: impl Into<String>) -> Self {
        RegistryLinkedRepository {
            inner,
            gateway,
            base_url: base_url.into(),
        }
    }
}

impl<R: SubmodelRepository, G: RegistryGateway> SubmodelRepository
    for RegistryLinkedRepository<R, G>
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn submodels(
        &self,
        semantic_id: Option<&str>,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Submodel>>, RepoError> {
        self.inner.submodels(semantic_id, page)
    }

    fn submodel(&self, id: &str) -> Result<Submodel, RepoError> {
        self.inner.submodel(id)
    }

    fn submodel_value_only(&self, id: &str) -> Result<SubmodelValueOnly, RepoError> {
        self.inner.submodel_value_only(id)
    }

    fn submodel_metadata(&self, id: &str) -> Result<Submodel, RepoError> {
        self.inner.submodel_metadata(id)
    }

    fn create_submodel(&self, submodel: Submodel) -> Result<(), RepoError> {
        let descriptor = SubmodelDescriptor::for_submodel(&submodel, &self.base_url);
        self.inner.create_submodel(submodel)?;
        self.gateway
            .register(&descriptor)
            .map_err(|error| RepoError::RegistryLink(error.0))
    }

    fn update_submodel(&self, id: &str, submodel: Submodel) -> Result<(), RepoError> {
        self.inner.update_submodel(id, submodel)
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        self.inner.delete_submodel(id)?;
        self.gateway
            .deregister(id)
            .map_err(|error| RepoError::RegistryUnlink(error.0))
    }

    fn elements(
        &self,
        id: &str,
        parent: &str,
        page: &PaginationInfo,
    ) -> Result<CursorResult<Vec<Element>>, RepoError> {
        self.inner.elements(id, parent, page)
    }

    fn element(&self, id: &str, path: &str) -> Result<Element, RepoError> {
        self.inner.element(id, path)
    }

    fn create_element(&self, id: &str, parent: &str, element: Element) -> Result<(), RepoError> {
        self.inner.create_element(id, parent, element)
    }

    fn update_element(&self, id: &str, path: &str, element: Element) -> Result<(), RepoError> {
        self.inner.update_element(id, path, element)
    }

    fn delete_element(&self, id: &str, path: &str) -> Result<(), RepoError> {
        self.inner.delete_element(id, path)
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        self.inner.patch_elements(id, elements)
    }

    fn element_value(&self, id: &str, path: &str) -> Result<ElementValue, RepoError> {
        self.inner.element_value(id, path)
    }

    fn set_element_value(
        &self,
        id: &str,
        path: &str,
        value: ElementValue,
    ) -> Result<(), RepoError> {
        self.inner.set_element_value(id, path, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CrudSubmodelRepository;
    use crate::store::MemorySubmodelStore;

    struct UnreachableRegistry;

    impl RegistryGateway for UnreachableRegistry {
        fn register(&self, _descriptor: &SubmodelDescriptor) -> Result<(), RegistryError> {
            Err(RegistryError("connection refused".into()))
        }

        fn deregister(&self, _submodel_id: &str) -> Result<(), RegistryError> {
            Err(RegistryError("connection refused".into()))
        }
    }

    #[test]
    fn descriptor_endpoint_encodes_the_id() {
        let submodel =
            Submodel::new("urn:sm:a", "A").with_semantic_id("https://example.com/sem/1");
        let descriptor = SubmodelDescriptor::for_submodel(&submodel, "http://repo.local/");
        assert_eq!(
            descriptor.endpoint,
            format!(
                "http://repo.local/submodels/{}",
                URL_SAFE_NO_PAD.encode("urn:sm:a")
            )
        );
        assert_eq!(
            descriptor.semantic_id.as_deref(),
            Some("https://example.com/sem/1")
        );
    }

    #[test]
    fn create_and_delete_keep_the_registry_in_step() {
        let registry = Arc::new(MemoryRegistry::new());
        let repository = RegistryLinkedRepository::new(
            CrudSubmodelRepository::new(MemorySubmodelStore::new()),
            Arc::clone(&registry),
            "http://repo.local",
        );

        repository
            .create_submodel(Submodel::new("urn:sm:a", "A"))
            .unwrap();
        assert_eq!(registry.ids(), vec!["urn:sm:a".to_string()]);

        repository.delete_submodel("urn:sm:a").unwrap();
        assert!(registry.ids().is_empty());
    }

    #[test]
    fn gateway_failure_keeps_the_local_change() {
        let repository = RegistryLinkedRepository::new(
            CrudSubmodelRepository::new(MemorySubmodelStore::new()),
            UnreachableRegistry,
            "http://repo.local",
        );

        let err = repository
            .create_submodel(Submodel::new("urn:sm:a", "A"))
            .unwrap_err();
        assert_eq!(
            err,
            RepoError::RegistryLink("connection refused".into())
        );
        // The submodel itself was stored.
        assert_eq!(repository.submodel("urn:sm:a").unwrap().id_short, "A");

        let err = repository.delete_submodel("urn:sm:a").unwrap_err();
        assert_eq!(err, RepoError::RegistryUnlink("connection refused".into()));
        assert!(repository.submodel("urn:sm:a").is_err());
    }

    #[test]
    fn failed_creates_do_not_register() {
        let registry = Arc::new(MemoryRegistry::new());
        let repository = RegistryLinkedRepository::new(
            CrudSubmodelRepository::new(MemorySubmodelStore::new()),
            Arc::clone(&registry),
            "http://repo.local",
        );

        assert!(repository
            .create_submodel(Submodel::new("", "Nameless"))
            .is_err());
        assert!(registry.ids().is_empty());
    }
}
