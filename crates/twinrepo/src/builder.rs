//! Assembly of a repository from a backend, a seed batch, and decorators.

use std::fmt;

use indexmap::IndexSet;
use thiserror::Error;

use twinrepo_core::RepoError;
use twinrepo_docstore::MemoryDocumentStore;
use twinrepo_model::Submodel;

use crate::events::{EventPublishingRepository, EventSink};
use crate::registry::{RegistryGateway, RegistryLinkedRepository};
use crate::repository::{CrudSubmodelRepository, SubmodelRepository, DEFAULT_REPOSITORY_NAME};
use crate::store::{DocumentSubmodelStore, MemorySubmodelStore, SubmodelStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// The same decorator was requested twice.
    #[error("DUPLICATE_DECORATOR: {0}")]
    DuplicateDecorator(&'static str),
}

const EVENTS: &str = "events";
const REGISTRY: &str = "registry";

/// Builds a repository: pick a backend, optionally seed it, then stack
/// decorators. Decorators wrap in the order they were requested, so the
/// last one requested sees every operation first.
///
/// # Examples
/// ```
/// use twinrepo::{RepositoryBuilder, SubmodelRepository};
///
/// let repository = RepositoryBuilder::memory().named("plant-7").build().unwrap();
/// assert_eq!(repository.name(), "plant-7");
/// ```
pub struct RepositoryBuilder<S> {
    store: S,
    name: String,
    seeds: Vec<Submodel>,
    events: Option<Box<dyn EventSink>>,
    registry: Option<(Box<dyn RegistryGateway>, String)>,
    decorators: IndexSet<&'static str>,
}

impl<S> fmt::Debug for RepositoryBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryBuilder")
            .field("name", &self.name)
            .field("seeds", &self.seeds)
            .field("decorators", &self.decorators)
            .finish_non_exhaustive()
    }
}

impl RepositoryBuilder<MemorySubmodelStore> {
    /// In-process tree backend.
    pub fn memory() -> Self {
        Self::from_store(MemorySubmodelStore::new())
    }
}

impl RepositoryBuilder<DocumentSubmodelStore<MemoryDocumentStore>> {
    /// Document backend over the in-process collection.
    pub fn in_process_documents() -> Self {
        Self::from_store(DocumentSubmodelStore::new(MemoryDocumentStore::new()))
    }
}

impl<S: SubmodelStore + 'static> RepositoryBuilder<S> {
    pub fn from_store(store: S) -> Self {
        RepositoryBuilder {
            store,
            name: DEFAULT_REPOSITORY_NAME.to_string(),
            seeds: Vec::new(),
            events: None,
            registry: None,
            decorators: IndexSet::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Submodels loaded into the backend before the repository is handed
    /// out. Validated as one batch at [`build`](Self::build) time.
    pub fn seeded(mut self, submodels: Vec<Submodel>) -> Self {
        self.seeds = submodels;
        self
    }

    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Result<Self, ComposeError> {
        if !self.decorators.insert(EVENTS) {
            return Err(ComposeError::DuplicateDecorator(EVENTS));
        }
        self.events = Some(Box::new(sink));
        Ok(self)
    }

    pub fn with_registry(
        mut self,
        gateway: impl RegistryGateway + 'static,
        base_url: impl Into<String>,
    ) -> Result<Self, ComposeError> {
        if !self.decorators.insert(REGISTRY) {
            return Err(ComposeError::DuplicateDecorator(REGISTRY));
        }
        self.registry = Some((Box::new(gateway), base_url.into()));
        Ok(self)
    }

    pub fn build(mut self) -> Result<Box<dyn SubmodelRepository>, RepoError> {
        let core = CrudSubmodelRepository::named(self.store, self.name);
        core.seed(self.seeds)?;

        let mut repository: Box<dyn SubmodelRepository> = Box::new(core);
        for decorator in &self.decorators {
            repository = match *decorator {
                EVENTS => {
                    // Present whenever the marker is.
                    let sink = self.events.take().unwrap();
                    Box::new(EventPublishingRepository::new(repository, sink))
                }
                REGISTRY => {
                    let (gateway, base_url) = self.registry.take().unwrap();
                    Box::new(RegistryLinkedRepository::new(repository, gateway, base_url))
                }
                _ => unreachable!(),
            };
        }
        Ok(repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::events::RecordingSink;
    use crate::registry::MemoryRegistry;

    #[test]
    fn each_decorator_may_appear_once() {
        let err = RepositoryBuilder::memory()
            .with_events(RecordingSink::new())
            .unwrap()
            .with_events(RecordingSink::new())
            .unwrap_err();
        assert_eq!(err, ComposeError::DuplicateDecorator("events"));

        let err = RepositoryBuilder::memory()
            .with_registry(MemoryRegistry::new(), "http://a")
            .unwrap()
            .with_registry(MemoryRegistry::new(), "http://b")
            .unwrap_err();
        assert_eq!(err, ComposeError::DuplicateDecorator("registry"));
    }

    #[test]
    fn decorators_compose() {
        let sink = Arc::new(RecordingSink::new());
        let registry = Arc::new(MemoryRegistry::new());
        let repository = RepositoryBuilder::memory()
            .with_events(Arc::clone(&sink))
            .unwrap()
            .with_registry(Arc::clone(&registry), "http://repo.local")
            .unwrap()
            .build()
            .unwrap();

        repository
            .create_submodel(Submodel::new("urn:sm:a", "A"))
            .unwrap();
        assert_eq!(sink.events().len(), 1);
        assert_eq!(registry.ids(), vec!["urn:sm:a".to_string()]);
    }

    #[test]
    fn seeds_are_loaded_at_build_time() {
        let repository = RepositoryBuilder::in_process_documents()
            .seeded(vec![Submodel::new("urn:sm:a", "A")])
            .build()
            .unwrap();
        assert_eq!(repository.submodel("urn:sm:a").unwrap().id_short, "A");

        let err = RepositoryBuilder::memory()
            .seeded(vec![Submodel::new("", "Nameless")])
            .build()
            .unwrap_err();
        assert_eq!(err, RepoError::MissingIdentifier);
    }
}
