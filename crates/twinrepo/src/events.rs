//! Repository events and the publishing decorator.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::warn;

use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
use twinrepo_model::{Element, ElementValue, Submodel, SubmodelValueOnly};

use crate::repository::SubmodelRepository;

/// A state change that completed in a repository.
///
/// Paths are carried as idShort path text, the same shape the repository
/// methods accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    SubmodelCreated { id: String },
    SubmodelUpdated { id: String },
    SubmodelDeleted { id: String },
    ElementCreated { submodel_id: String, path: String },
    ElementUpdated { submodel_id: String, path: String },
    ElementDeleted { submodel_id: String, path: String },
    ElementValueChanged { submodel_id: String, path: String },
    ElementsPatched { submodel_id: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("EVENT_PUBLISH_FAILED: {0}")]
pub struct EventError(pub String);

/// Receives repository events after the operations they describe have been
/// applied.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RepositoryEvent) -> Result<(), EventError>;
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, event: &RepositoryEvent) -> Result<(), EventError> {
        (**self).publish(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn publish(&self, event: &RepositoryEvent) -> Result<(), EventError> {
        (**self).publish(event)
    }
}

/// [`EventSink`] that keeps every published event, oldest first.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RepositoryEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }

    pub fn events(&self) -> Vec<RepositoryEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: &RepositoryEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Decorator that publishes an event after every successful mutation.
///
/// Publishing is best-effort: a failing sink is logged and swallowed, the
/// operation's own result stands.
pub struct EventPublishingRepository<R, S> {
    inner: R,
    sink: S,
}

impl<R: SubmodelRepository, S: EventSink> EventPublishingRepository<R, S> {
    pub fn new(inner: R, sink: S) -> Self {
        EventPublishingRepository { inner, sink }
    }

    fn publish(&self, event: RepositoryEvent) {
        if let Err(error) = self.sink.publish(&event) {
            warn!(
                target: "twinrepo::events",
                repo = self.inner.name(),
                %error,
                ?event,
                "event publish failed"
            );
        }
    }
}

fn child_path(parent: &str, id_short: &str) -> String {
    if parent.is_empty() {
        id_short.to_string()
    } else {
        format!("{parent}.{id_short}")
    }
}

impl<R: SubmodelRepository, S: EventSink> SubmodelRepository for EventPublishingRepository<R, S> {
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
        let id = submodel.id.clone();
        self.inner.create_submodel(submodel)?;
        self.publish(RepositoryEvent::SubmodelCreated { id });
        Ok(())
    }

    fn update_submodel(&self, id: &str, submodel: Submodel) -> Result<(), RepoError> {
        self.inner.update_submodel(id, submodel)?;
        self.publish(RepositoryEvent::SubmodelUpdated { id: id.to_string() });
        Ok(())
    }

    fn delete_submodel(&self, id: &str) -> Result<(), RepoError> {
        self.inner.delete_submodel(id)?;
        self.publish(RepositoryEvent::SubmodelDeleted { id: id.to_string() });
        Ok(())
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
        let path = child_path(parent, element.id_short());
        self.inner.create_element(id, parent, element)?;
        self.publish(RepositoryEvent::ElementCreated {
            submodel_id: id.to_string(),
            path,
        });
        Ok(())
    }

    fn update_element(&self, id: &str, path: &str, element: Element) -> Result<(), RepoError> {
        self.inner.update_element(id, path, element)?;
        self.publish(RepositoryEvent::ElementUpdated {
            submodel_id: id.to_string(),
            path: path.to_string(),
        });
        Ok(())
    }

    fn delete_element(&self, id: &str, path: &str) -> Result<(), RepoError> {
        self.inner.delete_element(id, path)?;
        self.publish(RepositoryEvent::ElementDeleted {
            submodel_id: id.to_string(),
            path: path.to_string(),
        });
        Ok(())
    }

    fn patch_elements(&self, id: &str, elements: Vec<Element>) -> Result<(), RepoError> {
        self.inner.patch_elements(id, elements)?;
        self.publish(RepositoryEvent::ElementsPatched {
            submodel_id: id.to_string(),
        });
        Ok(())
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
        self.inner.set_element_value(id, path, value)?;
        self.publish(RepositoryEvent::ElementValueChanged {
            submodel_id: id.to_string(),
            path: path.to_string(),
        });
        Ok(())
    }
}
