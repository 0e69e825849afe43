//! Hierarchical, path-addressable storage for digital-twin metadata.
//!
//! A repository holds identified submodels; each submodel is an ordered
//! tree of typed elements addressed by idShort paths like
//! `engine.cylinders[2].bore`. Storage is pluggable behind
//! [`SubmodelStore`]: in-process trees or one JSON document per submodel
//! in a document collection, with identical observable behavior across
//! the two.
//!
//! ```
//! use twinrepo::{Element, RepositoryBuilder, Submodel, SubmodelRepository};
//!
//! let repository = RepositoryBuilder::memory().build().unwrap();
//! repository
//!     .create_submodel(Submodel::with_elements(
//!         "urn:sm:engine",
//!         "Engine",
//!         vec![Element::collection(
//!             "cylinders",
//!             vec![Element::property("count", 6i64)],
//!         )],
//!     ))
//!     .unwrap();
//!
//! let count = repository.element("urn:sm:engine", "cylinders.count").unwrap();
//! assert_eq!(count.id_short(), "count");
//! ```

pub mod builder;
pub mod config;
pub mod events;
pub mod registry;
pub mod repository;
pub mod store;
pub mod tree;

pub use twinrepo_core::{CursorResult, PaginationInfo, RepoError};
pub use twinrepo_model::{
    apply_value, element_value, submodel_metadata, submodel_value_only, Element, ElementValue,
    EntityType, ScalarValue, Submodel, SubmodelValueOnly,
};
pub use twinrepo_path::{IdShortPath, PathParseError, Segment};

pub use crate::builder::{ComposeError, RepositoryBuilder};
pub use crate::config::{BackendKind, ConfigError, RepositoryConfig};
pub use crate::events::{
    EventError, EventPublishingRepository, EventSink, RecordingSink, RepositoryEvent,
};
pub use crate::registry::{
    MemoryRegistry, RegistryError, RegistryGateway, RegistryLinkedRepository, SubmodelDescriptor,
};
pub use crate::repository::{CrudSubmodelRepository, SubmodelRepository};
pub use crate::store::{DocumentSubmodelStore, MemorySubmodelStore, SubmodelStore};
