//! Submodel data model: the closed element union, its document layout, and
//! value-only views.
//!
//! A [`Submodel`] owns an ordered tree of [`Element`]s. Containers
//! (Collection, Entity) hold named children, Lists hold positional
//! children, everything else is a leaf. The serde layout of these types is
//! the persisted document layout: one document per submodel, a
//! `submodelElements` root array, and every container nesting its children
//! in an array field named `value`.

pub mod element;
pub mod submodel;
pub mod value;

pub use element::{Element, EntityType, ScalarValue};
pub use submodel::Submodel;
pub use value::{
    apply_value, element_value, submodel_metadata, submodel_value_only, ElementValue,
    SubmodelValueOnly,
};

/// Document field names, as serialized. The path-to-document translator
/// compiles locators against these.
pub mod fields {
    /// Document key of a submodel.
    pub const ID: &str = "id";
    /// Root element array of a submodel document.
    pub const ROOT_ELEMENTS: &str = "submodelElements";
    /// Child array of every container element.
    pub const CHILDREN: &str = "value";
    /// Local name field of every element.
    pub const ID_SHORT: &str = "idShort";
    /// Kind tag of every element.
    pub const MODEL_TYPE: &str = "modelType";
    /// Optional semantic reference of a submodel.
    pub const SEMANTIC_ID: &str = "semanticId";
}
