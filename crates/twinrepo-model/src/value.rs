//! Value-only views: element payloads without the surrounding structure
//! metadata, and the in-place write path for them.

use indexmap::IndexMap;
use serde::Serialize;
use twinrepo_core::RepoError;

use crate::{Element, EntityType, ScalarValue, Submodel};

/// The value-only view of an element.
///
/// Containers become maps keyed by child idShort (lists stay positional);
/// leaves keep just their payload. Views are produced by
/// [`element_value`] and built programmatically for writes. The untagged
/// wire form is not self-describing enough to deserialize (a File and a
/// Blob value look alike), so the type is serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ElementValue {
    Scalar(ScalarValue),
    Range {
        min: ScalarValue,
        max: ScalarValue,
    },
    File {
        content_type: String,
        value: String,
    },
    Blob {
        content_type: String,
        #[serde(with = "crate::element::base64_bytes")]
        value: Vec<u8>,
    },
    Entity {
        entity_type: EntityType,
        statements: IndexMap<String, ElementValue>,
    },
    Collection(IndexMap<String, ElementValue>),
    List(Vec<ElementValue>),
}

impl ElementValue {
    pub fn scalar(value: impl Into<ScalarValue>) -> ElementValue {
        ElementValue::Scalar(value.into())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementValue::Scalar(_) => "scalar",
            ElementValue::Range { .. } => "range",
            ElementValue::File { .. } => "file",
            ElementValue::Blob { .. } => "blob",
            ElementValue::Entity { .. } => "entity",
            ElementValue::Collection(_) => "collection",
            ElementValue::List(_) => "list",
        }
    }
}

/// Value-only view of a whole submodel: root idShort → value.
pub type SubmodelValueOnly = IndexMap<String, ElementValue>;

/// The recursive value-only view of an element.
pub fn element_value(element: &Element) -> ElementValue {
    match element {
        Element::Property { value, .. } => ElementValue::Scalar(value.clone()),
        Element::Range { min, max, .. } => ElementValue::Range {
            min: min.clone(),
            max: max.clone(),
        },
        Element::File {
            content_type,
            value,
            ..
        } => ElementValue::File {
            content_type: content_type.clone(),
            value: value.clone(),
        },
        Element::Blob {
            content_type,
            value,
            ..
        } => ElementValue::Blob {
            content_type: content_type.clone(),
            value: value.clone(),
        },
        Element::Collection { value, .. } => ElementValue::Collection(children_values(value)),
        Element::List { value, .. } => {
            ElementValue::List(value.iter().map(element_value).collect())
        }
        Element::Entity {
            entity_type,
            statements,
            ..
        } => ElementValue::Entity {
            entity_type: *entity_type,
            statements: children_values(statements),
        },
    }
}

/// Writes a value-only payload into an element, in place.
///
/// Leaf payloads replace the leaf's payload; container payloads recurse
/// into the children they mention. The element's structure never changes
/// through this path: a name the element does not have is
/// `ELEMENT_NOT_FOUND`, a list payload of the wrong length or a payload
/// kind that does not fit the element is `VALUE_MISMATCH`.
///
/// On error the element may be partially written; callers that need
/// all-or-nothing apply to a copy and swap.
pub fn apply_value(element: &mut Element, value: ElementValue) -> Result<(), RepoError> {
    match (element, value) {
        (Element::Property { value: slot, .. }, ElementValue::Scalar(scalar)) => {
            *slot = scalar;
            Ok(())
        }
        (
            Element::Range { min, max, .. },
            ElementValue::Range {
                min: new_min,
                max: new_max,
            },
        ) => {
            *min = new_min;
            *max = new_max;
            Ok(())
        }
        (
            Element::File {
                content_type,
                value: slot,
                ..
            },
            ElementValue::File {
                content_type: new_content_type,
                value: new_value,
            },
        ) => {
            *content_type = new_content_type;
            *slot = new_value;
            Ok(())
        }
        (
            Element::Blob {
                content_type,
                value: slot,
                ..
            },
            ElementValue::Blob {
                content_type: new_content_type,
                value: new_value,
            },
        ) => {
            *content_type = new_content_type;
            *slot = new_value;
            Ok(())
        }
        (Element::Collection { value: children, .. }, ElementValue::Collection(values)) => {
            apply_named_values(children, values)
        }
        (
            Element::Entity {
                entity_type,
                statements,
                ..
            },
            ElementValue::Entity {
                entity_type: new_type,
                statements: values,
            },
        ) => {
            *entity_type = new_type;
            apply_named_values(statements, values)
        }
        (Element::List { value: children, .. }, ElementValue::List(values)) => {
            if children.len() != values.len() {
                return Err(RepoError::value_mismatch(format!(
                    "list value has {} entries, element has {} children",
                    values.len(),
                    children.len()
                )));
            }
            for (child, value) in children.iter_mut().zip(values) {
                apply_value(child, value)?;
            }
            Ok(())
        }
        (element, value) => Err(RepoError::value_mismatch(format!(
            "cannot write {} value into {} '{}'",
            value.kind_name(),
            element.kind_name(),
            element.id_short()
        ))),
    }
}

/// Value-only view of a submodel's root level.
pub fn submodel_value_only(submodel: &Submodel) -> SubmodelValueOnly {
    children_values(&submodel.submodel_elements)
}

/// The submodel with its element tree stripped: identity and naming only.
pub fn submodel_metadata(submodel: &Submodel) -> Submodel {
    Submodel {
        submodel_elements: Vec::new(),
        ..submodel.clone()
    }
}

fn children_values(children: &[Element]) -> IndexMap<String, ElementValue> {
    children
        .iter()
        .map(|child| (child.id_short().to_string(), element_value(child)))
        .collect()
}

fn apply_named_values(
    children: &mut [Element],
    values: IndexMap<String, ElementValue>,
) -> Result<(), RepoError> {
    for (name, value) in values {
        let child = children
            .iter_mut()
            .find(|child| child.id_short() == name)
            .ok_or_else(|| RepoError::element_not_found(&name))?;
        apply_value(child, value)?;
    }
    Ok(())
}
