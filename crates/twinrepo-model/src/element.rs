//! The element union and its scalar payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar element payload.
///
/// Untagged on the wire; the JSON value carries its own kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{v}"),
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Str(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Str(v)
    }
}

/// How an entity relates to the asset it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    CoManagedEntity,
    SelfManagedEntity,
}

/// One node of a submodel's element tree.
///
/// The union is closed: every consumer matches exhaustively, so a new kind
/// is a compile error at every traversal site rather than a runtime
/// surprise.
///
/// Serialization notes: the kind is tagged through `modelType`; an Entity's
/// `statements` serialize under `value` like every other container's
/// children, so one field name reaches the child array of any container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modelType", rename_all_fields = "camelCase")]
pub enum Element {
    Property {
        id_short: String,
        value: ScalarValue,
    },
    Range {
        id_short: String,
        min: ScalarValue,
        max: ScalarValue,
    },
    File {
        id_short: String,
        content_type: String,
        /// Reference to the file content (path or URI), not the content
        /// itself.
        value: String,
    },
    Blob {
        id_short: String,
        content_type: String,
        #[serde(with = "base64_bytes")]
        value: Vec<u8>,
    },
    Collection {
        id_short: String,
        #[serde(default)]
        value: Vec<Element>,
    },
    List {
        id_short: String,
        #[serde(default)]
        value: Vec<Element>,
    },
    Entity {
        id_short: String,
        entity_type: EntityType,
        #[serde(default, rename = "value")]
        statements: Vec<Element>,
    },
}

impl Element {
    pub fn property(id_short: impl Into<String>, value: impl Into<ScalarValue>) -> Element {
        Element::Property {
            id_short: id_short.into(),
            value: value.into(),
        }
    }

    pub fn range(
        id_short: impl Into<String>,
        min: impl Into<ScalarValue>,
        max: impl Into<ScalarValue>,
    ) -> Element {
        Element::Range {
            id_short: id_short.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn file(
        id_short: impl Into<String>,
        content_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Element {
        Element::File {
            id_short: id_short.into(),
            content_type: content_type.into(),
            value: value.into(),
        }
    }

    pub fn blob(
        id_short: impl Into<String>,
        content_type: impl Into<String>,
        value: Vec<u8>,
    ) -> Element {
        Element::Blob {
            id_short: id_short.into(),
            content_type: content_type.into(),
            value,
        }
    }

    pub fn collection(id_short: impl Into<String>, children: Vec<Element>) -> Element {
        Element::Collection {
            id_short: id_short.into(),
            value: children,
        }
    }

    pub fn list(id_short: impl Into<String>, children: Vec<Element>) -> Element {
        Element::List {
            id_short: id_short.into(),
            value: children,
        }
    }

    pub fn entity(
        id_short: impl Into<String>,
        entity_type: EntityType,
        statements: Vec<Element>,
    ) -> Element {
        Element::Entity {
            id_short: id_short.into(),
            entity_type,
            statements,
        }
    }

    /// The element's local name.
    pub fn id_short(&self) -> &str {
        match self {
            Element::Property { id_short, .. }
            | Element::Range { id_short, .. }
            | Element::File { id_short, .. }
            | Element::Blob { id_short, .. }
            | Element::Collection { id_short, .. }
            | Element::List { id_short, .. }
            | Element::Entity { id_short, .. } => id_short,
        }
    }

    /// The `modelType` tag this element serializes under.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Property { .. } => "Property",
            Element::Range { .. } => "Range",
            Element::File { .. } => "File",
            Element::Blob { .. } => "Blob",
            Element::Collection { .. } => "Collection",
            Element::List { .. } => "List",
            Element::Entity { .. } => "Entity",
        }
    }

    /// Whether children are addressed by idShort under this element.
    pub fn accepts_named_children(&self) -> bool {
        matches!(self, Element::Collection { .. } | Element::Entity { .. })
    }

    /// Whether children are addressed by position under this element.
    pub fn accepts_indexed_children(&self) -> bool {
        matches!(self, Element::List { .. })
    }

    /// The element's children, if it is a container.
    pub fn children(&self) -> Option<&[Element]> {
        match self {
            Element::Collection { value, .. } | Element::List { value, .. } => Some(value),
            Element::Entity { statements, .. } => Some(statements),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Collection { value, .. } | Element::List { value, .. } => Some(value),
            Element::Entity { statements, .. } => Some(statements),
            _ => None,
        }
    }
}

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_layout() {
        let element = Element::property("MaxRotationSpeed", 5000i64);
        let doc = serde_json::to_value(&element).unwrap();
        assert_eq!(
            doc,
            json!({"modelType": "Property", "idShort": "MaxRotationSpeed", "value": 5000})
        );
        let back: Element = serde_json::from_value(doc).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn scalar_wire_kinds() {
        for (scalar, expected) in [
            (ScalarValue::from(true), json!(true)),
            (ScalarValue::from(42i64), json!(42)),
            (ScalarValue::from(2.5), json!(2.5)),
            (ScalarValue::from("on"), json!("on")),
        ] {
            assert_eq!(serde_json::to_value(&scalar).unwrap(), expected);
            let back: ScalarValue = serde_json::from_value(expected).unwrap();
            assert_eq!(back, scalar);
        }
    }

    #[test]
    fn container_children_share_one_field_name() {
        let collection = Element::collection("grp", vec![Element::property("x", 1i64)]);
        let entity = Element::entity(
            "machine",
            EntityType::SelfManagedEntity,
            vec![Element::property("serial", "A-1")],
        );

        let collection_doc = serde_json::to_value(&collection).unwrap();
        let entity_doc = serde_json::to_value(&entity).unwrap();
        assert!(collection_doc.get("value").unwrap().is_array());
        assert!(entity_doc.get("value").unwrap().is_array());
        assert_eq!(entity_doc.get("entityType").unwrap(), "SelfManagedEntity");
        assert!(entity_doc.get("statements").is_none());

        let back: Element = serde_json::from_value(entity_doc).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn containers_deserialize_without_children_field() {
        let element: Element =
            serde_json::from_value(json!({"modelType": "Collection", "idShort": "empty"}))
                .unwrap();
        assert_eq!(element, Element::collection("empty", vec![]));
    }

    #[test]
    fn blob_value_is_base64_text() {
        let element = Element::blob("firmware", "application/octet-stream", vec![1, 2, 3, 255]);
        let doc = serde_json::to_value(&element).unwrap();
        assert_eq!(doc.get("value").unwrap(), "AQID/w==");
        let back: Element = serde_json::from_value(doc).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn file_layout_uses_camel_case() {
        let element = Element::file("manual", "application/pdf", "/files/manual.pdf");
        let doc = serde_json::to_value(&element).unwrap();
        assert_eq!(doc.get("contentType").unwrap(), "application/pdf");
        assert_eq!(doc.get("value").unwrap(), "/files/manual.pdf");
    }

    #[test]
    fn accessors() {
        let list = Element::list("cylinders", vec![Element::property("bore", 84i64)]);
        assert_eq!(list.id_short(), "cylinders");
        assert_eq!(list.kind_name(), "List");
        assert!(list.accepts_indexed_children());
        assert!(!list.accepts_named_children());
        assert_eq!(list.children().unwrap().len(), 1);

        let leaf = Element::property("bore", 84i64);
        assert!(leaf.children().is_none());
        assert!(!leaf.accepts_named_children());
    }
}
