//! The submodel document.

use serde::{Deserialize, Serialize};

use crate::Element;

/// A submodel: an identified, ordered tree of elements.
///
/// `id` is the repository-wide identity; `id_short` is the local display
/// name. The serde layout of this struct is the persisted document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submodel {
    pub id: String,
    pub id_short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<String>,
    #[serde(default)]
    pub submodel_elements: Vec<Element>,
}

impl Submodel {
    pub fn new(id: impl Into<String>, id_short: impl Into<String>) -> Self {
        Submodel {
            id: id.into(),
            id_short: id_short.into(),
            semantic_id: None,
            submodel_elements: Vec::new(),
        }
    }

    pub fn with_elements(
        id: impl Into<String>,
        id_short: impl Into<String>,
        elements: Vec<Element>,
    ) -> Self {
        Submodel {
            id: id.into(),
            id_short: id_short.into(),
            semantic_id: None,
            submodel_elements: elements,
        }
    }

    pub fn with_semantic_id(mut self, semantic_id: impl Into<String>) -> Self {
        self.semantic_id = Some(semantic_id.into());
        self
    }

    /// Root child with the given idShort, if present.
    pub fn root_child(&self, id_short: &str) -> Option<&Element> {
        self.submodel_elements
            .iter()
            .find(|element| element.id_short() == id_short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_layout() {
        let submodel = Submodel::with_elements(
            "urn:sm:1",
            "Nameplate",
            vec![Element::property("ManufacturerName", "ACME")],
        )
        .with_semantic_id("urn:sem:nameplate");

        let doc = serde_json::to_value(&submodel).unwrap();
        assert_eq!(
            doc,
            json!({
                "id": "urn:sm:1",
                "idShort": "Nameplate",
                "semanticId": "urn:sem:nameplate",
                "submodelElements": [
                    {"modelType": "Property", "idShort": "ManufacturerName", "value": "ACME"}
                ]
            })
        );
        let back: Submodel = serde_json::from_value(doc).unwrap();
        assert_eq!(back, submodel);
    }

    #[test]
    fn semantic_id_is_omitted_when_absent() {
        let doc = serde_json::to_value(Submodel::new("urn:sm:2", "Empty")).unwrap();
        assert!(doc.get("semanticId").is_none());
        assert_eq!(doc.get("submodelElements").unwrap(), &json!([]));
    }

    #[test]
    fn deserializes_without_elements_field() {
        let submodel: Submodel =
            serde_json::from_value(json!({"id": "urn:sm:3", "idShort": "Bare"})).unwrap();
        assert!(submodel.submodel_elements.is_empty());
    }

    #[test]
    fn root_child_lookup() {
        let submodel = Submodel::with_elements(
            "urn:sm:4",
            "S",
            vec![
                Element::property("a", 1i64),
                Element::property("b", 2i64),
            ],
        );
        assert_eq!(submodel.root_child("b").unwrap().id_short(), "b");
        assert!(submodel.root_child("c").is_none());
    }
}
