//! Shared fixtures for the integration suites.

use twinrepo::{Element, PaginationInfo, Submodel};

/// A submodel with some depth: properties, a collection holding a list and
/// a range, and a file at the top level.
pub fn machine() -> Submodel {
    Submodel::with_elements(
        "urn:sm:machine",
        "Machine",
        vec![
            Element::property("serial", "MX-250-001"),
            Element::collection(
                "drive",
                vec![
                    Element::property("speed", 1480i64),
                    Element::list(
                        "gears",
                        vec![
                            Element::property("g0", 3.6),
                            Element::property("g1", 2.1),
                        ],
                    ),
                    Element::range("temperature", -20i64, 85i64),
                ],
            ),
            Element::file("manual", "application/pdf", "/docs/mx250.pdf"),
        ],
    )
    .with_semantic_id("https://example.com/ids/machine")
}

pub fn nameplate() -> Submodel {
    Submodel::with_elements(
        "urn:sm:nameplate",
        "Nameplate",
        vec![
            Element::property("manufacturer", "ACME"),
            Element::property("year", 2024i64),
        ],
    )
    .with_semantic_id("https://example.com/ids/nameplate")
}

pub fn page(limit: usize, cursor: Option<&str>) -> PaginationInfo {
    PaginationInfo::new(Some(limit), cursor.map(String::from))
}
