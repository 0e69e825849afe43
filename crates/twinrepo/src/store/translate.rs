//! Translation of idShort paths into document locators.
//!
//! A named segment becomes an array filter on `idShort`, an indexed segment
//! a positional step. Before descending into a container's child array the
//! locator asserts the container's `modelType` fits the segment kind, so a
//! position under a Collection or a name under a List dead-ends in the
//! document exactly where tree traversal dead-ends in memory.

use serde_json::{json, Value};
use twinrepo_docstore::TargetPath;
use twinrepo_model::fields;
use twinrepo_path::{IdShortPath, Segment};

const NAMED_CONTAINERS: [&str; 2] = ["Collection", "Entity"];
const INDEXED_CONTAINERS: [&str; 1] = ["List"];

/// Locator of the top-level element array.
pub(crate) fn roots() -> TargetPath {
    TargetPath::new().field(fields::ROOT_ELEMENTS)
}

/// Locator of the top-level element with the given idShort.
pub(crate) fn root_named(id_short: &str) -> TargetPath {
    roots().filtered(fields::ID_SHORT, json!(id_short))
}

/// Locator of the element a path addresses. `None` when the path cannot
/// address an element: the root itself, or a position at the named top
/// level.
pub(crate) fn element(path: &IdShortPath) -> Option<TargetPath> {
    let (first, rest) = path.segments().split_first()?;
    let Segment::Named(name) = first else {
        return None;
    };
    let mut target = root_named(name);
    for segment in rest {
        target = descend(target, segment);
    }
    Some(target)
}

/// Locator of the child array holding the element that `parent` + `child`
/// address.
pub(crate) fn siblings(parent: &IdShortPath, child: &Segment) -> Option<TargetPath> {
    if parent.is_root() {
        return match child {
            Segment::Named(_) => Some(roots()),
            Segment::Indexed(_) => None,
        };
    }
    let container = element(parent)?;
    Some(
        container
            .guard(fields::MODEL_TYPE, container_kinds(child))
            .field(fields::CHILDREN),
    )
}

/// Extends a locator positioned at a container element down into one of its
/// children.
fn descend(target: TargetPath, child: &Segment) -> TargetPath {
    let target = target
        .guard(fields::MODEL_TYPE, container_kinds(child))
        .field(fields::CHILDREN);
    match child {
        Segment::Named(name) => target.filtered(fields::ID_SHORT, json!(name)),
        Segment::Indexed(index) => target.at(*index),
    }
}

fn container_kinds(child: &Segment) -> Vec<Value> {
    let kinds: &[&str] = match child {
        Segment::Named(_) => &NAMED_CONTAINERS,
        Segment::Indexed(_) => &INDEXED_CONTAINERS,
    };
    kinds.iter().map(|kind| json!(kind)).collect()
}
