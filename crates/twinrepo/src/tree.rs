//! Traversal and mutation of a submodel's element tree.
//!
//! Elements are addressed by [`IdShortPath`]: named segments descend into
//! the children of a Collection or Entity, indexed segments into the
//! children of a List, and the top level of a submodel behaves like a named
//! container. Every addressing failure reports `ELEMENT_NOT_FOUND`,
//! including a segment kind that does not fit the container it lands on, so
//! a caller probing with a misshapen path cannot tell a missing element
//! from a mismatched one.

use twinrepo_core::RepoError;
use twinrepo_model::Element;
use twinrepo_path::{IdShortPath, Segment};

// ── Traversal ─────────────────────────────────────────────────────────────

/// Resolves a non-root path to its element.
pub fn resolve<'a>(elements: &'a [Element], path: &IdShortPath) -> Result<&'a Element, RepoError> {
    let Some((first, rest)) = path.segments().split_first() else {
        return Err(RepoError::element_not_found(path));
    };
    // The top level is named; a position cannot address it.
    let Segment::Named(name) = first else {
        return Err(RepoError::element_not_found(path));
    };
    let mut current = elements
        .iter()
        .find(|element| element.id_short() == name)
        .ok_or_else(|| RepoError::element_not_found(path))?;
    for segment in rest {
        current = child_of(current, segment).ok_or_else(|| RepoError::element_not_found(path))?;
    }
    Ok(current)
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(
    elements: &'a mut [Element],
    path: &IdShortPath,
) -> Result<&'a mut Element, RepoError> {
    let Some((first, rest)) = path.segments().split_first() else {
        return Err(RepoError::element_not_found(path));
    };
    let Segment::Named(name) = first else {
        return Err(RepoError::element_not_found(path));
    };
    let mut current = elements
        .iter_mut()
        .find(|element| element.id_short() == name)
        .ok_or_else(|| RepoError::element_not_found(path))?;
    for segment in rest {
        current =
            child_of_mut(current, segment).ok_or_else(|| RepoError::element_not_found(path))?;
    }
    Ok(current)
}

fn child_of<'a>(element: &'a Element, segment: &Segment) -> Option<&'a Element> {
    match segment {
        Segment::Named(name) if element.accepts_named_children() => element
            .children()?
            .iter()
            .find(|child| child.id_short() == name),
        Segment::Indexed(index) if element.accepts_indexed_children() => {
            element.children()?.get(*index)
        }
        _ => None,
    }
}

fn child_of_mut<'a>(element: &'a mut Element, segment: &Segment) -> Option<&'a mut Element> {
    let named = element.accepts_named_children();
    let indexed = element.accepts_indexed_children();
    match segment {
        Segment::Named(name) if named => element
            .children_mut()?
            .iter_mut()
            .find(|child| child.id_short() == name),
        Segment::Indexed(index) if indexed => element.children_mut()?.get_mut(*index),
        _ => None,
    }
}

/// A container's children and how they are addressed.
#[derive(Debug, PartialEq)]
pub struct Children<'a> {
    pub items: &'a [Element],
    /// Children are addressed by position rather than by idShort.
    pub indexed: bool,
}

/// The children of the container `parent` names; the root path names the
/// top level. A leaf parent is `ELEMENT_NOT_FOUND`.
pub fn children<'a>(
    elements: &'a [Element],
    parent: &IdShortPath,
) -> Result<Children<'a>, RepoError> {
    if parent.is_root() {
        return Ok(Children {
            items: elements,
            indexed: false,
        });
    }
    let container = resolve(elements, parent)?;
    let items = container
        .children()
        .ok_or_else(|| RepoError::element_not_found(parent))?;
    Ok(Children {
        items,
        indexed: container.accepts_indexed_children(),
    })
}

// ── Mutation ──────────────────────────────────────────────────────────────

/// Appends a new child under `parent`.
///
/// A named container rejects a sibling with the same idShort; a List
/// accepts any name since its children are addressed by position. Errors
/// name the parent path, the thing a create addresses.
pub fn insert_child(
    elements: &mut Vec<Element>,
    parent: &IdShortPath,
    element: Element,
) -> Result<(), RepoError> {
    if parent.is_root() {
        return append_to(elements, true, parent, element);
    }
    let container = resolve_mut(elements, parent)?;
    append_child(container, parent, element)
}

/// Appends a new child to a container element. `parent` is the container's
/// own path, used for error reporting and collision paths.
pub fn append_child(
    container: &mut Element,
    parent: &IdShortPath,
    element: Element,
) -> Result<(), RepoError> {
    let named = container.accepts_named_children();
    let Some(children) = container.children_mut() else {
        return Err(RepoError::element_not_found(parent));
    };
    append_to(children, named, parent, element)
}

fn append_to(
    children: &mut Vec<Element>,
    named: bool,
    parent: &IdShortPath,
    element: Element,
) -> Result<(), RepoError> {
    if named
        && children
            .iter()
            .any(|child| child.id_short() == element.id_short())
    {
        return Err(RepoError::colliding(
            parent.join(Segment::named(element.id_short())),
        ));
    }
    children.push(element);
    Ok(())
}

/// Removes the element at `path`, returning it.
pub fn remove(elements: &mut Vec<Element>, path: &IdShortPath) -> Result<Element, RepoError> {
    let (parent, last) = split_last(path)?;
    let siblings = siblings_mut(elements, &parent, path)?;
    let position =
        position_in(&siblings, last).ok_or_else(|| RepoError::element_not_found(path))?;
    Ok(siblings.children.remove(position))
}

/// Replaces the element at `path` with `element`, relocating it to the end
/// of its sibling array.
///
/// Under a named container a replacement that changes the idShort must not
/// collide with a sibling; the check runs before anything is touched, so a
/// rejected update leaves the tree as it was.
pub fn update(
    elements: &mut Vec<Element>,
    path: &IdShortPath,
    element: Element,
) -> Result<(), RepoError> {
    let (parent, last) = split_last(path)?;
    let siblings = siblings_mut(elements, &parent, path)?;
    let position =
        position_in(&siblings, last).ok_or_else(|| RepoError::element_not_found(path))?;
    if siblings.named
        && element.id_short() != siblings.children[position].id_short()
        && siblings
            .children
            .iter()
            .any(|child| child.id_short() == element.id_short())
    {
        return Err(RepoError::colliding(
            parent.join(Segment::named(element.id_short())),
        ));
    }
    siblings.children.remove(position);
    siblings.children.push(element);
    Ok(())
}

// ── Sibling plumbing ──────────────────────────────────────────────────────

struct Siblings<'a> {
    children: &'a mut Vec<Element>,
    named: bool,
    indexed: bool,
}

fn split_last(path: &IdShortPath) -> Result<(IdShortPath, &Segment), RepoError> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(last)) => Ok((parent, last)),
        _ => Err(RepoError::element_not_found(path)),
    }
}

fn siblings_mut<'a>(
    elements: &'a mut Vec<Element>,
    parent: &IdShortPath,
    full: &IdShortPath,
) -> Result<Siblings<'a>, RepoError> {
    if parent.is_root() {
        return Ok(Siblings {
            children: elements,
            named: true,
            indexed: false,
        });
    }
    let container =
        resolve_mut(elements, parent).map_err(|_| RepoError::element_not_found(full))?;
    let named = container.accepts_named_children();
    let indexed = container.accepts_indexed_children();
    match container.children_mut() {
        Some(children) => Ok(Siblings {
            children,
            named,
            indexed,
        }),
        None => Err(RepoError::element_not_found(full)),
    }
}

fn position_in(siblings: &Siblings<'_>, last: &Segment) -> Option<usize> {
    match last {
        Segment::Named(name) if siblings.named => siblings
            .children
            .iter()
            .position(|child| child.id_short() == name.as_str()),
        Segment::Indexed(index) if siblings.indexed => {
            (*index < siblings.children.len()).then_some(*index)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twinrepo_model::EntityType;

    fn path(input: &str) -> IdShortPath {
        IdShortPath::parse(input).unwrap()
    }

    fn forest() -> Vec<Element> {
        vec![
            Element::property("speed", 1500i64),
            Element::collection(
                "grp",
                vec![
                    Element::property("x", 1i64),
                    Element::list(
                        "items",
                        vec![Element::property("i0", 10i64), Element::property("i1", 11i64)],
                    ),
                ],
            ),
            Element::entity(
                "motor",
                EntityType::SelfManagedEntity,
                vec![Element::property("serial", "M-77")],
            ),
        ]
    }

    #[test]
    fn resolves_through_every_container_kind() {
        let elements = forest();
        assert_eq!(
            resolve(&elements, &path("speed")).unwrap().id_short(),
            "speed"
        );
        assert_eq!(resolve(&elements, &path("grp.x")).unwrap().id_short(), "x");
        assert_eq!(
            resolve(&elements, &path("grp.items[1]")).unwrap(),
            &Element::property("i1", 11i64)
        );
        assert_eq!(
            resolve(&elements, &path("motor.serial")).unwrap(),
            &Element::property("serial", "M-77")
        );
    }

    #[test]
    fn addressing_failures_collapse_to_not_found() {
        let elements = forest();
        for bad in [
            "nope",
            "grp.nope",
            "grp.items[2]",
            "grp.items.i0", // a name under a List
            "grp[0]",       // a position under a Collection
            "speed.x",      // descent below a leaf
            "[0]",          // a position at the named top level
            "",             // the root itself is not an element
        ] {
            let requested = path(bad);
            assert_eq!(
                resolve(&elements, &requested),
                Err(RepoError::element_not_found(&requested)),
                "path {bad:?}"
            );
        }
    }

    #[test]
    fn resolve_mut_reaches_the_same_elements() {
        let mut elements = forest();
        let target = resolve_mut(&mut elements, &path("grp.items[0]")).unwrap();
        *target = Element::property("i0", 99i64);
        assert_eq!(
            resolve(&elements, &path("grp.items[0]")).unwrap(),
            &Element::property("i0", 99i64)
        );
    }

    #[test]
    fn children_of_root_and_containers() {
        let elements = forest();
        let root = children(&elements, &IdShortPath::ROOT).unwrap();
        assert_eq!(root.items.len(), 3);
        assert!(!root.indexed);

        let list = children(&elements, &path("grp.items")).unwrap();
        assert_eq!(list.items.len(), 2);
        assert!(list.indexed);

        assert_eq!(
            children(&elements, &path("speed")),
            Err(RepoError::element_not_found(&path("speed")))
        );
    }

    #[test]
    fn insert_rejects_collisions_in_named_containers() {
        let mut elements = forest();
        insert_child(
            &mut elements,
            &IdShortPath::ROOT,
            Element::property("mode", "auto"),
        )
        .unwrap();
        assert_eq!(elements.len(), 4);

        assert_eq!(
            insert_child(
                &mut elements,
                &IdShortPath::ROOT,
                Element::property("speed", 0i64),
            ),
            Err(RepoError::colliding("speed"))
        );
        assert_eq!(
            insert_child(&mut elements, &path("grp"), Element::property("x", 0i64)),
            Err(RepoError::colliding("grp.x"))
        );
    }

    #[test]
    fn lists_accept_duplicate_names() {
        let mut elements = forest();
        insert_child(
            &mut elements,
            &path("grp.items"),
            Element::property("i0", 12i64),
        )
        .unwrap();
        let items = resolve(&elements, &path("grp.items")).unwrap();
        assert_eq!(items.children().unwrap().len(), 3);
    }

    #[test]
    fn insert_errors_name_the_parent() {
        let mut elements = forest();
        assert_eq!(
            insert_child(&mut elements, &path("nope"), Element::property("a", 1i64)),
            Err(RepoError::element_not_found("nope"))
        );
        assert_eq!(
            insert_child(&mut elements, &path("speed"), Element::property("a", 1i64)),
            Err(RepoError::element_not_found("speed"))
        );
    }

    #[test]
    fn remove_by_name_and_position() {
        let mut elements = forest();
        let removed = remove(&mut elements, &path("grp.items[0]")).unwrap();
        assert_eq!(removed.id_short(), "i0");

        let removed = remove(&mut elements, &path("motor")).unwrap();
        assert_eq!(removed.id_short(), "motor");
        assert_eq!(elements.len(), 2);

        assert_eq!(
            remove(&mut elements, &path("grp.items[5]")),
            Err(RepoError::element_not_found("grp.items[5]"))
        );
    }

    #[test]
    fn remove_errors_name_the_full_path() {
        let mut elements = forest();
        assert_eq!(
            remove(&mut elements, &path("nope.child")),
            Err(RepoError::element_not_found("nope.child"))
        );
    }

    #[test]
    fn update_relocates_to_the_end() {
        let mut elements = forest();
        update(
            &mut elements,
            &path("grp"),
            Element::collection("grp", vec![]),
        )
        .unwrap();
        let names: Vec<_> = elements.iter().map(Element::id_short).collect();
        assert_eq!(names, ["speed", "motor", "grp"]);
    }

    #[test]
    fn update_may_rename_without_collision() {
        let mut elements = forest();
        update(
            &mut elements,
            &path("speed"),
            Element::property("velocity", 1500i64),
        )
        .unwrap();
        assert!(resolve(&elements, &path("velocity")).is_ok());
        assert_eq!(
            resolve(&elements, &path("speed")),
            Err(RepoError::element_not_found("speed"))
        );
    }

    #[test]
    fn update_rename_onto_sibling_is_rejected_untouched() {
        let mut elements = forest();
        let before = elements.clone();
        assert_eq!(
            update(
                &mut elements,
                &path("speed"),
                Element::property("grp", 0i64),
            ),
            Err(RepoError::colliding("grp"))
        );
        assert_eq!(elements, before);
    }

    #[test]
    fn update_of_list_child_relocates_within_the_list() {
        let mut elements = forest();
        update(
            &mut elements,
            &path("grp.items[0]"),
            Element::property("i0", 0i64),
        )
        .unwrap();
        let items = resolve(&elements, &path("grp.items")).unwrap();
        let names: Vec<_> = items.children().unwrap().iter().map(Element::id_short).collect();
        assert_eq!(names, ["i1", "i0"]);
    }
}
