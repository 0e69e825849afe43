//! idShort path grammar for addressing elements inside a submodel.
//!
//! A path is a dot-separated sequence of idShort names where any name may be
//! followed by one or more bracketed list positions:
//! `engine.cylinders[2].bore` addresses the `bore` child of the third member
//! of the `cylinders` list inside the `engine` collection. The empty string
//! is the root path and addresses the submodel itself.
//!
//! # Example
//!
//! ```
//! use twinrepo_path::{IdShortPath, Segment};
//!
//! let path: IdShortPath = "engine.cylinders[2].bore".parse().unwrap();
//! assert_eq!(path.segments().len(), 4);
//! assert_eq!(path.segments()[1], Segment::Named("cylinders".to_string()));
//! assert_eq!(path.segments()[2], Segment::Indexed(2));
//! assert_eq!(path.to_string(), "engine.cylinders[2].bore");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing an idShort path string.
///
/// Positions are byte offsets into the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("Empty segment at position {0}")]
    EmptySegment(usize),
    #[error("Unclosed '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("Nested '[' at position {0}")]
    NestedBracket(usize),
    #[error("Unmatched ']' at position {0}")]
    UnmatchedBracket(usize),
    #[error("Invalid list index {0:?} at position {1}")]
    InvalidIndex(String, usize),
    #[error("Unexpected character {0:?} after ']' at position {1}")]
    UnexpectedAfterIndex(char, usize),
}

/// One step of an idShort path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Selects the child with this idShort under a named container.
    Named(String),
    /// Selects the child at this position under a list.
    Indexed(usize),
}

impl Segment {
    /// Convenience constructor for a named segment.
    pub fn named(id_short: impl Into<String>) -> Self {
        Segment::Named(id_short.into())
    }

    /// The idShort of a named segment.
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Named(name) => Some(name),
            Segment::Indexed(_) => None,
        }
    }

    /// The position of an indexed segment.
    pub fn index(&self) -> Option<usize> {
        match self {
            Segment::Named(_) => None,
            Segment::Indexed(index) => Some(*index),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Named(name) => write!(f, "{name}"),
            Segment::Indexed(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed idShort path.
///
/// The empty path (no segments) addresses the submodel root. Paths format
/// back to the canonical string form; parsing normalizes a separator that
/// directly precedes a bracket and drops a trailing separator, so
/// `format(parse(s))` may differ from `s` while `parse(format(p)) == p`
/// holds for every path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IdShortPath {
    segments: Vec<Segment>,
}

impl IdShortPath {
    /// The root path.
    pub const ROOT: IdShortPath = IdShortPath {
        segments: Vec::new(),
    };

    /// Parse a path from its string form.
    ///
    /// # Example
    ///
    /// ```
    /// use twinrepo_path::{IdShortPath, PathParseError, Segment};
    ///
    /// let path = IdShortPath::parse("doors[0]").unwrap();
    /// assert_eq!(
    ///     path.segments(),
    ///     &[Segment::named("doors"), Segment::Indexed(0)]
    /// );
    ///
    /// assert_eq!(IdShortPath::parse(""), Ok(IdShortPath::ROOT));
    /// assert!(matches!(
    ///     IdShortPath::parse("doors[x]"),
    ///     Err(PathParseError::InvalidIndex(..))
    /// ));
    /// ```
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        IdShortPathParser { input, pos: 0 }.parse_path()
    }

    /// Build a path directly from segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        IdShortPath { segments }
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path reaches below the first tree level.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The final segment, if any.
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The path of the addressed element's parent.
    ///
    /// Returns `None` for the root path, which has no parent.
    ///
    /// # Example
    ///
    /// ```
    /// use twinrepo_path::IdShortPath;
    ///
    /// let path = IdShortPath::parse("a.b[2]").unwrap();
    /// assert_eq!(path.parent().unwrap().to_string(), "a.b");
    /// assert_eq!(IdShortPath::ROOT.parent(), None);
    /// ```
    pub fn parent(&self) -> Option<IdShortPath> {
        match self.segments.split_last() {
            Some((_, rest)) => Some(IdShortPath {
                segments: rest.to_vec(),
            }),
            None => None,
        }
    }

    /// A new path extending this one by a segment.
    pub fn join(&self, segment: Segment) -> IdShortPath {
        let mut segments = self.segments.clone();
        segments.push(segment);
        IdShortPath { segments }
    }
}

impl From<Vec<Segment>> for IdShortPath {
    fn from(segments: Vec<Segment>) -> Self {
        IdShortPath { segments }
    }
}

impl FromStr for IdShortPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdShortPath::parse(s)
    }
}

impl fmt::Display for IdShortPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Named(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

// Paths cross the wire in their string form.
impl serde::Serialize for IdShortPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for IdShortPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        IdShortPath::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Single-pass scanner over the path string.
struct IdShortPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> IdShortPathParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn parse_path(mut self) -> Result<IdShortPath, PathParseError> {
        let mut segments = Vec::new();
        let mut name = String::new();
        // Set right after a closing ']': a separator may follow without an
        // intervening name, and a name may not.
        let mut after_index = false;

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    if name.is_empty() && !after_index {
                        return Err(PathParseError::EmptySegment(self.pos));
                    }
                    if !name.is_empty() {
                        segments.push(Segment::Named(std::mem::take(&mut name)));
                    }
                    after_index = false;
                    self.advance();
                }
                '[' => {
                    // A separator directly before a bracket collapses:
                    // "a.[2]" addresses the same element as "a[2]".
                    if !name.is_empty() {
                        segments.push(Segment::Named(std::mem::take(&mut name)));
                    }
                    let open = self.pos;
                    self.advance();
                    segments.push(self.parse_index(open)?);
                    after_index = true;
                }
                ']' => return Err(PathParseError::UnmatchedBracket(self.pos)),
                _ => {
                    if after_index {
                        return Err(PathParseError::UnexpectedAfterIndex(c, self.pos));
                    }
                    name.push(c);
                    self.advance();
                }
            }
        }

        // A trailing separator is dropped; interior empties errored above.
        if !name.is_empty() {
            segments.push(Segment::Named(name));
        }
        Ok(IdShortPath { segments })
    }

    fn parse_index(&mut self, open: usize) -> Result<Segment, PathParseError> {
        let start = self.pos;
        let mut digits = String::new();
        loop {
            match self.peek() {
                None => return Err(PathParseError::UnclosedBracket(open)),
                Some('[') => return Err(PathParseError::NestedBracket(self.pos)),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    digits.push(c);
                    self.advance();
                }
            }
        }
        // Rejects empty, signed, non-numeric, and overflowing indices alike.
        match digits.parse::<usize>() {
            Ok(index) => Ok(Segment::Indexed(index)),
            Err(_) => Err(PathParseError::InvalidIndex(digits, start)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> Segment {
        Segment::Named(s.to_string())
    }

    #[test]
    fn parses_empty_input_as_root() {
        let path = IdShortPath::parse("").unwrap();
        assert!(path.is_root());
        assert_eq!(path, IdShortPath::ROOT);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn parses_single_name() {
        let path = IdShortPath::parse("temperature").unwrap();
        assert_eq!(path.segments(), &[named("temperature")]);
        assert!(!path.is_nested());
    }

    #[test]
    fn parses_dotted_names() {
        let path = IdShortPath::parse("a.b.c").unwrap();
        assert_eq!(path.segments(), &[named("a"), named("b"), named("c")]);
        assert!(path.is_nested());
    }

    #[test]
    fn parses_index_suffix() {
        let path = IdShortPath::parse("doors[0]").unwrap();
        assert_eq!(path.segments(), &[named("doors"), Segment::Indexed(0)]);
    }

    #[test]
    fn parses_mixed_path() {
        let path = IdShortPath::parse("a.b[2].c").unwrap();
        assert_eq!(
            path.segments(),
            &[named("a"), named("b"), Segment::Indexed(2), named("c")]
        );
    }

    #[test]
    fn parses_consecutive_indices() {
        let path = IdShortPath::parse("grid[1][2]").unwrap();
        assert_eq!(
            path.segments(),
            &[named("grid"), Segment::Indexed(1), Segment::Indexed(2)]
        );
    }

    #[test]
    fn parses_leading_index() {
        // Syntactically valid; resolution rejects it because the root only
        // has named children.
        let path = IdShortPath::parse("[3]").unwrap();
        assert_eq!(path.segments(), &[Segment::Indexed(3)]);
    }

    #[test]
    fn accepts_leading_zeroes_in_index() {
        let path = IdShortPath::parse("a[007]").unwrap();
        assert_eq!(path.segments(), &[named("a"), Segment::Indexed(7)]);
    }

    #[test]
    fn drops_trailing_separator() {
        let path = IdShortPath::parse("a.b.").unwrap();
        assert_eq!(path.segments(), &[named("a"), named("b")]);
    }

    #[test]
    fn rejects_interior_empty_segment() {
        assert_eq!(
            IdShortPath::parse("a..b"),
            Err(PathParseError::EmptySegment(2))
        );
        assert_eq!(
            IdShortPath::parse(".a"),
            Err(PathParseError::EmptySegment(0))
        );
    }

    #[test]
    fn collapses_separator_before_bracket() {
        let path = IdShortPath::parse("a.[2]").unwrap();
        assert_eq!(path.segments(), &[named("a"), Segment::Indexed(2)]);
        assert_eq!(path.to_string(), "a[2]");
    }

    #[test]
    fn rejects_unclosed_bracket() {
        assert_eq!(
            IdShortPath::parse("a[1"),
            Err(PathParseError::UnclosedBracket(1))
        );
    }

    #[test]
    fn rejects_nested_bracket() {
        assert_eq!(
            IdShortPath::parse("a[[1]]"),
            Err(PathParseError::NestedBracket(2))
        );
    }

    #[test]
    fn rejects_unmatched_closing_bracket() {
        assert_eq!(
            IdShortPath::parse("a]b"),
            Err(PathParseError::UnmatchedBracket(1))
        );
    }

    #[test]
    fn rejects_non_numeric_index() {
        assert_eq!(
            IdShortPath::parse("a[x]"),
            Err(PathParseError::InvalidIndex("x".to_string(), 2))
        );
        assert_eq!(
            IdShortPath::parse("a[-1]"),
            Err(PathParseError::InvalidIndex("-1".to_string(), 2))
        );
        assert_eq!(
            IdShortPath::parse("a[]"),
            Err(PathParseError::InvalidIndex(String::new(), 2))
        );
    }

    #[test]
    fn rejects_overflowing_index() {
        let text = "a[99999999999999999999999999]";
        assert!(matches!(
            IdShortPath::parse(text),
            Err(PathParseError::InvalidIndex(..))
        ));
    }

    #[test]
    fn rejects_name_directly_after_index() {
        assert_eq!(
            IdShortPath::parse("a[1]b"),
            Err(PathParseError::UnexpectedAfterIndex('b', 4))
        );
    }

    #[test]
    fn display_round_trips_canonical_forms() {
        for text in ["", "a", "a.b.c", "a.b[2].c", "grid[1][2]", "[0].x"] {
            let path = IdShortPath::parse(text).unwrap();
            assert_eq!(path.to_string(), text);
            assert_eq!(IdShortPath::parse(&path.to_string()).unwrap(), path);
        }
    }

    #[test]
    fn parent_and_join() {
        let path = IdShortPath::parse("a.b[2]").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "a.b");
        assert_eq!(parent.join(Segment::Indexed(2)), path);
        assert_eq!(IdShortPath::ROOT.parent(), None);
        assert_eq!(path.last(), Some(&Segment::Indexed(2)));
    }

    #[test]
    fn serde_uses_string_form() {
        let path = IdShortPath::parse("a.b[2].c").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a.b[2].c\"");
        let back: IdShortPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);

        let err = serde_json::from_str::<IdShortPath>("\"a[\"");
        assert!(err.is_err());
    }

    #[test]
    fn segment_accessors() {
        assert_eq!(named("a").name(), Some("a"));
        assert_eq!(named("a").index(), None);
        assert_eq!(Segment::Indexed(4).index(), Some(4));
        assert_eq!(Segment::Indexed(4).name(), None);
    }
}
