//! Locator expressions addressing into documents.

use std::fmt;

use serde_json::Value;

/// One step of a document locator.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Descend into an object field.
    Field(String),
    /// Select every array element matching the named filter of the
    /// enclosing [`TargetPath`].
    Filtered(String),
    /// Select the array element at a fixed offset.
    At(usize),
    /// Stay on the current value, but only if its `field` equals one of
    /// `any_of`. Resolution dead-ends here otherwise.
    Guard { field: String, any_of: Vec<Value> },
}

/// Equality condition a [`Step::Filtered`] placeholder expands to.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFilter {
    pub placeholder: String,
    pub field: String,
    pub equals: Value,
}

/// An ordered document locator plus the named array filters its filtered
/// steps reference.
///
/// A locator may resolve to zero, one, or several targets: a filtered step
/// selects every matching array element. Callers that need uniqueness
/// check the result count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetPath {
    pub steps: Vec<Step>,
    pub filters: Vec<ArrayFilter>,
}

impl TargetPath {
    pub fn new() -> Self {
        TargetPath::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Field(name.into()));
        self
    }

    /// Adds a filtered step selecting array elements whose `field` equals
    /// `equals`; the placeholder is allocated automatically.
    pub fn filtered(mut self, field: impl Into<String>, equals: Value) -> Self {
        let placeholder = format!("e{}", self.filters.len());
        self.steps.push(Step::Filtered(placeholder.clone()));
        self.filters.push(ArrayFilter {
            placeholder,
            field: field.into(),
            equals,
        });
        self
    }

    pub fn at(mut self, index: usize) -> Self {
        self.steps.push(Step::At(index));
        self
    }

    pub fn guard(mut self, field: impl Into<String>, any_of: Vec<Value>) -> Self {
        self.steps.push(Step::Guard {
            field: field.into(),
            any_of,
        });
        self
    }

    pub fn filter_for(&self, placeholder: &str) -> Option<&ArrayFilter> {
        self.filters
            .iter()
            .find(|filter| filter.placeholder == placeholder)
    }
}

// Log rendition in the dotted style of document-database update keys;
// guards are structural and not shown.
impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            match step {
                Step::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    write!(f, "{name}")?;
                }
                Step::Filtered(placeholder) => write!(f, ".$[{placeholder}]")?,
                Step::At(index) => write!(f, ".{index}")?,
                Step::Guard { .. } => continue,
            }
            first = false;
        }
        Ok(())
    }
}

/// Mutation applied at the located target(s).
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Replace the target.
    Set(Value),
    /// Append to the target array.
    Push(Value),
    /// Remove every element of the target array whose `field` equals
    /// `equals`.
    Pull { field: String, equals: Value },
    /// Remove the element at `index` of the target array.
    RemoveAt(usize),
}

impl UpdateOp {
    pub fn name(&self) -> &'static str {
        match self {
            UpdateOp::Set(_) => "set",
            UpdateOp::Push(_) => "push",
            UpdateOp::Pull { .. } => "pull",
            UpdateOp::RemoveAt(_) => "removeAt",
        }
    }
}
