//! Field-scoped validation errors.
//!
//! Validators build errors against the innermost field they inspect and the
//! caller prepends the name of the containing field with [`ErrorList::prefix`]
//! or [`ErrorList::prefix_index`]. Paths are persistent cons-lists, so
//! prefixing a list shares every existing path rather than copying it.
use crate::error::StatusCause;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named field, rendered as `.name`
    Field(String),
    /// A position in a list, rendered as `[i]`
    Index(usize),
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Node {
    segment: Segment,
    rest: Path,
}

/// Location of a value within a nested object, outermost segment first.
///
/// ```
/// use admit_core::field::Path;
///
/// let path = Path::new("kind").field("from").field("imageChangeParams").index(2).field("triggers");
/// assert_eq!(path.to_string(), "triggers[2].imageChangeParams.from.kind");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Option<Arc<Node>>);

impl Path {
    /// The empty path
    pub fn root() -> Self {
        Self(None)
    }

    /// A path consisting of a single field
    pub fn new(name: impl Into<String>) -> Self {
        Self::root().field(name)
    }

    /// A path through nested fields, outermost first
    pub fn fields(names: &[&str]) -> Self {
        names.iter().rev().fold(Self::root(), |path, name| path.field(*name))
    }

    /// Returns this path nested under the field `name`
    #[must_use]
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.prepend(Segment::Field(name.into()))
    }

    /// Returns this path nested under list position `index`
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.prepend(Segment::Index(index))
    }

    fn prepend(&self, segment: Segment) -> Self {
        Self(Some(Arc::new(Node {
            segment,
            rest: self.clone(),
        })))
    }

    /// Whether the path has no segments
    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    /// Iterate segments from the outermost container inwards
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        let mut next = self.0.as_deref();
        std::iter::from_fn(move || {
            let node = next?;
            next = node.rest.0.as_deref();
            Some(&node.segment)
        })
    }
}

impl From<&str> for Path {
    fn from(name: &str) -> Self {
        Path::new(name)
    }
}

impl From<String> for Path {
    fn from(name: String) -> Self {
        Path::new(name)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// The class of a [`FieldError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required value was absent or empty
    Required,
    /// A value was present but failed a grammar or constraint
    Invalid,
    /// A value was repeated where it must be unique
    Duplicate,
}

impl ErrorKind {
    /// Machine readable reason used in API status causes
    pub fn reason(self) -> &'static str {
        match self {
            ErrorKind::Required => "FieldValueRequired",
            ErrorKind::Invalid => "FieldValueInvalid",
            ErrorKind::Duplicate => "FieldValueDuplicate",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            ErrorKind::Required => "Required value",
            ErrorKind::Invalid => "Invalid value",
            ErrorKind::Duplicate => "Duplicate value",
        }
    }
}

/// A single validation failure attached to a field
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it went wrong
    pub path: Path,
    /// The offending value, absent for [`ErrorKind::Required`]
    pub value: Option<Value>,
    /// Human readable explanation
    pub detail: String,
}

impl FieldError {
    /// The field at `path` must be set
    pub fn required(path: impl Into<Path>) -> Self {
        Self {
            kind: ErrorKind::Required,
            path: path.into(),
            value: None,
            detail: String::new(),
        }
    }

    /// The field at `path` holds `value`, which is not acceptable
    pub fn invalid(path: impl Into<Path>, value: impl Into<Value>, detail: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Invalid,
            path: path.into(),
            value: Some(value.into()),
            detail: detail.into(),
        }
    }

    /// The field at `path` repeats `value`
    pub fn duplicate(path: impl Into<Path>, value: impl Into<Value>) -> Self {
        Self {
            kind: ErrorKind::Duplicate,
            path: path.into(),
            value: Some(value.into()),
            detail: String::new(),
        }
    }

    /// The error message without its path
    pub fn message(&self) -> String {
        let mut msg = self.kind.describe().to_string();
        if let Some(value) = &self.value {
            msg.push_str(&format!(": {value}"));
        }
        if !self.detail.is_empty() {
            msg.push_str(&format!(": {}", self.detail));
        }
        msg
    }

    fn nested(&self, path: Path) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message())
    }
}

impl std::error::Error for FieldError {}

impl From<&FieldError> for StatusCause {
    fn from(err: &FieldError) -> Self {
        StatusCause {
            field: Some(err.path.to_string()),
            message: Some(err.message()),
            reason: Some(err.kind.reason().to_string()),
        }
    }
}

/// An ordered aggregate of [`FieldError`]s.
///
/// An empty list is the only success signal a validator gives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorList(Vec<FieldError>);

impl ErrorList {
    /// An empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no errors were found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Add a single error
    pub fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }

    /// Move all errors of `other` to the end of this list
    pub fn append(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    /// A copy of this list with every path nested under the field `name`
    #[must_use]
    pub fn prefix(&self, name: &str) -> ErrorList {
        self.0.iter().map(|e| e.nested(e.path.field(name))).collect()
    }

    /// A copy of this list with every path nested under list position `index`
    #[must_use]
    pub fn prefix_index(&self, index: usize) -> ErrorList {
        self.0.iter().map(|e| e.nested(e.path.index(index))).collect()
    }

    /// Iterate the errors in order
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Status causes for an API error response
    pub fn causes(&self) -> Vec<StatusCause> {
        self.0.iter().map(StatusCause::from).collect()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msgs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", msgs.join(", "))
    }
}

impl std::error::Error for ErrorList {}

impl From<FieldError> for ErrorList {
    fn from(err: FieldError) -> Self {
        Self(vec![err])
    }
}

impl From<Vec<FieldError>> for ErrorList {
    fn from(errs: Vec<FieldError>) -> Self {
        Self(errs)
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<T: IntoIterator<Item = FieldError>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<FieldError> for ErrorList {
    fn extend<T: IntoIterator<Item = FieldError>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl IntoIterator for ErrorList {
    type IntoIter = std::vec::IntoIter<FieldError>;
    type Item = FieldError;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type IntoIter = std::slice::Iter<'a, FieldError>;
    type Item = &'a FieldError;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
