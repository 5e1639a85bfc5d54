//! Predicates handed to the list/watch filter layer.
use crate::{fields, labels};
use thiserror::Error;

/// Errors extracting selectable attributes from an object
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The filter layer passed an object of a kind this predicate does not handle
    #[error("not a {expected}: got {actual}")]
    UnexpectedKind {
        /// Kind the predicate was built for
        expected: &'static str,
        /// Kind of the object received
        actual: &'static str,
    },
}

/// Extracts the label set and the enumerated selectable fields of an object
pub type AttrFunc<T> = fn(&T) -> Result<(labels::Set, fields::Set), Error>;

/// Matches objects against a label selector and a field selector
pub struct SelectionPredicate<T> {
    /// Requirements on labels
    pub label: labels::Selector,
    /// Requirements on selectable fields
    pub field: fields::Selector,
    /// Attribute adapter for the kind being filtered
    pub attrs: AttrFunc<T>,
}

impl<T> SelectionPredicate<T> {
    /// Whether `obj` satisfies both selectors
    ///
    /// Objects the attribute adapter refuses are an error even when both
    /// selectors are empty.
    pub fn matches(&self, obj: &T) -> Result<bool, Error> {
        let (labels, fields) = (self.attrs)(obj)?;
        Ok(self.label.matches(&labels) && self.field.matches(&fields))
    }
}

impl<T> Clone for SelectionPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            field: self.field.clone(),
            attrs: self.attrs,
        }
    }
}

impl<T> std::fmt::Debug for SelectionPredicate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionPredicate")
            .field("label", &self.label)
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}
