//! Selectable field sets and the selectors that match them.
//!
//! Each kind enumerates the fields it can be filtered on; anything not in
//! that set is treated as unset.
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Filterable fields of one object, keyed by dotted path
pub type Set = BTreeMap<String, String>;

/// A requirement on a single field
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Requirement {
    /// The field has exactly this value
    Equal(String, String),
    /// The field is unset or has a different value
    NotEqual(String, String),
}

impl Requirement {
    fn matches(&self, fields: &Set) -> bool {
        match self {
            Requirement::Equal(field, value) => fields.get(field) == Some(value),
            Requirement::NotEqual(field, value) => fields.get(field) != Some(value),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Equal(field, value) => write!(f, "{field}={value}"),
            Requirement::NotEqual(field, value) => write!(f, "{field}!={value}"),
        }
    }
}

/// A conjunction of [`Requirement`]s; the empty selector matches everything
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct Selector(Vec<Requirement>);

impl Selector {
    /// A selector matching every field set
    pub fn everything() -> Self {
        Self::default()
    }

    /// Whether `fields` satisfies every requirement
    pub fn matches(&self, fields: &Set) -> bool {
        self.0.iter().all(|req| req.matches(fields))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reqs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&reqs.join(","))
    }
}

impl FromIterator<Requirement> for Selector {
    fn from_iter<T: IntoIterator<Item = Requirement>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(f, v)| Requirement::Equal(f.into(), v.into()))
            .collect()
    }
}

impl From<Requirement> for Selector {
    fn from(value: Requirement) -> Self {
        Self(vec![value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_and_display() {
        let fields: Set = [
            ("name".to_string(), "shared".to_string()),
            ("policyRef.namespace".to_string(), "shared".to_string()),
        ]
        .into();
        let selector = Selector::from_iter([("policyRef.namespace", "shared")]);
        assert!(selector.matches(&fields));

        let excluding = Selector::from(Requirement::NotEqual("name".into(), "shared".into()));
        assert!(!excluding.matches(&fields));
        assert_eq!(excluding.to_string(), "name!=shared");

        let unknown = Selector::from_iter([("spec.host", "a")]);
        assert!(!unknown.matches(&fields));
        assert!(Selector::everything().matches(&fields));
    }
}
