//! Label sets and the selectors that match them.
//!
//! Selectors are built programmatically; parsing the selector string syntax
//! belongs to the query layer that hands them to us.
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// The labels of one object
pub type Set = BTreeMap<String, String>;

/// A single requirement on a label set
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Expression {
    /// The label is present with one of the values
    In(String, BTreeSet<String>),
    /// The label is absent, or present with none of the values
    NotIn(String, BTreeSet<String>),
    /// The label is present with exactly this value
    Equal(String, String),
    /// The label is absent, or has a different value
    NotEqual(String, String),
    /// The label is present
    Exists(String),
    /// The label is absent
    DoesNotExist(String),
}

impl Expression {
    fn matches(&self, labels: &Set) -> bool {
        match self {
            Expression::In(key, values) => labels.get(key).is_some_and(|v| values.contains(v)),
            Expression::NotIn(key, values) => !labels.get(key).is_some_and(|v| values.contains(v)),
            Expression::Exists(key) => labels.contains_key(key),
            Expression::DoesNotExist(key) => !labels.contains_key(key),
            Expression::Equal(key, value) => labels.get(key) == Some(value),
            Expression::NotEqual(key, value) => labels.get(key) != Some(value),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &BTreeSet<String>| values.iter().cloned().collect::<Vec<_>>().join(",");
        match self {
            Expression::In(key, values) => write!(f, "{key} in ({})", join(values)),
            Expression::NotIn(key, values) => write!(f, "{key} notin ({})", join(values)),
            Expression::Equal(key, value) => write!(f, "{key}={value}"),
            Expression::NotEqual(key, value) => write!(f, "{key}!={value}"),
            Expression::Exists(key) => write!(f, "{key}"),
            Expression::DoesNotExist(key) => write!(f, "!{key}"),
        }
    }
}

/// A conjunction of [`Expression`]s; the empty selector matches everything
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct Selector(Vec<Expression>);

impl Selector {
    /// A selector matching every label set
    pub fn everything() -> Self {
        Self::default()
    }

    /// Whether this selector matches every label set
    pub fn selects_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `labels` satisfies every expression
    pub fn matches(&self, labels: &Set) -> bool {
        self.0.iter().all(|expr| expr.matches(labels))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exprs: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&exprs.join(","))
    }
}

impl FromIterator<(String, String)> for Selector {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| Expression::Equal(k, v)).collect())
    }
}

impl FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl FromIterator<Expression> for Selector {
    fn from_iter<T: IntoIterator<Item = Expression>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Expression> for Selector {
    fn from(value: Expression) -> Self {
        Self(vec![value])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> Set {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn values(vs: &[&str]) -> BTreeSet<String> {
        vs.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn matching() {
        let labels = set(&[("app", "web"), ("tier", "frontend")]);
        for (selector, matches, msg) in [
            (Selector::everything(), true, "empty selector"),
            (Selector::from_iter([("app", "web")]), true, "equality"),
            (Selector::from_iter([("app", "db")]), false, "equality mismatch"),
            (Selector::from(Expression::In("tier".into(), values(&["frontend", "backend"]))), true, "in"),
            (Selector::from(Expression::NotIn("tier".into(), values(&["frontend"]))), false, "notin"),
            (Selector::from(Expression::NotIn("zone".into(), values(&["a"]))), true, "notin absent"),
            (Selector::from(Expression::NotEqual("app".into(), "web".into())), false, "not equal"),
            (Selector::from(Expression::Exists("app".into())), true, "exists"),
            (Selector::from(Expression::DoesNotExist("app".into())), false, "does not exist"),
            (
                Selector::from_iter([
                    Expression::Equal("app".into(), "web".into()),
                    Expression::In("tier".into(), values(&["backend"])),
                ]),
                false,
                "every expression must hold",
            ),
        ] {
            assert_eq!(selector.matches(&labels), matches, "{msg}");
        }
    }

    #[test]
    fn display() {
        let selector = Selector::from_iter([
            Expression::In("foo".into(), values(&["bar", "baz"])),
            Expression::NotIn("foo".into(), values(&["bar"])),
            Expression::Equal("foo".into(), "bar".into()),
            Expression::NotEqual("foo".into(), "bar".into()),
            Expression::Exists("foo".into()),
            Expression::DoesNotExist("foo".into()),
        ]);
        assert_eq!(
            selector.to_string(),
            "foo in (bar,baz),foo notin (bar),foo=bar,foo!=bar,foo,!foo"
        );
        assert!(Selector::everything().selects_all());
    }
}
