//! Grammars and validators shared by every API group.
//!
//! Each grammar is defined exactly once here and compiled on first use.
use crate::{
    field::{ErrorList, FieldError, Path},
    metadata::{EnvVar, ObjectMeta},
};
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

/// A DNS-1123 label: lowercase alphanumerics and `-`, alphanumeric at both ends
pub const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
/// Maximum length of a DNS-1123 label
pub const DNS1123_LABEL_MAX_LENGTH: usize = 63;
/// A DNS-1123 subdomain: DNS-1123 labels joined by `.`
pub const DNS1123_SUBDOMAIN_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?(\\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*";
/// Maximum length of a DNS-1123 subdomain
pub const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
/// A C identifier, as used for environment variable names
pub const C_IDENTIFIER_FMT: &str = "[A-Za-z_][A-Za-z0-9_]*";
/// The name part of a qualified name (label keys)
pub const QUALIFIED_NAME_FMT: &str = "([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]";
/// Maximum length of the name part of a qualified name
pub const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
/// Maximum length of a label value
pub const LABEL_VALUE_MAX_LENGTH: usize = 63;

static DNS1123_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| anchored(DNS1123_LABEL_FMT));
static DNS1123_SUBDOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| anchored(DNS1123_SUBDOMAIN_FMT));
static C_IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| anchored(C_IDENTIFIER_FMT));
static QUALIFIED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| anchored(QUALIFIED_NAME_FMT));

fn anchored(fmt: &str) -> Regex {
    Regex::new(&format!("^{fmt}$")).unwrap_or_else(|err| panic!("grammar {fmt} does not compile: {err}"))
}

/// Whether `value` is a DNS-1123 label
pub fn is_dns1123_label(value: &str) -> bool {
    value.len() <= DNS1123_LABEL_MAX_LENGTH && DNS1123_LABEL_RE.is_match(value)
}

/// Whether `value` is a DNS-1123 subdomain
pub fn is_dns1123_subdomain(value: &str) -> bool {
    value.len() <= DNS1123_SUBDOMAIN_MAX_LENGTH && DNS1123_SUBDOMAIN_RE.is_match(value)
}

/// Whether `value` is a C identifier
pub fn is_c_identifier(value: &str) -> bool {
    C_IDENTIFIER_RE.is_match(value)
}

/// Whether `value` is a qualified name: an optional DNS-1123 subdomain prefix and `/`, then a name
pub fn is_qualified_name(value: &str) -> bool {
    let name = match value.split_once('/') {
        Some((prefix, name)) => {
            if !is_dns1123_subdomain(prefix) {
                return false;
            }
            name
        }
        None => value,
    };
    name.len() <= QUALIFIED_NAME_MAX_LENGTH && QUALIFIED_NAME_RE.is_match(name)
}

/// Whether `value` may be used as a label value; the empty string is allowed
pub fn is_valid_label_value(value: &str) -> bool {
    value.is_empty() || (value.len() <= LABEL_VALUE_MAX_LENGTH && QUALIFIED_NAME_RE.is_match(value))
}

/// Validates every key and value in `labels`, reporting errors at `field`
pub fn validate_labels(labels: Option<&BTreeMap<String, String>>, field: impl Into<Path>) -> ErrorList {
    let field = field.into();
    let mut errs = ErrorList::new();
    for (k, v) in labels.into_iter().flatten() {
        if !is_qualified_name(k) {
            errs.push(FieldError::invalid(
                field.clone(),
                k.as_str(),
                format!("must match regex [{DNS1123_SUBDOMAIN_FMT} / ] {QUALIFIED_NAME_FMT}"),
            ));
        }
        if !is_valid_label_value(v) {
            errs.push(FieldError::invalid(
                field.clone(),
                v.as_str(),
                format!("must have at most {LABEL_VALUE_MAX_LENGTH} characters and match regex {QUALIFIED_NAME_FMT}"),
            ));
        }
    }
    errs
}

/// Checks an object name, returning a detail message when it is unacceptable
pub type NameValidator = fn(&str) -> Option<String>;

/// The default [`NameValidator`]: names must be DNS-1123 subdomains
pub fn validate_subdomain_name(name: &str) -> Option<String> {
    (!is_dns1123_subdomain(name)).then(|| "name must be a valid subdomain".to_string())
}

/// Validates name, namespace and labels of an object.
///
/// Cluster scoped objects must not carry a namespace.
pub fn validate_object_meta(meta: &ObjectMeta, namespaced: bool, validate_name: NameValidator) -> ErrorList {
    let mut errs = ErrorList::new();
    let name = meta.name.as_deref().unwrap_or_default();
    if name.is_empty() {
        errs.push(FieldError::required("name"));
    } else if let Some(detail) = validate_name(name) {
        errs.push(FieldError::invalid("name", name, detail));
    }

    let namespace = meta.namespace.as_deref().unwrap_or_default();
    if namespaced {
        if namespace.is_empty() {
            errs.push(FieldError::required("namespace"));
        } else if !is_dns1123_subdomain(namespace) {
            errs.push(FieldError::invalid(
                "namespace",
                namespace,
                "namespace must be a valid subdomain",
            ));
        }
    } else if !namespace.is_empty() {
        errs.push(FieldError::invalid(
            "namespace",
            namespace,
            "namespace is not allowed on this type",
        ));
    }

    errs.append(validate_labels(meta.labels.as_ref(), "labels"));
    errs
}

/// Validates that an update leaves identity fields unchanged
pub fn validate_object_meta_update(new: &ObjectMeta, old: &ObjectMeta) -> ErrorList {
    let mut errs = ErrorList::new();
    if new.name != old.name {
        errs.push(FieldError::invalid(
            "name",
            new.name.clone().unwrap_or_default(),
            "field is immutable",
        ));
    }
    if new.namespace != old.namespace {
        errs.push(FieldError::invalid(
            "namespace",
            new.namespace.clone().unwrap_or_default(),
            "field is immutable",
        ));
    }
    errs
}

/// Validates environment variable names; callers prefix the result with the list's field name
pub fn validate_env(vars: &[EnvVar]) -> ErrorList {
    let mut errs = ErrorList::new();
    for (i, ev) in vars.iter().enumerate() {
        let mut var_errs = ErrorList::new();
        if ev.name.is_empty() {
            var_errs.push(FieldError::required("name"));
        }
        if !is_c_identifier(&ev.name) {
            var_errs.push(FieldError::invalid(
                "name",
                ev.name.as_str(),
                format!("must match regex {C_IDENTIFIER_FMT}"),
            ));
        }
        errs.append(var_errs.prefix_index(i));
    }
    errs
}
