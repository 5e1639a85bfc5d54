//! Validation of policy bindings and the role bindings they hold.
use super::{PolicyBinding, RoleBinding};
use admit_core::{
    field::{ErrorList, FieldError, Path},
    validation::{validate_object_meta, validate_object_meta_update, validate_subdomain_name},
};

/// Validates a policy binding and each of its role bindings
pub fn validate_policy_binding(binding: &PolicyBinding) -> ErrorList {
    let policy_namespace = binding.policy_ref.namespace.as_deref().unwrap_or_default();
    let mut errs = validate_binding_meta(binding, policy_namespace).prefix("metadata");

    if policy_namespace.is_empty() {
        errs.push(FieldError::required(Path::fields(&["policyRef", "namespace"])));
    }

    for (key, role_binding) in &binding.role_bindings {
        let mut binding_errs = ErrorList::new();
        let role_namespace = role_binding.role_ref.namespace.as_deref().unwrap_or_default();
        if role_namespace != policy_namespace {
            binding_errs.push(FieldError::invalid(
                Path::fields(&["roleRef", "namespace"]),
                role_namespace,
                format!("must be {policy_namespace}"),
            ));
        }
        let name = role_binding.metadata.name.as_deref().unwrap_or_default();
        if name != key {
            binding_errs.push(FieldError::invalid(Path::fields(&["metadata", "name"]), name, format!("must be {key}")));
        }
        binding_errs.append(validate_role_binding(role_binding));
        errs.append(binding_errs.prefix(key).prefix("roleBindings"));
    }
    errs
}

fn validate_binding_meta(binding: &PolicyBinding, policy_namespace: &str) -> ErrorList {
    let mut errs = validate_object_meta(&binding.metadata, true, validate_subdomain_name);
    let name = binding.metadata.name.as_deref().unwrap_or_default();
    if !name.is_empty() && name != policy_namespace {
        errs.push(FieldError::invalid("name", name, format!("must be {policy_namespace}")));
    }
    errs
}

/// Validates a policy binding against its stored version
pub fn validate_policy_binding_update(binding: &PolicyBinding, old: &PolicyBinding) -> ErrorList {
    let mut errs = validate_policy_binding(binding);
    errs.append(validate_object_meta_update(&binding.metadata, &old.metadata).prefix("metadata"));
    if binding.policy_ref.namespace != old.policy_ref.namespace {
        errs.push(FieldError::invalid(
            Path::fields(&["policyRef", "namespace"]),
            binding.policy_ref.namespace.as_deref().unwrap_or_default(),
            "cannot change policyRef",
        ));
    }
    errs
}

/// Validates a single role binding
pub fn validate_role_binding(binding: &RoleBinding) -> ErrorList {
    let mut errs = validate_object_meta(&binding.metadata, true, validate_subdomain_name).prefix("metadata");
    if binding.role_ref.name.as_deref().unwrap_or_default().is_empty() {
        errs.push(FieldError::required(Path::fields(&["roleRef", "name"])));
    }
    errs
}
