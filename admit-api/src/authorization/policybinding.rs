//! Admission strategy and list filtering for [`PolicyBinding`]s.
use super::{
    validation::{validate_policy_binding, validate_policy_binding_update},
    PolicyBinding, POLICY_NAME,
};
use crate::ApiObject;
use admit_core::{
    field::ErrorList,
    fields,
    labels,
    metadata::{ObjectMeta, ObjectReference, Time},
    predicate, Context, Resource, ResourceExt, SelectionPredicate, Strategy,
};
use std::collections::BTreeMap;

/// Create and update behaviour of policy bindings
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyBindingStrategy;

impl Strategy for PolicyBindingStrategy {
    type Object = PolicyBinding;

    fn namespace_scoped(&self) -> bool {
        true
    }

    fn allow_create_on_update(&self) -> bool {
        false
    }

    fn generate_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn prepare_for_create(&self, binding: &mut PolicyBinding) {
        binding.metadata.name = binding.policy_ref.namespace.clone();
        scrub_binding_refs(binding);
    }

    fn prepare_for_update(&self, binding: &mut PolicyBinding, _old: &PolicyBinding) {
        scrub_binding_refs(binding);
    }

    fn validate(&self, _ctx: &Context, binding: &PolicyBinding) -> ErrorList {
        validate_policy_binding(binding)
    }

    fn validate_update(&self, _ctx: &Context, binding: &PolicyBinding, old: &PolicyBinding) -> ErrorList {
        validate_policy_binding_update(binding, old)
    }
}

/// Discards the parts of every reference the binding does not honour.
///
/// The policy reference keeps its namespace; each role reference keeps its
/// name and is pinned to the policy namespace.
pub fn scrub_binding_refs(binding: &mut PolicyBinding) {
    binding.policy_ref = ObjectReference {
        namespace: binding.policy_ref.namespace.take(),
        ..ObjectReference::default()
    };
    for role_binding in binding.role_bindings.values_mut() {
        role_binding.role_ref = ObjectReference {
            name: role_binding.role_ref.name.take(),
            namespace: binding.policy_ref.namespace.clone(),
            ..ObjectReference::default()
        };
    }
}

/// The fields policy bindings can be filtered on
pub fn selectable_fields(binding: &PolicyBinding) -> fields::Set {
    fields::Set::from([
        ("name".to_string(), binding.name_any().to_string()),
        (
            "policyRef.namespace".to_string(),
            binding.policy_ref.namespace.clone().unwrap_or_default(),
        ),
    ])
}

fn policy_binding_attrs(obj: &ApiObject) -> Result<(labels::Set, fields::Set), predicate::Error> {
    match obj {
        ApiObject::PolicyBinding(binding) => Ok((binding.labels().clone(), selectable_fields(binding))),
        other => Err(predicate::Error::UnexpectedKind {
            expected: PolicyBinding::KIND,
            actual: other.kind(),
        }),
    }
}

/// A predicate selecting policy bindings by label and by [`selectable_fields`]
pub fn matcher(label: labels::Selector, field: fields::Selector) -> SelectionPredicate<ApiObject> {
    SelectionPredicate {
        label,
        field,
        attrs: policy_binding_attrs,
    }
}

/// A binding in `namespace` to the policy of `policy_namespace` with no role bindings yet
pub fn new_empty_policy_binding(namespace: &str, policy_namespace: &str) -> PolicyBinding {
    let now = Time(jiff::Timestamp::now());
    PolicyBinding {
        metadata: ObjectMeta {
            name: Some(policy_namespace.to_string()),
            namespace: Some(namespace.to_string()),
            creation_timestamp: Some(now.clone()),
            ..ObjectMeta::default()
        },
        last_modified: Some(now),
        policy_ref: ObjectReference {
            name: Some(POLICY_NAME.to_string()),
            namespace: Some(policy_namespace.to_string()),
            ..ObjectReference::default()
        },
        role_bindings: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{authorization::RoleBinding, deploy::DeploymentConfig};
    use admit_core::{admission::Admission, fields::Requirement};

    fn forged() -> PolicyBinding {
        let role_ref = ObjectReference {
            kind: Some("ClusterRole".into()),
            name: Some("admin".into()),
            namespace: Some("elsewhere".into()),
            uid: Some("1234".into()),
            ..ObjectReference::default()
        };
        PolicyBinding {
            metadata: ObjectMeta {
                name: Some("whatever".into()),
                namespace: Some("dev".into()),
                ..ObjectMeta::default()
            },
            policy_ref: ObjectReference {
                name: Some("not-default".into()),
                namespace: Some("shared".into()),
                resource_version: Some("9".into()),
                ..ObjectReference::default()
            },
            role_bindings: [("admins".to_string(), RoleBinding {
                metadata: ObjectMeta {
                    name: Some("admins".into()),
                    namespace: Some("dev".into()),
                    ..ObjectMeta::default()
                },
                role_ref,
                ..RoleBinding::default()
            })]
            .into(),
            ..PolicyBinding::default()
        }
    }

    #[test]
    fn create_derives_name_and_scrubs_references() {
        let mut binding = forged();
        PolicyBindingStrategy.prepare_for_create(&mut binding);
        assert_eq!(binding.metadata.name.as_deref(), Some("shared"));
        assert_eq!(binding.policy_ref, ObjectReference {
            namespace: Some("shared".into()),
            ..ObjectReference::default()
        });
        assert_eq!(binding.role_bindings["admins"].role_ref, ObjectReference {
            name: Some("admin".into()),
            namespace: Some("shared".into()),
            ..ObjectReference::default()
        });
    }

    #[test]
    fn scrubbing_is_idempotent() {
        let mut once = forged();
        PolicyBindingStrategy.prepare_for_create(&mut once);
        let mut twice = once.clone();
        PolicyBindingStrategy.prepare_for_create(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn update_cannot_smuggle_references() {
        let admission = Admission::new(PolicyBindingStrategy);
        let ctx = Context::with_namespace("dev");
        let stored = admission.create(&ctx, forged()).unwrap();

        let mut change = stored.clone();
        change.role_bindings.get_mut("admins").unwrap().role_ref.namespace = Some("elsewhere".into());
        change.policy_ref.kind = Some("Policy".into());
        let updated = admission.update(&ctx, change, Some(&stored)).unwrap();
        assert_eq!(updated.policy_ref, stored.policy_ref);
        assert_eq!(updated.role_bindings, stored.role_bindings);
    }

    #[test]
    fn update_of_missing_binding_is_refused() {
        let err = Admission::new(PolicyBindingStrategy)
            .update(&Context::with_namespace("dev"), forged(), None)
            .unwrap_err();
        assert_eq!(err.status().code, 404);
    }

    #[test]
    fn empty_binding() {
        let binding = new_empty_policy_binding("dev", "shared");
        assert_eq!(binding.name_any(), "shared");
        assert_eq!(binding.namespace_any(), "dev");
        assert_eq!(binding.policy_ref.name.as_deref(), Some(POLICY_NAME));
        assert_eq!(binding.last_modified, binding.metadata.creation_timestamp);
        assert!(binding.role_bindings.is_empty());
        assert!(validate_policy_binding(&binding).is_empty());
    }

    #[test]
    fn matcher_selects_on_enumerated_fields() {
        let binding = ApiObject::PolicyBinding(new_empty_policy_binding("dev", "shared"));
        let by_policy = matcher(
            labels::Selector::everything(),
            fields::Selector::from_iter([("policyRef.namespace", "shared")]),
        );
        assert_eq!(by_policy.matches(&binding), Ok(true));

        let not_shared = matcher(
            labels::Selector::everything(),
            Requirement::NotEqual("name".into(), "shared".into()).into(),
        );
        assert_eq!(not_shared.matches(&binding), Ok(false));

        let by_label = matcher(labels::Selector::from_iter([("team", "a")]), fields::Selector::everything());
        assert_eq!(by_label.matches(&binding), Ok(false));
    }

    #[test]
    fn matcher_refuses_other_kinds() {
        let pred = matcher(
            labels::Selector::everything(),
            fields::Selector::from_iter([("name", "shared")]),
        );
        let err = pred
            .matches(&ApiObject::DeploymentConfig(DeploymentConfig::default()))
            .unwrap_err();
        assert_eq!(err.to_string(), "not a PolicyBinding: got DeploymentConfig");

        let everything = matcher(labels::Selector::everything(), fields::Selector::everything());
        assert!(everything
            .matches(&ApiObject::DeploymentConfig(DeploymentConfig::default()))
            .is_err());
    }
}
