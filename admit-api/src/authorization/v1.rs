//! Wire layout of the authorization kinds in `v1`.
//!
//! Maps and sets are ordered lists on the wire: role bindings are a list of
//! named entries, users and groups are lists of names.
use admit_core::{
    field::{ErrorList, FieldError, Path},
    metadata::{ObjectMeta, ObjectReference, Time},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wire form of [`super::PolicyBinding`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyBinding {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// When any of the role bindings last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Time>,
    /// The policy whose roles are bound
    #[serde(default)]
    pub policy_ref: ObjectReference,
    /// Role bindings, ordered by name
    #[serde(default)]
    pub role_bindings: Vec<NamedRoleBinding>,
}

/// A role binding and the key it is stored under
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRoleBinding {
    /// Key of the binding
    pub name: String,
    /// The binding
    pub role_binding: RoleBinding,
}

/// Wire form of [`super::RoleBinding`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// The role granted
    #[serde(default)]
    pub role_ref: ObjectReference,
    /// Users holding the role
    #[serde(default)]
    pub user_names: Vec<String>,
    /// Groups holding the role
    #[serde(default)]
    pub group_names: Vec<String>,
}

/// Reports role binding names that appear more than once.
///
/// The internal form keys role bindings by name, so converting keeps only the
/// last entry of each name. Run this on the wire form to refuse such bindings.
pub fn validate_role_binding_names(binding: &PolicyBinding) -> ErrorList {
    let mut errs = ErrorList::new();
    let mut seen = BTreeSet::new();
    for (i, named) in binding.role_bindings.iter().enumerate() {
        if !seen.insert(named.name.as_str()) {
            errs.push(FieldError::duplicate(
                Path::new("name").index(i).field("roleBindings"),
                named.name.as_str(),
            ));
        }
    }
    errs
}

impl From<PolicyBinding> for super::PolicyBinding {
    fn from(binding: PolicyBinding) -> Self {
        Self {
            metadata: binding.metadata,
            last_modified: binding.last_modified,
            policy_ref: binding.policy_ref,
            role_bindings: binding
                .role_bindings
                .into_iter()
                .map(|named| (named.name, named.role_binding.into()))
                .collect(),
        }
    }
}

impl From<super::PolicyBinding> for PolicyBinding {
    fn from(binding: super::PolicyBinding) -> Self {
        Self {
            metadata: binding.metadata,
            last_modified: binding.last_modified,
            policy_ref: binding.policy_ref,
            role_bindings: binding
                .role_bindings
                .into_iter()
                .map(|(name, role_binding)| NamedRoleBinding {
                    name,
                    role_binding: role_binding.into(),
                })
                .collect(),
        }
    }
}

impl From<RoleBinding> for super::RoleBinding {
    fn from(binding: RoleBinding) -> Self {
        Self {
            metadata: binding.metadata,
            role_ref: binding.role_ref,
            users: binding.user_names.into_iter().collect(),
            groups: binding.group_names.into_iter().collect(),
        }
    }
}

impl From<super::RoleBinding> for RoleBinding {
    fn from(binding: super::RoleBinding) -> Self {
        Self {
            metadata: binding.metadata,
            role_ref: binding.role_ref,
            user_names: binding.users.into_iter().collect(),
            group_names: binding.groups.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn role_bindings_become_a_map() {
        let wire = json!({
            "metadata": { "name": "shared", "namespace": "dev" },
            "policyRef": { "namespace": "shared" },
            "roleBindings": [
                {
                    "name": "admins",
                    "roleBinding": {
                        "metadata": { "name": "admins", "namespace": "dev" },
                        "roleRef": { "name": "admin", "namespace": "shared" },
                        "userNames": ["alice", "bob"],
                        "groupNames": []
                    }
                },
                {
                    "name": "viewers",
                    "roleBinding": {
                        "metadata": { "name": "viewers", "namespace": "dev" },
                        "roleRef": { "name": "view", "namespace": "shared" },
                        "userNames": [],
                        "groupNames": ["qa"]
                    }
                }
            ]
        });
        let binding: PolicyBinding = serde_json::from_value(wire.clone()).unwrap();
        let internal = super::super::PolicyBinding::from(binding);
        assert_eq!(
            internal.role_bindings.keys().collect::<Vec<_>>(),
            ["admins", "viewers"]
        );
        assert!(internal.role_bindings["admins"].users.contains("bob"));
        assert!(internal.role_bindings["viewers"].groups.contains("qa"));

        let back = serde_json::to_value(PolicyBinding::from(internal)).unwrap();
        assert_json_eq!(back, wire);
    }

    #[test]
    fn duplicate_role_binding_names() {
        let named = |name: &str, role: &str| NamedRoleBinding {
            name: name.into(),
            role_binding: RoleBinding {
                role_ref: ObjectReference {
                    name: Some(role.into()),
                    ..ObjectReference::default()
                },
                ..RoleBinding::default()
            },
        };
        let binding = PolicyBinding {
            role_bindings: vec![named("admins", "admin"), named("viewers", "view"), named("admins", "edit")],
            ..PolicyBinding::default()
        };
        let errs = validate_role_binding_names(&binding);
        assert_eq!(errs.to_string(), "[roleBindings[2].name: Duplicate value: \"admins\"]");

        let internal = super::super::PolicyBinding::from(binding);
        assert_eq!(internal.role_bindings.len(), 2);
        assert_eq!(internal.role_bindings["admins"].role_ref.name.as_deref(), Some("edit"));

        let unique = PolicyBinding::from(internal);
        assert!(validate_role_binding_names(&unique).is_empty());
    }

    #[test]
    fn duplicate_user_names_collapse() {
        let binding = RoleBinding {
            user_names: vec!["bob".into(), "alice".into(), "bob".into()],
            ..RoleBinding::default()
        };
        let internal = super::super::RoleBinding::from(binding);
        assert_eq!(RoleBinding::from(internal).user_names, ["alice", "bob"]);
    }
}
