//! Policy bindings: which users and groups hold which roles of a policy.
use admit_core::{
    metadata::{ObjectMeta, ObjectReference, Time},
    Resource,
};
use std::collections::{BTreeMap, BTreeSet};

pub mod policybinding;
pub mod v1;
pub mod validation;

pub use policybinding::PolicyBindingStrategy;

/// Name of the single policy in each namespace
pub const POLICY_NAME: &str = "default";

/// The role bindings a namespace grants against one source policy.
///
/// A binding is named after the namespace of the policy it refers to, so a
/// namespace holds at most one binding per source policy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyBinding {
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// When any of the role bindings last changed
    pub last_modified: Option<Time>,
    /// The policy whose roles are bound; only its namespace is kept
    pub policy_ref: ObjectReference,
    /// Role bindings keyed by their name
    pub role_bindings: BTreeMap<String, RoleBinding>,
}

impl Resource for PolicyBinding {
    const KIND: &'static str = "PolicyBinding";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Grants one role to a set of users and groups
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleBinding {
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// The role granted; only its name and namespace are kept
    pub role_ref: ObjectReference,
    /// Users holding the role
    pub users: BTreeSet<String>,
    /// Groups holding the role
    pub groups: BTreeSet<String>,
}

impl Resource for RoleBinding {
    const KIND: &'static str = "RoleBinding";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
