//! Per-kind lifecycle policy applied around create and update.
use crate::{field::ErrorList, resource::Resource};

/// Request scoped information handed to strategies
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    namespace: Option<String>,
}

impl Context {
    /// A context without a request namespace, as used for cluster scoped requests
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for a request made against `namespace`
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
        }
    }

    /// The namespace the request was made against
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|ns| !ns.is_empty())
    }
}

/// Creation and update behaviour for one kind of object.
///
/// Implementations are stateless; the same strategy serves every request for
/// its kind. See [`Admission`](crate::admission::Admission) for the order in
/// which the hooks run.
pub trait Strategy {
    /// The internal type this strategy governs
    type Object: Resource;

    /// Whether objects of this kind live inside a namespace
    fn namespace_scoped(&self) -> bool;

    /// Whether an update of a missing object may create it
    fn allow_create_on_update(&self) -> bool;

    /// Derives a name from a requested base name
    fn generate_name(&self, base: &str) -> String;

    /// Clears or derives fields end users may not set on creation
    fn prepare_for_create(&self, obj: &mut Self::Object);

    /// Clears or derives fields end users may not set on update
    fn prepare_for_update(&self, obj: &mut Self::Object, old: &Self::Object);

    /// Fills in values that validation treats as implied.
    ///
    /// Runs immediately before [`validate`](Strategy::validate) and
    /// [`validate_update`](Strategy::validate_update).
    fn default_for_validation(&self, _obj: &mut Self::Object) {}

    /// Validates a new object
    fn validate(&self, ctx: &Context, obj: &Self::Object) -> ErrorList;

    /// Validates an object against its previous version
    fn validate_update(&self, ctx: &Context, obj: &Self::Object, old: &Self::Object) -> ErrorList;
}
