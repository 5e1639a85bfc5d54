use crate::metadata::ObjectMeta;
use std::{collections::BTreeMap, sync::LazyLock};

/// An accessor trait for internal objects carrying [`ObjectMeta`].
pub trait Resource {
    /// Kind name used in messages and status details
    const KIND: &'static str;

    /// Metadata that all persisted objects must have
    fn meta(&self) -> &ObjectMeta;
    /// Metadata that all persisted objects must have
    fn meta_mut(&mut self) -> &mut ObjectMeta;
}

static EMPTY_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(BTreeMap::new);

/// Helper methods for objects implementing [`Resource`]
///
/// Absent and empty strings read the same through these accessors.
pub trait ResourceExt: Resource {
    /// The name, empty when unset
    fn name_any(&self) -> &str;
    /// The namespace, empty when unset
    fn namespace_any(&self) -> &str;
    /// The labels, empty when unset
    fn labels(&self) -> &BTreeMap<String, String>;
}

impl<K: Resource> ResourceExt for K {
    fn name_any(&self) -> &str {
        self.meta().name.as_deref().unwrap_or_default()
    }

    fn namespace_any(&self) -> &str {
        self.meta().namespace.as_deref().unwrap_or_default()
    }

    fn labels(&self) -> &BTreeMap<String, String> {
        self.meta().labels.as_ref().unwrap_or(&EMPTY_MAP)
    }
}
