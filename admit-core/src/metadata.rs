//! Metadata structs shared by every internal and external object.
pub use k8s_openapi::{
    api::core::v1::{EnvVar, ObjectReference},
    apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time},
};
use serde::{Deserialize, Serialize};

/// Type information that is flattened into every wire object
#[derive(Deserialize, Serialize, Clone, Default, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// The version of the API
    #[serde(default)]
    pub api_version: String,

    /// The name of the API
    #[serde(default)]
    pub kind: String,
}

impl TypeMeta {
    /// Read the type fields of a wire object, leaving absent fields empty
    pub fn of(value: &serde_json::Value) -> Self {
        let field = |key: &str| value.get(key).and_then(|v| v.as_str()).unwrap_or_default().to_string();
        Self {
            api_version: field("apiVersion"),
            kind: field("kind"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_meta_of_wire_object() {
        let value = serde_json::json!({ "apiVersion": "v1", "kind": "PolicyBinding", "metadata": {} });
        assert_eq!(TypeMeta::of(&value), TypeMeta {
            api_version: "v1".into(),
            kind: "PolicyBinding".into(),
        });
        assert_eq!(TypeMeta::of(&serde_json::json!({ "kind": 3 })), TypeMeta::default());
    }
}
