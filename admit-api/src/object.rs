use crate::{authorization, deploy, server};
use admit_core::{
    metadata::TypeMeta,
    scheme::{Error, Result},
    GroupVersion, GroupVersionKind, Resource, Scheme,
};

/// Kind name of [`deploy::DeploymentConfigRollback`]
pub const DEPLOYMENT_CONFIG_ROLLBACK_KIND: &str = "DeploymentConfigRollback";
/// Kind name of [`server::MasterConfig`]
pub const MASTER_CONFIG_KIND: &str = "MasterConfig";

/// Any internal object this crate knows about.
///
/// Wire objects are resolved to a variant once, by [`ApiObject::decode`].
#[derive(Clone, Debug, PartialEq)]
pub enum ApiObject {
    /// A deployment config
    DeploymentConfig(deploy::DeploymentConfig),
    /// A single deployment
    Deployment(deploy::Deployment),
    /// A rollback request
    DeploymentConfigRollback(deploy::DeploymentConfigRollback),
    /// A policy binding
    PolicyBinding(authorization::PolicyBinding),
    /// Master process configuration
    MasterConfig(server::MasterConfig),
}

impl ApiObject {
    /// Kind name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ApiObject::DeploymentConfig(_) => deploy::DeploymentConfig::KIND,
            ApiObject::Deployment(_) => deploy::Deployment::KIND,
            ApiObject::DeploymentConfigRollback(_) => DEPLOYMENT_CONFIG_ROLLBACK_KIND,
            ApiObject::PolicyBinding(_) => authorization::PolicyBinding::KIND,
            ApiObject::MasterConfig(_) => MASTER_CONFIG_KIND,
        }
    }

    /// Decodes a wire object of any registered kind
    pub fn decode(scheme: &Scheme, value: serde_json::Value) -> Result<Self> {
        let types = TypeMeta::of(&value);
        match types.kind.as_str() {
            deploy::DeploymentConfig::KIND => scheme.to_internal(value).map(ApiObject::DeploymentConfig),
            deploy::Deployment::KIND => scheme.to_internal(value).map(ApiObject::Deployment),
            DEPLOYMENT_CONFIG_ROLLBACK_KIND => scheme.to_internal(value).map(ApiObject::DeploymentConfigRollback),
            authorization::PolicyBinding::KIND => scheme.to_internal(value).map(ApiObject::PolicyBinding),
            MASTER_CONFIG_KIND => scheme.to_internal(value).map(ApiObject::MasterConfig),
            kind => {
                if types.api_version.is_empty() {
                    return Err(Error::MissingTypeMeta("apiVersion"));
                }
                if kind.is_empty() {
                    return Err(Error::MissingTypeMeta("kind"));
                }
                let gvk = GroupVersionKind::from_api_version(&types.api_version, kind)?;
                Err(Error::NotRegistered(gvk))
            }
        }
    }

    /// Encodes the object as the wire type registered for it in `gv`
    pub fn encode(self, scheme: &Scheme, gv: &GroupVersion) -> Result<serde_json::Value> {
        match self {
            ApiObject::DeploymentConfig(o) => scheme.to_external(o, gv),
            ApiObject::Deployment(o) => scheme.to_external(o, gv),
            ApiObject::DeploymentConfigRollback(o) => scheme.to_external(o, gv),
            ApiObject::PolicyBinding(o) => scheme.to_external(o, gv),
            ApiObject::MasterConfig(o) => scheme.to_external(o, gv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_resolves_the_variant() {
        let scheme = crate::scheme();
        let obj = ApiObject::decode(
            &scheme,
            json!({
                "apiVersion": "v1",
                "kind": "DeploymentConfigRollback",
                "spec": { "from": { "name": "dc-1" } }
            }),
        )
        .unwrap();
        assert_eq!(obj.kind(), "DeploymentConfigRollback");
        let ApiObject::DeploymentConfigRollback(rollback) = &obj else {
            panic!("decoded {}", obj.kind());
        };
        assert_eq!(rollback.spec.from.name.as_deref(), Some("dc-1"));

        let wire = obj.encode(&scheme, &GroupVersion::gv("", "v1")).unwrap();
        assert_eq!(wire["kind"], "DeploymentConfigRollback");
        assert_eq!(wire["apiVersion"], "v1");
    }

    #[test]
    fn decode_failures() {
        let scheme = crate::scheme();
        let unknown = ApiObject::decode(&scheme, json!({ "apiVersion": "v1", "kind": "Build" })).unwrap_err();
        assert_eq!(unknown.to_string(), "no kind v1, Kind=Build is registered");
        assert!(matches!(
            ApiObject::decode(&scheme, json!({ "kind": "Build" })),
            Err(Error::MissingTypeMeta("apiVersion"))
        ));
        assert!(matches!(
            ApiObject::decode(&scheme, json!({ "apiVersion": "v1" })),
            Err(Error::MissingTypeMeta("kind"))
        ));
        assert!(matches!(
            ApiObject::decode(&scheme, json!({ "apiVersion": "v2", "kind": "PolicyBinding" })),
            Err(Error::NotRegistered(_))
        ));
    }
}
