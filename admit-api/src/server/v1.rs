//! Wire layout of the master configuration in `v1`.
use super::{
    CertInfo, EtcdStorageConfig, DEFAULT_KUBERNETES_STORAGE_VERSION, DEFAULT_OPENSHIFT_STORAGE_VERSION,
};
use serde::{Deserialize, Serialize};

/// Wire form of [`super::MasterConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterConfig {
    /// Where and how the API is served
    #[serde(default)]
    pub serving_info: ServingInfo,
    /// How to reach etcd
    #[serde(default)]
    pub etcd_client_info: EtcdConnectionInfo,
    /// How to reach kubelets
    #[serde(default)]
    pub kubelet_client_info: KubeletConnectionInfo,
    /// How to reach another master
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_client_info: Option<RemoteConnectionInfo>,
    /// Storage versions and prefixes inside etcd
    #[serde(default)]
    pub etcd_storage_config: EtcdStorageConfig,
}

/// Wire form of [`super::ServingInfo`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServingInfo {
    /// `host:port` to listen on
    #[serde(default)]
    pub bind_address: String,
    /// Server certificate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    /// Server private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_file: String,
    /// Bundle used to verify client certificates
    #[serde(default, rename = "clientCA", skip_serializing_if = "String::is_empty")]
    pub client_ca: String,
}

/// Wire form of [`super::RemoteConnectionInfo`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConnectionInfo {
    /// Base URL of the server
    #[serde(default)]
    pub url: String,
    /// Bundle used to verify the server
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca: String,
    /// Client certificate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    /// Client private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_file: String,
}

/// Wire form of [`super::EtcdConnectionInfo`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdConnectionInfo {
    /// Client URLs of the members
    #[serde(default)]
    pub urls: Vec<String>,
    /// Bundle used to verify the members
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca: String,
    /// Client certificate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    /// Client private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_file: String,
}

/// Wire form of [`super::KubeletConnectionInfo`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeletConnectionInfo {
    /// Port every kubelet listens on
    #[serde(default)]
    pub port: u16,
    /// Bundle used to verify kubelets
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ca: String,
    /// Client certificate
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cert_file: String,
    /// Client private key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_file: String,
}

/// Fills in unset storage versions, each with its own default
pub fn default_etcd_storage_config(config: &mut EtcdStorageConfig) {
    if config.kubernetes_storage_version.is_empty() {
        config.kubernetes_storage_version = DEFAULT_KUBERNETES_STORAGE_VERSION.to_string();
    }
    if config.openshift_storage_version.is_empty() {
        config.openshift_storage_version = DEFAULT_OPENSHIFT_STORAGE_VERSION.to_string();
    }
}

/// Defaulting function registered for [`MasterConfig`]
pub fn default_master_config(config: &mut MasterConfig) {
    default_etcd_storage_config(&mut config.etcd_storage_config);
}

fn cert(cert_file: String, key_file: String) -> CertInfo {
    CertInfo { cert_file, key_file }
}

impl From<MasterConfig> for super::MasterConfig {
    fn from(c: MasterConfig) -> Self {
        Self {
            serving_info: c.serving_info.into(),
            etcd_client_info: c.etcd_client_info.into(),
            kubelet_client_info: c.kubelet_client_info.into(),
            master_client_info: c.master_client_info.map(Into::into),
            etcd_storage_config: c.etcd_storage_config,
        }
    }
}

impl From<super::MasterConfig> for MasterConfig {
    fn from(c: super::MasterConfig) -> Self {
        Self {
            serving_info: c.serving_info.into(),
            etcd_client_info: c.etcd_client_info.into(),
            kubelet_client_info: c.kubelet_client_info.into(),
            master_client_info: c.master_client_info.map(Into::into),
            etcd_storage_config: c.etcd_storage_config,
        }
    }
}

impl From<ServingInfo> for super::ServingInfo {
    fn from(s: ServingInfo) -> Self {
        Self {
            bind_address: s.bind_address,
            server_cert: cert(s.cert_file, s.key_file),
            client_ca: s.client_ca,
        }
    }
}

impl From<super::ServingInfo> for ServingInfo {
    fn from(s: super::ServingInfo) -> Self {
        Self {
            bind_address: s.bind_address,
            cert_file: s.server_cert.cert_file,
            key_file: s.server_cert.key_file,
            client_ca: s.client_ca,
        }
    }
}

impl From<RemoteConnectionInfo> for super::RemoteConnectionInfo {
    fn from(r: RemoteConnectionInfo) -> Self {
        Self {
            url: r.url,
            ca: r.ca,
            client_cert: cert(r.cert_file, r.key_file),
        }
    }
}

impl From<super::RemoteConnectionInfo> for RemoteConnectionInfo {
    fn from(r: super::RemoteConnectionInfo) -> Self {
        Self {
            url: r.url,
            ca: r.ca,
            cert_file: r.client_cert.cert_file,
            key_file: r.client_cert.key_file,
        }
    }
}

impl From<EtcdConnectionInfo> for super::EtcdConnectionInfo {
    fn from(e: EtcdConnectionInfo) -> Self {
        Self {
            urls: e.urls,
            ca: e.ca,
            client_cert: cert(e.cert_file, e.key_file),
        }
    }
}

impl From<super::EtcdConnectionInfo> for EtcdConnectionInfo {
    fn from(e: super::EtcdConnectionInfo) -> Self {
        Self {
            urls: e.urls,
            ca: e.ca,
            cert_file: e.client_cert.cert_file,
            key_file: e.client_cert.key_file,
        }
    }
}

impl From<KubeletConnectionInfo> for super::KubeletConnectionInfo {
    fn from(k: KubeletConnectionInfo) -> Self {
        Self {
            port: k.port,
            ca: k.ca,
            client_cert: cert(k.cert_file, k.key_file),
        }
    }
}

impl From<super::KubeletConnectionInfo> for KubeletConnectionInfo {
    fn from(k: super::KubeletConnectionInfo) -> Self {
        Self {
            port: k.port,
            ca: k.ca,
            cert_file: k.client_cert.cert_file,
            key_file: k.client_cert.key_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_versions_default_independently() {
        let mut config = EtcdStorageConfig {
            kubernetes_storage_version: "v1".into(),
            ..EtcdStorageConfig::default()
        };
        default_etcd_storage_config(&mut config);
        assert_eq!(config.kubernetes_storage_version, "v1");
        assert_eq!(config.openshift_storage_version, "v1beta1");

        let mut config = EtcdStorageConfig::default();
        default_etcd_storage_config(&mut config);
        assert_eq!(config.kubernetes_storage_version, "v1beta3");
        assert_eq!(config.openshift_storage_version, "v1beta1");
    }

    #[test]
    fn certificates_are_nested_internally() {
        let wire = KubeletConnectionInfo {
            port: 10250,
            ca: "ca.crt".into(),
            cert_file: "kubelet.crt".into(),
            key_file: "kubelet.key".into(),
        };
        let internal = super::super::KubeletConnectionInfo::from(wire.clone());
        assert_eq!(internal.client_cert, CertInfo {
            cert_file: "kubelet.crt".into(),
            key_file: "kubelet.key".into(),
        });
        assert_eq!(KubeletConnectionInfo::from(internal), wire);
    }
}
