//! Master process configuration.
//!
//! Internally every client or serving certificate is a [`CertInfo`]; the `v1`
//! wire layout flattens it into `certFile`/`keyFile` on the owning block.
use serde::{Deserialize, Serialize};

pub mod config;
pub mod v1;

pub use config::{read_master_config, Error};

/// Storage version used for upstream objects when none is configured
pub const DEFAULT_KUBERNETES_STORAGE_VERSION: &str = "v1beta3";
/// Storage version used for platform objects when none is configured
pub const DEFAULT_OPENSHIFT_STORAGE_VERSION: &str = "v1beta1";

/// Settings of the master process
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MasterConfig {
    /// Where and how the API is served
    pub serving_info: ServingInfo,
    /// How to reach etcd
    pub etcd_client_info: EtcdConnectionInfo,
    /// How to reach kubelets
    pub kubelet_client_info: KubeletConnectionInfo,
    /// How to reach another master, when this one is not standalone
    pub master_client_info: Option<RemoteConnectionInfo>,
    /// Storage versions and prefixes inside etcd
    pub etcd_storage_config: EtcdStorageConfig,
}

/// A certificate and its private key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertInfo {
    /// PEM encoded certificate
    pub cert_file: String,
    /// PEM encoded private key
    pub key_file: String,
}

/// Listening address and server certificate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServingInfo {
    /// `host:port` to listen on
    pub bind_address: String,
    /// Certificate presented to clients
    pub server_cert: CertInfo,
    /// Bundle used to verify client certificates
    pub client_ca: String,
}

/// A remote API server
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteConnectionInfo {
    /// Base URL of the server
    pub url: String,
    /// Bundle used to verify the server
    pub ca: String,
    /// Certificate presented to the server
    pub client_cert: CertInfo,
}

/// An etcd cluster
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EtcdConnectionInfo {
    /// Client URLs of the members
    pub urls: Vec<String>,
    /// Bundle used to verify the members
    pub ca: String,
    /// Certificate presented to the members
    pub client_cert: CertInfo,
}

/// The kubelets of the cluster
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KubeletConnectionInfo {
    /// Port every kubelet listens on
    pub port: u16,
    /// Bundle used to verify kubelets
    pub ca: String,
    /// Certificate presented to kubelets
    pub client_cert: CertInfo,
}

/// Storage versions and key prefixes in etcd.
///
/// The two API families are versioned independently and each has its own default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtcdStorageConfig {
    /// Storage version of upstream objects
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubernetes_storage_version: String,
    /// Key prefix of upstream objects
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kubernetes_storage_prefix: String,
    /// Storage version of platform objects
    #[serde(default, rename = "openShiftStorageVersion", skip_serializing_if = "String::is_empty")]
    pub openshift_storage_version: String,
    /// Key prefix of platform objects
    #[serde(default, rename = "openShiftStoragePrefix", skip_serializing_if = "String::is_empty")]
    pub openshift_storage_prefix: String,
}

impl MasterConfig {
    /// Every file path named in the configuration, for rewriting in place
    pub(crate) fn file_paths_mut(&mut self) -> Vec<&mut String> {
        let mut paths = vec![
            &mut self.serving_info.server_cert.cert_file,
            &mut self.serving_info.server_cert.key_file,
            &mut self.serving_info.client_ca,
            &mut self.etcd_client_info.ca,
            &mut self.etcd_client_info.client_cert.cert_file,
            &mut self.etcd_client_info.client_cert.key_file,
            &mut self.kubelet_client_info.ca,
            &mut self.kubelet_client_info.client_cert.cert_file,
            &mut self.kubelet_client_info.client_cert.key_file,
        ];
        if let Some(remote) = &mut self.master_client_info {
            paths.extend([
                &mut remote.ca,
                &mut remote.client_cert.cert_file,
                &mut remote.client_cert.key_file,
            ]);
        }
        paths
    }
}
