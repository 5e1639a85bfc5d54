//! Loading and writing master configuration files.
//!
//! Files are YAML documents carrying `apiVersion` and `kind`; they are decoded
//! through the [`Scheme`] so that version defaults apply. Certificate and CA
//! paths that are relative are taken relative to the file.
use super::MasterConfig;
use admit_core::{scheme, GroupVersion, Scheme};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors loading or writing a master configuration
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read the file
    #[error("failed to read master config from {1:?}: {0}")]
    ReadConfig(#[source] std::io::Error, PathBuf),

    /// The file is not YAML
    #[error("failed to parse master config YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The document is not a master config of a known version
    #[error("failed to convert master config: {0}")]
    Convert(#[source] scheme::Error),

    /// Failed to render YAML
    #[error("failed to serialize master config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Reads a master configuration file, resolving relative paths against its directory
pub fn read_master_config<P: AsRef<Path>>(scheme: &Scheme, path: P) -> Result<MasterConfig, Error> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| Error::ReadConfig(source, path.into()))?;
    let mut config = master_config_from_yaml(scheme, &data)?;
    if let Some(dir) = path.parent() {
        config.resolve_relative_paths(dir);
    }
    tracing::debug!(path = %path.display(), "loaded master config");
    Ok(config)
}

/// Decodes a master configuration document; paths are left as written
pub fn master_config_from_yaml(scheme: &Scheme, data: &str) -> Result<MasterConfig, Error> {
    let value: serde_json::Value = serde_yaml::from_str(data).map_err(Error::Parse)?;
    scheme.to_internal(value).map_err(Error::Convert)
}

/// Encodes a master configuration as a YAML document of version `gv`
pub fn master_config_to_yaml(scheme: &Scheme, config: MasterConfig, gv: &GroupVersion) -> Result<String, Error> {
    let value = scheme.to_external(config, gv).map_err(Error::Convert)?;
    serde_yaml::to_string(&value).map_err(Error::Serialize)
}

impl MasterConfig {
    /// Rewrites every relative file path as a path under `dir`
    pub fn resolve_relative_paths(&mut self, dir: &Path) {
        for file in self.file_paths_mut() {
            if let Some(abs_path) = to_absolute(dir, file) {
                *file = abs_path;
            }
        }
    }
}

fn to_absolute(dir: &Path, file: &str) -> Option<String> {
    let path = Path::new(file);
    if !file.is_empty() && path.is_relative() {
        dir.join(path).to_str().map(str::to_owned)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{DEFAULT_KUBERNETES_STORAGE_VERSION, DEFAULT_OPENSHIFT_STORAGE_VERSION};
    use std::io::Write;

    const CONFIG: &str = r#"
apiVersion: v1
kind: MasterConfig
servingInfo:
  bindAddress: 0.0.0.0:8443
  certFile: master.server.crt
  keyFile: master.server.key
  clientCA: /etc/pki/ca.crt
etcdClientInfo:
  urls:
  - https://127.0.0.1:4001
  ca: ca.crt
kubeletClientInfo:
  port: 10250
etcdStorageConfig:
  kubernetesStoragePrefix: kubernetes.io
"#;

    #[test]
    fn read_resolves_relative_paths_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("master-config.yaml");
        fs::File::create(&path).unwrap().write_all(CONFIG.as_bytes()).unwrap();

        let config = read_master_config(&crate::scheme(), &path).unwrap();
        let expected_cert = dir.path().join("master.server.crt");
        assert_eq!(config.serving_info.server_cert.cert_file, expected_cert.to_str().unwrap());
        assert_eq!(config.serving_info.client_ca, "/etc/pki/ca.crt");
        assert_eq!(config.etcd_client_info.ca, dir.path().join("ca.crt").to_str().unwrap());
        assert_eq!(config.kubelet_client_info.ca, "");
        assert_eq!(config.kubelet_client_info.port, 10250);

        let storage = &config.etcd_storage_config;
        assert_eq!(storage.kubernetes_storage_version, DEFAULT_KUBERNETES_STORAGE_VERSION);
        assert_eq!(storage.openshift_storage_version, DEFAULT_OPENSHIFT_STORAGE_VERSION);
        assert_eq!(storage.kubernetes_storage_prefix, "kubernetes.io");
    }

    #[test]
    fn defaults_apply_on_read_only() {
        let scheme = crate::scheme();
        let yaml = master_config_to_yaml(&scheme, MasterConfig::default(), &GroupVersion::gv("", "v1")).unwrap();
        let written: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(written["kind"], "MasterConfig");
        assert_eq!(written["etcdStorageConfig"], serde_json::json!({}));

        let reread = master_config_from_yaml(&scheme, &yaml).unwrap();
        assert_eq!(reread.etcd_storage_config.kubernetes_storage_version, "v1beta3");
        assert_eq!(reread.etcd_storage_config.openshift_storage_version, "v1beta1");
    }

    #[test]
    fn written_paths_are_kept_as_stored() {
        let scheme = crate::scheme();
        let config = master_config_from_yaml(&scheme, CONFIG).unwrap();
        let yaml = master_config_to_yaml(&scheme, config.clone(), &GroupVersion::gv("", "v1")).unwrap();
        let written: serde_json::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(written["servingInfo"]["certFile"], "master.server.crt");
        assert_eq!(master_config_from_yaml(&scheme, &yaml).unwrap(), config);
    }

    #[test]
    fn missing_file() {
        let err = read_master_config(&crate::scheme(), "/nonexistent/master-config.yaml").unwrap_err();
        assert!(matches!(err, Error::ReadConfig(_, ref p) if p == Path::new("/nonexistent/master-config.yaml")));
    }

    #[test]
    fn wrong_kind() {
        let yaml = "apiVersion: v1\nkind: PolicyBinding\nmetadata:\n  name: a\n";
        let err = master_config_from_yaml(&crate::scheme(), yaml).unwrap_err();
        assert!(matches!(err, Error::Convert(scheme::Error::TypeMismatch { .. })));
    }
}
