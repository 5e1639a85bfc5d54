//! Loads a master configuration file and prints it with defaults applied
//! and every certificate path made absolute.
use admit_api::{
    scheme,
    server::config::{master_config_to_yaml, read_master_config},
    v1,
};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::*;

#[derive(Parser)]
struct App {
    /// Path to the master configuration
    #[arg(default_value = "master-config.yaml")]
    file: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let app = App::parse();
    let scheme = scheme();

    let config = read_master_config(&scheme, &app.file)?;
    let storage = &config.etcd_storage_config;
    info!(
        kubernetes = %storage.kubernetes_storage_version,
        openshift = %storage.openshift_storage_version,
        "etcd storage versions"
    );
    if config.master_client_info.is_none() {
        debug!("no masterClientInfo configured");
    }
    print!("{}", master_config_to_yaml(&scheme, config, &v1())?);
    Ok(())
}
