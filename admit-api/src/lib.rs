//! Concrete kinds for the admission core
//!
//! Three API groups live here, each with an internal representation, a `v1`
//! wire layout, conversions between the two, validation and, for stored
//! kinds, an admission [`Strategy`](admit_core::Strategy):
//!
//! - [`deploy`]: deployment configs, deployments and rollbacks
//! - [`authorization`]: policy bindings
//! - [`server`]: master process configuration
//!
//! [`scheme()`] registers every kind; build it once at startup and share it.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]

pub mod authorization;
pub mod deploy;
pub mod server;

mod object;
pub use object::{ApiObject, DEPLOYMENT_CONFIG_ROLLBACK_KIND, MASTER_CONFIG_KIND};

use admit_core::{GroupVersion, Resource, Scheme};

/// The only version served so far
pub const V1: &str = "v1";

/// The group version every kind is registered in
pub fn v1() -> GroupVersion {
    GroupVersion::gv("", V1)
}

/// Builds the scheme with every kind of this crate.
///
/// # Panics
/// When a registration is malformed; call once during startup.
pub fn scheme() -> Scheme {
    let v1 = v1();
    Scheme::builder()
        .add_known_type::<deploy::v1::DeploymentConfig, deploy::DeploymentConfig>(
            &v1,
            deploy::DeploymentConfig::KIND,
        )
        .add_known_type::<deploy::v1::Deployment, deploy::Deployment>(&v1, deploy::Deployment::KIND)
        .add_known_type::<deploy::v1::DeploymentConfigRollback, deploy::DeploymentConfigRollback>(
            &v1,
            DEPLOYMENT_CONFIG_ROLLBACK_KIND,
        )
        .add_known_type::<authorization::v1::PolicyBinding, authorization::PolicyBinding>(
            &v1,
            authorization::PolicyBinding::KIND,
        )
        .add_known_type::<server::v1::MasterConfig, server::MasterConfig>(&v1, MASTER_CONFIG_KIND)
        .add_defaulting_func::<server::v1::MasterConfig>(server::v1::default_master_config)
        .build()
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
