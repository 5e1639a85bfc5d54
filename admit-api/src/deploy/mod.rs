//! Deployment configs, deployments and rollbacks.
//!
//! The types in this module are the internal, version independent
//! representation; [`v1`] holds the wire layout.
use admit_core::{
    metadata::{EnvVar, ObjectMeta, ObjectReference},
    Resource,
};
use k8s_openapi::api::core::v1::ReplicationControllerSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod strategy;
pub mod v1;
pub mod validation;

pub use strategy::DeploymentConfigStrategy;

/// The only kind a rollback may target
pub const ROLLBACK_FROM_KIND: &str = "ReplicationController";
/// Kind assumed for an image change trigger that names a source without a kind
pub const DEFAULT_IMAGE_CHANGE_FROM_KIND: &str = "ImageStream";
/// Kinds an image change trigger may watch
pub const IMAGE_CHANGE_FROM_KINDS: [&str; 2] = ["ImageStream", "ImageRepository"];

/// Declares a closed set of discriminator values with a catch-all for unknown ones.
///
/// The empty discriminator has no variant; it maps to `None` at the conversion boundary.
macro_rules! discriminator {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this version does not know about
            Other(String),
        }

        impl $name {
            /// Parses a wire value, `None` for the empty string
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    "" => None,
                    $($wire => Some(Self::$variant),)+
                    other => Some(Self::Other(other.to_string())),
                }
            }

            /// The wire value
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(other) => other,
                }
            }

            pub(crate) fn to_wire(value: Option<&Self>) -> String {
                value.map(|v| v.as_str().to_string()).unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

discriminator! {
    /// How a deployment replaces the previous one
    DeploymentStrategyType {
        /// Scale the old deployment down before bringing the new one up
        Recreate => "Recreate",
        /// Run a user supplied image that performs the deployment
        Custom => "Custom",
        /// Replace pods incrementally
        Rolling => "Rolling",
    }
}

discriminator! {
    /// What to do when a lifecycle hook fails
    LifecycleHookFailurePolicy {
        /// Retry the hook until it succeeds
        Retry => "Retry",
        /// Fail the deployment
        Abort => "Abort",
        /// Carry on with the deployment
        Ignore => "Ignore",
    }
}

discriminator! {
    /// The event that starts a new deployment
    DeploymentTriggerType {
        /// A new image was pushed to a watched repository
        ImageChange => "ImageChange",
        /// The deployment config template changed
        ConfigChange => "ConfigChange",
    }
}

discriminator! {
    /// Progress of a single deployment
    DeploymentStatus {
        /// Created but not yet picked up
        New => "New",
        /// Waiting for resources
        Pending => "Pending",
        /// In progress
        Running => "Running",
        /// Finished successfully
        Complete => "Complete",
        /// Finished unsuccessfully
        Failed => "Failed",
    }
}

/// A template for deployments plus the triggers that start them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentConfig {
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// Events that cause a new deployment
    pub triggers: Vec<DeploymentTriggerPolicy>,
    /// What each deployment looks like
    pub template: DeploymentTemplate,
    /// Version of the most recent deployment, system managed
    pub latest_version: i64,
    /// Why the most recent deployment happened, system managed
    pub details: Option<DeploymentDetails>,
}

impl Resource for DeploymentConfig {
    const KIND: &'static str = "DeploymentConfig";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Strategy and replication controller a deployment is built from
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentTemplate {
    /// How the deployment is rolled out
    pub strategy: DeploymentStrategy,
    /// The replication controller each deployment creates
    pub controller_template: ReplicationControllerSpec,
}

/// One concrete rollout of a deployment config
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deployment {
    /// Standard object metadata
    pub metadata: ObjectMeta,
    /// How the deployment is rolled out
    pub strategy: DeploymentStrategy,
    /// The replication controller this deployment creates
    pub controller_template: ReplicationControllerSpec,
    /// Current progress
    pub status: Option<DeploymentStatus>,
}

impl Resource for Deployment {
    const KIND: &'static str = "Deployment";

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// A tagged strategy; only the parameter block of the active variant is read
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentStrategy {
    /// The active variant, `None` when unset
    pub type_: Option<DeploymentStrategyType>,
    /// Parameters of [`DeploymentStrategyType::Custom`]
    pub custom_params: Option<CustomDeploymentStrategyParams>,
    /// Parameters of [`DeploymentStrategyType::Recreate`]
    pub recreate_params: Option<RecreateDeploymentStrategyParams>,
}

/// Input to a custom deployment image
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDeploymentStrategyParams {
    /// Image that performs the deployment
    #[serde(default)]
    pub image: String,
    /// Environment given to the image
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvVar>,
    /// Overrides the image entrypoint
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

/// Hooks around a recreate deployment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecreateDeploymentStrategyParams {
    /// Runs before the old deployment is scaled down
    pub pre: Option<LifecycleHook>,
    /// Runs after the new deployment is scaled up
    pub post: Option<LifecycleHook>,
}

/// An action run at a fixed point of a deployment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LifecycleHook {
    /// Reaction to a failed action, `None` when unset
    pub failure_policy: Option<LifecycleHookFailurePolicy>,
    /// Run a command in a fresh pod
    pub exec_new_pod: Option<ExecNewPodHook>,
}

/// Runs a command in a new pod based on a container of the deployment template
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecNewPodHook {
    /// Command and arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// Extra environment for the pod
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Template container the pod is based on
    #[serde(default)]
    pub container_name: String,
}

/// A tagged trigger; only the parameter block of the active variant is read
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentTriggerPolicy {
    /// The active variant, `None` when unset
    pub type_: Option<DeploymentTriggerType>,
    /// Parameters of [`DeploymentTriggerType::ImageChange`]
    pub image_change_params: Option<DeploymentTriggerImageChangeParams>,
}

/// Which image to watch and which containers to update when it changes.
///
/// The source is either `from` or, for older clients, `repository_name`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerImageChangeParams {
    /// Whether a change starts a deployment without confirmation
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub automatic: bool,
    /// Containers whose image is replaced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_names: Vec<String>,
    /// Image repository to watch
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository_name: String,
    /// Image stream to watch
    #[serde(default, skip_serializing_if = "crate::is_default")]
    pub from: ObjectReference,
    /// Tag to watch
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
    /// Image that last fired this trigger
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_triggered_image: String,
}

/// Why the latest deployment was started
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentDetails {
    /// Free form description
    pub message: String,
    /// Triggers that fired
    pub causes: Vec<DeploymentCause>,
}

/// One trigger that started a deployment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentCause {
    /// The trigger variant, `None` when unset
    pub type_: Option<DeploymentTriggerType>,
    /// Set when an image change fired
    pub image_trigger: Option<DeploymentCauseImageTrigger>,
}

/// The image change behind a [`DeploymentCause`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCauseImageTrigger {
    /// Repository that changed
    #[serde(default)]
    pub repository_name: String,
    /// Tag that changed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// A request to roll a deployment config back to an earlier deployment.
///
/// The wire and internal layouts are the same.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigRollback {
    /// What to roll back to
    #[serde(default)]
    pub spec: DeploymentConfigRollbackSpec,
}

/// Target and scope of a rollback
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigRollbackSpec {
    /// The deployment to roll back to
    #[serde(default)]
    pub from: ObjectReference,
    /// Restore the triggers of the target
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_triggers: bool,
    /// Restore the pod template of the target
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_template: bool,
    /// Restore replica count and selector of the target
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_replication_meta: bool,
    /// Restore the strategy of the target
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_strategy: bool,
}
