//! Wire layout of the deploy kinds in `v1`.
//!
//! Discriminators are plain strings here. A [`DeploymentConfig`] nests its
//! desired state under `spec` and its system managed state under `status`.
use super::{
    CustomDeploymentStrategyParams, DeploymentCauseImageTrigger, DeploymentStatus,
    DeploymentStrategyType, DeploymentTriggerImageChangeParams, DeploymentTriggerType, ExecNewPodHook,
    LifecycleHookFailurePolicy,
};
use admit_core::metadata::ObjectMeta;
use k8s_openapi::api::core::v1::{PodTemplateSpec, ReplicationControllerSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use super::DeploymentConfigRollback;

/// Wire form of [`super::DeploymentConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired state
    #[serde(default)]
    pub spec: DeploymentConfigSpec,
    /// Observed state
    #[serde(default, skip_serializing_if = "crate::is_default")]
    pub status: DeploymentConfigStatus,
}

/// Desired state of a [`DeploymentConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// How deployments are rolled out
    #[serde(default)]
    pub strategy: DeploymentStrategy,
    /// Events that cause a new deployment
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<DeploymentTriggerPolicy>,
    /// Desired number of pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    /// Seconds a new pod must be ready before it counts as available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ready_seconds: Option<i32>,
    /// Label query over the pods of a deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<BTreeMap<String, String>>,
    /// Pod template of a deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PodTemplateSpec>,
}

/// Observed state of a [`DeploymentConfig`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    /// Version of the most recent deployment
    #[serde(default, skip_serializing_if = "crate::is_default")]
    pub latest_version: i64,
    /// Why the most recent deployment happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DeploymentDetails>,
}

/// Wire form of [`super::Deployment`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Standard object metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// How the deployment is rolled out
    #[serde(default)]
    pub strategy: DeploymentStrategy,
    /// The replication controller this deployment creates
    #[serde(default)]
    pub controller_template: ReplicationControllerSpec,
    /// Current progress
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

/// Wire form of [`super::DeploymentStrategy`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStrategy {
    /// Discriminator
    #[serde(default, rename = "type")]
    pub type_: String,
    /// Parameters of the `Custom` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_params: Option<CustomDeploymentStrategyParams>,
    /// Parameters of the `Recreate` strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recreate_params: Option<RecreateDeploymentStrategyParams>,
}

/// Wire form of [`super::RecreateDeploymentStrategyParams`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecreateDeploymentStrategyParams {
    /// Runs before the old deployment is scaled down
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<LifecycleHook>,
    /// Runs after the new deployment is scaled up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<LifecycleHook>,
}

/// Wire form of [`super::LifecycleHook`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleHook {
    /// Discriminator of the failure handling
    #[serde(default)]
    pub failure_policy: String,
    /// Run a command in a fresh pod
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_new_pod: Option<ExecNewPodHook>,
}

/// Wire form of [`super::DeploymentTriggerPolicy`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTriggerPolicy {
    /// Discriminator
    #[serde(default, rename = "type")]
    pub type_: String,
    /// Parameters of the `ImageChange` trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_change_params: Option<DeploymentTriggerImageChangeParams>,
}

/// Wire form of [`super::DeploymentDetails`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDetails {
    /// Free form description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Triggers that fired
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<DeploymentCause>,
}

/// Wire form of [`super::DeploymentCause`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentCause {
    /// Discriminator
    #[serde(default, rename = "type")]
    pub type_: String,
    /// Set when an image change fired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_trigger: Option<DeploymentCauseImageTrigger>,
}

impl From<DeploymentConfig> for super::DeploymentConfig {
    fn from(dc: DeploymentConfig) -> Self {
        let DeploymentConfigSpec {
            strategy,
            triggers,
            replicas,
            min_ready_seconds,
            selector,
            template,
        } = dc.spec;
        Self {
            metadata: dc.metadata,
            triggers: triggers.into_iter().map(Into::into).collect(),
            template: super::DeploymentTemplate {
                strategy: strategy.into(),
                controller_template: ReplicationControllerSpec {
                    min_ready_seconds,
                    replicas,
                    selector,
                    template,
                },
            },
            latest_version: dc.status.latest_version,
            details: dc.status.details.map(Into::into),
        }
    }
}

impl From<super::DeploymentConfig> for DeploymentConfig {
    fn from(dc: super::DeploymentConfig) -> Self {
        let ReplicationControllerSpec {
            min_ready_seconds,
            replicas,
            selector,
            template,
        } = dc.template.controller_template;
        Self {
            metadata: dc.metadata,
            spec: DeploymentConfigSpec {
                strategy: dc.template.strategy.into(),
                triggers: dc.triggers.into_iter().map(Into::into).collect(),
                replicas,
                min_ready_seconds,
                selector,
                template,
            },
            status: DeploymentConfigStatus {
                latest_version: dc.latest_version,
                details: dc.details.map(Into::into),
            },
        }
    }
}

impl From<Deployment> for super::Deployment {
    fn from(d: Deployment) -> Self {
        Self {
            metadata: d.metadata,
            strategy: d.strategy.into(),
            controller_template: d.controller_template,
            status: DeploymentStatus::parse(&d.status),
        }
    }
}

impl From<super::Deployment> for Deployment {
    fn from(d: super::Deployment) -> Self {
        Self {
            metadata: d.metadata,
            strategy: d.strategy.into(),
            controller_template: d.controller_template,
            status: DeploymentStatus::to_wire(d.status.as_ref()),
        }
    }
}

impl From<DeploymentStrategy> for super::DeploymentStrategy {
    fn from(s: DeploymentStrategy) -> Self {
        Self {
            type_: DeploymentStrategyType::parse(&s.type_),
            custom_params: s.custom_params,
            recreate_params: s.recreate_params.map(|p| super::RecreateDeploymentStrategyParams {
                pre: p.pre.map(Into::into),
                post: p.post.map(Into::into),
            }),
        }
    }
}

impl From<super::DeploymentStrategy> for DeploymentStrategy {
    fn from(s: super::DeploymentStrategy) -> Self {
        Self {
            type_: DeploymentStrategyType::to_wire(s.type_.as_ref()),
            custom_params: s.custom_params,
            recreate_params: s.recreate_params.map(|p| RecreateDeploymentStrategyParams {
                pre: p.pre.map(Into::into),
                post: p.post.map(Into::into),
            }),
        }
    }
}

impl From<LifecycleHook> for super::LifecycleHook {
    fn from(hook: LifecycleHook) -> Self {
        Self {
            failure_policy: LifecycleHookFailurePolicy::parse(&hook.failure_policy),
            exec_new_pod: hook.exec_new_pod,
        }
    }
}

impl From<super::LifecycleHook> for LifecycleHook {
    fn from(hook: super::LifecycleHook) -> Self {
        Self {
            failure_policy: LifecycleHookFailurePolicy::to_wire(hook.failure_policy.as_ref()),
            exec_new_pod: hook.exec_new_pod,
        }
    }
}

impl From<DeploymentTriggerPolicy> for super::DeploymentTriggerPolicy {
    fn from(t: DeploymentTriggerPolicy) -> Self {
        Self {
            type_: DeploymentTriggerType::parse(&t.type_),
            image_change_params: t.image_change_params,
        }
    }
}

impl From<super::DeploymentTriggerPolicy> for DeploymentTriggerPolicy {
    fn from(t: super::DeploymentTriggerPolicy) -> Self {
        Self {
            type_: DeploymentTriggerType::to_wire(t.type_.as_ref()),
            image_change_params: t.image_change_params,
        }
    }
}

impl From<DeploymentDetails> for super::DeploymentDetails {
    fn from(d: DeploymentDetails) -> Self {
        Self {
            message: d.message,
            causes: d
                .causes
                .into_iter()
                .map(|c| super::DeploymentCause {
                    type_: DeploymentTriggerType::parse(&c.type_),
                    image_trigger: c.image_trigger,
                })
                .collect(),
        }
    }
}

impl From<super::DeploymentDetails> for DeploymentDetails {
    fn from(d: super::DeploymentDetails) -> Self {
        Self {
            message: d.message,
            causes: d
                .causes
                .into_iter()
                .map(|c| DeploymentCause {
                    type_: DeploymentTriggerType::to_wire(c.type_.as_ref()),
                    image_trigger: c.image_trigger,
                })
                .collect(),
        }
    }
}
