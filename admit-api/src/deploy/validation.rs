//! Structural checks for the deploy kinds.
//!
//! Image change triggers and rollbacks that leave the source kind empty are
//! defaulted before they are checked; the defaulting passes are public so the
//! admission strategy can run them as a separate step.
use super::{
    CustomDeploymentStrategyParams, Deployment, DeploymentConfig, DeploymentConfigRollback, DeploymentStrategy,
    DeploymentStrategyType, DeploymentTriggerImageChangeParams, DeploymentTriggerPolicy, DeploymentTriggerType,
    ExecNewPodHook, LifecycleHook, RecreateDeploymentStrategyParams, DEFAULT_IMAGE_CHANGE_FROM_KIND,
    IMAGE_CHANGE_FROM_KINDS, ROLLBACK_FROM_KIND,
};
use admit_core::{
    field::{ErrorList, FieldError, Path},
    labels,
    validation::{
        is_dns1123_subdomain, validate_env, validate_labels, validate_object_meta,
        validate_object_meta_update, validate_subdomain_name,
    },
};
use k8s_openapi::api::core::v1::ReplicationControllerSpec;

/// Fills in the kind of every image change source that names a source without one
pub fn default_image_change_from_kinds(config: &mut DeploymentConfig) {
    for params in config
        .triggers
        .iter_mut()
        .filter_map(|t| t.image_change_params.as_mut())
    {
        default_image_change_from_kind(params);
    }
}

fn default_image_change_from_kind(params: &mut DeploymentTriggerImageChangeParams) {
    let from = &mut params.from;
    if !from.name.as_deref().unwrap_or_default().is_empty() && from.kind.as_deref().unwrap_or_default().is_empty() {
        from.kind = Some(DEFAULT_IMAGE_CHANGE_FROM_KIND.to_string());
    }
}

/// Fills in the kind of a rollback target that does not name one
pub fn default_rollback_from_kind(rollback: &mut DeploymentConfigRollback) {
    let from = &mut rollback.spec.from;
    if from.kind.as_deref().unwrap_or_default().is_empty() {
        from.kind = Some(ROLLBACK_FROM_KIND.to_string());
    }
}

/// Validates a new deployment config, defaulting image change source kinds first
pub fn validate_deployment_config(config: &mut DeploymentConfig) -> ErrorList {
    default_image_change_from_kinds(config);
    check_deployment_config(config)
}

/// Validates a deployment config against its stored version
pub fn validate_deployment_config_update(config: &mut DeploymentConfig, old: &DeploymentConfig) -> ErrorList {
    default_image_change_from_kinds(config);
    check_deployment_config_update(config, old)
}

pub(crate) fn check_deployment_config(config: &DeploymentConfig) -> ErrorList {
    let mut errs = validate_object_meta(&config.metadata, true, validate_subdomain_name);
    for (i, trigger) in config.triggers.iter().enumerate() {
        errs.append(validate_trigger(trigger).prefix_index(i).prefix("triggers"));
    }
    errs.append(validate_deployment_strategy(&config.template.strategy).prefix("strategy").prefix("template"));
    errs.append(
        validate_replication_controller_spec(&config.template.controller_template)
            .prefix("controllerTemplate")
            .prefix("template"),
    );
    errs
}

pub(crate) fn check_deployment_config_update(config: &DeploymentConfig, old: &DeploymentConfig) -> ErrorList {
    let mut errs = check_deployment_config(config);
    errs.append(validate_object_meta_update(&config.metadata, &old.metadata));
    if config.latest_version < old.latest_version {
        errs.push(FieldError::invalid(
            Path::fields(&["status", "latestVersion"]),
            config.latest_version,
            "cannot be decremented",
        ));
    }
    errs
}

/// Validates a standalone deployment
pub fn validate_deployment(deployment: &Deployment) -> ErrorList {
    let mut errs = validate_deployment_strategy(&deployment.strategy).prefix("strategy");
    errs.append(validate_object_meta(
        &deployment.metadata,
        true,
        validate_subdomain_name,
    ));
    errs.append(validate_replication_controller_spec(&deployment.controller_template).prefix("controllerTemplate"));
    errs
}

/// Validates a rollback request, defaulting the target kind first
pub fn validate_deployment_config_rollback(rollback: &mut DeploymentConfigRollback) -> ErrorList {
    default_rollback_from_kind(rollback);
    check_deployment_config_rollback(rollback)
}

fn check_deployment_config_rollback(rollback: &DeploymentConfigRollback) -> ErrorList {
    let mut errs = ErrorList::new();
    let from = &rollback.spec.from;
    if from.name.as_deref().unwrap_or_default().is_empty() {
        errs.push(FieldError::required(Path::fields(&["spec", "from", "name"])));
    }
    let kind = from.kind.as_deref().unwrap_or_default();
    if kind != ROLLBACK_FROM_KIND {
        errs.push(FieldError::invalid(
            Path::fields(&["spec", "from", "kind"]),
            kind,
            format!("the kind of the rollback target must be '{ROLLBACK_FROM_KIND}'"),
        ));
    }
    errs
}

fn validate_deployment_strategy(strategy: &DeploymentStrategy) -> ErrorList {
    let mut errs = ErrorList::new();
    match &strategy.type_ {
        None => errs.push(FieldError::required("type")),
        Some(DeploymentStrategyType::Recreate) => {
            if let Some(params) = &strategy.recreate_params {
                errs.append(validate_recreate_params(params).prefix("recreateParams"));
            }
        }
        Some(DeploymentStrategyType::Custom) => match &strategy.custom_params {
            None => errs.push(FieldError::required("customParams")),
            Some(params) => errs.append(validate_custom_params(params).prefix("customParams")),
        },
        // rolling parameters are reserved
        Some(DeploymentStrategyType::Rolling | DeploymentStrategyType::Other(_)) => {}
    }
    errs
}

fn validate_custom_params(params: &CustomDeploymentStrategyParams) -> ErrorList {
    let mut errs = ErrorList::new();
    if params.image.is_empty() {
        errs.push(FieldError::required("image"));
    }
    errs
}

fn validate_recreate_params(params: &RecreateDeploymentStrategyParams) -> ErrorList {
    let mut errs = ErrorList::new();
    if let Some(pre) = &params.pre {
        errs.append(validate_lifecycle_hook(pre).prefix("pre"));
    }
    if let Some(post) = &params.post {
        errs.append(validate_lifecycle_hook(post).prefix("post"));
    }
    errs
}

fn validate_lifecycle_hook(hook: &LifecycleHook) -> ErrorList {
    let mut errs = ErrorList::new();
    if hook.failure_policy.is_none() {
        errs.push(FieldError::required("failurePolicy"));
    }
    match &hook.exec_new_pod {
        None => errs.push(FieldError::required("execNewPod")),
        Some(exec) => errs.append(validate_exec_new_pod(exec).prefix("execNewPod")),
    }
    errs
}

fn validate_exec_new_pod(hook: &ExecNewPodHook) -> ErrorList {
    let mut errs = ErrorList::new();
    if hook.command.is_empty() {
        errs.push(FieldError::required("command"));
    }
    if hook.container_name.is_empty() {
        errs.push(FieldError::required("containerName"));
    }
    if !hook.env.is_empty() {
        errs.append(validate_env(&hook.env).prefix("env"));
    }
    errs
}

fn validate_trigger(trigger: &DeploymentTriggerPolicy) -> ErrorList {
    let mut errs = ErrorList::new();
    match &trigger.type_ {
        None => errs.push(FieldError::required("type")),
        Some(DeploymentTriggerType::ImageChange) => match &trigger.image_change_params {
            None => errs.push(FieldError::required("imageChangeParams")),
            Some(params) => errs.append(validate_image_change_params(params).prefix("imageChangeParams")),
        },
        Some(DeploymentTriggerType::ConfigChange | DeploymentTriggerType::Other(_)) => {}
    }
    errs
}

fn validate_image_change_params(params: &DeploymentTriggerImageChangeParams) -> ErrorList {
    let mut errs = ErrorList::new();
    let from = &params.from;
    let name = from.name.as_deref().unwrap_or_default();
    if !name.is_empty() {
        let kind = from.kind.as_deref().unwrap_or_default();
        if !IMAGE_CHANGE_FROM_KINDS.contains(&kind) {
            errs.push(FieldError::invalid(
                Path::fields(&["from", "kind"]),
                kind,
                "kind must be 'ImageStream' or 'ImageRepository'",
            ));
        }
        if !is_dns1123_subdomain(name) {
            errs.push(FieldError::invalid(Path::fields(&["from", "name"]), name, "name must be a valid subdomain"));
        }
        let namespace = from.namespace.as_deref().unwrap_or_default();
        if !namespace.is_empty() && !is_dns1123_subdomain(namespace) {
            errs.push(FieldError::invalid(
                Path::fields(&["from", "namespace"]),
                namespace,
                "namespace must be a valid subdomain",
            ));
        }
        if !params.repository_name.is_empty() {
            errs.push(FieldError::invalid(
                "repositoryName",
                params.repository_name.as_str(),
                "only one of 'from', 'repository' name may be specified",
            ));
        }
    } else if params.repository_name.is_empty() {
        errs.push(FieldError::required("from"));
    }

    if params.container_names.is_empty() {
        errs.push(FieldError::required("containerNames"));
    }
    errs
}

/// Validates the replication controller a deployment creates.
///
/// Every part is optional; what is present must be consistent.
pub fn validate_replication_controller_spec(spec: &ReplicationControllerSpec) -> ErrorList {
    let mut errs = ErrorList::new();
    if let Some(replicas) = spec.replicas.filter(|r| *r < 0) {
        errs.push(FieldError::invalid("replicas", replicas, "must be non-negative"));
    }
    if let Some(seconds) = spec.min_ready_seconds.filter(|s| *s < 0) {
        errs.push(FieldError::invalid("minReadySeconds", seconds, "must be non-negative"));
    }
    errs.append(validate_labels(spec.selector.as_ref(), "selector"));

    let template_labels = spec
        .template
        .as_ref()
        .and_then(|t| t.metadata.as_ref())
        .and_then(|m| m.labels.as_ref());
    errs.append(validate_labels(template_labels, Path::fields(&["template", "metadata", "labels"])));

    if let (Some(selector), Some(template_labels)) = (spec.selector.as_ref(), template_labels) {
        let selector: labels::Selector = selector.clone().into_iter().collect();
        if !selector.selects_all() && !selector.matches(template_labels) {
            errs.push(FieldError::invalid(
                Path::fields(&["template", "metadata", "labels"]),
                serde_json::to_value(template_labels).unwrap_or_default(),
                format!("selector {selector} does not match template labels"),
            ));
        }
    }
    errs
}
