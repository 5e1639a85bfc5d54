//! Admission strategy for deployment configs.
use super::{
    validation::{check_deployment_config, check_deployment_config_update, default_image_change_from_kinds},
    DeploymentConfig,
};
use admit_core::{field::ErrorList, Context, Strategy};

/// Create and update behaviour of [`DeploymentConfig`]s.
///
/// The deployment history (`latest_version` and `details`) belongs to the
/// deployment controller: it is cleared on create and carried over on update.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeploymentConfigStrategy;

impl Strategy for DeploymentConfigStrategy {
    type Object = DeploymentConfig;

    fn namespace_scoped(&self) -> bool {
        true
    }

    fn allow_create_on_update(&self) -> bool {
        false
    }

    fn generate_name(&self, base: &str) -> String {
        base.to_string()
    }

    fn prepare_for_create(&self, config: &mut DeploymentConfig) {
        config.latest_version = 0;
        config.details = None;
    }

    fn prepare_for_update(&self, config: &mut DeploymentConfig, old: &DeploymentConfig) {
        config.latest_version = old.latest_version;
        config.details = old.details.clone();
    }

    fn default_for_validation(&self, config: &mut DeploymentConfig) {
        default_image_change_from_kinds(config);
    }

    fn validate(&self, _ctx: &Context, config: &DeploymentConfig) -> ErrorList {
        check_deployment_config(config)
    }

    fn validate_update(&self, _ctx: &Context, config: &DeploymentConfig, old: &DeploymentConfig) -> ErrorList {
        check_deployment_config_update(config, old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{
        DeploymentDetails, DeploymentStrategy, DeploymentStrategyType, DeploymentTemplate,
        DeploymentTriggerImageChangeParams, DeploymentTriggerPolicy, DeploymentTriggerType,
    };
    use admit_core::{
        admission::{Admission, Error},
        metadata::{ObjectMeta, ObjectReference},
    };

    fn config() -> DeploymentConfig {
        DeploymentConfig {
            metadata: ObjectMeta {
                name: Some("frontend".into()),
                ..ObjectMeta::default()
            },
            triggers: vec![DeploymentTriggerPolicy {
                type_: Some(DeploymentTriggerType::ImageChange),
                image_change_params: Some(DeploymentTriggerImageChangeParams {
                    container_names: vec!["app".into()],
                    from: ObjectReference {
                        name: Some("frontend".into()),
                        ..ObjectReference::default()
                    },
                    ..DeploymentTriggerImageChangeParams::default()
                }),
            }],
            template: DeploymentTemplate {
                strategy: DeploymentStrategy {
                    type_: Some(DeploymentStrategyType::Recreate),
                    ..DeploymentStrategy::default()
                },
                ..DeploymentTemplate::default()
            },
            latest_version: 7,
            details: Some(DeploymentDetails {
                message: "forged".into(),
                causes: vec![],
            }),
        }
    }

    #[test]
    fn history_is_system_managed() {
        let admission = Admission::new(DeploymentConfigStrategy);
        let ctx = Context::with_namespace("web");
        let created = admission.create(&ctx, config()).unwrap();
        assert_eq!(created.latest_version, 0);
        assert_eq!(created.details, None);
        let from = &created.triggers[0].image_change_params.as_ref().unwrap().from;
        assert_eq!(from.kind.as_deref(), Some("ImageStream"));

        let mut stored = created;
        stored.latest_version = 2;
        let updated = admission.update(&ctx, config(), Some(&stored)).unwrap();
        assert_eq!(updated.latest_version, 2);
        assert_eq!(updated.details, None);
    }

    #[test]
    fn update_requires_an_existing_config() {
        let err = Admission::new(DeploymentConfigStrategy)
            .update(&Context::with_namespace("web"), config(), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "DeploymentConfig \"frontend\" not found");
        assert_eq!(err.status().code, 404);
    }

    #[test]
    fn invalid_config_is_rejected_with_every_cause() {
        let mut dc = config();
        dc.metadata.name = None;
        dc.template.strategy.type_ = None;
        let err = Admission::new(DeploymentConfigStrategy)
            .create(&Context::with_namespace("web"), dc)
            .unwrap_err();
        let Error::Invalid { errors, .. } = &err else {
            panic!("expected invalid, got {err}");
        };
        let fields: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(fields, ["name", "template.strategy.type"]);
    }
}
