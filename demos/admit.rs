//! Admits an object file the way the API server would before storing it.
//!
//! Prints the stored object as YAML, or the rejection status as JSON.
use admit_api::{
    authorization::{self, PolicyBindingStrategy},
    deploy::{validation, DeploymentConfigStrategy},
    scheme, v1, ApiObject,
};
use admit_core::{
    metadata::TypeMeta, Admission, Context as RequestContext, ErrorList, ErrorResponse, Resource, ResourceExt, Scheme,
    Strategy,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::*;

#[derive(Parser)]
struct App {
    /// YAML or JSON file holding the object
    file: PathBuf,
    /// Namespace the request is made against
    #[arg(long, short)]
    namespace: Option<String>,
    /// Currently stored version of the object; admits the file as an update
    #[arg(long)]
    old: Option<PathBuf>,
}

fn read_value(path: &Path) -> Result<serde_json::Value> {
    let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_yaml::from_str(&data)?)
}

fn read_object(scheme: &Scheme, path: &Path) -> Result<ApiObject> {
    Ok(ApiObject::decode(scheme, read_value(path)?)?)
}

/// Rejections only visible on the wire form, such as duplicate role binding names
fn check_wire(value: &serde_json::Value) -> Result<Result<(), ErrorResponse>> {
    if TypeMeta::of(value).kind != authorization::PolicyBinding::KIND {
        return Ok(Ok(()));
    }
    let binding: authorization::v1::PolicyBinding = serde_json::from_value(value.clone())?;
    let name = binding.metadata.name.clone().unwrap_or_default();
    let errors = authorization::v1::validate_role_binding_names(&binding);
    Ok(checked(authorization::PolicyBinding::KIND, &name, (), errors))
}

fn admit<S: Strategy>(strategy: S, ctx: &RequestContext, obj: S::Object, old: Option<S::Object>) -> Result<S::Object, ErrorResponse> {
    let admission = Admission::new(strategy);
    let admitted = match old {
        Some(old) => admission.update(ctx, obj, Some(&old)),
        None => admission.create(ctx, obj),
    };
    admitted.map_err(|e| e.status())
}

fn checked<T>(kind: &str, name: &str, obj: T, errors: ErrorList) -> Result<T, ErrorResponse> {
    if errors.is_empty() {
        Ok(obj)
    } else {
        Err(ErrorResponse::invalid(kind, name, &errors))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let app = App::parse();
    let scheme = scheme();
    let ctx = app.namespace.map(RequestContext::with_namespace).unwrap_or_default();

    let value = read_value(&app.file)?;
    if let Err(status) = check_wire(&value)? {
        reject(&status)?;
    }
    let obj = ApiObject::decode(&scheme, value)?;
    let old = app.old.as_deref().map(|p| read_object(&scheme, p)).transpose()?;
    if let Some(old) = &old {
        if old.kind() != obj.kind() {
            bail!("cannot update a {} with a {}", old.kind(), obj.kind());
        }
    }
    info!(kind = obj.kind(), update = old.is_some(), "admitting");

    let admitted = match (obj, old) {
        (ApiObject::DeploymentConfig(dc), old) => {
            let old = match old {
                Some(ApiObject::DeploymentConfig(o)) => Some(o),
                _ => None,
            };
            admit(DeploymentConfigStrategy, &ctx, dc, old).map(ApiObject::DeploymentConfig)
        }
        (ApiObject::PolicyBinding(pb), old) => {
            let old = match old {
                Some(ApiObject::PolicyBinding(o)) => Some(o),
                _ => None,
            };
            admit(PolicyBindingStrategy, &ctx, pb, old).map(ApiObject::PolicyBinding)
        }
        (ApiObject::Deployment(d), _) => {
            let errors = validation::validate_deployment(&d);
            let name = d.name_any().to_owned();
            checked("Deployment", &name, d, errors).map(ApiObject::Deployment)
        }
        (ApiObject::DeploymentConfigRollback(mut r), _) => {
            let errors = validation::validate_deployment_config_rollback(&mut r);
            checked(admit_api::DEPLOYMENT_CONFIG_ROLLBACK_KIND, "", r, errors)
                .map(ApiObject::DeploymentConfigRollback)
        }
        (obj @ ApiObject::MasterConfig(_), _) => Ok(obj),
    };

    match admitted {
        Ok(obj) => {
            let wire = obj.encode(&scheme, &v1())?;
            print!("{}", serde_yaml::to_string(&wire)?);
        }
        Err(status) => reject(&status)?,
    }
    Ok(())
}

fn reject(status: &ErrorResponse) -> Result<()> {
    warn!(reason = %status.reason, code = status.code, "rejected");
    println!("{}", serde_json::to_string_pretty(status)?);
    std::process::exit(1);
}
