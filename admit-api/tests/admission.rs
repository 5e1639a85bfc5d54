//! Integration tests for the admission strategies.
use admit_api::{
    authorization::{policybinding, PolicyBinding, PolicyBindingStrategy},
    deploy::{DeploymentConfig, DeploymentConfigStrategy},
    scheme, v1, ApiObject,
};
use admit_core::{admission::Error, fields, labels, Admission, Context};
use assert_json_diff::assert_json_include;
use serde_json::json;
use std::{sync::Arc, thread};

fn policy_binding_request() -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "PolicyBinding",
        "metadata": { "name": "ignored" },
        "policyRef": { "name": "someone-elses", "namespace": "shared", "uid": "123" },
        "roleBindings": [{
            "name": "admins",
            "roleBinding": {
                "metadata": { "name": "admins", "namespace": "dev" },
                "roleRef": { "kind": "Role", "name": "admin", "namespace": "kube-system" },
                "userNames": ["alice"],
                "groupNames": []
            }
        }]
    })
}

#[test]
fn policy_binding_create_from_the_wire() {
    let scheme = scheme();
    let binding: PolicyBinding = scheme.to_internal(policy_binding_request()).unwrap();
    let stored = Admission::new(PolicyBindingStrategy)
        .create(&Context::with_namespace("dev"), binding)
        .unwrap();

    let wire = scheme.to_external(stored, &v1()).unwrap();
    assert_json_include!(
        actual: &wire,
        expected: json!({
            "apiVersion": "v1",
            "kind": "PolicyBinding",
            "metadata": { "name": "shared", "namespace": "dev" },
            "policyRef": { "namespace": "shared" },
            "roleBindings": [{
                "name": "admins",
                "roleBinding": { "roleRef": { "name": "admin", "namespace": "shared" } }
            }]
        })
    );
    assert!(wire["metadata"]["creationTimestamp"].is_string());
    assert!(wire["policyRef"].get("uid").is_none());
    assert!(wire["roleBindings"][0]["roleBinding"]["roleRef"].get("kind").is_none());
}

#[test]
fn rejection_lists_every_cause() {
    let scheme = scheme();
    let config: DeploymentConfig = scheme
        .to_internal(json!({
            "apiVersion": "v1",
            "kind": "DeploymentConfig",
            "metadata": { "name": "Frontend" },
            "spec": {
                "strategy": { "type": "Custom" },
                "triggers": [
                    { "type": "ConfigChange" },
                    { "type": "ImageChange", "imageChangeParams": { "containerNames": ["app"] } }
                ]
            }
        }))
        .unwrap();

    let err = Admission::new(DeploymentConfigStrategy)
        .create(&Context::with_namespace("web"), config)
        .unwrap_err();
    assert!(matches!(err, Error::Invalid { .. }));
    let status = serde_json::to_value(err.status()).unwrap();
    assert_json_include!(
        actual: status,
        expected: json!({
            "status": "Failure",
            "reason": "Invalid",
            "code": 422,
            "details": {
                "name": "Frontend",
                "kind": "DeploymentConfig",
                "causes": [
                    { "reason": "FieldValueInvalid", "field": "name" },
                    { "reason": "FieldValueRequired", "field": "triggers[1].imageChangeParams.from" },
                    { "reason": "FieldValueRequired", "field": "template.strategy.customParams" }
                ]
            }
        })
    );
}

#[test]
fn scheme_is_shared_between_threads() {
    let scheme = Arc::new(scheme());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let scheme = Arc::clone(&scheme);
            thread::spawn(move || {
                let mut request = policy_binding_request();
                request["policyRef"]["namespace"] = format!("ns-{i}").into();
                ApiObject::decode(&scheme, request).unwrap()
            })
        })
        .collect();
    let objects: Vec<ApiObject> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let pred = policybinding::matcher(
        labels::Selector::everything(),
        fields::Selector::from_iter([("policyRef.namespace", "ns-2")]),
    );
    let selected: Vec<&ApiObject> = objects.iter().filter(|o| pred.matches(o) == Ok(true)).collect();
    assert_eq!(selected.len(), 1);
}
