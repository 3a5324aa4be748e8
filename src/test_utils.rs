// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::error::OperatorError;
use crate::kubernetes::secrets::new_client_config;
use crate::kubernetes::{AnnotationChanges, ConfigStore, MobileClientStore};
use crate::push::PushApplication;
use crate::retry::RetryPolicy;
use crate::types::mobile_client::{MobileClient, MobileClientSpec};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

type Route = (String, String);

/// A request the mock service received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Registering the same method and path more than once queues the responses;
/// the last one keeps being served once the queue is drained.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Route, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received with the given method
    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        let key = (method.to_string(), path.to_string());
        let route = if responses.contains_key(&key) {
            Some(key)
        } else {
            // Fall back to prefix match for paths like /api/v1/namespaces/foo
            responses
                .keys()
                .filter(|(m, p)| m == method && path.starts_with(p.as_str()))
                .max_by_key(|(_, p)| p.len())
                .cloned()
        }?;

        let queue = responses.get_mut(&route)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);
        let content_type = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                content_type,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create a successful Status response, as returned by deletes
pub fn status_success_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Success",
        "code": 200
    })
    .to_string()
}

/// Create a 409 conflict response
pub fn conflict_json(name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("Operation cannot be fulfilled on \"{}\": the object has been modified", name),
        "reason": "Conflict",
        "code": 409
    })
    .to_string()
}

/// Create a mock Secret with labels and plain-text data
pub fn secret_with_data_json(name: &str, labels: &[(&str, &str)], data: &[(&str, &str)]) -> String {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
        .collect();
    let data: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!(STANDARD.encode(v))))
        .collect();

    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": "test-ns",
            "resourceVersion": "1",
            "labels": labels
        },
        "data": data
    })
    .to_string()
}

/// Create a mock config document Secret holding `config`
pub fn secret_json(name: &str, config: &str) -> String {
    secret_with_data_json(
        name,
        &[("serviceName", "ups"), ("clientId", "myClientId")],
        &[("config", config)],
    )
}

pub fn secret_list_json(items: &[String]) -> String {
    list_json("SecretList", "v1", items)
}

/// Create a mock MobileClient with annotations
pub fn mobile_client_json(name: &str, annotations: &[(&str, &str)]) -> String {
    let annotations: serde_json::Map<String, serde_json::Value> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::json!(v)))
        .collect();

    serde_json::json!({
        "apiVersion": "mobile.k8s.io/v1alpha1",
        "kind": "MobileClient",
        "metadata": {
            "name": name,
            "namespace": "test-ns",
            "resourceVersion": "5",
            "annotations": annotations
        },
        "spec": {
            "name": name,
            "apiKey": "key",
            "dmzUrl": ""
        }
    })
    .to_string()
}

/// Create a mock ServiceBindingList from `(name, externalID)` pairs
pub fn service_binding_list_json(bindings: &[(&str, &str)]) -> String {
    let items: Vec<String> = bindings
        .iter()
        .map(|(name, external_id)| {
            serde_json::json!({
                "apiVersion": "servicecatalog.k8s.io/v1beta1",
                "kind": "ServiceBinding",
                "metadata": { "name": name, "namespace": "test-ns" },
                "spec": {
                    "externalID": external_id,
                    "instanceRef": { "name": "ups-instance" },
                    "secretName": name
                }
            })
            .to_string()
        })
        .collect();
    list_json("ServiceBindingList", "servicecatalog.k8s.io/v1beta1", &items)
}

fn list_json(kind: &str, api_version: &str, items: &[String]) -> String {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|i| serde_json::from_str(i).unwrap())
        .collect();

    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// A Kubernetes 409 as returned for a stale resourceVersion
pub fn conflict_error() -> OperatorError {
    OperatorError::KubeError(kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: "the object has been modified".to_string(),
        reason: "Conflict".to_string(),
        code: 409,
    }))
}

/// Retry policy without noticeable delays
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    }
}

pub fn push_application() -> PushApplication {
    PushApplication {
        application_id: "myPushApplicationId".to_string(),
        service_instance_id: "myPushServiceInstanceId".to_string(),
        base_url: "http://example.org".to_string(),
    }
}

/// A MobileClient named `myClientId` carrying annotations
pub fn mobile_client(annotations: &[(&str, &str)]) -> MobileClient {
    let mut client = MobileClient::new("myClientId", MobileClientSpec::default());
    client.metadata.resource_version = Some("5".to_string());
    client.metadata.annotations = Some(
        annotations
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    client
}

/// In-memory MobileClient store applying patches the way a merge patch does
pub struct InMemoryMobileClients {
    client: Mutex<Option<MobileClient>>,
}

impl InMemoryMobileClients {
    pub fn new(client: Option<MobileClient>) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    pub fn annotations(&self) -> BTreeMap<String, String> {
        self.client
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|c| c.metadata.annotations.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MobileClientStore for InMemoryMobileClients {
    async fn get_mobile_client(&self, _name: &str) -> crate::error::Result<Option<MobileClient>> {
        Ok(self.client.lock().unwrap().clone())
    }

    async fn patch_annotations(
        &self,
        _name: &str,
        _resource_version: Option<String>,
        changes: AnnotationChanges,
    ) -> crate::error::Result<()> {
        let mut guard = self.client.lock().unwrap();
        let client = guard.as_mut().unwrap();
        let annotations = client.metadata.annotations.get_or_insert_with(BTreeMap::new);
        for (key, value) in changes {
            match value {
                Some(v) => annotations.insert(key, v),
                None => annotations.remove(&key),
            };
        }
        Ok(())
    }
}

/// In-memory Secret store matching `key=value` selectors against labels
#[derive(Default)]
pub struct InMemoryConfigStore {
    secrets: Mutex<BTreeMap<String, Secret>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, secret: Secret) {
        self.secrets
            .lock()
            .unwrap()
            .insert(secret.name_any(), secret);
    }

    pub fn secrets(&self) -> Vec<Secret> {
        self.secrets.lock().unwrap().values().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Secret> {
        self.secrets.lock().unwrap().get(name).cloned()
    }
}

fn matches_selector(secret: &Secret, selector: &str) -> bool {
    selector.split(',').filter(|s| !s.is_empty()).all(|term| {
        let (key, value) = term.split_once('=').unwrap_or((term, ""));
        secret.labels().get(key).is_some_and(|v| v == value)
    })
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn list_secrets(&self, selector: &str) -> crate::error::Result<Vec<Secret>> {
        Ok(self
            .secrets()
            .into_iter()
            .filter(|s| matches_selector(s, selector))
            .collect())
    }

    async fn create_secret(&self, secret: &Secret) -> crate::error::Result<Secret> {
        self.insert(secret.clone());
        Ok(secret.clone())
    }

    async fn update_secret(&self, secret: &Secret) -> crate::error::Result<Secret> {
        self.insert(secret.clone());
        Ok(secret.clone())
    }

    async fn delete_secret(&self, name: &str) -> crate::error::Result<()> {
        self.secrets.lock().unwrap().remove(name);
        Ok(())
    }
}

/// A config document Secret for `client_id` holding `config` and binding annotations
pub fn config_document(
    name: &str,
    client_id: &str,
    config: &str,
    bindings: &[(&str, &str)],
) -> Secret {
    let mut secret =
        new_client_config(client_id, "myServiceInstanceName", "si", "myPushApplicationId");
    secret.metadata.name = Some(name.to_string());
    secret.metadata.annotations = Some(
        bindings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    secret
        .data
        .get_or_insert_with(BTreeMap::new)
        .insert("config".to_string(), ByteString(config.as_bytes().to_vec()));
    secret
}
