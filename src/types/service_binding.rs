// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Service catalog binding between a service instance and a consumer
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "servicecatalog.k8s.io", version = "v1beta1", kind = "ServiceBinding")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBindingSpec {
    /// Id the binding was provisioned under; referenced by client config documents
    #[serde(rename = "externalID", default)]
    pub external_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<InstanceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct InstanceRef {
    pub name: String,
}
