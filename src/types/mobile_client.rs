// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// The mobile client a push configuration belongs to.
///
/// Only its annotations are written by this operator.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "mobile.k8s.io", version = "v1alpha1", kind = "MobileClient")]
#[kube(namespaced)]
#[kube(status = "MobileClientStatus")]
#[serde(rename_all = "camelCase")]
pub struct MobileClientSpec {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub dmz_url: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct MobileClientStatus {
    #[serde(default)]
    pub services: Vec<MobileClientService>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct MobileClientService {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub service_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub version: String,
}
