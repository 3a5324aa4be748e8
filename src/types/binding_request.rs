// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding request Secrets produced by the service catalog.

use crate::constants::{binding, labels};
use crate::error::{OperatorError, Result};
use crate::types::{data_string, platform::Platform};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use tracing::warn;

/// A pending request to provision a push variant for a mobile client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRequest {
    pub client_id: String,
    pub service_binding_id: String,
    pub service_instance_name: String,
    pub platform: PlatformRequest,
}

/// Platform specific part of a binding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformRequest {
    Android {
        google_key: String,
        project_number: String,
    },
    Ios {
        /// Base64 encoded APNs certificate
        certificate: String,
        passphrase: String,
        is_production: bool,
    },
}

impl PlatformRequest {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformRequest::Android { .. } => Platform::Android,
            PlatformRequest::Ios { .. } => Platform::Ios,
        }
    }
}

impl BindingRequest {
    /// Read a binding request from its Secret
    pub fn from_secret(secret: &Secret) -> Result<Self> {
        let app_type = data_string(secret, binding::APP_TYPE);
        let platform: Platform = app_type.parse().map_err(|e| {
            OperatorError::InvalidBindingRequest(format!(
                "secret {} has unsupported appType: {}",
                secret.name_any(),
                e
            ))
        })?;

        let client_id = data_string(secret, binding::CLIENT_ID);

        let platform = match platform {
            Platform::Android => PlatformRequest::Android {
                google_key: data_string(secret, binding::GOOGLE_KEY),
                project_number: data_string(secret, binding::PROJECT_NUMBER),
            },
            Platform::Ios => {
                let raw = data_string(secret, binding::IOS_IS_PRODUCTION);
                let is_production = parse_bool(&raw).unwrap_or_else(|| {
                    warn!(
                        "iOS variant with clientId {} is invalid, isProduction value '{}' should be true or false. Setting to false",
                        client_id, raw
                    );
                    false
                });

                PlatformRequest::Ios {
                    certificate: data_string(secret, binding::IOS_CERT),
                    passphrase: data_string(secret, binding::IOS_PASSPHRASE),
                    is_production,
                }
            }
        };

        Ok(BindingRequest {
            client_id,
            service_binding_id: data_string(secret, binding::SERVICE_BINDING_ID),
            service_instance_name: data_string(secret, binding::SERVICE_INSTANCE_NAME),
            platform,
        })
    }
}

/// Check if a Secret is a mobile client binding request
pub fn is_binding_request(secret: &Secret) -> bool {
    secret
        .labels()
        .get(labels::SECRET_TYPE)
        .is_some_and(|v| v == labels::BINDING_SECRET_TYPE_MOBILE)
}

/// Check if a Secret is owned by a ServiceBinding.
///
/// Only those deletions are teardowns initiated by the service catalog; the
/// request Secrets this operator deletes itself carry no such owner.
pub fn is_owned_by_service_binding(secret: &Secret) -> bool {
    secret
        .owner_references()
        .iter()
        .any(|r| r.kind == binding::SERVICE_BINDING_OWNER_KIND)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
