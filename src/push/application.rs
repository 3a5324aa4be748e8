// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The push application this operator provisions variants in.

use crate::constants::bootstrap;
use crate::error::{OperatorError, Result};
use crate::types::data_string;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client, ResourceExt};
use tracing::{info, instrument};

/// Identity of the push application, read once from the bootstrap Secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushApplication {
    pub application_id: String,
    /// Service instance the push server was provisioned as
    pub service_instance_id: String,
    /// Public URL of the push server, handed to mobile clients
    pub base_url: String,
}

impl PushApplication {
    pub fn from_secret(secret: &Secret) -> Result<Self> {
        let application_id = data_string(secret, bootstrap::APPLICATION_ID);
        if application_id.is_empty() {
            return Err(OperatorError::BootstrapSecretError(format!(
                "secret {} does not contain '{}'",
                secret.name_any(),
                bootstrap::APPLICATION_ID
            )));
        }

        Ok(PushApplication {
            application_id,
            service_instance_id: secret
                .labels()
                .get(bootstrap::SERVICE_INSTANCE_ID_LABEL)
                .cloned()
                .unwrap_or_default(),
            base_url: data_string(secret, bootstrap::URI),
        })
    }

    /// Fetch and read the bootstrap Secret
    #[instrument(skip(client))]
    pub async fn load(client: &Client, namespace: &str, secret_name: &str) -> Result<Self> {
        let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
        let secret = secrets.get(secret_name).await.map_err(|e| {
            OperatorError::BootstrapSecretError(format!(
                "Failed to get push server secret {}/{}: {}",
                namespace, secret_name, e
            ))
        })?;

        let app = Self::from_secret(&secret)?;
        info!(
            "Using push application {} at {}",
            app.application_id, app.base_url
        );
        Ok(app)
    }

    /// Admin console page listing the variants of the application
    pub fn variants_url(&self) -> String {
        format!("{}/#/app/{}/variants", self.base_url, self.application_id)
    }

    /// Admin console page of a single variant
    pub fn variant_url(&self, variant_id: &str) -> String {
        format!("{}/{}", self.variants_url(), variant_id)
    }
}
