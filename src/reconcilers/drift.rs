// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Drift reconciler - finds config documents referencing variants the push
//! server no longer knows and deletes their ServiceBindings.
//!
//! Only that direction is healed. Variants registered on the push server
//! without a config document are left alone.

use crate::config::Config;
use crate::constants::config_document;
use crate::error::Result;
use crate::kubernetes::secrets::push_application_selector;
use crate::kubernetes::service_bindings::find_service_binding_name;
use crate::kubernetes::{ConfigStore, ServiceBindingStore};
use crate::push::{PushApplication, PushClient};
use crate::sync::stored_config;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Why a mapping read from a config document cannot be used
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MappingError {
    #[error("variantId is empty")]
    MissingVariantId,
    #[error("serviceBindingId is empty")]
    MissingServiceBindingId,
}

/// A variant recorded in a config document and the ServiceBinding that created it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantServiceBindingMapping {
    pub variant_id: String,
    pub service_binding_id: String,
}

impl VariantServiceBindingMapping {
    pub fn new(variant_id: &str, service_binding_id: &str) -> std::result::Result<Self, MappingError> {
        if variant_id.is_empty() {
            return Err(MappingError::MissingVariantId);
        }
        if service_binding_id.is_empty() {
            return Err(MappingError::MissingServiceBindingId);
        }
        Ok(Self {
            variant_id: variant_id.to_string(),
            service_binding_id: service_binding_id.to_string(),
        })
    }
}

/// Mappings of every platform present in the given config documents.
///
/// Invalid mappings are logged and skipped.
pub fn variant_mappings(secrets: &[Secret]) -> Vec<VariantServiceBindingMapping> {
    let mut mappings = Vec::new();

    for secret in secrets {
        for (platform, config) in stored_config(secret).iter() {
            let binding_id = secret
                .annotations()
                .get(&config_document::binding_annotation(platform.as_str()))
                .map(String::as_str)
                .unwrap_or_default();

            match VariantServiceBindingMapping::new(&config.variant_id, binding_id) {
                Ok(mapping) => mappings.push(mapping),
                Err(e) => warn!(
                    "Invalid {} client config found in secret {}: {}",
                    platform,
                    secret.name_any(),
                    e
                ),
            }
        }
    }

    mappings
}

pub struct DriftReconciler {
    store: Arc<dyn ConfigStore>,
    bindings: Arc<dyn ServiceBindingStore>,
    push_client: Arc<dyn PushClient>,
    application: Arc<PushApplication>,
    interval: Duration,
}

impl DriftReconciler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        bindings: Arc<dyn ServiceBindingStore>,
        push_client: Arc<dyn PushClient>,
        application: Arc<PushApplication>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            bindings,
            push_client,
            application,
            interval: config.poll_interval,
        }
    }

    /// Reconcile every interval, forever
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Polling push server for removed variants every {:?}", self.interval);
        loop {
            sleep(self.interval).await;
            if let Err(e) = self.reconcile().await {
                error!("Drift reconciliation failed: {}", e);
            }
        }
    }

    /// One comparison of the config documents against the push server.
    ///
    /// Failures for a single mapping are logged and do not stop the others.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<()> {
        let secrets = self
            .store
            .list_secrets(&push_application_selector(&self.application.application_id))
            .await?;
        let mappings = variant_mappings(&secrets);

        let known: HashSet<String> = self
            .push_client
            .list_variants()
            .await?
            .into_iter()
            .map(|v| v.variant_id)
            .collect();
        debug!(
            "Comparing {} recorded variants against {} on the push server",
            mappings.len(),
            known.len()
        );

        for mapping in mappings.iter().filter(|m| !known.contains(&m.variant_id)) {
            info!(
                "Variant {} found in client configs but not on the push server, removing service binding {}",
                mapping.variant_id, mapping.service_binding_id
            );
            if let Err(e) = self.delete_binding(&mapping.service_binding_id).await {
                error!(
                    "Error deleting service binding with id {}: {}",
                    mapping.service_binding_id, e
                );
            }
        }

        Ok(())
    }

    async fn delete_binding(&self, service_binding_id: &str) -> Result<()> {
        let name = find_service_binding_name(self.bindings.as_ref(), service_binding_id).await?;
        self.bindings.delete_service_binding(&name).await
    }
}
