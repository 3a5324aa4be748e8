// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Push state recorded as annotations on the owning MobileClient.
//!
//! Per service instance `S` three annotations are kept:
//! - `org.aerogear.binding.S/push-application`: link to the push application
//! - `org.aerogear.binding.S/ups-url`: push server admin console
//! - `org.aerogear.binding-ext.S/variants`: one descriptor per bound platform
//!
//! The last platform being removed removes all three.

use crate::constants::annotations;
use crate::error::Result;
use crate::kubernetes::{AnnotationChanges, MobileClientStore};
use crate::push::PushApplication;
use crate::retry::{retry_on_conflict, RetryPolicy};
use crate::types::Platform;
use kube::ResourceExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Entry of the variants annotation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptor {
    #[serde(rename = "type")]
    pub platform: Platform,
    pub type_label: String,
    pub url: String,
    pub id: String,
}

/// Value of the push application link annotation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PushApplicationLink {
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub link_type: String,
}

/// Parse the variants annotation; absent or malformed reads as empty
pub fn parse_descriptors(raw: Option<&String>) -> Vec<VariantDescriptor> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Malformed variants annotation '{}', treating it as empty: {}", raw, e);
        Vec::new()
    })
}

/// Maintains the push annotations of MobileClients
pub struct AnnotationManager {
    store: Arc<dyn MobileClientStore>,
    application: Arc<PushApplication>,
    retry: RetryPolicy,
}

impl AnnotationManager {
    pub fn new(
        store: Arc<dyn MobileClientStore>,
        application: Arc<PushApplication>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            application,
            retry,
        }
    }

    /// Record a bound variant on the mobile client.
    ///
    /// A missing mobile client is logged and otherwise ignored.
    #[instrument(skip(self, application_name, variant_id))]
    pub async fn add(
        &self,
        client_id: &str,
        application_name: &str,
        platform: Platform,
        variant_id: &str,
        service_instance_name: &str,
    ) -> Result<()> {
        retry_on_conflict(&self.retry, "add mobile client annotations", || {
            self.try_add(
                client_id,
                application_name,
                platform,
                variant_id,
                service_instance_name,
            )
        })
        .await
    }

    async fn try_add(
        &self,
        client_id: &str,
        application_name: &str,
        platform: Platform,
        variant_id: &str,
        service_instance_name: &str,
    ) -> Result<()> {
        let Some(client) = self.store.get_mobile_client(client_id).await? else {
            warn!("No mobile client with name {} found", client_id);
            return Ok(());
        };

        let variants_key = annotations::variants(service_instance_name);
        let mut descriptors = parse_descriptors(client.annotations().get(&variants_key));
        descriptors.retain(|d| d.platform != platform);
        descriptors.push(VariantDescriptor {
            platform,
            type_label: platform.label().to_string(),
            url: self.application.variant_url(variant_id),
            id: variant_id.to_string(),
        });

        let link = PushApplicationLink {
            label: application_name.to_string(),
            value: self.application.variants_url(),
            link_type: "href".to_string(),
        };

        let changes = AnnotationChanges::from([
            (
                annotations::push_application(service_instance_name),
                Some(serde_json::to_string(&link)?),
            ),
            (
                annotations::ups_url(service_instance_name),
                Some(self.application.base_url.clone()),
            ),
            (variants_key, Some(serde_json::to_string(&descriptors)?)),
        ]);

        self.store
            .patch_annotations(client_id, client.resource_version(), changes)
            .await?;
        info!("Added {} variant annotation to mobile client {}", platform, client_id);
        Ok(())
    }

    /// Drop the descriptor of `platform` from the mobile client.
    ///
    /// Removing the last descriptor removes every push annotation of the
    /// service instance.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        client_id: &str,
        platform: Platform,
        service_instance_name: &str,
    ) -> Result<()> {
        retry_on_conflict(&self.retry, "remove mobile client annotations", || {
            self.try_remove(client_id, platform, service_instance_name)
        })
        .await
    }

    async fn try_remove(
        &self,
        client_id: &str,
        platform: Platform,
        service_instance_name: &str,
    ) -> Result<()> {
        let Some(client) = self.store.get_mobile_client(client_id).await? else {
            warn!("No mobile client with name {} found", client_id);
            return Ok(());
        };

        let variants_key = annotations::variants(service_instance_name);
        let mut descriptors = parse_descriptors(client.annotations().get(&variants_key));
        descriptors.retain(|d| d.platform != platform);

        let changes = if descriptors.is_empty() {
            debug!(
                "No variants left for {} on mobile client {}, removing all push annotations",
                service_instance_name, client_id
            );
            AnnotationChanges::from([
                (annotations::push_application(service_instance_name), None),
                (annotations::ups_url(service_instance_name), None),
                (variants_key, None),
            ])
        } else {
            AnnotationChanges::from([(variants_key, Some(serde_json::to_string(&descriptors)?))])
        };

        self.store
            .patch_annotations(client_id, client.resource_version(), changes)
            .await?;
        info!("Removed {} variant annotation from mobile client {}", platform, client_id);
        Ok(())
    }
}
