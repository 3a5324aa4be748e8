// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Merging variants into, and collapsing them out of, client config documents.

use crate::constants::{binding, config_document};
use crate::error::Result;
use crate::kubernetes::secrets::{find_client_config, new_client_config};
use crate::kubernetes::ConfigStore;
use crate::push::{PushApplication, PushClient};
use crate::retry::{retry_on_conflict, RetryPolicy};
use crate::sync::AnnotationManager;
use crate::types::{data_string, ClientConfig, Platform, PlatformConfig};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A freshly created variant to record for its mobile client
#[derive(Debug, Clone)]
pub struct BoundVariant {
    pub platform: Platform,
    pub client_id: String,
    pub config: PlatformConfig,
    pub service_binding_id: String,
    pub service_instance_name: String,
}

/// Keeps the single config document of each mobile client in line with its variants
pub struct ClientConfigSync {
    store: Arc<dyn ConfigStore>,
    push_client: Arc<dyn PushClient>,
    annotations: Arc<AnnotationManager>,
    application: Arc<PushApplication>,
    retry: RetryPolicy,
}

impl ClientConfigSync {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        push_client: Arc<dyn PushClient>,
        annotations: Arc<AnnotationManager>,
        application: Arc<PushApplication>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            push_client,
            annotations,
            application,
            retry,
        }
    }

    /// Record a variant in its client's config document, creating the
    /// document on first use, and annotate the MobileClient.
    #[instrument(skip(self, bound), fields(client_id = %bound.client_id, platform = %bound.platform))]
    pub async fn upsert(&self, bound: &BoundVariant) -> Result<()> {
        retry_on_conflict(&self.retry, "update client config", || self.try_upsert(bound)).await?;
        info!(
            "{} configuration of {} has been updated",
            bound.platform, bound.client_id
        );

        let application_name = match self.push_client.push_application_name().await {
            Ok(name) => name,
            Err(e) => {
                debug!("Push application name unavailable, using its id: {}", e);
                self.application.application_id.clone()
            }
        };

        if let Err(e) = self
            .annotations
            .add(
                &bound.client_id,
                &application_name,
                bound.platform,
                &bound.config.variant_id,
                &bound.service_instance_name,
            )
            .await
        {
            warn!(
                "Failed to annotate mobile client {}: {}",
                bound.client_id, e
            );
        }

        Ok(())
    }

    async fn try_upsert(&self, bound: &BoundVariant) -> Result<()> {
        let existing = find_client_config(self.store.as_ref(), &bound.client_id).await?;
        let is_new = existing.is_none();
        let mut secret = existing.unwrap_or_else(|| {
            new_client_config(
                &bound.client_id,
                &bound.service_instance_name,
                &self.application.service_instance_id,
                &self.application.application_id,
            )
        });

        let mut config = stored_config(&secret);
        config.insert(bound.platform, bound.config.clone());

        let data = secret.data.get_or_insert_with(BTreeMap::new);
        set_data(data, config_document::CONFIG, config.to_json()?);
        set_data(data, config_document::URI, self.application.base_url.clone());
        set_data(data, config_document::NAME, config_document::NAME_VALUE.to_string());
        set_data(data, config_document::TYPE, config_document::TYPE_VALUE.to_string());

        secret.annotations_mut().insert(
            config_document::binding_annotation(bound.platform.as_str()),
            bound.service_binding_id.clone(),
        );

        if is_new {
            self.store.create_secret(&secret).await?;
        } else {
            self.store.update_secret(&secret).await?;
        }
        Ok(())
    }

    /// Remove `platform` from the config document of the client named in
    /// `secret`.
    ///
    /// Returns the id of the removed variant, empty if the document held none,
    /// or `None` when there was nothing to tear down. A document left without
    /// platforms is deleted.
    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    pub async fn collapse(&self, secret: &Secret, platform: Platform) -> Result<Option<String>> {
        let client_id = data_string(secret, binding::CLIENT_ID);
        if client_id.is_empty() {
            debug!("Secret carries no clientId, nothing to tear down");
            return Ok(None);
        }

        retry_on_conflict(&self.retry, "collapse client config", || {
            self.try_collapse(&client_id, platform)
        })
        .await
    }

    async fn try_collapse(&self, client_id: &str, platform: Platform) -> Result<Option<String>> {
        let Some(mut secret) = find_client_config(self.store.as_ref(), client_id).await? else {
            warn!(
                "Cannot delete configuration for client `{}` because the secret does not exist",
                client_id
            );
            return Ok(None);
        };

        let service_instance_name = data_string(&secret, config_document::SERVICE_INSTANCE_NAME);
        info!("Deleting {} configuration from {}", platform, client_id);

        if let Err(e) = self
            .annotations
            .remove(client_id, platform, &service_instance_name)
            .await
        {
            warn!("Failed to remove annotations of mobile client {}: {}", client_id, e);
        }

        let mut config = stored_config(&secret);
        let variant_id = config
            .remove(platform)
            .map(|c| c.variant_id)
            .unwrap_or_default();

        if config.is_empty() {
            self.store.delete_secret(&secret.name_any()).await?;
            return Ok(Some(variant_id));
        }

        debug!("More than one variant available, updating configuration object");
        set_data(
            secret.data.get_or_insert_with(BTreeMap::new),
            config_document::CONFIG,
            config.to_json()?,
        );
        secret
            .annotations_mut()
            .remove(&config_document::binding_annotation(platform.as_str()));

        self.store.update_secret(&secret).await?;
        Ok(Some(variant_id))
    }
}

/// The platform entries stored in a config document
pub fn stored_config(secret: &Secret) -> ClientConfig {
    let raw = secret
        .data
        .as_ref()
        .and_then(|d| d.get(config_document::CONFIG))
        .map(|v| v.0.as_slice())
        .unwrap_or_default();
    ClientConfig::parse(raw)
}

fn set_data(data: &mut BTreeMap<String, ByteString>, key: &str, value: String) {
    data.insert(key.to_string(), ByteString(value.into_bytes()));
}
