// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Binding request handler - provisions variants for new binding requests and
//! tears them down when their ServiceBinding goes away.

use crate::constants::binding;
use crate::error::Result;
use crate::kubernetes::ConfigStore;
use crate::push::PushClient;
use crate::sync::{BoundVariant, ClientConfigSync};
use crate::types::binding_request::{is_binding_request, is_owned_by_service_binding};
use crate::types::{
    data_string, AndroidVariant, BindingRequest, IosVariant, Platform, PlatformRequest, Variant,
};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Secret changes the handler reacts to
#[derive(Debug, Clone)]
pub enum SecretEvent {
    Added(Secret),
    Deleted(Secret),
}

pub struct BindingRequestHandler {
    store: Arc<dyn ConfigStore>,
    push_client: Arc<dyn PushClient>,
    documents: Arc<ClientConfigSync>,
}

impl BindingRequestHandler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        push_client: Arc<dyn PushClient>,
        documents: Arc<ClientConfigSync>,
    ) -> Self {
        Self {
            store,
            push_client,
            documents,
        }
    }

    /// Handle one event; failures are logged and the event is dropped
    pub async fn handle_event(&self, event: SecretEvent) {
        match event {
            SecretEvent::Added(secret) => self.handle_added(&secret).await,
            SecretEvent::Deleted(secret) => self.handle_deleted(&secret).await,
        }
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn handle_added(&self, secret: &Secret) {
        if !is_binding_request(secret) {
            return;
        }

        let app_type = data_string(secret, binding::APP_TYPE);
        info!("A mobile binding secret of type `{}` was added", app_type);

        match BindingRequest::from_secret(secret) {
            Ok(request) => {
                if let Err(e) = self.provision(&request).await {
                    error!(
                        "Failed to provision {} variant for client {}: {}",
                        request.platform.platform(),
                        request.client_id,
                        e
                    );
                }
            }
            Err(e) => warn!("Ignoring binding request: {}", e),
        }

        // Requests are consumed exactly once, whatever the outcome
        if let Err(e) = self.store.delete_secret(&secret.name_any()).await {
            error!("Failed to delete binding request {}: {}", secret.name_any(), e);
        }
    }

    /// Create the variant on the push server and merge it into the client's
    /// config document.
    ///
    /// Android variants are deduplicated by Google key. iOS requests always
    /// create a new variant, since no comparable identity is checked.
    async fn provision(&self, request: &BindingRequest) -> Result<()> {
        let config = match &request.platform {
            PlatformRequest::Android {
                google_key,
                project_number,
            } => {
                if let Some(existing) = self.push_client.find_android_variant(google_key).await? {
                    info!(
                        "Android variant {} already exists for this Google key, skipping",
                        existing.variant.variant_id
                    );
                    return Ok(());
                }

                let payload = AndroidVariant {
                    project_number: project_number.clone(),
                    google_key: google_key.clone(),
                    variant: Variant::generate(&request.client_id),
                };
                debug!("Creating a new android variant {}", payload.variant.variant_id);
                self.push_client
                    .create_android_variant(&payload)
                    .await?
                    .platform_config()
            }
            PlatformRequest::Ios {
                certificate,
                passphrase,
                is_production,
            } => {
                let payload = IosVariant {
                    certificate: certificate.clone(),
                    passphrase: passphrase.clone(),
                    production: *is_production,
                    variant: Variant::generate(&request.client_id),
                };
                debug!("Creating a new iOS variant {}", payload.variant.variant_id);
                self.push_client
                    .create_ios_variant(&payload)
                    .await?
                    .platform_config()
            }
        };

        self.documents
            .upsert(&BoundVariant {
                platform: request.platform.platform(),
                client_id: request.client_id.clone(),
                config,
                service_binding_id: request.service_binding_id.clone(),
                service_instance_name: request.service_instance_name.clone(),
            })
            .await
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn handle_deleted(&self, secret: &Secret) {
        if !is_owned_by_service_binding(secret) {
            return;
        }

        if let Err(e) = self.teardown(secret).await {
            error!("Failed to tear down binding {}: {}", secret.name_any(), e);
        }
    }

    async fn teardown(&self, secret: &Secret) -> Result<()> {
        let app_type = data_string(secret, binding::APP_TYPE);
        let platform: Platform = match app_type.parse() {
            Ok(platform) => platform,
            Err(e) => {
                debug!("Not a push binding: {}", e);
                return Ok(());
            }
        };

        let Some(variant_id) = self.documents.collapse(secret, platform).await? else {
            return Ok(());
        };
        if variant_id.is_empty() {
            debug!("No {} variant recorded, nothing to delete on the push server", platform);
            return Ok(());
        }

        if !self.push_client.delete_variant(platform, &variant_id).await? {
            warn!("Push server reported an error when deleting variant {}", variant_id);
        }
        Ok(())
    }
}
