// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - watches the Secrets of the namespace and hands
//! additions and deletions to the binding request handler.

use crate::constants::WATCH_RESTART_DELAY_SECS;
use crate::error::Result;
use crate::reconcilers::binding::{BindingRequestHandler, SecretEvent};
use futures::TryStreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{WatchEvent, WatchParams},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub struct SecretReconciler {
    client: Client,
    namespace: String,
    handler: Arc<BindingRequestHandler>,
}

impl SecretReconciler {
    pub fn new(client: Client, namespace: &str, handler: Arc<BindingRequestHandler>) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            handler,
        }
    }

    /// Watch forever, re-establishing the watch whenever it ends.
    ///
    /// Every restart lists from scratch, so events may be delivered again.
    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        info!("Entering watch loop for secrets in {}", self.namespace);

        loop {
            match self.watch(&secrets).await {
                Ok(()) => info!("Secret watch closed, restarting"),
                Err(e) => warn!("Secret watch failed: {}, restarting", e),
            }
            sleep(Duration::from_secs(WATCH_RESTART_DELAY_SECS)).await;
        }
    }

    /// Consume one watch until the server closes it or reports an error.
    /// Events are handled one at a time, in delivery order.
    async fn watch(&self, secrets: &Api<Secret>) -> Result<()> {
        let stream = secrets.watch(&WatchParams::default(), "0").await?;
        futures::pin_mut!(stream);

        while let Some(event) = stream.try_next().await? {
            match event {
                WatchEvent::Added(secret) => {
                    self.handler.handle_event(SecretEvent::Added(secret)).await
                }
                WatchEvent::Deleted(secret) => {
                    self.handler.handle_event(SecretEvent::Deleted(secret)).await
                }
                WatchEvent::Modified(secret) => {
                    debug!("Unhandled action: secret {} modified", secret.name_any())
                }
                WatchEvent::Bookmark(_) => debug!("Unhandled action: bookmark"),
                WatchEvent::Error(e) => {
                    warn!("Secret watch reported an error: {}", e);
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}
