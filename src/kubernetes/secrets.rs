// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client config document Secrets.

use crate::constants::{config_document, labels};
use crate::error::{OperatorError, Result};
use crate::kubernetes::KubeStore;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{DeleteParams, ListParams, ObjectMeta, PostParams},
    Api, ResourceExt,
};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[cfg(test)]
use mockall::automock;

/// Secret storage of the namespace the operator manages
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// List Secrets matching a label selector
    async fn list_secrets(&self, selector: &str) -> Result<Vec<Secret>>;

    /// Create a Secret
    async fn create_secret(&self, secret: &Secret) -> Result<Secret>;

    /// Replace a Secret; fails with a conflict if it changed since it was read
    async fn update_secret(&self, secret: &Secret) -> Result<Secret>;

    /// Delete a Secret; deleting a missing Secret succeeds
    async fn delete_secret(&self, name: &str) -> Result<()>;
}

/// Selector of the config document of one mobile client
pub fn client_config_selector(client_id: &str) -> String {
    format!(
        "{}={},{}={}",
        labels::CLIENT_ID,
        client_id,
        labels::SERVICE_NAME,
        labels::UPS_SERVICE_NAME
    )
}

/// Selector of all config documents of a push application
pub fn push_application_selector(push_application_id: &str) -> String {
    format!(
        "{}={},{}={}",
        labels::SERVICE_NAME,
        labels::UPS_SERVICE_NAME,
        labels::PUSH_APPLICATION_ID,
        push_application_id
    )
}

/// Find the config document of a mobile client.
///
/// There is at most one per client; finding more means the store is
/// inconsistent and nobody can tell which one is authoritative.
pub async fn find_client_config(store: &dyn ConfigStore, client_id: &str) -> Result<Option<Secret>> {
    let mut secrets = store.list_secrets(&client_config_selector(client_id)).await?;

    match secrets.len() {
        0 => Ok(None),
        1 => Ok(secrets.pop()),
        _ => Err(OperatorError::MultipleConfigDocuments(client_id.to_string())),
    }
}

/// Name of a new config document
pub fn client_config_name(client_id: &str) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..config_document::NAME_SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", config_document::NAME_PREFIX, client_id, suffix)
}

/// An empty config document for a mobile client, not yet persisted
pub fn new_client_config(
    client_id: &str,
    service_instance_name: &str,
    service_instance_id: &str,
    push_application_id: &str,
) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(client_config_name(client_id)),
            labels: Some(BTreeMap::from([
                (labels::MOBILE.to_string(), "enabled".to_string()),
                (labels::SERVICE_NAME.to_string(), labels::UPS_SERVICE_NAME.to_string()),
                (labels::SERVICE_INSTANCE_ID.to_string(), service_instance_id.to_string()),
                (labels::CLIENT_ID.to_string(), client_id.to_string()),
                (labels::PUSH_APPLICATION_ID.to_string(), push_application_id.to_string()),
            ])),
            ..Default::default()
        },
        data: Some(BTreeMap::from([
            (
                config_document::SERVICE_INSTANCE_NAME.to_string(),
                ByteString(service_instance_name.as_bytes().to_vec()),
            ),
            (config_document::CONFIG.to_string(), ByteString(b"{}".to_vec())),
        ])),
        ..Default::default()
    }
}

#[async_trait]
impl ConfigStore for KubeStore {
    #[instrument(skip(self))]
    async fn list_secrets(&self, selector: &str) -> Result<Vec<Secret>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let list = secrets.list(&ListParams::default().labels(selector)).await?;
        debug!("Found {} secrets matching '{}'", list.items.len(), selector);
        Ok(list.items)
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    async fn create_secret(&self, secret: &Secret) -> Result<Secret> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let created = secrets.create(&PostParams::default(), secret).await?;
        info!("Secret `{}` created", created.name_any());
        Ok(created)
    }

    async fn update_secret(&self, secret: &Secret) -> Result<Secret> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(secrets
            .replace(&secret.name_any(), &PostParams::default(), secret)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_secret(&self, name: &str) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        match secrets
            .delete(name, &DeleteParams::default())
            .await
            .map_err(OperatorError::from)
        {
            Ok(_) => {
                info!("Secret `{}` has been deleted", name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!("Secret `{}` was already gone", name);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
