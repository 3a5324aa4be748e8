// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! MobileClient custom resources.

use crate::constants::OPERATOR_NAME;
use crate::error::Result;
use crate::kubernetes::KubeStore;
use crate::types::MobileClient;
use async_trait::async_trait;
use kube::{
    api::{Patch, PatchParams},
    Api,
};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

/// Annotation changes: `Some` sets a value, `None` removes the key
pub type AnnotationChanges = BTreeMap<String, Option<String>>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MobileClientStore: Send + Sync {
    /// Get a MobileClient; `None` when it does not exist
    async fn get_mobile_client(&self, name: &str) -> Result<Option<MobileClient>>;

    /// Apply annotation changes.
    ///
    /// With a `resource_version` the write only succeeds if the resource is
    /// still at that version and fails with a conflict otherwise.
    async fn patch_annotations(
        &self,
        name: &str,
        resource_version: Option<String>,
        changes: AnnotationChanges,
    ) -> Result<()>;
}

/// JSON merge patch carrying the annotation changes and the version precondition
pub fn annotation_patch(resource_version: Option<&str>, changes: &AnnotationChanges) -> serde_json::Value {
    let mut metadata = json!({ "annotations": changes });
    if let Some(version) = resource_version {
        metadata["resourceVersion"] = json!(version);
    }
    json!({ "metadata": metadata })
}

#[async_trait]
impl MobileClientStore for KubeStore {
    async fn get_mobile_client(&self, name: &str) -> Result<Option<MobileClient>> {
        let clients: Api<MobileClient> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(clients.get_opt(name).await?)
    }

    #[instrument(skip(self, changes))]
    async fn patch_annotations(
        &self,
        name: &str,
        resource_version: Option<String>,
        changes: AnnotationChanges,
    ) -> Result<()> {
        let clients: Api<MobileClient> = Api::namespaced(self.client.clone(), &self.namespace);
        let patch = annotation_patch(resource_version.as_deref(), &changes);

        clients
            .patch(name, &PatchParams::apply(OPERATOR_NAME), &Patch::Merge(&patch))
            .await?;
        debug!("Patched {} annotations of mobile client {}", changes.len(), name);
        Ok(())
    }
}
