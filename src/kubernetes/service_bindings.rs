// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service catalog ServiceBindings.

use crate::error::{OperatorError, Result};
use crate::kubernetes::KubeStore;
use crate::types::ServiceBinding;
use async_trait::async_trait;
use kube::{
    api::{DeleteParams, ListParams},
    Api, ResourceExt,
};
use tracing::{debug, info, instrument};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ServiceBindingStore: Send + Sync {
    async fn list_service_bindings(&self) -> Result<Vec<ServiceBinding>>;

    /// Delete a ServiceBinding; the service catalog then tears down its Secret
    async fn delete_service_binding(&self, name: &str) -> Result<()>;
}

/// Resolve the name of the ServiceBinding provisioned under `external_id`
pub async fn find_service_binding_name(
    store: &dyn ServiceBindingStore,
    external_id: &str,
) -> Result<String> {
    let bindings = store.list_service_bindings().await?;

    bindings
        .iter()
        .inspect(|b| debug!("Checking service binding {}", b.name_any()))
        .find(|b| b.spec.external_id == external_id)
        .map(|b| b.name_any())
        .ok_or_else(|| OperatorError::ServiceBindingNotFound(external_id.to_string()))
}

#[async_trait]
impl ServiceBindingStore for KubeStore {
    async fn list_service_bindings(&self) -> Result<Vec<ServiceBinding>> {
        let bindings: Api<ServiceBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        Ok(bindings.list(&ListParams::default()).await?.items)
    }

    #[instrument(skip(self))]
    async fn delete_service_binding(&self, name: &str) -> Result<()> {
        let bindings: Api<ServiceBinding> = Api::namespaced(self.client.clone(), &self.namespace);
        bindings.delete(name, &DeleteParams::default()).await?;
        info!("Service binding {} deleted", name);
        Ok(())
    }
}
