// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: CRD discovery and the stores backing the reconcilers.

pub mod crd;
pub mod mobile_clients;
pub mod secrets;
pub mod service_bindings;

pub use crd::wait_for_crds;
pub use mobile_clients::{AnnotationChanges, MobileClientStore};
pub use secrets::ConfigStore;
pub use service_bindings::ServiceBindingStore;

#[cfg(test)]
pub use mobile_clients::MockMobileClientStore;
#[cfg(test)]
pub use secrets::MockConfigStore;
#[cfg(test)]
pub use service_bindings::MockServiceBindingStore;

use kube::Client;

/// Namespaced access to Secrets, MobileClients and ServiceBindings
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    namespace: String,
}

impl KubeStore {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }
}
