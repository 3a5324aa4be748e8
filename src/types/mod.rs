// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types and the documents stored inside them.

pub mod binding_request;
pub mod client_config;
pub mod mobile_client;
pub mod platform;
pub mod service_binding;
pub mod variant;

pub use binding_request::{BindingRequest, PlatformRequest};
pub use client_config::{ClientConfig, PlatformConfig};
pub use mobile_client::MobileClient;
pub use platform::Platform;
pub use service_binding::ServiceBinding;
pub use variant::{AndroidVariant, IosVariant, Variant};

use k8s_openapi::api::core::v1::Secret;

/// Read a Secret data entry as a string; missing entries read as empty
pub fn data_string(secret: &Secret, key: &str) -> String {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
        .unwrap_or_default()
}
