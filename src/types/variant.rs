// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Push variants as exchanged with the push server REST API.

use crate::types::client_config::PlatformConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields shared by every variant
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Variant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "variantID", default)]
    pub variant_id: String,
    #[serde(default)]
    pub secret: String,
}

impl Variant {
    /// A new variant with operator issued id and secret.
    ///
    /// Both are random and never derived from the binding request.
    pub fn generate(name: &str) -> Self {
        Variant {
            name: name.to_string(),
            description: String::new(),
            variant_id: Uuid::new_v4().to_string(),
            secret: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AndroidVariant {
    #[serde(default)]
    pub project_number: String,
    #[serde(default)]
    pub google_key: String,
    #[serde(flatten)]
    pub variant: Variant,
}

impl AndroidVariant {
    /// The config document entry for this variant
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            sender_id: Some(self.project_number.clone()),
            variant_id: self.variant.variant_id.clone(),
            variant_secret: self.variant.secret.clone(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IosVariant {
    /// Base64 encoded certificate as delivered in the binding request
    #[serde(default, skip_serializing)]
    pub certificate: String,
    #[serde(default)]
    pub passphrase: String,
    #[serde(default)]
    pub production: bool,
    #[serde(flatten)]
    pub variant: Variant,
}

impl IosVariant {
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            sender_id: None,
            variant_id: self.variant.variant_id.clone(),
            variant_secret: self.variant.secret.clone(),
            ..Default::default()
        }
    }
}
