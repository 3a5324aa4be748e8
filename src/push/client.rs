// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Push server REST client.
//!
//! Endpoints used, relative to the configured API URL:
//! - `GET    applications/{appId}`
//! - `GET    applications/{appId}/{platform}`
//! - `POST   applications/{appId}/android` (JSON body)
//! - `POST   applications/{appId}/ios` (multipart form with the decoded certificate)
//! - `DELETE applications/{appId}/{platform}/{variantId}`

use crate::error::{OperatorError, Result};
use crate::types::{AndroidVariant, IosVariant, Platform, Variant};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[cfg(test)]
use mockall::automock;

/// Operations on the variants of one push application
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PushClient: Send + Sync {
    /// Display name of the push application
    async fn push_application_name(&self) -> Result<String>;

    /// Find an existing Android variant registered for a Google key
    async fn find_android_variant(&self, google_key: &str) -> Result<Option<AndroidVariant>>;

    /// Create an Android variant, returning it as stored by the push server
    async fn create_android_variant(&self, variant: &AndroidVariant) -> Result<AndroidVariant>;

    /// Create an iOS variant, returning it as stored by the push server
    async fn create_ios_variant(&self, variant: &IosVariant) -> Result<IosVariant>;

    /// Delete a variant. `Ok(false)` when it does not exist or the push server refused.
    async fn delete_variant(&self, platform: Platform, variant_id: &str) -> Result<bool>;

    /// All variants of the application across platforms
    async fn list_variants(&self) -> Result<Vec<Variant>>;
}

#[derive(Deserialize)]
struct PushApplicationInfo {
    name: String,
}

/// [`PushClient`] talking to the push server over HTTP
pub struct UpsClient {
    http_client: Client,
    api_url: Url,
    application_id: String,
}

impl UpsClient {
    pub fn new(api_url: &str, application_id: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(OperatorError::UrlError(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        Ok(UpsClient {
            http_client: Client::new(),
            api_url,
            application_id: application_id.to_string(),
        })
    }

    fn application_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("applications")
                .push(&self.application_id)
                .extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("Push server request GET {}", url);
        let resp = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let resp = expect_status(resp, StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    async fn platform_variants<T: DeserializeOwned>(&self, platform: Platform) -> Result<Vec<T>> {
        self.get_json(self.application_url(&[platform.as_str()])).await
    }
}

#[async_trait]
impl PushClient for UpsClient {
    async fn push_application_name(&self) -> Result<String> {
        let info: PushApplicationInfo = self.get_json(self.application_url(&[])).await?;
        Ok(info.name)
    }

    #[instrument(skip(self, google_key))]
    async fn find_android_variant(&self, google_key: &str) -> Result<Option<AndroidVariant>> {
        let variants: Vec<AndroidVariant> = self.platform_variants(Platform::Android).await?;
        Ok(variants.into_iter().find(|v| v.google_key == google_key))
    }

    #[instrument(skip(self, variant), fields(variant_id = %variant.variant.variant_id))]
    async fn create_android_variant(&self, variant: &AndroidVariant) -> Result<AndroidVariant> {
        let url = self.application_url(&[Platform::Android.as_str()]);
        debug!("Push server request POST {}", url);

        let resp = self
            .http_client
            .post(url)
            .header("Accept", "application/json")
            .json(variant)
            .send()
            .await?;
        let resp = expect_status(resp, StatusCode::CREATED).await?;

        info!("Android variant {} created", variant.variant.variant_id);
        Ok(resp.json().await?)
    }

    #[instrument(skip(self, variant), fields(variant_id = %variant.variant.variant_id))]
    async fn create_ios_variant(&self, variant: &IosVariant) -> Result<IosVariant> {
        let url = self.application_url(&[Platform::Ios.as_str()]);
        debug!("Push server request POST {}", url);

        let certificate = match general_purpose::STANDARD.decode(variant.certificate.trim()) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    "Invalid cert - Please check this cert is in base64 encoded format: {}",
                    e
                );
                variant.certificate.as_bytes().to_vec()
            }
        };

        let form = multipart::Form::new()
            .part(
                "certificate",
                multipart::Part::bytes(certificate).file_name("certificate"),
            )
            .text("name", variant.variant.name.clone())
            .text("passphrase", variant.passphrase.clone())
            .text("production", variant.production.to_string())
            .text("description", variant.variant.description.clone());

        let resp = self
            .http_client
            .post(url)
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;
        let resp = expect_status(resp, StatusCode::CREATED).await?;

        info!("iOS variant {} created", variant.variant.variant_id);
        Ok(resp.json().await?)
    }

    #[instrument(skip(self))]
    async fn delete_variant(&self, platform: Platform, variant_id: &str) -> Result<bool> {
        let variants: Vec<Variant> = self.platform_variants(platform).await?;
        if !variants.iter().any(|v| v.variant_id == variant_id) {
            info!("No variant found to delete (Variant Id: `{}`)", variant_id);
            return Ok(false);
        }

        let url = self.application_url(&[platform.as_str(), variant_id]);
        info!("Deleting {} variant with id `{}`", platform, variant_id);

        let resp = self.http_client.delete(url).send().await?;
        let status = resp.status();
        info!(
            "Variant `{}` delete returned status code {}",
            variant_id,
            status.as_u16()
        );

        Ok(status == StatusCode::NO_CONTENT)
    }

    async fn list_variants(&self) -> Result<Vec<Variant>> {
        let mut variants: Vec<Variant> = self.platform_variants(Platform::Android).await?;
        variants.extend(self.platform_variants::<Variant>(Platform::Ios).await?);
        Ok(variants)
    }
}

async fn expect_status(resp: Response, expected: StatusCode) -> Result<Response> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    Err(OperatorError::PushServiceError {
        status: status.as_u16(),
        message,
    })
}
