// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Push server request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid push server URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Push server responded with status {status}: {message}")]
    PushServiceError { status: u16, message: String },

    #[error("Multiple config secrets found for clientId {0}")]
    MultipleConfigDocuments(String),

    #[error("Can't find a service binding with ExternalID {0}")]
    ServiceBindingNotFound(String),

    #[error("Invalid bootstrap secret: {0}")]
    BootstrapSecretError(String),

    #[error("Invalid binding request: {0}")]
    InvalidBindingRequest(String),
}

impl OperatorError {
    /// True when the Kubernetes API rejected a write because the object changed underneath it
    pub fn is_conflict(&self) -> bool {
        matches!(self, OperatorError::KubeError(kube::Error::Api(err)) if err.code == 409)
    }

    /// True when the Kubernetes API reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, OperatorError::KubeError(kube::Error::Api(err)) if err.code == 404)
    }
}

pub type Result<T> = std::result::Result<T, OperatorError>;
