// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ups_config_operator::config::Config;
use ups_config_operator::kubernetes::{wait_for_crds, KubeStore};
use ups_config_operator::push::{PushApplication, PushClient, UpsClient};
use ups_config_operator::reconcilers::{BindingRequestHandler, DriftReconciler, SecretReconciler};
use ups_config_operator::retry::RetryPolicy;
use ups_config_operator::sync::{AnnotationManager, ClientConfigSync};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting UPS config operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: namespace={}, ups_api_url={}",
        config.namespace, config.ups_api_url
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    info!("Waiting for MobileClient and ServiceBinding CRDs to become available...");
    wait_for_crds(&client).await?;

    let application = Arc::new(
        PushApplication::load(&client, &config.namespace, &config.ups_secret_name).await?,
    );
    let push_client: Arc<dyn PushClient> =
        Arc::new(UpsClient::new(&config.ups_api_url, &application.application_id)?);
    let store = Arc::new(KubeStore::new(client.clone(), &config.namespace));
    let retry = RetryPolicy::with_max_retries(config.conflict_retries);

    let annotations = Arc::new(AnnotationManager::new(
        store.clone(),
        application.clone(),
        retry.clone(),
    ));
    let documents = Arc::new(ClientConfigSync::new(
        store.clone(),
        push_client.clone(),
        annotations,
        application.clone(),
        retry,
    ));
    let handler = Arc::new(BindingRequestHandler::new(
        store.clone(),
        push_client.clone(),
        documents,
    ));

    let secret_reconciler = SecretReconciler::new(client.clone(), &config.namespace, handler);
    let drift_reconciler = Arc::new(DriftReconciler::new(
        store.clone(),
        store,
        push_client,
        application,
        &config,
    ));

    info!("Starting reconcilers...");

    // Run the watch loop and the drift poll concurrently
    tokio::try_join!(secret_reconciler.run(), drift_reconciler.run())?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
